mod writer;

pub use writer::{to_pdb_block, write_conformers};
