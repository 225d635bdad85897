//! Structure output.
//!
//! Conformers are written as PDB blocks: one `HETATM` record per atom in a
//! single `UNL` residue, `CONECT` records for the bond graph and an `END`
//! terminator. Several conformers go into one file as numbered
//! `MODEL`/`ENDMDL` sections.

pub mod error;
pub mod pdb;

pub use error::Error;
