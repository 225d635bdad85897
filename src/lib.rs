//! A pure Rust library for turning SMILES strings into force-field optimized
//! 3D conformers written as PDB files.
//!
//! # Features
//!
//! - **SMILES parsing**: Organic subset, bracket atoms, aromaticity, ring
//!   closures, tetrahedral chirality, and `/` `\` double-bond marks
//! - **Hydrogen completion**: Implicit hydrogens become graph atoms in a
//!   stable order
//! - **Distance-geometry embedding**: Bounds smoothing, metric-matrix
//!   coordinates and chirality-aware refinement, parallel across conformers
//! - **UFF optimization**: Atom typing, bonded and van der Waals terms, L-BFGS
//!   minimization
//! - **PDB output**: `HETATM`/`CONECT` blocks with multi-model files
//!
//! # Quick Start
//!
//! ```
//! use smiles2pdb::pipeline::{self, PipelineConfig};
//! use smiles2pdb::io::pdb::write_conformers;
//!
//! let output = pipeline::run("CCO", &PipelineConfig::default())?;
//!
//! // Ethanol with explicit hydrogens: 3 heavy atoms + 6 H
//! assert_eq!(output.molecule.atom_count(), 9);
//! assert_eq!(output.conformer_ids.len(), 1);
//!
//! let mut pdb = Vec::new();
//! write_conformers(&mut pdb, &output.molecule, &output.conformer_ids)?;
//! assert!(String::from_utf8(pdb)?.ends_with("END\n"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Module Organization
//!
//! - [`smiles`]: SMILES parser
//! - [`ops`]: Hydrogen addition and ring perception
//! - [`embed`]: Distance-geometry conformer generation
//! - [`forcefield`]: UFF typing, energy and optimization
//! - [`minimize`]: FIRE and L-BFGS minimizers
//! - [`io`]: PDB serialization
//! - [`pipeline`]: The full conversion as one call

pub mod embed;
pub mod forcefield;
pub mod io;
pub mod minimize;
pub mod model;
pub mod ops;
pub mod pipeline;
pub mod smiles;

pub use model::atom::{Atom, StereoNeighbor};
pub use model::molecule::{Bond, Conformer, ConformerId, DirectionMark, Molecule};
pub use model::types::{
    BondDirection, BondOrder, Chirality, Element, ParseBondOrderError, ParseElementError,
};
