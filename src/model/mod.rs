//! Core data structures for molecules flowing through the conversion pipeline.
//!
//! - [`atom`] – Atoms with element, charge, aromaticity, and stereo tags.
//! - [`types`] – Periodic table data, bond orders, and stereo descriptors.
//! - [`molecule`] – Molecular graphs with bonds and attached 3D conformers.
//!
//! A [`Molecule`] starts life as a bare graph produced by the SMILES parser,
//! gains explicit hydrogens, then accumulates [`Conformer`]s from embedding.
//! Every later stage mutates coordinates in place and never changes the atom order.
//!
//! [`Molecule`]: molecule::Molecule
//! [`Conformer`]: molecule::Conformer

pub mod atom;
pub mod molecule;
pub mod types;
