//! Graph operations applied to a parsed [`Molecule`](crate::model::molecule::Molecule).
//!
//! - [`add_hydrogens`] turns implicit hydrogen counts into explicit atoms.
//! - [`rings::RingInfo`] answers ring-membership queries used by the parser,
//!   the force-field typer and the embedding bounds.

mod hydro;
pub mod rings;

pub use hydro::add_hydrogens;
