//! Error types for UFF setup.
//!
//! Optimization itself never fails: problems found while building the force
//! field are reported through these variants and surface to callers as a
//! setup-failed status.

use thiserror::Error;

use crate::model::molecule::ConformerId;
use crate::model::types::Element;

#[derive(Debug, Error)]
pub enum Error {
    /// Failed to parse force field parameters TOML.
    #[error("failed to parse force field parameters: {0}")]
    ParameterParse(#[from] toml::de::Error),

    /// No UFF atom type is defined for this element.
    #[error("no UFF atom type for atom {atom} ({element})")]
    UnsupportedElement { atom: usize, element: Element },

    /// An atom type was assigned but the parameter table has no entry for it.
    #[error("missing force field parameter for atom type '{atom_type}'")]
    MissingParameter { atom_type: String },

    /// The requested conformer does not exist on the molecule.
    #[error("conformer {0} does not exist")]
    UnknownConformer(ConformerId),

    /// The conformer does not hold one position per atom.
    #[error("conformer {id} has {positions} positions for {atoms} atoms")]
    CoordinateMismatch {
        id: ConformerId,
        positions: usize,
        atoms: usize,
    },
}
