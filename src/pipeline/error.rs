//! Error type for the end-to-end conversion pipeline.

use thiserror::Error;

use crate::{embed, forcefield, smiles};

/// Failures that stop a conversion. Optimization problems are not errors;
/// they are reported per conformer in the pipeline output.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse SMILES: {0}")]
    Parse(#[from] smiles::Error),

    #[error("failed to generate 3D coordinates: {0}")]
    Embed(#[from] embed::Error),

    /// No conformer of a batch could be embedded.
    #[error("failed to generate any of the {requested} requested conformers")]
    NoConformers { requested: usize },

    /// The custom force field parameter table could not be loaded.
    #[error("failed to load force field parameters: {0}")]
    Parameters(#[from] forcefield::Error),
}
