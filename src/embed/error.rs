use thiserror::Error;

/// Errors produced while generating 3D coordinates.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot embed a molecule with no atoms")]
    EmptyMolecule,

    /// Triangle smoothing found a pair whose lower bound exceeds its upper bound.
    #[error("distance bounds between atoms {i} and {j} are inconsistent")]
    InconsistentBounds { i: usize, j: usize },

    /// No attempt produced an acceptable geometry.
    #[error("failed to embed a conformer after {attempts} attempts")]
    EmbeddingFailed { attempts: usize },

    #[error("failed to build embedding thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
