use crate::model::molecule::ConformerId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("conformer {0} does not exist on this molecule")]
    UnknownConformer(ConformerId),

    #[error("conformer {id} has {positions} positions for {atoms} atoms")]
    CoordinateMismatch {
        id: ConformerId,
        positions: usize,
        atoms: usize,
    },
}
