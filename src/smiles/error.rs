use thiserror::Error;

use crate::model::types::Element;

/// Errors produced while reading a SMILES string.
///
/// Positions are 0-based character offsets into the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("SMILES string is empty")]
    Empty,

    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },

    #[error("unknown element symbol '{symbol}' at position {position}")]
    UnknownElement { symbol: String, position: usize },

    #[error("bracket atom opened at position {position} is never closed")]
    UnclosedBracket { position: usize },

    #[error("closing parenthesis at position {position} has no matching '('")]
    UnmatchedParenthesis { position: usize },

    #[error("branch opened at position {position} is never closed")]
    UnclosedBranch { position: usize },

    #[error("bond or branch at position {position} has no preceding atom")]
    MissingAtom { position: usize },

    #[error("bond at position {position} is not followed by an atom")]
    DanglingBond { position: usize },

    #[error("ring closure {label} opened at position {position} is never closed")]
    UnclosedRing { label: u16, position: usize },

    #[error("ring closure {label} at position {position} specifies conflicting bond types")]
    RingBondConflict { label: u16, position: usize },

    #[error("ring closure {label} at position {position} would duplicate an existing bond")]
    InvalidRingClosure { label: u16, position: usize },

    #[error("unsupported SMILES feature '{feature}' at position {position}")]
    Unsupported {
        feature: &'static str,
        position: usize,
    },

    #[error("atom {atom} is marked aromatic but is not in a ring")]
    NonRingAromatic { atom: usize },

    #[error("explicit valence {valence} for atom {atom} ({element}) exceeds the maximum of {max}")]
    ValenceExceeded {
        atom: usize,
        element: Element,
        valence: u8,
        max: u8,
    },
}

impl Error {
    /// Character offset the error points at, when there is one.
    pub fn position(&self) -> Option<usize> {
        match self {
            Error::UnexpectedCharacter { position, .. }
            | Error::UnknownElement { position, .. }
            | Error::UnclosedBracket { position }
            | Error::UnmatchedParenthesis { position }
            | Error::UnclosedBranch { position }
            | Error::MissingAtom { position }
            | Error::DanglingBond { position }
            | Error::UnclosedRing { position, .. }
            | Error::RingBondConflict { position, .. }
            | Error::InvalidRingClosure { position, .. }
            | Error::Unsupported { position, .. } => Some(*position),
            Error::Empty | Error::NonRingAromatic { .. } | Error::ValenceExceeded { .. } => None,
        }
    }
}
