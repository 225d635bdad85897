use super::types::{Chirality, Element};

/// A neighbor slot in the SMILES-order neighbor list of a stereocenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StereoNeighbor {
    Atom(usize),
    /// The hydrogen written inside the bracket (`[C@H]`), before it is made explicit.
    ImplicitHydrogen,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: Element,
    pub formal_charge: i8,
    pub isotope: Option<u16>,
    pub aromatic: bool,
    /// Hydrogens attached to this atom that are not yet graph atoms.
    pub implicit_hydrogens: u8,
    pub chirality: Chirality,
    /// Neighbors in the order that defines `chirality`. Empty for non-stereo atoms.
    pub stereo_neighbors: Vec<StereoNeighbor>,
}

impl Atom {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            formal_charge: 0,
            isotope: None,
            aromatic: false,
            implicit_hydrogens: 0,
            chirality: Chirality::None,
            stereo_neighbors: Vec::new(),
        }
    }

    #[inline]
    pub fn is_hydrogen(&self) -> bool {
        self.element == Element::H
    }

    #[inline]
    pub fn is_stereocenter(&self) -> bool {
        self.chirality != Chirality::None
    }
}
