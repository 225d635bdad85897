use std::fmt;

use super::atom::Atom;
use super::types::{BondDirection, BondOrder};

/// A `/` or `\` mark together with the atom the bond was written from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirectionMark {
    pub direction: BondDirection,
    pub from: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bond {
    pub i: usize,
    pub j: usize,
    pub order: BondOrder,
    pub mark: Option<DirectionMark>,
}

impl Bond {
    pub fn new(idx1: usize, idx2: usize, order: BondOrder) -> Self {
        if idx1 <= idx2 {
            Self { i: idx1, j: idx2, order, mark: None }
        } else {
            Self { i: idx2, j: idx1, order, mark: None }
        }
    }

    pub fn with_mark(mut self, mark: Option<DirectionMark>) -> Self {
        self.mark = mark;
        self
    }

    #[inline]
    pub fn contains(&self, atom: usize) -> bool {
        self.i == atom || self.j == atom
    }

    /// The atom on the other end of this bond, if `atom` is one of its ends.
    #[inline]
    pub fn partner(&self, atom: usize) -> Option<usize> {
        if self.i == atom {
            Some(self.j)
        } else if self.j == atom {
            Some(self.i)
        } else {
            None
        }
    }

    /// Whether `neighbor` sits "up" relative to `center` across this bond.
    ///
    /// `X/C` places X below C, while `C/X` places X above C.
    pub fn neighbor_is_up(&self, center: usize, neighbor: usize) -> Option<bool> {
        let mark = self.mark?;
        if mark.from == center {
            Some(mark.direction == BondDirection::Up)
        } else if mark.from == neighbor {
            Some(mark.direction == BondDirection::Down)
        } else {
            None
        }
    }
}

/// Handle to one 3D coordinate set stored on a [`Molecule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConformerId(pub u32);

impl ConformerId {
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ConformerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conformer {
    pub id: ConformerId,
    pub positions: Vec<[f64; 3]>,
}

#[derive(Debug, Clone, Default)]
pub struct Molecule {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
    pub conformers: Vec<Conformer>,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    #[inline]
    pub fn conformer_count(&self) -> usize {
        self.conformers.len()
    }

    pub fn heavy_atom_count(&self) -> usize {
        self.atoms.iter().filter(|a| !a.is_hydrogen()).count()
    }

    pub fn add_atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.atoms.len() - 1
    }

    pub fn add_bond(&mut self, bond: Bond) -> usize {
        self.bonds.push(bond);
        self.bonds.len() - 1
    }

    pub fn bond_between(&self, a: usize, b: usize) -> Option<&Bond> {
        let (i, j) = if a <= b { (a, b) } else { (b, a) };
        self.bonds.iter().find(|bond| bond.i == i && bond.j == j)
    }

    /// Neighbor lists for every atom, in bond insertion order.
    pub fn adjacency(&self) -> Vec<Vec<usize>> {
        let mut adj = vec![Vec::new(); self.atoms.len()];
        for bond in &self.bonds {
            adj[bond.i].push(bond.j);
            adj[bond.j].push(bond.i);
        }
        adj
    }

    /// Sum of bond orders around `atom`, counting aromatic bonds as one.
    pub fn explicit_valence(&self, atom: usize) -> u8 {
        self.bonds
            .iter()
            .filter(|b| b.contains(atom))
            .map(|b| match b.order {
                BondOrder::Single | BondOrder::Aromatic => 1,
                BondOrder::Double => 2,
                BondOrder::Triple => 3,
            })
            .sum()
    }

    pub fn conformer(&self, id: ConformerId) -> Option<&Conformer> {
        self.conformers.iter().find(|c| c.id == id)
    }

    pub fn conformer_mut(&mut self, id: ConformerId) -> Option<&mut Conformer> {
        self.conformers.iter_mut().find(|c| c.id == id)
    }

    /// Stores a coordinate set and returns its newly assigned id.
    pub fn add_conformer(&mut self, positions: Vec<[f64; 3]>) -> ConformerId {
        let next = self
            .conformers
            .iter()
            .map(|c| c.id.0 + 1)
            .max()
            .unwrap_or(0);
        let id = ConformerId(next);
        self.conformers.push(Conformer { id, positions });
        id
    }

    pub fn conformer_ids(&self) -> Vec<ConformerId> {
        self.conformers.iter().map(|c| c.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::Element;

    fn ethene() -> Molecule {
        let mut mol = Molecule::new();
        let c1 = mol.add_atom(Atom::new(Element::C));
        let c2 = mol.add_atom(Atom::new(Element::C));
        mol.add_bond(Bond::new(c2, c1, BondOrder::Double));
        mol
    }

    #[test]
    fn bond_new_orders_indices() {
        let bond = Bond::new(5, 2, BondOrder::Single);
        assert_eq!((bond.i, bond.j), (2, 5));
        assert_eq!(bond.partner(2), Some(5));
        assert_eq!(bond.partner(7), None);
    }

    #[test]
    fn bond_lookup_is_order_independent() {
        let mol = ethene();
        assert!(mol.bond_between(0, 1).is_some());
        assert!(mol.bond_between(1, 0).is_some());
        assert_eq!(mol.explicit_valence(0), 2);
        assert_eq!(mol.adjacency(), vec![vec![1], vec![0]]);
    }

    #[test]
    fn direction_marks_resolve_relative_to_center() {
        // F/C: written from F (index 0) to C (index 1), so F sits below C.
        let bond = Bond::new(0, 1, BondOrder::Single).with_mark(Some(DirectionMark {
            direction: BondDirection::Up,
            from: 0,
        }));
        assert_eq!(bond.neighbor_is_up(1, 0), Some(false));
        assert_eq!(bond.neighbor_is_up(0, 1), Some(true));
        assert_eq!(Bond::new(0, 1, BondOrder::Single).neighbor_is_up(1, 0), None);
    }

    #[test]
    fn conformer_ids_are_sequential() {
        let mut mol = ethene();
        let a = mol.add_conformer(vec![[0.0; 3]; 2]);
        let b = mol.add_conformer(vec![[1.0; 3]; 2]);
        assert_eq!(a, ConformerId(0));
        assert_eq!(b, ConformerId(1));
        assert_eq!(mol.conformer_ids(), vec![a, b]);
        assert_eq!(mol.conformer(b).unwrap().positions[0], [1.0; 3]);
        assert!(mol.conformer(ConformerId(9)).is_none());
    }
}
