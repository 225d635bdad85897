//! SMILES reader.
//!
//! Builds a [`Molecule`] graph from a SMILES string. Supported syntax covers
//! the organic subset (`B C N O P S F Cl Br I` and aromatic `b c n o p s`),
//! bracket atoms with isotope, tetrahedral chirality, hydrogen count, charge
//! and atom class, the bond symbols `- = # : / \`, branches, ring closures
//! (`0-9` and `%nn`), and dot-disconnected components.
//!
//! Hydrogens are not added as graph atoms here: organic-subset atoms receive
//! an implicit count from their default valence and bracket atoms keep the
//! count they were written with. See [`crate::ops::add_hydrogens`].

mod error;

pub use error::Error;

use std::collections::HashMap;

use crate::model::atom::{Atom, StereoNeighbor};
use crate::model::molecule::{Bond, DirectionMark, Molecule};
use crate::model::types::{BondDirection, BondOrder, Chirality, Element};
use crate::ops::rings::RingInfo;

/// Parses a SMILES string into a hydrogen-suppressed molecular graph.
///
/// # Errors
///
/// Returns an [`Error`] describing the first syntax problem found, or a
/// chemistry problem (aromatic atom outside a ring, exceeded valence)
/// detected once the whole string has been read.
pub fn parse(smiles: &str) -> Result<Molecule, Error> {
    let trimmed = smiles.trim();
    if trimmed.is_empty() {
        return Err(Error::Empty);
    }
    Parser::new(trimmed).run()
}

#[derive(Debug, Clone, Copy)]
struct PendingBond {
    order: Option<BondOrder>,
    direction: Option<BondDirection>,
    position: usize,
}

#[derive(Debug, Clone, Copy)]
struct RingOpening {
    atom: usize,
    bond: Option<PendingBond>,
    /// Index of the placeholder in the opening atom's stereo neighbor list.
    slot: usize,
    position: usize,
}

struct BracketAtom {
    atom: Atom,
    hydrogens: u8,
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    mol: Molecule,
    prev: Option<usize>,
    branches: Vec<(Option<usize>, usize)>,
    pending: Option<PendingBond>,
    rings: HashMap<u16, RingOpening>,
    /// Atoms written without brackets; their hydrogens come from default valences.
    organic: Vec<bool>,
    /// Whether each atom was bonded to a preceding atom when it was read.
    has_prev: Vec<bool>,
    neighbor_order: Vec<Vec<StereoNeighbor>>,
}

impl Parser {
    fn new(smiles: &str) -> Self {
        Self {
            chars: smiles.chars().collect(),
            pos: 0,
            mol: Molecule::new(),
            prev: None,
            branches: Vec::new(),
            pending: None,
            rings: HashMap::new(),
            organic: Vec::new(),
            has_prev: Vec::new(),
            neighbor_order: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Molecule, Error> {
        while let Some(ch) = self.peek() {
            match ch {
                '(' => self.open_branch()?,
                ')' => self.close_branch()?,
                '.' => self.dot()?,
                '-' | '=' | '#' | ':' | '$' | '/' | '\\' => self.bond_symbol(ch)?,
                '0'..='9' | '%' => self.ring_closure()?,
                '[' => {
                    let bracket = self.bracket_atom()?;
                    self.push_atom(bracket.atom, false, bracket.hydrogens);
                }
                _ => {
                    let atom = self.organic_atom()?;
                    self.push_atom(atom, true, 0);
                }
            }
        }

        if let Some(bond) = self.pending {
            return Err(Error::DanglingBond {
                position: bond.position,
            });
        }
        if let Some(&(_, position)) = self.branches.last() {
            return Err(Error::UnclosedBranch { position });
        }
        if let Some((&label, opening)) = self.rings.iter().min_by_key(|(_, o)| o.position) {
            return Err(Error::UnclosedRing {
                label,
                position: opening.position,
            });
        }

        self.finish()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn open_branch(&mut self) -> Result<(), Error> {
        let Some(prev) = self.prev else {
            return Err(Error::MissingAtom { position: self.pos });
        };
        if let Some(bond) = self.pending {
            return Err(Error::DanglingBond {
                position: bond.position,
            });
        }
        self.branches.push((Some(prev), self.pos));
        self.pos += 1;
        Ok(())
    }

    fn close_branch(&mut self) -> Result<(), Error> {
        if let Some(bond) = self.pending {
            return Err(Error::DanglingBond {
                position: bond.position,
            });
        }
        let Some((restored, _)) = self.branches.pop() else {
            return Err(Error::UnmatchedParenthesis { position: self.pos });
        };
        self.prev = restored;
        self.pos += 1;
        Ok(())
    }

    fn dot(&mut self) -> Result<(), Error> {
        if self.prev.is_none() {
            return Err(Error::UnexpectedCharacter {
                ch: '.',
                position: self.pos,
            });
        }
        if let Some(bond) = self.pending {
            return Err(Error::DanglingBond {
                position: bond.position,
            });
        }
        self.prev = None;
        self.pos += 1;
        Ok(())
    }

    fn bond_symbol(&mut self, ch: char) -> Result<(), Error> {
        if self.prev.is_none() {
            return Err(Error::MissingAtom { position: self.pos });
        }
        if self.pending.is_some() {
            return Err(Error::UnexpectedCharacter {
                ch,
                position: self.pos,
            });
        }
        let (order, direction) = match ch {
            '-' => (Some(BondOrder::Single), None),
            '=' => (Some(BondOrder::Double), None),
            '#' => (Some(BondOrder::Triple), None),
            ':' => (Some(BondOrder::Aromatic), None),
            '/' => (Some(BondOrder::Single), Some(BondDirection::Up)),
            '\\' => (Some(BondOrder::Single), Some(BondDirection::Down)),
            _ => {
                return Err(Error::Unsupported {
                    feature: "quadruple bond",
                    position: self.pos,
                });
            }
        };
        self.pending = Some(PendingBond {
            order,
            direction,
            position: self.pos,
        });
        self.pos += 1;
        Ok(())
    }

    fn ring_closure(&mut self) -> Result<(), Error> {
        let position = self.pos;
        let Some(current) = self.prev else {
            return Err(Error::MissingAtom { position });
        };

        let label = if self.peek() == Some('%') {
            let (Some(a), Some(b)) = (self.peek_at(1), self.peek_at(2)) else {
                return Err(Error::UnexpectedCharacter {
                    ch: '%',
                    position,
                });
            };
            match (a.to_digit(10), b.to_digit(10)) {
                (Some(a), Some(b)) => {
                    self.pos += 3;
                    (a * 10 + b) as u16
                }
                _ => {
                    return Err(Error::UnexpectedCharacter {
                        ch: '%',
                        position,
                    });
                }
            }
        } else {
            let digit = self.peek().and_then(|c| c.to_digit(10)).unwrap_or(0);
            self.pos += 1;
            digit as u16
        };

        let bond = self.pending.take();

        match self.rings.remove(&label) {
            None => {
                self.neighbor_order[current].push(StereoNeighbor::Atom(usize::MAX));
                let slot = self.neighbor_order[current].len() - 1;
                self.rings.insert(
                    label,
                    RingOpening {
                        atom: current,
                        bond,
                        slot,
                        position,
                    },
                );
            }
            Some(opening) => {
                if opening.atom == current || self.mol.bond_between(opening.atom, current).is_some()
                {
                    return Err(Error::InvalidRingClosure { label, position });
                }

                let order = match (
                    opening.bond.and_then(|b| b.order),
                    bond.and_then(|b| b.order),
                ) {
                    (Some(a), Some(b)) if a != b => {
                        return Err(Error::RingBondConflict { label, position });
                    }
                    (Some(a), _) | (None, Some(a)) => a,
                    (None, None) => self.default_order(opening.atom, current),
                };

                let mark = bond
                    .and_then(|b| b.direction.map(|d| (d, current)))
                    .or_else(|| opening.bond.and_then(|b| b.direction.map(|d| (d, opening.atom))))
                    .map(|(direction, from)| DirectionMark { direction, from });

                self.mol
                    .add_bond(Bond::new(opening.atom, current, order).with_mark(mark));
                self.neighbor_order[opening.atom][opening.slot] = StereoNeighbor::Atom(current);
                self.neighbor_order[current].push(StereoNeighbor::Atom(opening.atom));
            }
        }
        Ok(())
    }

    fn default_order(&self, a: usize, b: usize) -> BondOrder {
        if self.mol.atoms[a].aromatic && self.mol.atoms[b].aromatic {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        }
    }

    fn push_atom(&mut self, atom: Atom, organic: bool, bracket_hydrogens: u8) {
        let has_chirality = atom.is_stereocenter();
        let index = self.mol.add_atom(atom);
        self.organic.push(organic);
        self.has_prev.push(self.prev.is_some());
        self.neighbor_order.push(Vec::new());

        if let Some(prev) = self.prev {
            let pending = self.pending.take();
            let order = pending
                .and_then(|b| b.order)
                .unwrap_or_else(|| self.default_order(prev, index));
            let mark = pending
                .and_then(|b| b.direction)
                .map(|direction| DirectionMark {
                    direction,
                    from: prev,
                });
            self.mol
                .add_bond(Bond::new(prev, index, order).with_mark(mark));
            self.neighbor_order[prev].push(StereoNeighbor::Atom(index));
            self.neighbor_order[index].push(StereoNeighbor::Atom(prev));
        }

        if has_chirality && bracket_hydrogens > 0 {
            self.neighbor_order[index].push(StereoNeighbor::ImplicitHydrogen);
        }
        self.mol.atoms[index].implicit_hydrogens = bracket_hydrogens;
        self.prev = Some(index);
    }

    fn organic_atom(&mut self) -> Result<Atom, Error> {
        let position = self.pos;
        let Some(ch) = self.peek() else {
            return Err(Error::UnexpectedCharacter { ch: ' ', position });
        };

        let (element, aromatic, width) = match (ch, self.peek_at(1)) {
            ('C', Some('l')) => (Element::Cl, false, 2),
            ('B', Some('r')) => (Element::Br, false, 2),
            ('B', _) => (Element::B, false, 1),
            ('C', _) => (Element::C, false, 1),
            ('N', _) => (Element::N, false, 1),
            ('O', _) => (Element::O, false, 1),
            ('P', _) => (Element::P, false, 1),
            ('S', _) => (Element::S, false, 1),
            ('F', _) => (Element::F, false, 1),
            ('I', _) => (Element::I, false, 1),
            ('b', _) => (Element::B, true, 1),
            ('c', _) => (Element::C, true, 1),
            ('n', _) => (Element::N, true, 1),
            ('o', _) => (Element::O, true, 1),
            ('p', _) => (Element::P, true, 1),
            ('s', _) => (Element::S, true, 1),
            ('*', _) => {
                return Err(Error::Unsupported {
                    feature: "wildcard atom",
                    position,
                });
            }
            (c, _) if c.is_ascii_uppercase() => {
                let symbol = match self.peek_at(1) {
                    Some(l) if l.is_ascii_lowercase() => format!("{c}{l}"),
                    _ => c.to_string(),
                };
                return Err(Error::UnknownElement { symbol, position });
            }
            (c, _) => return Err(Error::UnexpectedCharacter { ch: c, position }),
        };

        self.pos += width;
        let mut atom = Atom::new(element);
        atom.aromatic = aromatic;
        Ok(atom)
    }

    fn bracket_atom(&mut self) -> Result<BracketAtom, Error> {
        let open = self.pos;
        self.pos += 1;

        let isotope = self.read_number().map(|n| n as u16);

        let (element, aromatic) = self.bracket_symbol(open)?;
        let mut atom = Atom::new(element);
        atom.aromatic = aromatic;
        atom.isotope = isotope;
        atom.chirality = self.bracket_chirality()?;

        let mut hydrogens = 0;
        if self.peek() == Some('H') {
            self.pos += 1;
            hydrogens = self.read_number().unwrap_or(1).min(u32::from(u8::MAX)) as u8;
        }

        atom.formal_charge = self.bracket_charge();

        if self.peek() == Some(':') {
            self.pos += 1;
            if self.read_number().is_none() {
                return Err(self.unexpected_or_unclosed(open));
            }
        }

        match self.peek() {
            Some(']') => {
                self.pos += 1;
                Ok(BracketAtom { atom, hydrogens })
            }
            _ => Err(self.unexpected_or_unclosed(open)),
        }
    }

    fn bracket_symbol(&mut self, open: usize) -> Result<(Element, bool), Error> {
        let position = self.pos;
        match self.peek() {
            Some(c) if c.is_ascii_uppercase() => {
                if let Some(l) = self.peek_at(1).filter(|l| l.is_ascii_lowercase()) {
                    let two = format!("{c}{l}");
                    if let Ok(element) = two.parse::<Element>() {
                        self.pos += 2;
                        return Ok((element, false));
                    }
                }
                let one = c.to_string();
                match one.parse::<Element>() {
                    Ok(element) => {
                        self.pos += 1;
                        Ok((element, false))
                    }
                    Err(_) => Err(Error::UnknownElement {
                        symbol: one,
                        position,
                    }),
                }
            }
            Some(c) if c.is_ascii_lowercase() => {
                for (text, element) in [("se", Element::Se), ("as", Element::As), ("te", Element::Te)]
                {
                    if self.matches(text) {
                        self.pos += 2;
                        return Ok((element, true));
                    }
                }
                let element = match c {
                    'b' => Element::B,
                    'c' => Element::C,
                    'n' => Element::N,
                    'o' => Element::O,
                    'p' => Element::P,
                    's' => Element::S,
                    _ => {
                        return Err(Error::UnknownElement {
                            symbol: c.to_string(),
                            position,
                        });
                    }
                };
                self.pos += 1;
                Ok((element, true))
            }
            Some('*') => Err(Error::Unsupported {
                feature: "wildcard atom",
                position,
            }),
            _ => Err(self.unexpected_or_unclosed(open)),
        }
    }

    fn bracket_chirality(&mut self) -> Result<Chirality, Error> {
        if self.peek() != Some('@') {
            return Ok(Chirality::None);
        }
        let position = self.pos;
        self.pos += 1;
        if self.peek() == Some('@') {
            self.pos += 1;
            return Ok(Chirality::Clockwise);
        }
        if self.matches("TH1") {
            self.pos += 3;
            return Ok(Chirality::CounterClockwise);
        }
        if self.matches("TH2") {
            self.pos += 3;
            return Ok(Chirality::Clockwise);
        }
        if ["AL", "SP", "TB", "OH"].iter().any(|tag| self.matches(tag)) {
            return Err(Error::Unsupported {
                feature: "non-tetrahedral chirality",
                position,
            });
        }
        Ok(Chirality::CounterClockwise)
    }

    fn bracket_charge(&mut self) -> i8 {
        let sign = match self.peek() {
            Some('+') => 1i8,
            Some('-') => -1i8,
            _ => return 0,
        };
        let symbol = if sign > 0 { '+' } else { '-' };
        self.pos += 1;

        if let Some(n) = self.read_number() {
            return sign.saturating_mul(n.min(15) as i8);
        }
        let mut magnitude = 1i8;
        while self.peek() == Some(symbol) {
            self.pos += 1;
            magnitude = magnitude.saturating_add(1);
        }
        sign * magnitude
    }

    fn read_number(&mut self) -> Option<u32> {
        let start = self.pos;
        let mut value: u32 = 0;
        while let Some(d) = self.peek().and_then(|c| c.to_digit(10)) {
            value = value.saturating_mul(10).saturating_add(d);
            self.pos += 1;
        }
        (self.pos > start).then_some(value)
    }

    fn matches(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn unexpected_or_unclosed(&self, open: usize) -> Error {
        match self.peek() {
            Some(ch) => Error::UnexpectedCharacter {
                ch,
                position: self.pos,
            },
            None => Error::UnclosedBracket { position: open },
        }
    }

    fn finish(mut self) -> Result<Molecule, Error> {
        let ring_info = RingInfo::new(&self.mol);

        for index in 0..self.mol.atom_count() {
            let atom = &self.mol.atoms[index];
            if atom.aromatic && !ring_info.atom_in_ring(index) {
                return Err(Error::NonRingAromatic { atom: index });
            }

            let valence = self.mol.explicit_valence(index);
            if self.organic[index] {
                let hydrogens = implicit_hydrogens(atom.element, atom.aromatic, valence)
                    .ok_or_else(|| Error::ValenceExceeded {
                        atom: index,
                        element: atom.element,
                        valence,
                        max: atom.element.valences().last().copied().unwrap_or(0),
                    })?;
                self.mol.atoms[index].implicit_hydrogens = hydrogens;
            } else if !atom.aromatic {
                let allowed = atom.element.valences_with_charge(atom.formal_charge);
                let total = valence.saturating_add(atom.implicit_hydrogens);
                match allowed.last() {
                    Some(&max) if total > max => {
                        return Err(Error::ValenceExceeded {
                            atom: index,
                            element: atom.element,
                            valence: total,
                            max,
                        });
                    }
                    _ => {}
                }
            }
        }

        let orders = self.neighbor_order.into_iter().zip(self.has_prev);
        for (index, (atom, (mut order, has_prev))) in self.mol.atoms.iter_mut().zip(orders).enumerate() {
            if !atom.is_stereocenter() {
                continue;
            }
            // A lone pair takes the place an implicit hydrogen would have;
            // the center's own position stands in for it.
            if order.len() == 3 {
                order.insert(usize::from(has_prev), StereoNeighbor::Atom(index));
            }
            if order.len() == 4 {
                atom.stereo_neighbors = order;
            } else {
                atom.chirality = Chirality::None;
            }
        }

        Ok(self.mol)
    }
}

/// Hydrogens implied by an organic-subset atom's default valence.
///
/// Returns `None` when a non-aromatic atom already exceeds every allowed valence.
fn implicit_hydrogens(element: Element, aromatic: bool, explicit_valence: u8) -> Option<u8> {
    let valences = element.valences();
    if aromatic {
        let lowest = valences.first().copied().unwrap_or(0);
        return Some(lowest.saturating_sub(explicit_valence + 1));
    }
    valences
        .iter()
        .find(|&&v| v >= explicit_valence)
        .map(|&v| v - explicit_valence)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hydrogens(mol: &Molecule) -> Vec<u8> {
        mol.atoms.iter().map(|a| a.implicit_hydrogens).collect()
    }

    #[test]
    fn parses_simple_chain_with_implicit_hydrogens() {
        let mol = parse("CCO").unwrap();
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 2);
        assert_eq!(hydrogens(&mol), vec![3, 2, 1]);
    }

    #[test]
    fn parses_two_letter_organic_atoms() {
        let mol = parse("ClCBr").unwrap();
        let elements: Vec<_> = mol.atoms.iter().map(|a| a.element).collect();
        assert_eq!(elements, vec![Element::Cl, Element::C, Element::Br]);
        assert_eq!(hydrogens(&mol), vec![0, 2, 0]);
    }

    #[test]
    fn parses_branches_and_multiple_bonds() {
        let mol = parse("CC(=O)O").unwrap();
        assert_eq!(mol.atom_count(), 4);
        assert_eq!(mol.bond_between(1, 2).unwrap().order, BondOrder::Double);
        assert_eq!(mol.bond_between(1, 3).unwrap().order, BondOrder::Single);
        assert_eq!(hydrogens(&mol), vec![3, 0, 0, 1]);
    }

    #[test]
    fn parses_triple_bond() {
        let mol = parse("C#N").unwrap();
        assert_eq!(mol.bonds[0].order, BondOrder::Triple);
        assert_eq!(hydrogens(&mol), vec![1, 0]);
    }

    #[test]
    fn parses_ring_closures() {
        let mol = parse("C1CCCCC1").unwrap();
        assert_eq!(mol.atom_count(), 6);
        assert_eq!(mol.bond_count(), 6);
        assert!(mol.bond_between(0, 5).is_some());
        assert!(hydrogens(&mol).iter().all(|&h| h == 2));
    }

    #[test]
    fn parses_percent_ring_labels() {
        let mol = parse("C%12CCC%12").unwrap();
        assert_eq!(mol.bond_count(), 4);
        assert!(mol.bond_between(0, 3).is_some());
    }

    #[test]
    fn ring_closure_bond_order_from_either_end() {
        let mol = parse("C=1CCCCC1").unwrap();
        assert_eq!(mol.bond_between(0, 5).unwrap().order, BondOrder::Double);
        let mol = parse("C1CCCCC=1").unwrap();
        assert_eq!(mol.bond_between(0, 5).unwrap().order, BondOrder::Double);
    }

    #[test]
    fn aromatic_ring_gets_aromatic_bonds_and_one_hydrogen_per_carbon() {
        let mol = parse("c1ccccc1").unwrap();
        assert!(mol.bonds.iter().all(|b| b.order == BondOrder::Aromatic));
        assert_eq!(hydrogens(&mol), vec![1; 6]);
    }

    #[test]
    fn heteroaromatic_hydrogen_counts() {
        let pyridine = parse("n1ccccc1").unwrap();
        assert_eq!(pyridine.atoms[0].implicit_hydrogens, 0);

        let pyrrole = parse("[nH]1cccc1").unwrap();
        assert_eq!(pyrrole.atoms[0].implicit_hydrogens, 1);

        let thiophene = parse("s1cccc1").unwrap();
        assert_eq!(thiophene.atoms[0].implicit_hydrogens, 0);

        let phenol = parse("Oc1ccccc1").unwrap();
        assert_eq!(phenol.atoms[1].implicit_hydrogens, 0);
        assert_eq!(phenol.atoms[0].implicit_hydrogens, 1);
    }

    #[test]
    fn bracket_atoms_keep_written_hydrogens_and_charge() {
        let mol = parse("C[NH3+]").unwrap();
        assert_eq!(mol.atoms[1].element, Element::N);
        assert_eq!(mol.atoms[1].implicit_hydrogens, 3);
        assert_eq!(mol.atoms[1].formal_charge, 1);

        let mol = parse("[O-]C=O").unwrap();
        assert_eq!(mol.atoms[0].implicit_hydrogens, 0);
        assert_eq!(mol.atoms[0].formal_charge, -1);

        let mol = parse("[Fe+++]").unwrap();
        assert_eq!(mol.atoms[0].formal_charge, 3);

        let mol = parse("[Cu-2]").unwrap();
        assert_eq!(mol.atoms[0].formal_charge, -2);
    }

    #[test]
    fn bracket_atoms_read_isotope_and_class() {
        let mol = parse("[13CH4:7]").unwrap();
        assert_eq!(mol.atoms[0].isotope, Some(13));
        assert_eq!(mol.atoms[0].implicit_hydrogens, 4);
    }

    #[test]
    fn bracket_two_letter_symbols_prefer_the_longer_element() {
        let mol = parse("[Na+].[Cl-]").unwrap();
        assert_eq!(mol.atoms[0].element, Element::Na);
        assert_eq!(mol.atoms[1].element, Element::Cl);
        assert_eq!(mol.bond_count(), 0);
    }

    #[test]
    fn dot_separates_components() {
        let mol = parse("C.C").unwrap();
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(mol.bond_count(), 0);
    }

    #[test]
    fn records_chirality_neighbor_order() {
        let mol = parse("N[C@@H](C)C(=O)O").unwrap();
        let center = &mol.atoms[1];
        assert_eq!(center.chirality, Chirality::Clockwise);
        assert_eq!(
            center.stereo_neighbors,
            vec![
                StereoNeighbor::Atom(0),
                StereoNeighbor::ImplicitHydrogen,
                StereoNeighbor::Atom(2),
                StereoNeighbor::Atom(3),
            ]
        );
    }

    #[test]
    fn ring_closure_neighbors_take_the_digit_position() {
        let mol = parse("[C@]1(F)(Cl)CC1").unwrap();
        assert_eq!(
            mol.atoms[0].stereo_neighbors,
            vec![
                StereoNeighbor::Atom(4),
                StereoNeighbor::Atom(1),
                StereoNeighbor::Atom(2),
                StereoNeighbor::Atom(3),
            ]
        );
    }

    #[test]
    fn lone_pair_stereocenters_use_the_center_as_fourth_neighbor() {
        let mol = parse("C[S@](=O)CC").unwrap();
        assert_eq!(
            mol.atoms[1].stereo_neighbors,
            vec![
                StereoNeighbor::Atom(0),
                StereoNeighbor::Atom(1),
                StereoNeighbor::Atom(2),
                StereoNeighbor::Atom(3),
            ]
        );

        let mol = parse("[S@](C)(=O)CC").unwrap();
        assert_eq!(mol.atoms[0].stereo_neighbors[0], StereoNeighbor::Atom(0));
    }

    #[test]
    fn chirality_on_underconnected_atoms_is_dropped() {
        let mol = parse("F[C@]Cl").unwrap();
        assert_eq!(mol.atoms[1].chirality, Chirality::None);
        assert!(mol.atoms[1].stereo_neighbors.is_empty());
    }

    #[test]
    fn records_double_bond_direction_marks() {
        let mol = parse("F/C=C/F").unwrap();
        let first = mol.bond_between(0, 1).unwrap();
        let last = mol.bond_between(2, 3).unwrap();
        assert_eq!(first.neighbor_is_up(1, 0), Some(false));
        assert_eq!(last.neighbor_is_up(2, 3), Some(true));
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(parse("   ").unwrap_err(), Error::Empty);
    }

    #[test]
    fn rejects_unexpected_characters() {
        let err = parse("not_a_smiles").unwrap_err();
        assert_eq!(
            err,
            Error::UnexpectedCharacter {
                ch: 't',
                position: 2
            }
        );
    }

    #[test]
    fn rejects_unknown_elements() {
        assert!(matches!(
            parse("CXy").unwrap_err(),
            Error::UnknownElement { position: 1, .. }
        ));
        assert!(matches!(
            parse("[Qq]").unwrap_err(),
            Error::UnknownElement { .. }
        ));
    }

    #[test]
    fn rejects_unbalanced_branches() {
        assert_eq!(
            parse("CC(C").unwrap_err(),
            Error::UnclosedBranch { position: 2 }
        );
        assert_eq!(
            parse("CC)C").unwrap_err(),
            Error::UnmatchedParenthesis { position: 2 }
        );
        assert_eq!(parse("(C)").unwrap_err(), Error::MissingAtom { position: 0 });
    }

    #[test]
    fn rejects_unclosed_rings() {
        assert_eq!(
            parse("C1CC").unwrap_err(),
            Error::UnclosedRing {
                label: 1,
                position: 1
            }
        );
    }

    #[test]
    fn rejects_conflicting_and_invalid_ring_bonds() {
        assert!(matches!(
            parse("C=1CC#1").unwrap_err(),
            Error::RingBondConflict { label: 1, .. }
        ));
        assert!(matches!(
            parse("C11").unwrap_err(),
            Error::InvalidRingClosure { label: 1, .. }
        ));
        assert!(matches!(
            parse("C12C12").unwrap_err(),
            Error::InvalidRingClosure { .. }
        ));
    }

    #[test]
    fn rejects_dangling_and_leading_bonds() {
        assert_eq!(parse("CC=").unwrap_err(), Error::DanglingBond { position: 2 });
        assert_eq!(parse("=CC").unwrap_err(), Error::MissingAtom { position: 0 });
    }

    #[test]
    fn rejects_unclosed_bracket() {
        assert_eq!(
            parse("C[NH4").unwrap_err(),
            Error::UnclosedBracket { position: 1 }
        );
    }

    #[test]
    fn rejects_aromatic_atoms_outside_rings() {
        assert_eq!(
            parse("cC").unwrap_err(),
            Error::NonRingAromatic { atom: 0 }
        );
    }

    #[test]
    fn rejects_hypervalent_atoms() {
        let err = parse("C(C)(C)(C)(C)C").unwrap_err();
        assert!(matches!(
            err,
            Error::ValenceExceeded {
                atom: 0,
                element: Element::C,
                valence: 5,
                max: 4
            }
        ));
        assert!(matches!(
            parse("[CH5]").unwrap_err(),
            Error::ValenceExceeded { .. }
        ));
    }

    #[test]
    fn charged_bracket_atoms_use_shifted_valence() {
        assert!(parse("C[N+](C)(C)C").is_ok());
        assert!(matches!(
            parse("C[N+](C)(C)(C)C").unwrap_err(),
            Error::ValenceExceeded { .. }
        ));
    }

    #[test]
    fn rejects_unsupported_features() {
        assert!(matches!(
            parse("C$C").unwrap_err(),
            Error::Unsupported { feature: "quadruple bond", .. }
        ));
        assert!(matches!(
            parse("*C").unwrap_err(),
            Error::Unsupported { feature: "wildcard atom", .. }
        ));
    }

    #[test]
    fn error_positions_are_exposed() {
        assert_eq!(parse("C1CC").unwrap_err().position(), Some(1));
        assert_eq!(parse("").unwrap_err().position(), None);
    }
}
