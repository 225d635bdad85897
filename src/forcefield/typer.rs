//! UFF atom typing from element, aromaticity and bond orders.

use super::error::Error;
use crate::model::molecule::Molecule;
use crate::model::types::{BondOrder, Element};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hybridization {
    /// Terminal-only atoms (hydrogen, halogens).
    None,
    SP,
    SP2,
    Resonant,
    SP3,
}

impl Hybridization {
    #[inline]
    pub fn is_trigonal(&self) -> bool {
        matches!(self, Hybridization::SP2 | Hybridization::Resonant)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UffType {
    pub label: &'static str,
    pub hybridization: Hybridization,
}

impl UffType {
    const fn new(label: &'static str, hybridization: Hybridization) -> Self {
        Self {
            label,
            hybridization,
        }
    }
}

#[derive(Debug, Default)]
struct BondSummary {
    degree: usize,
    doubles: usize,
    triples: usize,
    aromatic: bool,
    valence: f64,
}

/// Assigns a UFF atom type to every atom of a hydrogen-complete molecule.
pub fn assign_types(mol: &Molecule) -> Result<Vec<UffType>, Error> {
    let mut summaries: Vec<BondSummary> = (0..mol.atom_count()).map(|_| BondSummary::default()).collect();
    for bond in &mol.bonds {
        for end in [bond.i, bond.j] {
            let s = &mut summaries[end];
            s.degree += 1;
            s.valence += bond.order.value();
            match bond.order {
                BondOrder::Double => s.doubles += 1,
                BondOrder::Triple => s.triples += 1,
                BondOrder::Aromatic => s.aromatic = true,
                BondOrder::Single => {}
            }
        }
    }

    mol.atoms
        .iter()
        .zip(&summaries)
        .enumerate()
        .map(|(index, (atom, s))| {
            let aromatic = atom.aromatic || s.aromatic;
            type_atom(atom.element, aromatic, s).ok_or(Error::UnsupportedElement {
                atom: index,
                element: atom.element,
            })
        })
        .collect()
}

fn type_atom(element: Element, aromatic: bool, s: &BondSummary) -> Option<UffType> {
    use Hybridization::*;

    let linear = s.triples > 0 || s.doubles >= 2;
    let t = match element {
        Element::H => UffType::new("H_", None),
        Element::C if aromatic => UffType::new("C_R", Resonant),
        Element::C if linear => UffType::new("C_1", SP),
        Element::C if s.doubles == 1 => UffType::new("C_2", SP2),
        Element::C => UffType::new("C_3", SP3),
        Element::N if aromatic => UffType::new("N_R", Resonant),
        Element::N if s.triples > 0 || (s.doubles >= 2 && s.degree == 2) => {
            UffType::new("N_1", SP)
        }
        Element::N if s.doubles >= 1 => UffType::new("N_2", SP2),
        Element::N => UffType::new("N_3", SP3),
        Element::O if aromatic => UffType::new("O_R", Resonant),
        Element::O if s.triples > 0 => UffType::new("O_1", SP),
        Element::O if s.doubles > 0 => UffType::new("O_2", SP2),
        Element::O => UffType::new("O_3", SP3),
        Element::S if aromatic => UffType::new("S_R", Resonant),
        Element::S if s.doubles > 0 && s.degree == 1 => UffType::new("S_2", SP2),
        Element::S if s.valence <= 2.0 => UffType::new("S_3+2", SP3),
        Element::S if s.valence <= 4.0 => UffType::new("S_3+4", SP3),
        Element::S => UffType::new("S_3+6", SP3),
        Element::P if s.valence > 3.0 => UffType::new("P_3+5", SP3),
        Element::P => UffType::new("P_3+3", SP3),
        Element::B if aromatic => UffType::new("B_2", Resonant),
        Element::B if s.doubles > 0 => UffType::new("B_2", SP2),
        Element::B => UffType::new("B_3", SP3),
        Element::Si => UffType::new("Si3", SP3),
        Element::F => UffType::new("F_", None),
        Element::Cl => UffType::new("Cl", None),
        Element::Br => UffType::new("Br", None),
        Element::I => UffType::new("I_", None),
        _ => return Option::None,
    };
    Some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::add_hydrogens;
    use crate::smiles;

    fn labels(smiles: &str) -> Vec<&'static str> {
        let mut mol = smiles::parse(smiles).unwrap();
        add_hydrogens(&mut mol);
        assign_types(&mol)
            .unwrap()
            .into_iter()
            .filter(|t| t.label != "H_")
            .map(|t| t.label)
            .collect()
    }

    #[test]
    fn types_carbon_hybridizations() {
        assert_eq!(labels("CC=CC#C"), vec!["C_3", "C_2", "C_2", "C_1", "C_1"]);
        assert_eq!(labels("C=C=C"), vec!["C_2", "C_1", "C_2"]);
    }

    #[test]
    fn types_aromatic_ring_atoms_as_resonant() {
        assert_eq!(labels("c1ccncc1"), vec!["C_R", "C_R", "C_R", "N_R", "C_R", "C_R"]);
        assert_eq!(labels("c1ccoc1")[3], "O_R");
        assert_eq!(labels("c1ccsc1")[3], "S_R");
    }

    #[test]
    fn types_heteroatoms() {
        assert_eq!(labels("CC(=O)O"), vec!["C_3", "C_2", "O_2", "O_3"]);
        assert_eq!(labels("CN"), vec!["C_3", "N_3"]);
        assert_eq!(labels("C=N"), vec!["C_2", "N_2"]);
        assert_eq!(labels("CC#N"), vec!["C_3", "C_1", "N_1"]);
        assert_eq!(labels("CSC"), vec!["C_3", "S_3+2", "C_3"]);
        assert_eq!(labels("CS(=O)C"), vec!["C_3", "S_3+4", "O_2", "C_3"]);
        assert_eq!(labels("CS(=O)(=O)C")[1], "S_3+6");
        assert_eq!(labels("C=S"), vec!["C_2", "S_2"]);
        assert_eq!(labels("CP(C)C")[1], "P_3+3");
        assert_eq!(labels("OP(=O)(O)O")[1], "P_3+5");
        assert_eq!(labels("FC(Cl)(Br)I"), vec!["F_", "C_3", "Cl", "Br", "I_"]);
    }

    #[test]
    fn hydrogens_and_halogens_are_terminal() {
        let mut mol = smiles::parse("CF").unwrap();
        add_hydrogens(&mut mol);
        let types = assign_types(&mol).unwrap();
        assert_eq!(types[1].hybridization, Hybridization::None);
        assert!(types[2..].iter().all(|t| t.label == "H_"));
    }

    #[test]
    fn rejects_elements_without_types() {
        let mol = smiles::parse("[Na+].[Cl-]").unwrap();
        assert!(matches!(
            assign_types(&mol).unwrap_err(),
            Error::UnsupportedElement {
                atom: 0,
                element: Element::Na
            }
        ));
    }
}
