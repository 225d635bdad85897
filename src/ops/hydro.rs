use glam::DVec3;

use crate::model::atom::{Atom, StereoNeighbor};
use crate::model::molecule::{Bond, Molecule};
use crate::model::types::{BondOrder, Element};

const FALLBACK_DIRECTIONS: [DVec3; 6] = [
    DVec3::X,
    DVec3::Y,
    DVec3::Z,
    DVec3::NEG_X,
    DVec3::NEG_Y,
    DVec3::NEG_Z,
];

/// Makes every implicit hydrogen an explicit atom.
///
/// New hydrogens are appended after the existing atoms, grouped by parent in
/// parent order, and bonded to their parent with single bonds. Stereocenters
/// that referred to a bracket hydrogen are updated to point at the new atom.
///
/// When the molecule already carries conformers, each new hydrogen is placed
/// at its ideal bond length from the parent, pointing away from the parent's
/// other neighbors.
pub fn add_hydrogens(mol: &mut Molecule) {
    let parents: Vec<(usize, u8)> = mol
        .atoms
        .iter()
        .enumerate()
        .filter(|(_, atom)| atom.implicit_hydrogens > 0)
        .map(|(index, atom)| (index, atom.implicit_hydrogens))
        .collect();

    for (parent, count) in parents {
        let first_new = mol.atom_count();
        for _ in 0..count {
            let h = mol.add_atom(Atom::new(Element::H));
            mol.add_bond(Bond::new(parent, h, BondOrder::Single));
        }

        let atom = &mut mol.atoms[parent];
        atom.implicit_hydrogens = 0;
        for slot in atom.stereo_neighbors.iter_mut() {
            if *slot == StereoNeighbor::ImplicitHydrogen {
                *slot = StereoNeighbor::Atom(first_new);
            }
        }

        if !mol.conformers.is_empty() {
            place_hydrogens(mol, parent, first_new..first_new + usize::from(count));
        }
    }
}

fn place_hydrogens(mol: &mut Molecule, parent: usize, hydrogens: std::ops::Range<usize>) {
    let bond_length =
        mol.atoms[parent].element.covalent_radius() + Element::H.covalent_radius();
    let existing: Vec<usize> = mol
        .adjacency()
        .swap_remove(parent)
        .into_iter()
        .filter(|n| !hydrogens.contains(n))
        .collect();

    for conformer in &mut mol.conformers {
        let center = DVec3::from_array(conformer.positions[parent]);
        let mut directions: Vec<DVec3> = existing
            .iter()
            .filter_map(|&n| {
                let pos = conformer.positions.get(n)?;
                (DVec3::from_array(*pos) - center).try_normalize()
            })
            .collect();

        for h in hydrogens.clone() {
            let direction = away_from(&directions);
            let position = center + direction * bond_length;
            if conformer.positions.len() <= h {
                conformer.positions.resize(h + 1, [0.0; 3]);
            }
            conformer.positions[h] = position.to_array();
            directions.push(direction);
        }
    }
}

/// Unit vector pointing away from the given unit directions.
fn away_from(directions: &[DVec3]) -> DVec3 {
    let sum: DVec3 = directions.iter().copied().sum();
    if sum.length() > 1e-3 {
        return -sum.normalize();
    }
    FALLBACK_DIRECTIONS
        .iter()
        .copied()
        .min_by(|a, b| {
            let worst = |c: &DVec3| directions.iter().map(|d| d.dot(*c)).fold(-1.0, f64::max);
            worst(a).total_cmp(&worst(b))
        })
        .unwrap_or(DVec3::X)
}
