//! Builds a [`ForceField`] from a typed molecule and a parameter table.

use std::collections::HashSet;

use super::error::Error;
use super::params::{AtomTypeParams, ForceFieldParams};
use super::terms::{AngleBend, AngleForm, BondStretch, ForceField, Inversion, Torsion, VanDerWaals};
use super::typer::{Hybridization, UffType, assign_types};
use crate::model::molecule::Molecule;
use crate::model::types::Element;

/// Group 16 sp3 torsion barriers: oxygen, then the heavier chalcogens.
const OXYGEN_SP3_BARRIER: f64 = 2.0;
const CHALCOGEN_SP3_BARRIER: f64 = 6.8;

struct Context<'a> {
    mol: &'a Molecule,
    params: &'a ForceFieldParams,
    types: Vec<UffType>,
    atom_params: Vec<&'a AtomTypeParams>,
    adjacency: Vec<Vec<usize>>,
}

pub fn build(mol: &Molecule, params: &ForceFieldParams) -> Result<ForceField, Error> {
    let types = assign_types(mol)?;
    let atom_params = types
        .iter()
        .map(|t| params.atom(t.label))
        .collect::<Result<Vec<_>, _>>()?;

    let ctx = Context {
        mol,
        params,
        types,
        atom_params,
        adjacency: mol.adjacency(),
    };

    Ok(ForceField {
        bonds: ctx.bond_terms(),
        angles: ctx.angle_terms(),
        torsions: ctx.torsion_terms(),
        inversions: ctx.inversion_terms(),
        van_der_waals: ctx.van_der_waals_terms(),
    })
}

impl Context<'_> {
    fn bond_order(&self, a: usize, b: usize) -> f64 {
        self.mol
            .bond_between(a, b)
            .map(|bond| bond.order.value())
            .unwrap_or(1.0)
    }

    fn rest_length(&self, a: usize, b: usize) -> f64 {
        self.params
            .rest_length(self.atom_params[a], self.atom_params[b], self.bond_order(a, b))
    }

    fn bond_terms(&self) -> Vec<BondStretch> {
        self.mol
            .bonds
            .iter()
            .map(|bond| {
                let r0 = self.rest_length(bond.i, bond.j);
                let k = self.params.global.bond_k
                    * self.atom_params[bond.i].z_star
                    * self.atom_params[bond.j].z_star
                    / r0.powi(3);
                BondStretch {
                    i: bond.i,
                    j: bond.j,
                    rest_length: r0,
                    force_constant: k,
                }
            })
            .collect()
    }

    fn angle_terms(&self) -> Vec<AngleBend> {
        let mut terms = Vec::new();
        for (j, neighbors) in self.adjacency.iter().enumerate() {
            let theta0 = self.atom_params[j].theta0.to_radians();
            let cos0 = theta0.cos();
            for (a, &i) in neighbors.iter().enumerate() {
                for &k in &neighbors[a + 1..] {
                    let r_ij = self.rest_length(i, j);
                    let r_jk = self.rest_length(j, k);
                    let r_ik_sq = (r_ij * r_ij + r_jk * r_jk - 2.0 * r_ij * r_jk * cos0).max(1e-6);
                    let r_ik = r_ik_sq.sqrt();
                    let k_ijk = self.params.global.bond_k
                        * self.atom_params[i].z_star
                        * self.atom_params[k].z_star
                        / r_ik.powi(5)
                        * (3.0 * r_ij * r_jk * (1.0 - cos0 * cos0) - r_ik_sq * cos0);
                    terms.push(AngleBend {
                        i,
                        j,
                        k,
                        force_constant: k_ijk,
                        form: AngleForm::for_natural_angle(theta0),
                    });
                }
            }
        }
        terms
    }

    fn torsion_terms(&self) -> Vec<Torsion> {
        let mut terms = Vec::new();
        for bond in &self.mol.bonds {
            let (j, k) = (bond.i, bond.j);
            let (deg_j, deg_k) = (self.adjacency[j].len(), self.adjacency[k].len());
            if deg_j < 2 || deg_k < 2 {
                continue;
            }
            let Some((barrier, periodicity, phase)) = self.torsion_params(j, k, bond.order.value())
            else {
                continue;
            };
            let barrier = barrier / ((deg_j - 1) * (deg_k - 1)) as f64;
            if barrier.abs() < 1e-12 {
                continue;
            }

            for &i in self.adjacency[j].iter().filter(|&&i| i != k) {
                for &l in self.adjacency[k].iter().filter(|&&l| l != j && l != i) {
                    terms.push(Torsion {
                        i,
                        j,
                        k,
                        l,
                        barrier,
                        periodicity,
                        phase,
                    });
                }
            }
        }
        terms
    }

    /// Barrier, periodicity and `cos(n φ0)` for rotation about `j`-`k`.
    fn torsion_params(&self, j: usize, k: usize, bond_order: f64) -> Option<(f64, f64, f64)> {
        let (hj, hk) = (self.types[j].hybridization, self.types[k].hybridization);
        let (pj, pk) = (self.atom_params[j], self.atom_params[k]);
        let sp2_barrier = || {
            self.params.global.sp2_torsion_scale
                * (pj.u_j * pk.u_j).sqrt()
                * (1.0 + self.params.global.sp2_torsion_order_scale * bond_order.ln())
        };

        match (hj, hk) {
            (Hybridization::SP3, Hybridization::SP3) => {
                if is_chalcogen(self.mol.atoms[j].element) && is_chalcogen(self.mol.atoms[k].element) {
                    let v = (chalcogen_barrier(self.mol.atoms[j].element)
                        * chalcogen_barrier(self.mol.atoms[k].element))
                    .sqrt();
                    Some((v, 2.0, -1.0))
                } else {
                    Some(((pj.v_i * pk.v_i).sqrt(), 3.0, -1.0))
                }
            }
            (a, b) if a.is_trigonal() && b.is_trigonal() => Some((sp2_barrier(), 2.0, 1.0)),
            (a, b) if (a.is_trigonal() && b == Hybridization::SP3)
                || (a == Hybridization::SP3 && b.is_trigonal()) =>
            {
                let (sp3, sp2) = if a == Hybridization::SP3 { (j, k) } else { (k, j) };
                if is_chalcogen(self.mol.atoms[sp3].element) {
                    Some((sp2_barrier(), 2.0, -1.0))
                } else if self.adjacency[sp2]
                    .iter()
                    .any(|&n| n != sp3 && self.types[n].hybridization.is_trigonal())
                {
                    Some((2.0, 3.0, -1.0))
                } else {
                    Some((1.0, 6.0, 1.0))
                }
            }
            _ => None,
        }
    }

    fn inversion_terms(&self) -> Vec<Inversion> {
        let mut terms = Vec::new();
        for (center, neighbors) in self.adjacency.iter().enumerate() {
            if neighbors.len() != 3 {
                continue;
            }
            let k = match (self.mol.atoms[center].element, self.types[center].label) {
                (Element::C, "C_2" | "C_R") => {
                    if neighbors.iter().any(|&n| self.types[n].label == "O_2") {
                        self.params.global.inversion_k_carbonyl
                    } else {
                        self.params.global.inversion_k
                    }
                }
                (Element::N, "N_2" | "N_R") => self.params.global.inversion_k,
                _ => continue,
            };
            let (a, b, c) = (neighbors[0], neighbors[1], neighbors[2]);
            for (i, kk, l) in [(a, b, c), (b, c, a), (c, a, b)] {
                terms.push(Inversion {
                    center,
                    i,
                    k: kk,
                    l,
                    force_constant: k / 3.0,
                });
            }
        }
        terms
    }

    fn van_der_waals_terms(&self) -> Vec<VanDerWaals> {
        let mut excluded = HashSet::new();
        for (center, neighbors) in self.adjacency.iter().enumerate() {
            for &n in neighbors {
                excluded.insert(ordered(center, n));
            }
            for (a, &i) in neighbors.iter().enumerate() {
                for &k in &neighbors[a + 1..] {
                    excluded.insert(ordered(i, k));
                }
            }
        }

        let n = self.mol.atom_count();
        let mut terms = Vec::new();
        for i in 0..n {
            for j in i + 1..n {
                if excluded.contains(&(i, j)) {
                    continue;
                }
                let (pi, pj) = (self.atom_params[i], self.atom_params[j]);
                terms.push(VanDerWaals {
                    i,
                    j,
                    distance: (pi.x1 * pj.x1).sqrt(),
                    well_depth: (pi.d1 * pj.d1).sqrt(),
                });
            }
        }
        terms
    }
}

#[inline]
fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

fn is_chalcogen(element: Element) -> bool {
    matches!(element, Element::O | Element::S | Element::Se | Element::Te)
}

fn chalcogen_barrier(element: Element) -> f64 {
    if element == Element::O {
        OXYGEN_SP3_BARRIER
    } else {
        CHALCOGEN_SP3_BARRIER
    }
}
