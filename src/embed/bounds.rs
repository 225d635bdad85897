//! Interatomic distance bounds for distance-geometry embedding.

use std::collections::HashMap;

use super::error::Error;
use crate::forcefield::{self, ForceFieldParams};
use crate::model::molecule::Molecule;
use crate::model::types::BondOrder;
use crate::ops::rings::RingInfo;

/// Upper bound for pairs nothing constrains.
pub const MAX_UPPER: f64 = 1000.0;

const BOND_TOLERANCE: f64 = 0.01;
const ANGLE_TOLERANCE: f64 = 0.04;
const TORSION_TOLERANCE: f64 = 0.06;
const STEREO_TOLERANCE: f64 = 0.06;
/// Extra room above the contact distance for atoms in separate fragments.
const FRAGMENT_SPACING: f64 = 10.0;
/// Van der Waals scalings tried in turn until smoothing succeeds.
const VDW_SCALES: [f64; 3] = [0.7, 0.5, 0.0];

/// Symmetric matrix of lower and upper distance bounds.
#[derive(Debug, Clone)]
pub struct BoundsMatrix {
    n: usize,
    lower: Vec<f64>,
    upper: Vec<f64>,
    fixed: Vec<bool>,
}

impl BoundsMatrix {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            lower: vec![0.0; n * n],
            upper: vec![MAX_UPPER; n * n],
            fixed: vec![false; n * n],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn lower(&self, i: usize, j: usize) -> f64 {
        self.lower[i * self.n + j]
    }

    #[inline]
    pub fn upper(&self, i: usize, j: usize) -> f64 {
        self.upper[i * self.n + j]
    }

    /// Whether a topological (1-2, 1-3 or 1-4) rule already set this pair.
    #[inline]
    pub fn is_fixed(&self, i: usize, j: usize) -> bool {
        self.fixed[i * self.n + j]
    }

    pub fn set(&mut self, i: usize, j: usize, lower: f64, upper: f64) {
        let (lower, upper) = (lower.max(0.0), upper.max(lower));
        for (a, b) in [(i, j), (j, i)] {
            self.lower[a * self.n + b] = lower;
            self.upper[a * self.n + b] = upper;
            self.fixed[a * self.n + b] = true;
        }
    }

    fn set_loose(&mut self, i: usize, j: usize, lower: f64, upper: f64) {
        for (a, b) in [(i, j), (j, i)] {
            self.lower[a * self.n + b] = lower;
            self.upper[a * self.n + b] = upper;
        }
    }

    /// Floyd–Warshall triangle-inequality smoothing.
    pub fn smooth(&mut self) -> Result<(), Error> {
        let n = self.n;
        for k in 0..n {
            for i in 0..n {
                if i == k {
                    continue;
                }
                let u_ik = self.upper[i * n + k];
                let l_ik = self.lower[i * n + k];
                for j in (i + 1)..n {
                    if j == k {
                        continue;
                    }
                    let u_kj = self.upper[k * n + j];
                    let l_kj = self.lower[k * n + j];

                    let mut u = self.upper[i * n + j];
                    if u_ik + u_kj < u {
                        u = u_ik + u_kj;
                    }
                    let mut l = self.lower[i * n + j];
                    if l_ik - u_kj > l {
                        l = l_ik - u_kj;
                    } else if l_kj - u_ik > l {
                        l = l_kj - u_ik;
                    }
                    if l - u > 1e-6 {
                        return Err(Error::InconsistentBounds { i, j });
                    }
                    self.set_loose(i, j, l, u);
                }
            }
        }
        Ok(())
    }
}

/// Ideal bond lengths and valence angles, from UFF types when the molecule
/// can be typed and from covalent radii otherwise.
struct IdealGeometry {
    bond_lengths: HashMap<(usize, usize), f64>,
    angles: Vec<f64>,
}

impl IdealGeometry {
    fn new(mol: &Molecule, params: &ForceFieldParams) -> Self {
        Self::from_uff(mol, params).unwrap_or_else(|| Self::from_radii(mol))
    }

    fn from_uff(mol: &Molecule, params: &ForceFieldParams) -> Option<Self> {
        let types = forcefield::assign_types(mol).ok()?;
        let atom_params = types
            .iter()
            .map(|t| params.atom(t.label).ok())
            .collect::<Option<Vec<_>>>()?;

        let bond_lengths = mol
            .bonds
            .iter()
            .map(|b| {
                let r0 = params.rest_length(atom_params[b.i], atom_params[b.j], b.order.value());
                ((b.i, b.j), r0)
            })
            .collect();
        let angles = atom_params.iter().map(|p| p.theta0.to_radians()).collect();
        Some(Self {
            bond_lengths,
            angles,
        })
    }

    fn from_radii(mol: &Molecule) -> Self {
        let bond_lengths = mol
            .bonds
            .iter()
            .map(|b| {
                let sum = mol.atoms[b.i].element.covalent_radius()
                    + mol.atoms[b.j].element.covalent_radius();
                ((b.i, b.j), sum * (1.0 - 0.1332 * b.order.value().ln()))
            })
            .collect();

        let mut doubles = vec![0usize; mol.atom_count()];
        let mut triples = vec![0usize; mol.atom_count()];
        let mut aromatic = vec![false; mol.atom_count()];
        for b in &mol.bonds {
            for end in [b.i, b.j] {
                match b.order {
                    BondOrder::Double => doubles[end] += 1,
                    BondOrder::Triple => triples[end] += 1,
                    BondOrder::Aromatic => aromatic[end] = true,
                    BondOrder::Single => {}
                }
            }
        }
        let angles = (0..mol.atom_count())
            .map(|a| {
                let degrees = if triples[a] > 0 || doubles[a] >= 2 {
                    180.0
                } else if doubles[a] == 1 || aromatic[a] {
                    120.0
                } else {
                    109.47
                };
                f64::to_radians(degrees)
            })
            .collect();

        Self {
            bond_lengths,
            angles,
        }
    }

    fn bond_length(&self, a: usize, b: usize) -> f64 {
        let key = if a <= b { (a, b) } else { (b, a) };
        self.bond_lengths.get(&key).copied().unwrap_or(1.5)
    }
}

/// Distance across the angle `i`-`j`-`k` with bond lengths `a`, `b`.
#[inline]
fn law_of_cosines(a: f64, b: f64, theta: f64) -> f64 {
    (a * a + b * b - 2.0 * a * b * theta.cos()).max(0.0).sqrt()
}

/// 1-4 distances at dihedral 0° and 180° for the path `i`-`j`-`k`-`l`.
fn cis_trans(r_ij: f64, r_jk: f64, r_kl: f64, theta_j: f64, theta_k: f64) -> (f64, f64) {
    let ix = r_ij * theta_j.cos();
    let iy = r_ij * theta_j.sin();
    let lx = r_jk - r_kl * theta_k.cos();
    let ly = r_kl * theta_k.sin();
    let cis = ((lx - ix).powi(2) + (ly - iy).powi(2)).sqrt();
    let trans = ((lx - ix).powi(2) + (ly + iy).powi(2)).sqrt();
    (cis.min(trans), cis.max(trans))
}

struct Builder<'a> {
    mol: &'a Molecule,
    rings: RingInfo,
    ideal: IdealGeometry,
    adjacency: Vec<Vec<usize>>,
}

impl Builder<'_> {
    fn angle(&self, i: usize, j: usize, k: usize) -> f64 {
        match self.rings.smallest_ring_with_angle(i, j, k) {
            Some(3) => 60f64.to_radians(),
            Some(4) => 90f64.to_radians(),
            Some(5) => 108f64.to_radians(),
            _ => self.ideal.angles[j],
        }
    }

    fn one_two(&self, bounds: &mut BoundsMatrix) {
        for b in &self.mol.bonds {
            let r = self.ideal.bond_length(b.i, b.j);
            bounds.set(b.i, b.j, r - BOND_TOLERANCE, r + BOND_TOLERANCE);
        }
    }

    fn one_three(&self, bounds: &mut BoundsMatrix) {
        for (j, neighbors) in self.adjacency.iter().enumerate() {
            let crowded = neighbors.len() > 4;
            for (a, &i) in neighbors.iter().enumerate() {
                for &k in &neighbors[a + 1..] {
                    if self.mol.bond_between(i, k).is_some() {
                        continue;
                    }
                    let (r_ij, r_jk) = (self.ideal.bond_length(i, j), self.ideal.bond_length(j, k));
                    let (lower, upper) = if crowded {
                        (
                            law_of_cosines(r_ij, r_jk, 90f64.to_radians()) - ANGLE_TOLERANCE,
                            r_ij + r_jk,
                        )
                    } else {
                        let d = law_of_cosines(r_ij, r_jk, self.angle(i, j, k));
                        (d - ANGLE_TOLERANCE, d + ANGLE_TOLERANCE)
                    };
                    if bounds.is_fixed(i, k) {
                        let l = bounds.lower(i, k).min(lower);
                        let u = bounds.upper(i, k).max(upper);
                        bounds.set(i, k, l, u);
                    } else {
                        bounds.set(i, k, lower, upper);
                    }
                }
            }
        }
    }

    fn one_four(&self, bounds: &mut BoundsMatrix) {
        for bond in &self.mol.bonds {
            let (j, k) = (bond.i, bond.j);
            let stereo = (bond.order == BondOrder::Double)
                .then(|| (self.substituent_sides(j, k), self.substituent_sides(k, j)));

            for &i in self.adjacency[j].iter().filter(|&&i| i != k) {
                for &l in self.adjacency[k].iter().filter(|&&l| l != j && l != i) {
                    if bounds.is_fixed(i, l) {
                        continue;
                    }
                    let (cis, trans) = cis_trans(
                        self.ideal.bond_length(i, j),
                        self.ideal.bond_length(j, k),
                        self.ideal.bond_length(k, l),
                        self.angle(i, j, k),
                        self.angle(j, k, l),
                    );

                    let side = stereo.as_ref().and_then(|(sides_j, sides_k)| {
                        let up_i = sides_j.iter().find(|(n, _)| *n == i)?.1;
                        let up_l = sides_k.iter().find(|(n, _)| *n == l)?.1;
                        Some(up_i == up_l)
                    });
                    let (lower, upper) = match side {
                        Some(true) => (cis - STEREO_TOLERANCE, cis + STEREO_TOLERANCE),
                        Some(false) => (trans - STEREO_TOLERANCE, trans + STEREO_TOLERANCE),
                        None => (cis - TORSION_TOLERANCE, trans + TORSION_TOLERANCE),
                    };
                    bounds.set(i, l, lower, upper);
                }
            }
        }
    }

    /// Which side (`true` = up) each substituent of `center` sits on across
    /// the double bond to `other`, from `/` and `\` marks.
    fn substituent_sides(&self, center: usize, other: usize) -> Vec<(usize, bool)> {
        let substituents: Vec<usize> = self.adjacency[center]
            .iter()
            .copied()
            .filter(|&n| n != other)
            .collect();
        let marked: Vec<(usize, bool)> = substituents
            .iter()
            .filter_map(|&n| {
                let up = self.mol.bond_between(center, n)?.neighbor_is_up(center, n)?;
                Some((n, up))
            })
            .collect();

        match (substituents.as_slice(), marked.as_slice()) {
            ([a, b], [(m, up)]) => {
                let unmarked = if m == a { *b } else { *a };
                vec![(*m, *up), (unmarked, !*up)]
            }
            _ => marked,
        }
    }

    fn nonbonded(&self, bounds: &mut BoundsMatrix, vdw_scale: f64) {
        let components = self.components();
        let n = self.mol.atom_count();
        for i in 0..n {
            for j in (i + 1)..n {
                if bounds.is_fixed(i, j) {
                    continue;
                }
                let contact = vdw_scale
                    * (self.mol.atoms[i].element.vdw_radius() + self.mol.atoms[j].element.vdw_radius());
                let upper = if components[i] == components[j] {
                    MAX_UPPER
                } else {
                    contact.max(1.0) + FRAGMENT_SPACING
                };
                bounds.set_loose(i, j, contact, upper);
            }
        }
    }

    fn components(&self) -> Vec<usize> {
        let n = self.mol.atom_count();
        let mut label = vec![usize::MAX; n];
        let mut next = 0;
        for start in 0..n {
            if label[start] != usize::MAX {
                continue;
            }
            let mut stack = vec![start];
            label[start] = next;
            while let Some(a) = stack.pop() {
                for &b in &self.adjacency[a] {
                    if label[b] == usize::MAX {
                        label[b] = next;
                        stack.push(b);
                    }
                }
            }
            next += 1;
        }
        label
    }
}

/// Builds and smooths the bounds matrix for a hydrogen-complete molecule.
///
/// Non-bonded lower bounds start at 0.7 × the van der Waals contact distance
/// and are relaxed when smoothing finds them incompatible with the
/// topological bounds.
pub fn build_bounds(mol: &Molecule, params: &ForceFieldParams) -> Result<BoundsMatrix, Error> {
    let builder = Builder {
        mol,
        rings: RingInfo::new(mol),
        ideal: IdealGeometry::new(mol, params),
        adjacency: mol.adjacency(),
    };

    let mut topological = BoundsMatrix::new(mol.atom_count());
    builder.one_two(&mut topological);
    builder.one_three(&mut topological);
    builder.one_four(&mut topological);

    let mut last_error = None;
    for scale in VDW_SCALES {
        let mut bounds = topological.clone();
        builder.nonbonded(&mut bounds, scale);
        match bounds.smooth() {
            Ok(()) => return Ok(bounds),
            Err(e) => last_error = Some(e),
        }
    }
    Err(last_error.unwrap_or(Error::InconsistentBounds { i: 0, j: 0 }))
}
