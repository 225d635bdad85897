//! Distance-geometry error function with chiral-volume and fourth-dimension terms.

use super::bounds::BoundsMatrix;
use crate::minimize::Objective;
use crate::model::atom::StereoNeighbor;
use crate::model::molecule::Molecule;

/// Minimum signed volume the chirality term pushes towards.
pub const CHIRAL_VOLUME_TARGET: f64 = 0.5;

/// A tetrahedral center expressed as four atoms and the required volume sign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiralConstraint {
    pub atoms: [usize; 4],
    pub sign: f64,
}

impl ChiralConstraint {
    /// Signed volume `(p1-p0)·((p2-p0)×(p3-p0))` using the first three coordinates.
    pub fn volume(&self, x: &[f64], stride: usize) -> f64 {
        let p = |a: usize| [x[a * stride], x[a * stride + 1], x[a * stride + 2]];
        let p0 = p(self.atoms[0]);
        let a = sub(p(self.atoms[1]), p0);
        let b = sub(p(self.atoms[2]), p0);
        let c = sub(p(self.atoms[3]), p0);
        dot(a, cross(b, c))
    }

    pub fn is_satisfied(&self, x: &[f64], stride: usize) -> bool {
        self.sign * self.volume(x, stride) > 0.0
    }
}

/// Collects one constraint per tagged stereocenter whose neighbors are all graph atoms.
pub fn chiral_constraints(mol: &Molecule) -> Vec<ChiralConstraint> {
    mol.atoms
        .iter()
        .filter_map(|atom| {
            let sign = atom.chirality.volume_sign()?;
            if atom.stereo_neighbors.len() != 4 {
                return None;
            }
            let mut atoms = [0usize; 4];
            for (slot, neighbor) in atoms.iter_mut().zip(&atom.stereo_neighbors) {
                match neighbor {
                    StereoNeighbor::Atom(index) => *slot = *index,
                    StereoNeighbor::ImplicitHydrogen => return None,
                }
            }
            Some(ChiralConstraint { atoms, sign })
        })
        .collect()
}

/// Objective minimized during embedding refinement.
pub struct DistanceGeometry<'a> {
    pub bounds: &'a BoundsMatrix,
    pub chiral: &'a [ChiralConstraint],
    pub stride: usize,
    pub chiral_weight: f64,
    /// Weight of the penalty on every coordinate past the third.
    pub extra_dim_weight: f64,
}

impl DistanceGeometry<'_> {
    /// Bound-violation error alone, summed over all pairs.
    pub fn distance_error(&self, x: &[f64]) -> f64 {
        let mut scratch = vec![0.0; x.len()];
        self.distance_terms(x, &mut scratch)
    }

    fn distance_terms(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let n = self.bounds.len();
        let s = self.stride;
        let mut error = 0.0;
        let mut diff = [0.0; 4];
        for i in 0..n {
            for j in (i + 1)..n {
                let mut d2 = 0.0;
                for k in 0..s {
                    diff[k] = x[i * s + k] - x[j * s + k];
                    d2 += diff[k] * diff[k];
                }
                let (lower, upper) = (self.bounds.lower(i, j), self.bounds.upper(i, j));
                let u2 = upper * upper;
                let l2 = lower * lower;

                let de_dd2 = if d2 > u2 {
                    let t = d2 / u2 - 1.0;
                    error += t * t;
                    2.0 * t / u2
                } else if d2 < l2 {
                    let denom = l2 + d2;
                    let t = 2.0 * l2 / denom - 1.0;
                    error += t * t;
                    -4.0 * t * l2 / (denom * denom)
                } else {
                    continue;
                };

                for k in 0..s {
                    let g = 2.0 * de_dd2 * diff[k];
                    grad[i * s + k] += g;
                    grad[j * s + k] -= g;
                }
            }
        }
        error
    }

    fn chiral_terms(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let s = self.stride;
        let mut error = 0.0;
        for c in self.chiral {
            let p = |a: usize| [x[a * s], x[a * s + 1], x[a * s + 2]];
            let p0 = p(c.atoms[0]);
            let a = sub(p(c.atoms[1]), p0);
            let b = sub(p(c.atoms[2]), p0);
            let cc = sub(p(c.atoms[3]), p0);
            let signed = c.sign * dot(a, cross(b, cc));
            if signed >= CHIRAL_VOLUME_TARGET {
                continue;
            }
            let t = signed - CHIRAL_VOLUME_TARGET;
            error += self.chiral_weight * t * t;
            let de_dv = 2.0 * self.chiral_weight * t * c.sign;

            let g1 = cross(b, cc);
            let g2 = cross(cc, a);
            let g3 = cross(a, b);
            for k in 0..3 {
                grad[c.atoms[1] * s + k] += de_dv * g1[k];
                grad[c.atoms[2] * s + k] += de_dv * g2[k];
                grad[c.atoms[3] * s + k] += de_dv * g3[k];
                grad[c.atoms[0] * s + k] -= de_dv * (g1[k] + g2[k] + g3[k]);
            }
        }
        error
    }

    fn extra_dim_terms(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        if self.stride <= 3 || self.extra_dim_weight == 0.0 {
            return 0.0;
        }
        let mut error = 0.0;
        for (p, g) in x.chunks(self.stride).zip(grad.chunks_mut(self.stride)) {
            for k in 3..self.stride {
                error += self.extra_dim_weight * p[k] * p[k];
                g[k] += 2.0 * self.extra_dim_weight * p[k];
            }
        }
        error
    }
}

impl Objective for DistanceGeometry<'_> {
    fn evaluate(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        self.distance_terms(x, grad) + self.chiral_terms(x, grad) + self.extra_dim_terms(x, grad)
    }
}

#[inline]
fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}
