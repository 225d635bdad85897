//! UFF energy terms and their analytic gradients.
//!
//! Every term reads positions from a flat `[x0, y0, z0, x1, ...]` slice and
//! accumulates `dE/dx` into a gradient slice of the same layout.

use glam::DVec3;

use crate::minimize::Objective;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondStretch {
    pub i: usize,
    pub j: usize,
    pub rest_length: f64,
    pub force_constant: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AngleForm {
    /// `E = K (1 + cos θ)`, minimal at 180°.
    Linear,
    /// `E = K (C0 + C1 cos θ + C2 cos 2θ)`.
    Fourier { c0: f64, c1: f64, c2: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleBend {
    pub i: usize,
    /// Vertex atom.
    pub j: usize,
    pub k: usize,
    pub force_constant: f64,
    pub form: AngleForm,
}

impl AngleForm {
    pub fn for_natural_angle(theta0: f64) -> Self {
        if (theta0 - std::f64::consts::PI).abs() < 1e-4 {
            return AngleForm::Linear;
        }
        let cos0 = theta0.cos();
        let sin0_sq = (1.0 - cos0 * cos0).max(1e-8);
        let c2 = 1.0 / (4.0 * sin0_sq);
        let c1 = -4.0 * c2 * cos0;
        let c0 = c2 * (2.0 * cos0 * cos0 + 1.0);
        AngleForm::Fourier { c0, c1, c2 }
    }
}

/// `E = V/2 [1 - cos(n φ0) cos(n φ)]` about the `j`-`k` bond.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Torsion {
    pub i: usize,
    pub j: usize,
    pub k: usize,
    pub l: usize,
    pub barrier: f64,
    pub periodicity: f64,
    /// `cos(n φ0)`.
    pub phase: f64,
}

/// Out-of-plane term `E = K (1 - sin Y)` for a trigonal `center`, where Y is
/// the angle between the `center`-`l` bond and the normal of the plane
/// through `center`, `i` and `k`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inversion {
    pub center: usize,
    pub i: usize,
    pub k: usize,
    pub l: usize,
    pub force_constant: f64,
}

/// Lennard-Jones 12-6 pair `E = D [(x/r)^12 - 2 (x/r)^6]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VanDerWaals {
    pub i: usize,
    pub j: usize,
    pub distance: f64,
    pub well_depth: f64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct EnergyTerms {
    pub bond: f64,
    pub angle: f64,
    pub torsion: f64,
    pub inversion: f64,
    pub van_der_waals: f64,
    pub total: f64,
}

/// A fully parameterized UFF instance for one molecule.
#[derive(Debug, Clone, Default)]
pub struct ForceField {
    pub bonds: Vec<BondStretch>,
    pub angles: Vec<AngleBend>,
    pub torsions: Vec<Torsion>,
    pub inversions: Vec<Inversion>,
    pub van_der_waals: Vec<VanDerWaals>,
}

#[inline]
fn point(x: &[f64], index: usize) -> DVec3 {
    DVec3::new(x[3 * index], x[3 * index + 1], x[3 * index + 2])
}

#[inline]
fn accumulate(grad: &mut [f64], index: usize, g: DVec3) {
    grad[3 * index] += g.x;
    grad[3 * index + 1] += g.y;
    grad[3 * index + 2] += g.z;
}

impl BondStretch {
    fn evaluate(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let d = point(x, self.i) - point(x, self.j);
        let r = d.length();
        let dr = r - self.rest_length;
        if r > 1e-8 {
            let g = d * (self.force_constant * dr / r);
            accumulate(grad, self.i, g);
            accumulate(grad, self.j, -g);
        }
        0.5 * self.force_constant * dr * dr
    }
}

impl AngleBend {
    fn evaluate(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let pj = point(x, self.j);
        let v_ji = point(x, self.i) - pj;
        let v_jk = point(x, self.k) - pj;
        let r_ji = v_ji.length();
        let r_jk = v_jk.length();
        if r_ji < 1e-8 || r_jk < 1e-8 {
            return 0.0;
        }

        let cos_theta = (v_ji.dot(v_jk) / (r_ji * r_jk)).clamp(-1.0, 1.0);
        let (energy, de_dcos) = match self.form {
            AngleForm::Linear => (
                self.force_constant * (1.0 + cos_theta),
                self.force_constant,
            ),
            AngleForm::Fourier { c0, c1, c2 } => {
                let cos_2theta = 2.0 * cos_theta * cos_theta - 1.0;
                (
                    self.force_constant * (c0 + c1 * cos_theta + c2 * cos_2theta),
                    self.force_constant * (c1 + 4.0 * c2 * cos_theta),
                )
            }
        };

        let grad_i = (v_jk / (r_ji * r_jk) - v_ji * (cos_theta / (r_ji * r_ji))) * de_dcos;
        let grad_k = (v_ji / (r_ji * r_jk) - v_jk * (cos_theta / (r_jk * r_jk))) * de_dcos;
        accumulate(grad, self.i, grad_i);
        accumulate(grad, self.k, grad_k);
        accumulate(grad, self.j, -(grad_i + grad_k));
        energy
    }
}

impl Torsion {
    fn evaluate(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let f = point(x, self.i) - point(x, self.j);
        let g = point(x, self.j) - point(x, self.k);
        let h = point(x, self.l) - point(x, self.k);
        let a = f.cross(g);
        let b = h.cross(g);
        let a2 = a.length_squared();
        let b2 = b.length_squared();
        let g_len = g.length();
        if a2 < 1e-12 || b2 < 1e-12 || g_len < 1e-8 {
            return 0.0;
        }

        let phi = (b.cross(a).dot(g) / g_len).atan2(a.dot(b));
        let n = self.periodicity;
        let energy = 0.5 * self.barrier * (1.0 - self.phase * (n * phi).cos());
        let de_dphi = 0.5 * self.barrier * self.phase * n * (n * phi).sin();

        let fg = f.dot(g) / (a2 * g_len);
        let hg = h.dot(g) / (b2 * g_len);
        let d_i = a * (-g_len / a2);
        let d_l = b * (g_len / b2);
        let d_j = a * (g_len / a2) + a * fg - b * hg;
        let d_k = b * (-g_len / b2) - a * fg + b * hg;

        accumulate(grad, self.i, d_i * de_dphi);
        accumulate(grad, self.j, d_j * de_dphi);
        accumulate(grad, self.k, d_k * de_dphi);
        accumulate(grad, self.l, d_l * de_dphi);
        energy
    }
}

impl Inversion {
    fn evaluate(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let pc = point(x, self.center);
        let a = point(x, self.i) - pc;
        let b = point(x, self.k) - pc;
        let l = point(x, self.l) - pc;
        let c = a.cross(b);
        let c_len = c.length();
        let l_len = l.length();
        if c_len < 1e-8 || l_len < 1e-8 {
            return 0.0;
        }

        let normal = c / c_len;
        let u = l / l_len;
        let cos_y = normal.dot(u).clamp(-1.0, 1.0);
        let sin_y = (1.0 - cos_y * cos_y).max(0.0).sqrt();
        let energy = self.force_constant * (1.0 - sin_y);

        let de_dcos = self.force_constant * cos_y / sin_y.max(1e-8);
        let g = (u - normal * cos_y) / c_len;
        let grad_i = b.cross(g) * de_dcos;
        let grad_k = g.cross(a) * de_dcos;
        let grad_l = (normal - u * cos_y) / l_len * de_dcos;

        accumulate(grad, self.i, grad_i);
        accumulate(grad, self.k, grad_k);
        accumulate(grad, self.l, grad_l);
        accumulate(grad, self.center, -(grad_i + grad_k + grad_l));
        energy
    }
}

impl VanDerWaals {
    fn evaluate(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let d = point(x, self.i) - point(x, self.j);
        let r = d.length().max(0.1 * self.distance);
        let ratio6 = (self.distance / r).powi(6);
        let ratio12 = ratio6 * ratio6;
        let energy = self.well_depth * (ratio12 - 2.0 * ratio6);
        let de_dr = 12.0 * self.well_depth / r * (ratio6 - ratio12);
        let g = d * (de_dr / r);
        accumulate(grad, self.i, g);
        accumulate(grad, self.j, -g);
        energy
    }
}

impl ForceField {
    /// Energy breakdown at `x`; the gradient is accumulated into `grad`.
    pub fn energy_terms(&self, x: &[f64], grad: &mut [f64]) -> EnergyTerms {
        let mut e = EnergyTerms {
            bond: self.bonds.iter().map(|t| t.evaluate(x, grad)).sum(),
            angle: self.angles.iter().map(|t| t.evaluate(x, grad)).sum(),
            torsion: self.torsions.iter().map(|t| t.evaluate(x, grad)).sum(),
            inversion: self.inversions.iter().map(|t| t.evaluate(x, grad)).sum(),
            van_der_waals: self.van_der_waals.iter().map(|t| t.evaluate(x, grad)).sum(),
            total: 0.0,
        };
        e.total = e.bond + e.angle + e.torsion + e.inversion + e.van_der_waals;
        e
    }
}

impl Objective for ForceField {
    fn evaluate(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        self.energy_terms(x, grad).total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn numeric_gradient(ff: &ForceField, x: &[f64]) -> Vec<f64> {
        let h = 1e-6;
        let mut scratch = vec![0.0; x.len()];
        (0..x.len())
            .map(|c| {
                let mut xp = x.to_vec();
                let mut xm = x.to_vec();
                xp[c] += h;
                xm[c] -= h;
                let ep = ff.evaluate(&xp, &mut scratch);
                let em = ff.evaluate(&xm, &mut scratch);
                (ep - em) / (2.0 * h)
            })
            .collect()
    }

    fn assert_gradient_matches(ff: &ForceField, x: &[f64]) {
        let mut grad = vec![0.0; x.len()];
        ff.evaluate(x, &mut grad);
        let numeric = numeric_gradient(ff, x);
        for (a, n) in grad.iter().zip(&numeric) {
            assert_abs_diff_eq!(*a, *n, epsilon = 1e-4 * (1.0 + n.abs()));
        }
    }

    const SKEWED: [f64; 12] = [
        0.1, 1.2, -0.3, //
        0.0, 0.0, 0.0, //
        1.4, 0.1, 0.2, //
        1.9, 1.1, 0.9,
    ];

    #[test]
    fn bond_stretch_energy_and_gradient() {
        let ff = ForceField {
            bonds: vec![BondStretch {
                i: 0,
                j: 1,
                rest_length: 1.0,
                force_constant: 700.0,
            }],
            ..Default::default()
        };
        let x = [0.0, 0.0, 0.0, 1.2, 0.0, 0.0];
        let mut grad = vec![0.0; 6];
        let e = ff.evaluate(&x, &mut grad);
        assert_abs_diff_eq!(e, 0.5 * 700.0 * 0.04, epsilon = 1e-9);
        assert_abs_diff_eq!(grad[0], -140.0, epsilon = 1e-9);
        assert_abs_diff_eq!(grad[3], 140.0, epsilon = 1e-9);
    }

    #[test]
    fn fourier_angle_is_minimal_at_natural_angle() {
        let theta0 = 109.47f64.to_radians();
        let AngleForm::Fourier { c0, c1, c2 } = AngleForm::for_natural_angle(theta0) else {
            panic!("expected Fourier form");
        };
        let e = |t: f64| c0 + c1 * t.cos() + c2 * (2.0 * t).cos();
        assert_abs_diff_eq!(e(theta0), 0.0, epsilon = 1e-9);
        assert!(e(theta0 + 0.1) > 0.0);
        assert!(e(theta0 - 0.1) > 0.0);
        assert_eq!(AngleForm::for_natural_angle(std::f64::consts::PI), AngleForm::Linear);
    }

    #[test]
    fn angle_gradient_matches_finite_differences() {
        let ff = ForceField {
            angles: vec![
                AngleBend {
                    i: 0,
                    j: 1,
                    k: 2,
                    force_constant: 100.0,
                    form: AngleForm::for_natural_angle(109.47f64.to_radians()),
                },
                AngleBend {
                    i: 1,
                    j: 2,
                    k: 3,
                    force_constant: 50.0,
                    form: AngleForm::Linear,
                },
            ],
            ..Default::default()
        };
        assert_gradient_matches(&ff, &SKEWED);
    }

    #[test]
    fn torsion_gradient_matches_finite_differences() {
        for (n, phase) in [(3.0, -1.0), (2.0, -1.0), (6.0, 1.0)] {
            let ff = ForceField {
                torsions: vec![Torsion {
                    i: 0,
                    j: 1,
                    k: 2,
                    l: 3,
                    barrier: 2.1,
                    periodicity: n,
                    phase,
                }],
                ..Default::default()
            };
            assert_gradient_matches(&ff, &SKEWED);
        }
    }

    #[test]
    fn staggered_ethane_torsion_is_at_minimum() {
        let ff = ForceField {
            torsions: vec![Torsion {
                i: 0,
                j: 1,
                k: 2,
                l: 3,
                barrier: 2.0,
                periodicity: 3.0,
                phase: -1.0,
            }],
            ..Default::default()
        };
        // anti arrangement, φ = 180°
        let x = [-1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.5, 0.0, 0.0, 2.5, -1.0, 0.0];
        let mut grad = vec![0.0; 12];
        assert_abs_diff_eq!(ff.evaluate(&x, &mut grad), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn inversion_is_zero_for_planar_center() {
        let ff = ForceField {
            inversions: vec![Inversion {
                center: 0,
                i: 1,
                k: 2,
                l: 3,
                force_constant: 2.0,
            }],
            ..Default::default()
        };
        let planar = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, -0.5, 0.86, 0.0, -0.5, -0.86, 0.0];
        let mut grad = vec![0.0; 12];
        assert_abs_diff_eq!(ff.evaluate(&planar, &mut grad), 0.0, epsilon = 1e-9);

        let pyramidal = [0.0, 0.0, 0.0, 1.0, 0.0, 0.3, -0.5, 0.86, 0.3, -0.5, -0.86, 0.3];
        assert!(ff.evaluate(&pyramidal, &mut grad) > 0.0);
    }

    #[test]
    fn inversion_gradient_matches_finite_differences() {
        let ff = ForceField {
            inversions: vec![Inversion {
                center: 1,
                i: 0,
                k: 2,
                l: 3,
                force_constant: 16.7,
            }],
            ..Default::default()
        };
        assert_gradient_matches(&ff, &SKEWED);
    }

    #[test]
    fn van_der_waals_minimum_sits_at_contact_distance() {
        let ff = ForceField {
            van_der_waals: vec![VanDerWaals {
                i: 0,
                j: 1,
                distance: 3.5,
                well_depth: 0.1,
            }],
            ..Default::default()
        };
        let mut grad = vec![0.0; 6];
        let e = ff.evaluate(&[0.0, 0.0, 0.0, 3.5, 0.0, 0.0], &mut grad);
        assert_abs_diff_eq!(e, -0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(grad[3], 0.0, epsilon = 1e-12);
        assert_gradient_matches(&ff, &[0.0, 0.2, 0.0, 3.1, 0.4, -0.2]);
    }
}
