//! Minimizers over flat coordinate arrays.
//!
//! Coordinates are stored as `[x0, y0, z0, x1, ...]` with a configurable
//! stride, so the same code handles 4D and 3D points.
//!
//! - [`Fire`] drives the distance-geometry refinement, where the objective
//!   is rough and changes between stages.
//! - [`Lbfgs`] relaxes force-field energies, which are smooth and stiff
//!   enough that an inertial integrator needs thousands of steps.

use std::collections::VecDeque;

/// A differentiable energy function of a flat coordinate vector.
pub trait Objective {
    /// Returns the energy at `x` and writes its gradient into `grad`.
    ///
    /// `grad` has the same length as `x` and is zeroed by the caller.
    fn evaluate(&self, x: &[f64], grad: &mut [f64]) -> f64;
}

impl<F> Objective for F
where
    F: Fn(&[f64], &mut [f64]) -> f64,
{
    fn evaluate(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        self(x, grad)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimizeOutcome {
    pub converged: bool,
    pub iterations: usize,
    pub energy: f64,
}

#[derive(Debug, Clone)]
pub struct Fire {
    /// Maximum number of integration steps.
    pub max_iterations: usize,
    /// Threshold for the averaged maximum per-point force.
    pub force_tolerance: f64,
    /// Number of steps averaged for the convergence criteria.
    pub history_size: usize,
    /// Maximum distance a point may move in one step.
    pub max_displacement: f64,
    /// Coordinates per point (3 for Cartesian, 4 for 4D embedding).
    pub stride: usize,
}

impl Fire {
    const DT_START: f64 = 0.02;
    const DT_MAX: f64 = 0.2;
    const ALPHA_START: f64 = 0.1;
    const N_MIN: usize = 5;
    const ENERGY_STALL: f64 = 1e-7;

    pub fn new(max_iterations: usize, force_tolerance: f64) -> Self {
        Self {
            max_iterations,
            force_tolerance,
            history_size: 10,
            max_displacement: 0.3,
            stride: 3,
        }
    }

    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride.max(1);
        self
    }

    pub fn with_max_displacement(mut self, max: f64) -> Self {
        self.max_displacement = max;
        self
    }

    pub fn with_history_size(mut self, size: usize) -> Self {
        self.history_size = size.max(1);
        self
    }

    /// Relaxes `x` in place and reports whether the force criteria were met.
    pub fn minimize<O: Objective + ?Sized>(&self, objective: &O, x: &mut [f64]) -> MinimizeOutcome {
        let stride = self.stride;
        let points = (x.len() / stride).max(1);

        let mut grad = vec![0.0; x.len()];
        let mut velocity = vec![0.0; x.len()];

        let mut dt = Self::DT_START;
        let mut alpha = Self::ALPHA_START;
        let mut n_pos = 0usize;

        let mut fmax_history = VecDeque::with_capacity(self.history_size);
        let mut frms_history = VecDeque::with_capacity(self.history_size);
        let mut ediff_history = VecDeque::with_capacity(self.history_size);
        let mut last_energy: Option<f64> = None;

        for iter in 0..self.max_iterations {
            grad.fill(0.0);
            let energy = objective.evaluate(x, &mut grad);

            let mut max_f_sq: f64 = 0.0;
            let mut sum_f_sq: f64 = 0.0;
            for g in grad.chunks(stride) {
                let f_sq: f64 = g.iter().map(|v| v * v).sum();
                max_f_sq = max_f_sq.max(f_sq);
                sum_f_sq += f_sq;
            }
            let f_max = max_f_sq.sqrt();
            let f_rms = (sum_f_sq / x.len().max(1) as f64).sqrt();

            push_bounded(&mut fmax_history, f_max, self.history_size);
            push_bounded(&mut frms_history, f_rms, self.history_size);
            if let Some(prev) = last_energy {
                push_bounded(
                    &mut ediff_history,
                    (energy - prev).abs() / points as f64,
                    self.history_size,
                );
            }
            last_energy = Some(energy);

            if f_max < self.force_tolerance * 1e-2
                || self.history_converged(&fmax_history, &frms_history, &ediff_history)
            {
                return MinimizeOutcome {
                    converged: true,
                    iterations: iter,
                    energy,
                };
            }

            // force = -grad
            let power: f64 = velocity.iter().zip(&grad).map(|(v, g)| -v * g).sum();

            for (v, g) in velocity.chunks_mut(stride).zip(grad.chunks(stride)) {
                let f_norm = g.iter().map(|c| c * c).sum::<f64>().sqrt();
                let v_norm = v.iter().map(|c| c * c).sum::<f64>().sqrt();
                if f_norm > 1e-9 {
                    for (vc, gc) in v.iter_mut().zip(g) {
                        *vc = (1.0 - alpha) * *vc + alpha * (-gc / f_norm) * v_norm;
                    }
                }
            }

            if power > 0.0 {
                n_pos += 1;
                if n_pos > Self::N_MIN {
                    dt = (dt * 1.1).min(Self::DT_MAX);
                    alpha *= 0.99;
                }
            } else {
                n_pos = 0;
                dt *= 0.5;
                alpha = Self::ALPHA_START;
                velocity.fill(0.0);
            }

            for ((p, v), g) in x
                .chunks_mut(stride)
                .zip(velocity.chunks_mut(stride))
                .zip(grad.chunks(stride))
            {
                for (vc, gc) in v.iter_mut().zip(g) {
                    *vc -= gc * dt;
                }
                let step_len = v.iter().map(|c| c * c).sum::<f64>().sqrt() * dt;
                let scale = if step_len > self.max_displacement {
                    self.max_displacement / step_len
                } else {
                    1.0
                };
                for (pc, vc) in p.iter_mut().zip(v.iter_mut()) {
                    *vc *= scale;
                    *pc += *vc * dt;
                }
            }
        }

        grad.fill(0.0);
        let energy = objective.evaluate(x, &mut grad);
        MinimizeOutcome {
            converged: false,
            iterations: self.max_iterations,
            energy,
        }
    }

    fn history_converged(
        &self,
        fmax: &VecDeque<f64>,
        frms: &VecDeque<f64>,
        ediff: &VecDeque<f64>,
    ) -> bool {
        if fmax.len() < self.history_size {
            return false;
        }
        let mean = |h: &VecDeque<f64>| h.iter().sum::<f64>() / h.len().max(1) as f64;
        let avg_fmax = mean(fmax);
        let avg_frms = mean(frms);

        avg_fmax < self.force_tolerance
            || (avg_fmax < self.force_tolerance * 2.0 && avg_frms < self.force_tolerance * 0.5)
            || (!ediff.is_empty() && mean(ediff) < Self::ENERGY_STALL)
    }
}

/// Limited-memory BFGS with a backtracking (Armijo) line search.
#[derive(Debug, Clone)]
pub struct Lbfgs {
    pub max_iterations: usize,
    /// Largest per-point gradient norm accepted as converged.
    pub force_tolerance: f64,
    /// Number of correction pairs kept for the inverse Hessian estimate.
    pub memory: usize,
    /// Maximum distance a point may move in one step.
    pub max_displacement: f64,
    /// Coordinates per point.
    pub stride: usize,
}

/// One stored step `s` with its gradient change `y` and `1 / (s·y)`.
struct Correction {
    s: Vec<f64>,
    y: Vec<f64>,
    rho: f64,
}

impl Lbfgs {
    const ARMIJO: f64 = 1e-4;
    const MAX_BACKTRACKS: usize = 30;
    const MIN_CURVATURE: f64 = 1e-10;

    pub fn new(max_iterations: usize, force_tolerance: f64) -> Self {
        Self {
            max_iterations,
            force_tolerance,
            memory: 10,
            max_displacement: 0.3,
            stride: 3,
        }
    }

    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride.max(1);
        self
    }

    pub fn with_max_displacement(mut self, max: f64) -> Self {
        self.max_displacement = max;
        self
    }

    pub fn with_memory(mut self, memory: usize) -> Self {
        self.memory = memory.max(1);
        self
    }

    /// Relaxes `x` in place until every point's gradient norm is below
    /// the tolerance or the iteration budget runs out.
    ///
    /// A line search that cannot lower the energy even along the steepest
    /// descent direction means `x` sits at a minimum to numerical precision,
    /// which also counts as converged.
    pub fn minimize<O: Objective + ?Sized>(&self, objective: &O, x: &mut [f64]) -> MinimizeOutcome {
        let n = x.len();
        let mut grad = vec![0.0; n];
        let mut energy = objective.evaluate(x, &mut grad);

        let mut history: VecDeque<Correction> = VecDeque::with_capacity(self.memory);
        let mut trial = vec![0.0; n];
        let mut trial_grad = vec![0.0; n];

        for iter in 0..self.max_iterations {
            if max_point_norm(&grad, self.stride) < self.force_tolerance {
                return MinimizeOutcome {
                    converged: true,
                    iterations: iter,
                    energy,
                };
            }

            let mut direction = self.search_direction(&grad, &history);
            let mut slope = dot(&grad, &direction);
            if slope >= 0.0 {
                history.clear();
                direction = grad.iter().map(|g| -g).collect();
                slope = dot(&grad, &direction);
            }

            let longest = max_point_norm(&direction, self.stride);
            if longest > self.max_displacement {
                let scale = self.max_displacement / longest;
                direction.iter_mut().for_each(|d| *d *= scale);
                slope *= scale;
            }

            let mut step = 1.0;
            let mut accepted = None;
            for _ in 0..Self::MAX_BACKTRACKS {
                for ((t, xi), di) in trial.iter_mut().zip(x.iter()).zip(&direction) {
                    *t = xi + step * di;
                }
                trial_grad.fill(0.0);
                let trial_energy = objective.evaluate(&trial, &mut trial_grad);
                if trial_energy <= energy + Self::ARMIJO * step * slope {
                    accepted = Some(trial_energy);
                    break;
                }
                step *= 0.5;
            }

            let Some(trial_energy) = accepted else {
                if history.is_empty() {
                    return MinimizeOutcome {
                        converged: true,
                        iterations: iter,
                        energy,
                    };
                }
                history.clear();
                continue;
            };

            let s: Vec<f64> = trial.iter().zip(x.iter()).map(|(a, b)| a - b).collect();
            let y: Vec<f64> = trial_grad.iter().zip(&grad).map(|(a, b)| a - b).collect();
            let sy = dot(&s, &y);
            if sy > Self::MIN_CURVATURE {
                if history.len() >= self.memory {
                    history.pop_front();
                }
                history.push_back(Correction { s, y, rho: 1.0 / sy });
            }

            x.copy_from_slice(&trial);
            std::mem::swap(&mut grad, &mut trial_grad);
            energy = trial_energy;
        }

        MinimizeOutcome {
            converged: false,
            iterations: self.max_iterations,
            energy,
        }
    }

    /// Two-loop recursion: `-H g` with `H` built from the stored corrections.
    fn search_direction(&self, grad: &[f64], history: &VecDeque<Correction>) -> Vec<f64> {
        let mut q = grad.to_vec();
        let mut alphas = Vec::with_capacity(history.len());
        for c in history.iter().rev() {
            let alpha = c.rho * dot(&c.s, &q);
            q.iter_mut().zip(&c.y).for_each(|(qi, yi)| *qi -= alpha * yi);
            alphas.push(alpha);
        }

        let gamma = match history.back() {
            Some(c) => dot(&c.s, &c.y) / dot(&c.y, &c.y),
            None => 1.0 / dot(grad, grad).sqrt().max(1.0),
        };
        q.iter_mut().for_each(|qi| *qi *= gamma);

        for (c, alpha) in history.iter().zip(alphas.iter().rev()) {
            let beta = c.rho * dot(&c.y, &q);
            q.iter_mut().zip(&c.s).for_each(|(qi, si)| *qi += si * (alpha - beta));
        }

        q.iter_mut().for_each(|qi| *qi = -*qi);
        q
    }
}

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Largest Euclidean norm over the `stride`-sized points of `v`.
fn max_point_norm(v: &[f64], stride: usize) -> f64 {
    v.chunks(stride)
        .map(|p| p.iter().map(|c| c * c).sum::<f64>())
        .fold(0.0, f64::max)
        .sqrt()
}

fn push_bounded(history: &mut VecDeque<f64>, value: f64, capacity: usize) {
    if history.len() >= capacity {
        history.pop_front();
    }
    history.push_back(value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn harmonic(x: &[f64], grad: &mut [f64]) -> f64 {
        let target = [1.0, -2.0, 0.5];
        let mut e = 0.0;
        for (i, (xi, ti)) in x.iter().zip(target.iter().cycle()).enumerate() {
            let d = xi - ti;
            e += d * d;
            grad[i] = 2.0 * d;
        }
        e
    }

    #[test]
    fn relaxes_quadratic_well() {
        let mut x = vec![5.0, 5.0, 5.0, -3.0, 0.0, 2.0];
        let outcome = Fire::new(5000, 1e-4).minimize(&harmonic, &mut x);
        assert!(outcome.converged);
        assert_abs_diff_eq!(x[0], 1.0, epsilon = 1e-2);
        assert_abs_diff_eq!(x[1], -2.0, epsilon = 1e-2);
        assert_abs_diff_eq!(x[5], 0.5, epsilon = 1e-2);
        assert!(outcome.energy < 1e-3);
    }

    #[test]
    fn supports_four_dimensional_points() {
        let f = |x: &[f64], grad: &mut [f64]| {
            let mut e = 0.0;
            for (i, xi) in x.iter().enumerate() {
                e += xi * xi;
                grad[i] = 2.0 * xi;
            }
            e
        };
        let mut x = vec![1.0, 2.0, 3.0, 4.0];
        let outcome = Fire::new(5000, 1e-4).with_stride(4).minimize(&f, &mut x);
        assert!(outcome.converged);
        assert!(x.iter().all(|v| v.abs() < 1e-2));
    }

    #[test]
    fn reports_exhausted_budget() {
        let mut x = vec![100.0, 100.0, 100.0];
        let outcome = Fire::new(3, 1e-8).minimize(&harmonic, &mut x);
        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 3);
    }

    #[test]
    fn zero_iterations_only_evaluates() {
        let mut x = vec![1.0, -2.0, 0.5];
        let outcome = Fire::new(0, 1e-4).minimize(&harmonic, &mut x);
        assert!(!outcome.converged);
        assert_abs_diff_eq!(outcome.energy, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn lbfgs_handles_ill_conditioned_wells() {
        let weights = [1.0, 10.0, 100.0, 1e3, 1e4, 3.0];
        let target = [1.0, -2.0, 0.5, 1.0, -2.0, 0.5];
        let f = |x: &[f64], grad: &mut [f64]| {
            let mut e = 0.0;
            for i in 0..6 {
                let d = x[i] - target[i];
                e += weights[i] * d * d;
                grad[i] = 2.0 * weights[i] * d;
            }
            e
        };
        let mut x = vec![5.0, 5.0, 5.0, -3.0, 0.0, 2.0];
        let outcome = Lbfgs::new(500, 1e-6).minimize(&f, &mut x);
        assert!(outcome.converged);
        for (xi, ti) in x.iter().zip(&target) {
            assert_abs_diff_eq!(*xi, *ti, epsilon = 1e-4);
        }
    }

    #[test]
    fn lbfgs_follows_the_rosenbrock_valley() {
        let f = |x: &[f64], grad: &mut [f64]| {
            let (a, b) = (x[0], x[1]);
            grad[0] = -2.0 * (1.0 - a) - 400.0 * a * (b - a * a);
            grad[1] = 200.0 * (b - a * a);
            (1.0 - a).powi(2) + 100.0 * (b - a * a).powi(2)
        };
        let mut x = vec![-1.2, 1.0];
        let outcome = Lbfgs::new(500, 1e-6).with_stride(2).minimize(&f, &mut x);
        assert!(outcome.converged);
        assert!(outcome.iterations < 200, "{} iterations", outcome.iterations);
        assert_abs_diff_eq!(x[0], 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(x[1], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn lbfgs_reports_exhausted_budget() {
        let mut x = vec![100.0, 100.0, 100.0];
        let outcome = Lbfgs::new(1, 1e-8).minimize(&harmonic, &mut x);
        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 1);
    }
}
