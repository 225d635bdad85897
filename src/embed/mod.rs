//! Distance-geometry generation of 3D conformers.
//!
//! Embedding works on a hydrogen-complete molecule:
//!
//! 1. [`bounds`] derives lower and upper distance limits for every atom pair
//!    from ideal bond lengths, valence angles, torsion extremes and
//!    double-bond marks, then smooths them with the triangle inequality.
//! 2. Each attempt samples a distance matrix inside the bounds and turns it
//!    into 4D coordinates through the metric matrix.
//! 3. The coordinates are refined against the bound violations and the
//!    chiral volumes, squeezed out of the fourth dimension, and refined again
//!    in 3D.
//!
//! Conformer `i` of a batch draws from its own generator seeded with
//! `random_seed + i`, so the output does not depend on the thread count.

pub mod bounds;
mod coords;
mod error;
mod refine;

pub use bounds::{BoundsMatrix, build_bounds};
pub use error::Error;
pub use refine::{ChiralConstraint, chiral_constraints};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::forcefield::get_default_parameters;
use crate::minimize::Fire;
use crate::model::molecule::{ConformerId, Molecule};
use coords::{EMBED_DIM, metric_coordinates, sample_distances};
use refine::DistanceGeometry;

const REFINE_TOLERANCE: f64 = 1e-3;
const MAX_ITERATIONS_4D: usize = 2000;
const MAX_ITERATIONS_3D: usize = 1000;
const EXTRA_DIM_WEIGHT: f64 = 1.0;
const CHIRAL_WEIGHT: f64 = 1.0;

/// Settings for [`embed_one`] and [`embed_many`].
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedParams {
    pub random_seed: u64,
    /// Worker threads for batches. `0` uses the global rayon pool.
    pub num_threads: usize,
    /// Attempts per conformer. `0` picks `max(10 × atoms, 50)`.
    pub max_attempts: usize,
    /// Largest accepted distance-geometry error per atom.
    pub error_per_atom: f64,
}

impl Default for EmbedParams {
    fn default() -> Self {
        Self {
            random_seed: 42,
            num_threads: 0,
            max_attempts: 0,
            error_per_atom: 0.05,
        }
    }
}

impl EmbedParams {
    fn attempts_for(&self, atoms: usize) -> usize {
        if self.max_attempts > 0 {
            self.max_attempts
        } else {
            (10 * atoms).max(50)
        }
    }
}

/// Everything an attempt needs, shared read-only between workers.
struct Problem {
    bounds: BoundsMatrix,
    chiral: Vec<ChiralConstraint>,
    attempts: usize,
    error_per_atom: f64,
}

impl Problem {
    fn new(mol: &Molecule, params: &EmbedParams) -> Result<Self, Error> {
        if mol.atom_count() == 0 {
            return Err(Error::EmptyMolecule);
        }
        Ok(Self {
            bounds: build_bounds(mol, get_default_parameters())?,
            chiral: chiral_constraints(mol),
            attempts: params.attempts_for(mol.atom_count()),
            error_per_atom: params.error_per_atom,
        })
    }

    fn generate(&self, seed: u64) -> Option<Vec<[f64; 3]>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..self.attempts).find_map(|_| self.attempt(&mut rng))
    }

    fn attempt(&self, rng: &mut StdRng) -> Option<Vec<[f64; 3]>> {
        let n = self.bounds.len();
        let distances = sample_distances(&self.bounds, rng);
        let mut x4 = metric_coordinates(&distances, rng)?;

        let mut objective = DistanceGeometry {
            bounds: &self.bounds,
            chiral: &self.chiral,
            stride: EMBED_DIM,
            chiral_weight: CHIRAL_WEIGHT,
            extra_dim_weight: 0.0,
        };
        let fire_4d = Fire::new(MAX_ITERATIONS_4D, REFINE_TOLERANCE).with_stride(EMBED_DIM);
        fire_4d.minimize(&objective, &mut x4);

        objective.extra_dim_weight = EXTRA_DIM_WEIGHT;
        fire_4d.minimize(&objective, &mut x4);

        let mut x3: Vec<f64> = x4
            .chunks_exact(EMBED_DIM)
            .flat_map(|p| p[..3].iter().copied())
            .collect();
        objective.stride = 3;
        objective.extra_dim_weight = 0.0;
        Fire::new(MAX_ITERATIONS_3D, REFINE_TOLERANCE).minimize(&objective, &mut x3);

        if objective.distance_error(&x3) / n as f64 >= self.error_per_atom {
            return None;
        }
        if !self.chiral.iter().all(|c| c.is_satisfied(&x3, 3)) {
            return None;
        }
        Some(centered(&x3))
    }
}

fn centered(x: &[f64]) -> Vec<[f64; 3]> {
    let n = (x.len() / 3).max(1) as f64;
    let mut center = [0.0; 3];
    for p in x.chunks_exact(3) {
        for k in 0..3 {
            center[k] += p[k] / n;
        }
    }
    x.chunks_exact(3)
        .map(|p| [p[0] - center[0], p[1] - center[1], p[2] - center[2]])
        .collect()
}

/// Generates one conformer and stores it on `mol`.
pub fn embed_one(mol: &mut Molecule, params: &EmbedParams) -> Result<ConformerId, Error> {
    let problem = Problem::new(mol, params)?;
    let positions = problem
        .generate(params.random_seed)
        .ok_or(Error::EmbeddingFailed {
            attempts: problem.attempts,
        })?;
    Ok(mol.add_conformer(positions))
}

/// Generates up to `count` conformers in parallel.
///
/// Conformers whose attempts all fail are skipped; the returned ids are the
/// successful ones in generation order and may be empty.
pub fn embed_many(
    mol: &mut Molecule,
    count: usize,
    params: &EmbedParams,
) -> Result<Vec<ConformerId>, Error> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let problem = Problem::new(mol, params)?;
    let run = || -> Vec<Option<Vec<[f64; 3]>>> {
        (0..count)
            .into_par_iter()
            .map(|i| problem.generate(params.random_seed.wrapping_add(i as u64)))
            .collect()
    };

    let results = if params.num_threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(params.num_threads)
            .build()?
            .install(run)
    } else {
        run()
    };

    Ok(results
        .into_iter()
        .flatten()
        .map(|positions| mol.add_conformer(positions))
        .collect())
}
