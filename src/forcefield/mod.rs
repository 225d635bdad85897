//! Universal Force Field (UFF) setup and geometry optimization.
//!
//! [`optimize`] types the atoms of a hydrogen-complete molecule, builds the
//! bonded and non-bonded UFF terms from the parameter table, and relaxes one
//! conformer in place with the L-BFGS minimizer. The outcome is reported as a
//! status code rather than an error: optimization problems never abort the
//! caller.
//!
//! # Terms
//!
//! - Harmonic bond stretch with bond-order and electronegativity corrected
//!   rest lengths.
//! - Fourier angle bend, with a dedicated linear form.
//! - Torsions for sp3–sp3, sp2–sp2 and sp2–sp3 bonds, split evenly over all
//!   torsions about a bond.
//! - Out-of-plane inversion for trigonal carbon and nitrogen.
//! - Lennard-Jones 12-6 van der Waals for all pairs beyond 1-3.

mod error;
mod params;
mod setup;
mod terms;
mod typer;

pub use error::Error;
pub use params::{AtomTypeParams, ForceFieldParams, GlobalParams, get_default_parameters, load_parameters};
pub use terms::{EnergyTerms, ForceField};
pub use typer::{Hybridization, UffType, assign_types};

use crate::minimize::Lbfgs;
use crate::model::molecule::{ConformerId, Molecule};

/// Settings for [`optimize_with`].
#[derive(Debug, Clone)]
pub struct OptimizeParams {
    pub max_iterations: usize,
    /// Largest per-atom force (kcal/mol/Å) at which the structure counts
    /// as converged.
    pub force_tolerance: f64,
    /// Custom parameter table as TOML text. `None` uses the built-in table.
    pub params: Option<String>,
}

impl Default for OptimizeParams {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            force_tolerance: 1e-2,
            params: None,
        }
    }
}

/// Outcome category of one optimization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizeStatus {
    Converged,
    /// The iteration budget ran out before the force criteria were met.
    MaxIterations,
    /// The force field could not be set up for this molecule or conformer.
    SetupFailed,
}

impl OptimizeStatus {
    /// Numeric return code: 0 converged, 1 budget exhausted, -1 setup failed.
    pub fn code(&self) -> i32 {
        match self {
            OptimizeStatus::Converged => 0,
            OptimizeStatus::MaxIterations => 1,
            OptimizeStatus::SetupFailed => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizeResult {
    pub status: OptimizeStatus,
    /// Final total energy in kcal/mol; `None` when setup failed.
    pub energy: Option<f64>,
    pub iterations: usize,
}

impl OptimizeResult {
    fn setup_failed() -> Self {
        Self {
            status: OptimizeStatus::SetupFailed,
            energy: None,
            iterations: 0,
        }
    }

    #[inline]
    pub fn code(&self) -> i32 {
        self.status.code()
    }
}

/// Optimizes one conformer with the built-in UFF parameters.
pub fn optimize(mol: &mut Molecule, max_iterations: usize, id: ConformerId) -> OptimizeResult {
    let settings = OptimizeParams {
        max_iterations,
        ..OptimizeParams::default()
    };
    optimize_with(mol, id, get_default_parameters(), &settings)
}

/// Optimizes one conformer with an explicit parameter table.
///
/// `settings.params` is ignored here; callers load custom tables once with
/// [`load_parameters`] and pass the result as `params`.
pub fn optimize_with(
    mol: &mut Molecule,
    id: ConformerId,
    params: &ForceFieldParams,
    settings: &OptimizeParams,
) -> OptimizeResult {
    let Ok((field, mut coords)) = prepare(mol, id, params) else {
        return OptimizeResult::setup_failed();
    };

    let outcome = Lbfgs::new(settings.max_iterations, settings.force_tolerance)
        .minimize(&field, &mut coords);

    if let Some(conformer) = mol.conformer_mut(id) {
        for (pos, xyz) in conformer.positions.iter_mut().zip(coords.chunks_exact(3)) {
            *pos = [xyz[0], xyz[1], xyz[2]];
        }
    }

    OptimizeResult {
        status: if outcome.converged {
            OptimizeStatus::Converged
        } else {
            OptimizeStatus::MaxIterations
        },
        energy: Some(outcome.energy),
        iterations: outcome.iterations,
    }
}

/// Builds the force field for `mol` and flattens the conformer's coordinates.
pub fn prepare(
    mol: &Molecule,
    id: ConformerId,
    params: &ForceFieldParams,
) -> Result<(ForceField, Vec<f64>), Error> {
    let conformer = mol.conformer(id).ok_or(Error::UnknownConformer(id))?;
    if conformer.positions.len() != mol.atom_count() {
        return Err(Error::CoordinateMismatch {
            id,
            positions: conformer.positions.len(),
            atoms: mol.atom_count(),
        });
    }
    let field = setup::build(mol, params)?;
    let coords = conformer.positions.iter().flatten().copied().collect();
    Ok((field, coords))
}

/// Total UFF energy of a stored conformer.
pub fn energy(mol: &Molecule, id: ConformerId, params: &ForceFieldParams) -> Result<EnergyTerms, Error> {
    let (field, coords) = prepare(mol, id, params)?;
    let mut grad = vec![0.0; coords.len()];
    Ok(field.energy_terms(&coords, &mut grad))
}
