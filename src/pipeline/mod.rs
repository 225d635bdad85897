//! The SMILES → optimized conformers sequence as library calls.
//!
//! [`run`] performs every stage in order. The individual stages are public
//! as well so front ends can report progress between them:
//!
//! 1. [`prepare`] parses the descriptor and makes every hydrogen explicit.
//! 2. [`generate`] embeds one conformer or a batch.
//! 3. [`optimize_all`] relaxes each conformer with UFF and records the
//!    outcome without ever failing.

mod config;
mod error;

pub use config::PipelineConfig;
pub use error::Error;

use std::borrow::Cow;

use crate::embed::{self, EmbedParams};
use crate::forcefield::{
    self, ForceFieldParams, OptimizeParams, OptimizeStatus, get_default_parameters, load_parameters,
};
use crate::model::molecule::{ConformerId, Molecule};
use crate::ops::add_hydrogens;
use crate::smiles;

/// Optimization result for one conformer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizationOutcome {
    pub conformer_id: ConformerId,
    pub status: OptimizeStatus,
    pub energy: Option<f64>,
}

impl OptimizationOutcome {
    #[inline]
    pub fn is_converged(&self) -> bool {
        self.status == OptimizeStatus::Converged
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub molecule: Molecule,
    pub conformer_ids: Vec<ConformerId>,
    pub outcomes: Vec<OptimizationOutcome>,
}

impl PipelineOutput {
    /// Outcomes whose optimization did not converge.
    pub fn warnings(&self) -> impl Iterator<Item = &OptimizationOutcome> {
        self.outcomes.iter().filter(|o| !o.is_converged())
    }
}

pub fn run(descriptor: &str, config: &PipelineConfig) -> Result<PipelineOutput, Error> {
    let mut molecule = prepare(descriptor)?;
    let params = resolve_parameters(&config.optimize)?;
    let conformer_ids = generate(&mut molecule, config.num_conformers, &config.embed)?;
    let outcomes = optimize_all(&mut molecule, &conformer_ids, &params, &config.optimize);
    Ok(PipelineOutput {
        molecule,
        conformer_ids,
        outcomes,
    })
}

/// Parses `descriptor` and adds explicit hydrogens.
pub fn prepare(descriptor: &str) -> Result<Molecule, Error> {
    let mut molecule = smiles::parse(descriptor)?;
    add_hydrogens(&mut molecule);
    Ok(molecule)
}

/// The parameter table named by `settings`, loaded once per conversion.
pub fn resolve_parameters(settings: &OptimizeParams) -> Result<Cow<'static, ForceFieldParams>, Error> {
    Ok(match settings.params.as_deref() {
        Some(text) => Cow::Owned(load_parameters(Some(text))?),
        None => Cow::Borrowed(get_default_parameters()),
    })
}

/// Embeds `count` conformers.
///
/// A single conformer propagates the embedding error. A batch keeps the
/// conformers that succeed and fails only when none do.
pub fn generate(
    molecule: &mut Molecule,
    count: usize,
    params: &EmbedParams,
) -> Result<Vec<ConformerId>, Error> {
    if count <= 1 {
        return Ok(vec![embed::embed_one(molecule, params)?]);
    }
    let ids = embed::embed_many(molecule, count, params)?;
    if ids.is_empty() {
        return Err(Error::NoConformers { requested: count });
    }
    Ok(ids)
}

/// Optimizes every conformer in `ids`, in order.
pub fn optimize_all(
    molecule: &mut Molecule,
    ids: &[ConformerId],
    params: &ForceFieldParams,
    settings: &OptimizeParams,
) -> Vec<OptimizationOutcome> {
    ids.iter()
        .map(|&id| {
            let result = forcefield::optimize_with(molecule, id, params, settings);
            OptimizationOutcome {
                conformer_id: id,
                status: result.status,
                energy: result.energy,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::chiral_constraints;
    use crate::io::pdb::write_conformers;

    fn positions(output: &PipelineOutput) -> &[[f64; 3]] {
        &output
            .molecule
            .conformer(output.conformer_ids[0])
            .unwrap()
            .positions
    }

    /// Signed dihedral angle `a`-`b`-`c`-`d` in degrees.
    fn dihedral(p: &[[f64; 3]], [a, b, c, d]: [usize; 4]) -> f64 {
        let sub = |u: [f64; 3], v: [f64; 3]| [u[0] - v[0], u[1] - v[1], u[2] - v[2]];
        let cross = |u: [f64; 3], v: [f64; 3]| {
            [
                u[1] * v[2] - u[2] * v[1],
                u[2] * v[0] - u[0] * v[2],
                u[0] * v[1] - u[1] * v[0],
            ]
        };
        let dot = |u: [f64; 3], v: [f64; 3]| u[0] * v[0] + u[1] * v[1] + u[2] * v[2];

        let (b1, b2, b3) = (sub(p[b], p[a]), sub(p[c], p[b]), sub(p[d], p[c]));
        let (n1, n2) = (cross(b1, b2), cross(b2, b3));
        let m1 = cross(n1, b2);
        let b2_len = dot(b2, b2).sqrt();
        let y = dot(m1, n2) / b2_len;
        y.atan2(dot(n1, n2)).to_degrees()
    }

    #[test]
    fn converts_ethanol_end_to_end() {
        let output = run("CCO", &PipelineConfig::default()).unwrap();
        assert_eq!(output.molecule.atom_count(), 9);
        assert_eq!(output.conformer_ids, vec![ConformerId(0)]);
        assert_eq!(output.outcomes.len(), 1);
        assert!(output.outcomes[0].energy.is_some());
    }

    #[test]
    fn batches_keep_generation_order() {
        let config = PipelineConfig {
            num_conformers: 3,
            ..PipelineConfig::default()
        };
        let output = run("CCO", &config).unwrap();
        assert_eq!(output.conformer_ids.len(), 3);
        let outcome_ids: Vec<_> = output.outcomes.iter().map(|o| o.conformer_id).collect();
        assert_eq!(outcome_ids, output.conformer_ids);
    }

    #[test]
    fn parse_failures_stop_the_pipeline() {
        let err = run("C1CC", &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert!(err.to_string().starts_with("failed to parse SMILES"));
    }

    #[test]
    fn untyped_atoms_are_reported_as_setup_failures() {
        let output = run("[Na+].[Cl-]", &PipelineConfig::default()).unwrap();
        assert_eq!(output.outcomes[0].status, OptimizeStatus::SetupFailed);
        assert_eq!(output.warnings().count(), 1);
    }

    #[test]
    fn invalid_custom_parameters_are_rejected() {
        let config = PipelineConfig {
            optimize: OptimizeParams {
                params: Some("atoms = 3".into()),
                ..OptimizeParams::default()
            },
            ..PipelineConfig::default()
        };
        assert!(matches!(
            run("C", &config).unwrap_err(),
            Error::Parameters(_)
        ));
    }

    #[test]
    fn repeated_runs_are_byte_identical() {
        let config = PipelineConfig {
            num_conformers: 2,
            ..PipelineConfig::default()
        };
        let render = || {
            let output = run("OCC(=O)N", &config).unwrap();
            let mut buf = Vec::new();
            write_conformers(&mut buf, &output.molecule, &output.conformer_ids).unwrap();
            buf
        };
        assert_eq!(render(), render());
    }

    #[test]
    fn optimized_double_bonds_keep_their_configuration() {
        let trans = run("F/C=C/F", &PipelineConfig::default()).unwrap();
        let cis = run("F/C=C\\F", &PipelineConfig::default()).unwrap();

        let trans_angle = dihedral(positions(&trans), [0, 1, 2, 3]);
        let cis_angle = dihedral(positions(&cis), [0, 1, 2, 3]);
        assert!(trans_angle.abs() > 170.0, "trans F-C=C-F at {trans_angle}");
        assert!(cis_angle.abs() < 10.0, "cis F-C=C-F at {cis_angle}");
    }

    #[test]
    fn optimized_benzene_is_planar() {
        let output = run("c1ccccc1", &PipelineConfig::default()).unwrap();
        let p = positions(&output);
        for start in 0..6 {
            let ring = [start, (start + 1) % 6, (start + 2) % 6, (start + 3) % 6];
            let angle = dihedral(p, ring);
            assert!(angle.abs() < 5.0, "ring torsion {ring:?} at {angle}");
        }
    }

    #[test]
    fn optimization_preserves_tetrahedral_chirality() {
        for smiles in ["F[C@](Cl)(Br)I", "F[C@@](Cl)(Br)I", "N[C@@H](C)C(=O)O", "N[C@H](C)C(=O)O"] {
            let output = run(smiles, &PipelineConfig::default()).unwrap();
            let constraints = chiral_constraints(&output.molecule);
            assert_eq!(constraints.len(), 1, "{smiles}");

            let flat: Vec<f64> = positions(&output).iter().flatten().copied().collect();
            assert!(constraints[0].is_satisfied(&flat, 3), "{smiles}");
        }
    }

    #[test]
    fn common_molecules_converge_within_the_default_budget() {
        for smiles in ["C[C@H](N)C(=O)O", "Cn1cnc2c1c(=O)n(C)c(=O)n2C"] {
            let output = run(smiles, &PipelineConfig::default()).unwrap();
            assert_eq!(output.outcomes.len(), 1, "{smiles}");
            assert!(
                output.outcomes.iter().all(OptimizationOutcome::is_converged),
                "{smiles}: {:?}",
                output.outcomes
            );
            assert_eq!(output.warnings().count(), 0);
        }
    }
}
