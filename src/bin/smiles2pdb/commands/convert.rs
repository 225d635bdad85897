use anyhow::{Context, Result};

use smiles2pdb::io::pdb::write_conformers;
use smiles2pdb::pipeline;

use crate::cli::Cli;
use crate::config::build_pipeline_config;
use crate::display::{
    Context as DisplayContext, Progress, print_molecule_summary, print_outcomes, print_warning,
};
use crate::io::create_output;

const TOTAL_STEPS: u8 = 4;

pub fn run_convert(cli: Cli, ctx: DisplayContext) -> Result<()> {
    let config = build_pipeline_config(&cli)?;
    let params = pipeline::resolve_parameters(&config.optimize)
        .context("Invalid force field parameters")?;

    let mut progress = Progress::new(ctx, TOTAL_STEPS);

    progress.step("Parsing SMILES");
    let mut molecule = pipeline::prepare(&cli.smiles)
        .with_context(|| format!("Could not read SMILES '{}'", cli.smiles))?;
    let parse_substeps = [
        format!("Parse {} heavy atoms", molecule.heavy_atom_count()),
        format!(
            "Add {} explicit hydrogens",
            molecule.atom_count() - molecule.heavy_atom_count()
        ),
    ];
    progress.complete_step("Parsing SMILES", &as_refs(&parse_substeps));

    if ctx.interactive {
        print_molecule_summary(&molecule);
    }

    progress.step("Generating 3D conformers");
    let ids = pipeline::generate(&mut molecule, config.num_conformers, &config.embed)
        .context("Conformer generation failed")?;
    let embed_substeps = [
        format!(
            "Embed {} of {} conformer(s) (seed {})",
            ids.len(),
            config.num_conformers,
            config.embed.random_seed
        ),
    ];
    progress.complete_step("Generating 3D conformers", &as_refs(&embed_substeps));

    progress.step("Optimizing with UFF");
    let outcomes = pipeline::optimize_all(&mut molecule, &ids, &params, &config.optimize);
    for (index, outcome) in outcomes.iter().enumerate() {
        if !outcome.is_converged() {
            progress.suspend(|| print_warning(index + 1, outcome.status.code()));
        }
    }
    let converged = outcomes.iter().filter(|o| o.is_converged()).count();
    let optimize_substeps = [
        format!("Relax {} conformer(s), {} converged", outcomes.len(), converged),
        format!("Budget {} iterations each", config.optimize.max_iterations),
    ];
    progress.complete_step("Optimizing with UFF", &as_refs(&optimize_substeps));

    if ctx.interactive {
        print_outcomes(&outcomes);
    }

    progress.step("Writing PDB");
    let mut out = create_output(&cli.output)?;
    write_conformers(&mut out, &molecule, &ids)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;
    let write_substeps = [format!("Write PDB → {}", cli.output.display())];
    progress.complete_step("Writing PDB", &as_refs(&write_substeps));

    progress.finish(&format!(
        "Successfully created {} with {} conformer(s)",
        cli.output.display(),
        ids.len()
    ));

    Ok(())
}

fn as_refs(items: &[String]) -> Vec<&str> {
    items.iter().map(String::as_str).collect()
}
