use anyhow::{Context, Result};

use smiles2pdb::embed::EmbedParams;
use smiles2pdb::forcefield::OptimizeParams;
use smiles2pdb::pipeline::PipelineConfig;

use crate::cli::{Cli, EmbedOptions, OptimizeOptions};
use crate::io::read_text;

pub fn build_pipeline_config(cli: &Cli) -> Result<PipelineConfig> {
    Ok(PipelineConfig {
        num_conformers: cli.num_conformers as usize,
        embed: build_embed_params(&cli.embed),
        optimize: build_optimize_params(&cli.optimize)?,
    })
}

fn build_embed_params(opts: &EmbedOptions) -> EmbedParams {
    EmbedParams {
        random_seed: opts.seed,
        num_threads: opts.threads,
        ..EmbedParams::default()
    }
}

fn build_optimize_params(opts: &OptimizeOptions) -> Result<OptimizeParams> {
    let params = opts
        .params
        .as_deref()
        .map(read_text)
        .transpose()
        .context("Failed to load custom UFF parameters")?;

    Ok(OptimizeParams {
        max_iterations: opts.max_iterations,
        params,
        ..OptimizeParams::default()
    })
}
