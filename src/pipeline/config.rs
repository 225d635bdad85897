use crate::embed::EmbedParams;
use crate::forcefield::OptimizeParams;

/// Settings for one SMILES → conformers conversion.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Conformers to generate. `1` embeds a single structure and fails if it
    /// cannot; larger counts embed a batch and keep whatever succeeds.
    pub num_conformers: usize,
    pub embed: EmbedParams,
    pub optimize: OptimizeParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            num_conformers: 1,
            embed: EmbedParams::default(),
            optimize: OptimizeParams::default(),
        }
    }
}
