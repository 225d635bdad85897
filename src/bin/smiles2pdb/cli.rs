use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "smiles2pdb",
    about = "Convert a SMILES string into UFF-optimized 3D conformers in PDB format",
    version,
    before_help = crate::display::banner_for_help(),
    allow_negative_numbers = true
)]
pub struct Cli {
    /// Molecule as a SMILES string
    #[arg(value_name = "SMILES")]
    pub smiles: String,

    /// Output PDB file
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Number of conformers to generate
    #[arg(
        value_name = "NUM_CONFORMERS",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub num_conformers: u32,

    #[command(flatten)]
    pub embed: EmbedOptions,

    #[command(flatten)]
    pub optimize: OptimizeOptions,

    /// Suppress progress output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Conformer generation options.
#[derive(clap::Args)]
#[command(next_help_heading = "Embedding")]
pub struct EmbedOptions {
    /// Random seed for distance-geometry embedding
    #[arg(long, value_name = "N", default_value_t = 42)]
    pub seed: u64,

    /// Worker threads for multi-conformer embedding (0 = all cores)
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub threads: usize,
}

/// Force field optimization options.
#[derive(clap::Args)]
#[command(next_help_heading = "Optimization")]
pub struct OptimizeOptions {
    /// UFF iteration budget per conformer
    #[arg(long = "max-iters", value_name = "N", default_value_t = 1000)]
    pub max_iterations: usize,

    /// Custom UFF parameter file (TOML)
    #[arg(long, value_name = "FILE")]
    pub params: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn count_defaults_to_one() {
        let cli = Cli::try_parse_from(["smiles2pdb", "CCO", "out.pdb"]).unwrap();
        assert_eq!(cli.num_conformers, 1);
        assert_eq!(cli.embed.seed, 42);
        assert_eq!(cli.optimize.max_iterations, 1000);
        assert!(!cli.quiet);
    }

    #[test]
    fn rejects_non_positive_or_malformed_counts() {
        for bad in ["0", "-1", "abc"] {
            assert!(
                Cli::try_parse_from(["smiles2pdb", "CCO", "out.pdb", bad]).is_err(),
                "{bad} accepted"
            );
        }
    }

    #[test]
    fn options_follow_positionals() {
        let cli = Cli::try_parse_from([
            "smiles2pdb", "CCO", "out.pdb", "3", "-q", "--seed", "7", "--threads", "2",
        ])
        .unwrap();
        assert_eq!(cli.num_conformers, 3);
        assert!(cli.quiet);
        assert_eq!(cli.embed.seed, 7);
        assert_eq!(cli.embed.threads, 2);
    }
}
