mod banner;
mod error;
mod progress;
mod tables;

pub use banner::{banner_for_help, print_banner};
pub use error::{print_error, print_warning};
pub use progress::Progress;
pub use tables::{print_molecule_summary, print_outcomes};

#[derive(Debug, Clone, Copy)]
pub struct Context {
    /// Spinners, tables and the banner go to a terminal.
    pub interactive: bool,
    /// No progress output at all; warnings and errors still print.
    pub quiet: bool,
}

impl Context {
    pub fn detect() -> Self {
        Self {
            interactive: crate::io::stderr_is_tty(),
            quiet: false,
        }
    }

    pub fn with_quiet(self, quiet: bool) -> Self {
        if quiet {
            Self {
                interactive: false,
                quiet: true,
            }
        } else {
            self
        }
    }
}
