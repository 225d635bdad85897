use std::io::{self, Write};

use anyhow::Error;

use crate::util::text::wrap;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    for line in wrap(&err.to_string(), 59) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    for cause in err.chain().skip(1) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause.to_string(), 57) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
    }

    if let Some(hints) = HintCollector::collect(err) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

/// Non-fatal optimization report, printed even in quiet mode.
pub fn print_warning(conformer: usize, code: i32) {
    let _ = writeln!(
        io::stderr().lock(),
        "Warning: UFF optimization for conformer {} returned code {}",
        conformer,
        code
    );
}

struct HintCollector {
    hints: Vec<String>,
    has_typed_hints: bool,
}

impl HintCollector {
    fn new() -> Self {
        Self {
            hints: Vec::new(),
            has_typed_hints: false,
        }
    }

    fn collect(err: &Error) -> Option<Vec<String>> {
        let mut collector = Self::new();

        collector.collect_smiles_hints(err);
        collector.collect_embed_hints(err);
        collector.collect_pipeline_hints(err);
        collector.collect_forcefield_hints(err);
        collector.collect_io_hints(err);

        if !collector.has_typed_hints {
            collector.collect_fallback_hints(err);
        }

        if collector.hints.is_empty() {
            None
        } else {
            Some(collector.hints)
        }
    }

    fn add(&mut self, hint: impl Into<String>) {
        self.hints.push(hint.into());
    }

    fn mark_typed(&mut self) {
        self.has_typed_hints = true;
    }

    fn collect_smiles_hints(&mut self, err: &Error) {
        use smiles2pdb::smiles::Error as SmilesError;

        let Some(smiles_err) = find::<SmilesError>(err) else {
            return;
        };

        self.mark_typed();

        if let Some(position) = smiles_err.position() {
            self.add(format!(
                "Parsing stopped at character {} (counting from 0)",
                position
            ));
        }

        match smiles_err {
            SmilesError::Empty => {
                self.add("Pass the molecule as the first argument, e.g. smiles2pdb CCO out.pdb");
            }

            SmilesError::UnexpectedCharacter { .. } | SmilesError::UnknownElement { .. } => {
                self.add("Organic-subset atoms are B C N O P S F Cl Br I (aromatic: b c n o p s)");
                self.add("Other elements must be written in brackets, e.g. [Na+] or [Se]");
            }

            SmilesError::UnclosedBracket { .. } => {
                self.add("Every '[' needs a matching ']'");
            }

            SmilesError::UnmatchedParenthesis { .. } | SmilesError::UnclosedBranch { .. } => {
                self.add("Check that branch parentheses are balanced");
            }

            SmilesError::MissingAtom { .. } | SmilesError::DanglingBond { .. } => {
                self.add("Bond symbols must sit between two atoms");
            }

            SmilesError::UnclosedRing { label, .. } => {
                self.add(format!("Ring bond {} is opened but never closed", label));
                self.add("Ring closure digits come in pairs, e.g. C1CCCCC1");
            }

            SmilesError::RingBondConflict { .. } => {
                self.add("Both ends of a ring closure specify different bond orders");
            }

            SmilesError::InvalidRingClosure { .. } => {
                self.add("A ring closure may not bond an atom to itself or repeat an existing bond");
            }

            SmilesError::Unsupported { feature, .. } => {
                self.add(format!("{} is not supported by this converter", feature));
                self.add("Only tetrahedral @/@@ chirality and single to triple bonds are handled");
            }

            SmilesError::NonRingAromatic { atom } => {
                self.add(format!("Atom {} uses a lowercase (aromatic) symbol outside a ring", atom));
                self.add("Write it in uppercase or close the aromatic ring");
            }

            SmilesError::ValenceExceeded { element, .. } => {
                self.add(format!("Too many bonds or hydrogens on {}", element));
                self.add("Check charges and explicit hydrogen counts in brackets");
            }
        }
    }

    fn collect_embed_hints(&mut self, err: &Error) {
        use smiles2pdb::embed::Error as EmbedError;

        let Some(embed_err) = find::<EmbedError>(err) else {
            return;
        };

        self.mark_typed();

        match embed_err {
            EmbedError::EmptyMolecule => {
                self.add("The molecule has no atoms to place");
            }

            EmbedError::InconsistentBounds { i, j } => {
                self.add(format!(
                    "Geometric constraints between atoms {} and {} contradict each other",
                    i, j
                ));
                self.add("Strained ring systems or conflicting stereo marks can cause this");
            }

            EmbedError::EmbeddingFailed { attempts } => {
                self.add(format!("All {} embedding attempts were rejected", attempts));
                self.add("Try a different --seed");
                self.add("Check that the chirality tags describe a realizable structure");
            }

            EmbedError::ThreadPool(_) => {
                self.add("Could not start embedding worker threads");
                self.add("Try --threads 1 or --threads 0");
            }
        }
    }

    fn collect_pipeline_hints(&mut self, err: &Error) {
        use smiles2pdb::pipeline::Error as PipelineError;

        if let Some(PipelineError::NoConformers { requested }) = find::<PipelineError>(err) {
            self.mark_typed();
            self.add(format!("None of the {} conformers could be embedded", requested));
            self.add("Try a different --seed or a single conformer to see the cause");
        }
    }

    fn collect_forcefield_hints(&mut self, err: &Error) {
        use smiles2pdb::forcefield::Error as ForceFieldError;

        let Some(ff_err) = find::<ForceFieldError>(err) else {
            return;
        };

        self.mark_typed();

        match ff_err {
            ForceFieldError::ParameterParse(_) => {
                self.add("Force field parameter file has invalid TOML syntax");
                self.add("Check for missing quotes, brackets, or invalid values");
                self.add("Atom type keys containing '+' must be quoted, e.g. [atoms.\"S_3+2\"]");
            }

            ForceFieldError::MissingParameter { atom_type } => {
                self.add(format!("No parameters found for atom type '{}'", atom_type));
                self.add("Add the missing entry to your --params file");
            }

            ForceFieldError::UnsupportedElement { element, .. } => {
                self.add(format!("UFF typing does not cover {}", element));
            }

            ForceFieldError::UnknownConformer(_) | ForceFieldError::CoordinateMismatch { .. } => {
                self.add("This indicates a bug. Please report it if reproducible");
            }
        }
    }

    fn collect_io_hints(&mut self, err: &Error) {
        use smiles2pdb::io::Error as IoError;

        if let Some(io_err) = find::<IoError>(err) {
            self.mark_typed();
            match io_err {
                IoError::Io { source } => self.collect_std_io_hints(source),
                IoError::UnknownConformer(_) | IoError::CoordinateMismatch { .. } => {
                    self.add("This indicates a bug. Please report it if reproducible");
                }
            }
        } else if let Some(source) = find::<std::io::Error>(err) {
            self.mark_typed();
            self.collect_std_io_hints(source);
        }
    }

    fn collect_std_io_hints(&mut self, source: &std::io::Error) {
        use std::io::ErrorKind;

        match source.kind() {
            ErrorKind::NotFound => {
                self.add("File or directory not found");
                self.add("Check that the parent directory of the output file exists");
            }

            ErrorKind::PermissionDenied => {
                self.add("Permission denied accessing the file");
                self.add("Check file permissions with `ls -la`");
            }

            ErrorKind::IsADirectory => {
                self.add("The output path points to a directory");
                self.add("Give a file name such as out.pdb");
            }

            ErrorKind::WriteZero | ErrorKind::StorageFull => {
                self.add("Failed to write data (disk full?)");
                self.add("Check available disk space");
            }

            _ => {
                self.add("I/O operation failed");
                self.add("Check file path, permissions, and disk space");
            }
        }
    }

    fn collect_fallback_hints(&mut self, err: &Error) {
        let msg = error_chain_text(err);

        if msg.contains("no such file") || msg.contains("not found") {
            self.add("Check that the file path is correct");
            return;
        }

        if msg.contains("permission denied") {
            self.add("Check file permissions with `ls -la`");
        }
    }
}

fn find<'a, T>(err: &'a Error) -> Option<&'a T>
where
    T: std::error::Error + Send + Sync + 'static,
{
    err.chain().find_map(|cause| cause.downcast_ref::<T>())
}

fn error_chain_text(err: &Error) -> String {
    err.chain()
        .map(|cause| cause.to_string())
        .collect::<Vec<_>>()
        .join("\n")
        .to_lowercase()
}
