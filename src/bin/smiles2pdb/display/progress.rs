use std::io::{self, Write};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

use super::Context;

pub struct StepSpinner {
    bar: Option<ProgressBar>,
    start: Instant,
    step: u8,
    total_steps: u8,
    step_start: Instant,
}

impl StepSpinner {
    pub fn new(total_steps: u8) -> Self {
        let now = Instant::now();
        Self {
            bar: None,
            start: now,
            step: 0,
            total_steps,
            step_start: now,
        }
    }

    pub fn step(&mut self, description: &str) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }

        self.step += 1;
        self.step_start = Instant::now();

        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.cyan} {msg}")
                .expect("invalid template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        bar.enable_steady_tick(Duration::from_millis(80));
        bar.set_message(format!(
            "[{}/{}] {}...",
            self.step, self.total_steps, description
        ));

        self.bar = Some(bar);
    }

    /// Clears the spinner so a line can be printed without tearing it.
    pub fn suspend<F: FnOnce()>(&self, f: F) {
        match &self.bar {
            Some(bar) => bar.suspend(f),
            None => f(),
        }
    }

    pub fn complete_step(&mut self, description: &str, substeps: &[&str]) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }

        let elapsed = self.step_start.elapsed();
        let mut stderr = io::stderr().lock();

        let _ = writeln!(
            stderr,
            "  \x1b[32m✓\x1b[0m {:<44} {:>5.1}s",
            description,
            elapsed.as_secs_f64()
        );

        for substep in substeps {
            let _ = writeln!(stderr, "      \x1b[2m·\x1b[0m {}", substep);
        }
    }

    pub fn finish(mut self, summary: &str) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }

        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr);
        let _ = writeln!(
            stderr,
            "  \x1b[2m╺━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━╸\x1b[0m"
        );
        let _ = writeln!(stderr);
        let _ = writeln!(
            stderr,
            "  \x1b[32m✓\x1b[0m {:<38} {:>13}",
            summary,
            format!("Total: {:.2}s", self.start.elapsed().as_secs_f64())
        );
        let _ = writeln!(stderr);
    }
}

/// Line-per-step output for logs and pipes.
pub struct PlainProgress {
    step: u8,
    total_steps: u8,
}

impl PlainProgress {
    pub fn new(total_steps: u8) -> Self {
        Self {
            step: 0,
            total_steps,
        }
    }

    pub fn step(&mut self, description: &str) {
        self.step += 1;
        let _ = writeln!(
            io::stderr().lock(),
            "[{}/{}] {}...",
            self.step,
            self.total_steps,
            description
        );
    }

    pub fn finish(self, summary: &str) {
        let _ = writeln!(io::stderr().lock(), "{}", summary);
    }
}

pub enum Progress {
    Interactive(StepSpinner),
    Plain(PlainProgress),
    Silent,
}

impl Progress {
    pub fn new(ctx: Context, total_steps: u8) -> Self {
        if ctx.quiet {
            Self::Silent
        } else if ctx.interactive {
            Self::Interactive(StepSpinner::new(total_steps))
        } else {
            Self::Plain(PlainProgress::new(total_steps))
        }
    }

    pub fn step(&mut self, description: &str) {
        match self {
            Self::Interactive(s) => s.step(description),
            Self::Plain(p) => p.step(description),
            Self::Silent => {}
        }
    }

    pub fn complete_step(&mut self, description: &str, substeps: &[&str]) {
        if let Self::Interactive(s) = self {
            s.complete_step(description, substeps);
        }
    }

    /// Runs `f` with the spinner, if any, out of the way.
    pub fn suspend<F: FnOnce()>(&self, f: F) {
        match self {
            Self::Interactive(s) => s.suspend(f),
            Self::Plain(_) | Self::Silent => f(),
        }
    }

    pub fn finish(self, summary: &str) {
        match self {
            Self::Interactive(s) => s.finish(summary),
            Self::Plain(p) => p.finish(summary),
            Self::Silent => {}
        }
    }
}
