//! Run report output.
//!
//! The report is the user-facing record of a run: planned renames, removals,
//! conflicts and the rename-limit notice. It is separate from `tracing`
//! diagnostics so that a dry run can be diffed against a real run line by line.

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use std::fs::File;
use std::io::{self, Write};

/// Destination for report lines.
pub trait ReportSink {
    /// Emit one line of the run report.
    fn emit(&mut self, line: &str) -> Result<()>;
}

/// Prints report lines to stdout and optionally mirrors them to a file.
///
/// The file is created (truncating any previous report) on the first emitted
/// line and appended to through the same handle afterwards. A run that emits
/// nothing leaves an existing file untouched.
#[derive(Debug)]
pub struct ConsoleReport {
    output_file: Option<Utf8PathBuf>,
    file: Option<File>,
}

impl ConsoleReport {
    pub fn new(output_file: Option<Utf8PathBuf>) -> Self {
        Self {
            output_file,
            file: None,
        }
    }

    fn write_to_file(&mut self, line: &str) -> Result<()> {
        let Some(path) = &self.output_file else {
            return Ok(());
        };

        if self.file.is_none() {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            self.file = Some(file);
        }

        if let Some(file) = self.file.as_mut() {
            writeln!(file, "{}", line)
                .with_context(|| format!("Failed to write to output file: {}", path))?;
        }
        Ok(())
    }
}

impl ReportSink for ConsoleReport {
    fn emit(&mut self, line: &str) -> Result<()> {
        self.write_to_file(line)?;

        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", line).context("Failed to write to stdout")?;
        Ok(())
    }
}

/// Collects report lines in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryReport {
    lines: Vec<String>,
}

impl MemoryReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn contains(&self, line: &str) -> bool {
        self.lines.iter().any(|l| l == line)
    }
}

impl ReportSink for MemoryReport {
    fn emit(&mut self, line: &str) -> Result<()> {
        self.lines.push(line.to_string());
        Ok(())
    }
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn emit(&mut self, line: &str) -> Result<()> {
        (**self).emit(line)
    }
}
