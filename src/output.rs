use std::io::{self, Write};

use serde::Serialize;

use crate::app::{ProgressEvent, ProgressSink, RunSummary};
use crate::crosscheck::CrossCheckOutcome;
use crate::vocabulary::Vocabulary;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

impl OutputMode {
    pub fn sink(self) -> Box<dyn ProgressSink> {
        match self {
            OutputMode::Interactive => Box::new(LineProgress),
            OutputMode::NonInteractive => Box::new(JsonOutput),
        }
    }
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_summary(summary: &RunSummary) -> io::Result<()> {
        Self::print_json(summary)
    }

    pub fn print_vocabulary(vocabulary: &Vocabulary) -> io::Result<()> {
        Self::print_json(vocabulary)
    }

    pub fn print_cross_checks(outcomes: &[CrossCheckOutcome]) -> io::Result<()> {
        Self::print_json(&outcomes)
    }

    fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

/// Prints progress events to stderr, one per line.
pub struct LineProgress;

impl ProgressSink for LineProgress {
    fn event(&self, event: ProgressEvent) {
        let line = match event.elapsed {
            Some(elapsed) => format!("{} ({:.1}s)", event.message, elapsed.as_secs_f64()),
            None => event.message,
        };
        // Progress is advisory; a closed stderr must not stop the run.
        writeln!(io::stderr(), "{line}").ok();
    }
}
