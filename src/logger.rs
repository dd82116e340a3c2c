//! Stderr logger passed by value into the pipeline. Stdout stays reserved
//! for data, since it may be the configured sink.

use std::fmt::Display;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Silent,
    Verbose,
    Debug,
}

#[derive(Clone, Copy, Debug)]
pub struct Logger {
    level: Level,
}

impl Logger {
    /// Debug implies verbose.
    pub fn new(debug: bool, verbose: bool) -> Self {
        let level = if debug {
            Level::Debug
        } else if verbose {
            Level::Verbose
        } else {
            Level::Silent
        };
        Self { level }
    }

    pub fn verbose(&self, msg: impl Display) {
        if self.level >= Level::Verbose {
            eprintln!("{msg}");
        }
    }

    pub fn debug(&self, msg: impl Display) {
        if self.level >= Level::Debug {
            eprintln!("DEBUG: {msg}");
        }
    }

    /// Unconditional; used for retry notices, not for the final diagnostic.
    pub fn error(&self, msg: impl Display) {
        eprintln!("Error: {msg}");
    }
}
