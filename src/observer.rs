//! Telemetry collaborator
//!
//! The core reports successful operations here and nothing else. Whatever an
//! observer does with them, business results stay the same.

use std::fmt;

/// Core operations that get counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Submit,
    List,
    Stats,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::List => "list",
            Self::Stats => "stats",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait SurveyObserver: Send + Sync {
    /// Called once per successful operation
    fn operation_succeeded(&self, op: Operation);
}

/// Observer used when no telemetry backend is available
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SurveyObserver for NoopObserver {
    fn operation_succeeded(&self, _op: Operation) {}
}
