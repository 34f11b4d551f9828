// Process discovery, matching and reaping

mod matcher;
mod reaper;
mod source;

pub use matcher::{MatchCriteria, Matcher};
pub use reaper::{Reaper, ReapOutcome, SigtermTerminator, Terminator};
pub use source::{ProcessSource, PsSource};

/// Snapshot of one operating-system process.
///
/// The pid is only unique at a point in time; it can be reused as soon as
/// the process exits, so records must not be cached across reap windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub owner: String,
    pub pid: i32,
    pub name: String,
    pub command: String,
}

impl std::fmt::Display for ProcessRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PID {} ({}): {}", self.pid, self.name, self.command)
    }
}
