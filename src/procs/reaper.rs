// Signal matching processes and confirm they are gone within a deadline

use super::{MatchCriteria, Matcher, ProcessRecord, ProcessSource};
use crate::error::Error;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::time::Duration;
use tokio::time::Instant;

/// Sends a termination signal to a single pid.
///
/// Seam for tests; production uses [`SigtermTerminator`].
pub trait Terminator: Send + Sync {
    fn terminate(&self, pid: i32) -> Result<(), Error>;
}

/// Production terminator delivering SIGTERM via the kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct SigtermTerminator;

impl Terminator for SigtermTerminator {
    fn terminate(&self, pid: i32) -> Result<(), Error> {
        match signal::kill(Pid::from_raw(pid), Signal::SIGTERM) {
            Ok(()) => Ok(()),
            // Absence of the target is not an error: it is the outcome
            // the caller wanted.
            Err(nix::errno::Errno::ESRCH) => Ok(()),
            Err(nix::errno::Errno::EPERM) => Err(Error::execution(
                format!("kill -TERM {pid}"),
                "permission denied",
            )),
            Err(e) => Err(Error::execution(
                format!("kill -TERM {pid}"),
                format!("signal error: {e}"),
            )),
        }
    }
}

/// Outcome of one reap invocation. Stateless across calls.
#[derive(Debug, Clone)]
pub struct ReapOutcome {
    /// Processes that were matched and signaled.
    pub signaled: Vec<ProcessRecord>,
    /// True iff no match remained at the time of the final check.
    pub cleared: bool,
}

/// Terminates matching sibling processes and confirms, within a bounded
/// time window, that none remain.
pub struct Reaper<S, T> {
    matcher: Matcher<S>,
    terminator: T,
    poll_interval: Duration,
}

impl<S: ProcessSource, T: Terminator> Reaper<S, T> {
    pub fn new(matcher: Matcher<S>, terminator: T, poll_interval: Duration) -> Self {
        Self {
            matcher,
            terminator,
            poll_interval,
        }
    }

    /// Signal every process matching `criteria`, then poll until either no
    /// match remains or `timeout` expires.
    ///
    /// An individual signal failure is logged and swallowed: the process
    /// may already be gone or unkillable, and the re-check reveals the
    /// true state. A zero timeout means one post-signal check with no
    /// retries. A process respawning under the same pattern during the
    /// wait window counts as still-matching; the contract is "no match at
    /// the final check", not permanent absence.
    pub async fn reap(
        &self,
        criteria: &MatchCriteria,
        timeout: Duration,
    ) -> Result<ReapOutcome, Error> {
        let matches = self.matcher.find_matching(criteria).await?;

        if matches.is_empty() {
            log::debug!("No matching processes to reap");
            return Ok(ReapOutcome {
                signaled: matches,
                cleared: true,
            });
        }

        for process in &matches {
            log::info!("Sending SIGTERM to {process}");
            if let Err(e) = self.terminator.terminate(process.pid) {
                log::warn!("Failed to signal pid {}: {e}", process.pid);
            }
        }

        let start = Instant::now();
        loop {
            let remaining = self.matcher.find_matching(criteria).await?;

            if remaining.is_empty() {
                log::info!("All {} matching process(es) are gone", matches.len());
                return Ok(ReapOutcome {
                    signaled: matches,
                    cleared: true,
                });
            }

            if start.elapsed() >= timeout {
                log::warn!(
                    "{} process(es) still match after {:.1}s",
                    remaining.len(),
                    timeout.as_secs_f64()
                );
                return Ok(ReapOutcome {
                    signaled: matches,
                    cleared: false,
                });
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
