// Main daemon service implementation

use crate::config::Config;
use crate::procs::{Matcher, PsSource, Reaper, SigtermTerminator};
use crate::server;
use crate::sync::{ChannelMode, Controller};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Daemon service: reap configured siblings, then serve settings
pub struct Service {
    config: Config,
}

impl Service {
    /// Create a new daemon service
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Main run loop
    pub async fn run(&self) -> Result<()> {
        self.print_startup_info();

        self.takeover().await?;

        let listener = TcpListener::bind(self.config.listen)
            .await
            .context(format!("Failed to bind {}", self.config.listen))?;
        log::info!("Listening for settings connections on {}", self.config.listen);

        let controller = Arc::new(Controller::new(self.config.initial.clone()));
        let mode = if self.config.read_only {
            ChannelMode::Echo
        } else {
            ChannelMode::Set
        };

        tokio::select! {
            result = server::serve(listener, controller, mode) => result,
            _ = tokio::signal::ctrl_c() => {
                log::info!("Received shutdown signal");
                log::info!("procwarden daemon shutting down gracefully");
                Ok(())
            }
        }
    }

    /// Reap stale sibling processes before binding.
    ///
    /// Failure to clear them is logged, not fatal: the subsequent bind
    /// will fail visibly if the port is actually still held.
    async fn takeover(&self) -> Result<()> {
        let Some(criteria) = self.config.takeover_criteria()? else {
            return Ok(());
        };

        log::info!(
            "Taking over: reaping processes matching {} pattern(s)",
            criteria.len()
        );

        let reaper = Reaper::new(
            Matcher::new(PsSource),
            SigtermTerminator,
            self.config.poll_interval,
        );

        let outcome = reaper
            .reap(&criteria, self.config.reap_timeout)
            .await
            .context("Takeover reap failed")?;

        if outcome.cleared {
            log::info!(
                "Takeover complete ({} process(es) signaled)",
                outcome.signaled.len()
            );
        } else {
            log::warn!(
                "Takeover incomplete: matching processes remain after {:.1}s",
                self.config.reap_timeout.as_secs_f64()
            );
        }

        Ok(())
    }

    /// Print startup information
    fn print_startup_info(&self) {
        log::info!("=== procwarden v{} starting ===", env!("CARGO_PKG_VERSION"));
        log::info!("Listen address: {}", self.config.listen);
        log::info!(
            "Channel mode: {}",
            if self.config.read_only {
                "echo (read-only)"
            } else {
                "set"
            }
        );

        if self.config.initial.is_empty() {
            log::info!("Initial settings: (empty)");
        } else {
            log::info!("Initial settings: {} key(s)", self.config.initial.len());
        }

        if self.config.takeover.is_empty() {
            log::info!("No takeover patterns configured");
        } else {
            log::info!(
                "Takeover: {} pattern(s), timeout {}s, poll every {}s",
                self.config.takeover.len(),
                self.config.reap_timeout.as_secs(),
                self.config.poll_interval.as_secs()
            );
        }

        log::info!("==========================================");
    }
}
