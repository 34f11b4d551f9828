// Configuration module

mod args;
mod env;

pub use args::Args;
use crate::procs::MatchCriteria;
use crate::sync::Settings;
use anyhow::{bail, Context, Result};
use std::net::SocketAddr;
use std::time::Duration;

/// Default listen address for the settings server
const DEFAULT_LISTEN: &str = "127.0.0.1:8890";

/// Default deadline for startup takeover reaps
const DEFAULT_REAP_TIMEOUT: Duration = Duration::from_secs(5);

/// Default cadence of reap confirmation checks
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Parse one KEY=VALUE settings entry
fn parse_setting(entry: &str) -> Result<(String, String)> {
    match entry.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => bail!("Invalid settings entry (expected KEY=VALUE): {entry}"),
    }
}

/// Main configuration struct for procwarden
#[derive(Debug, Clone)]
pub struct Config {
    // Settings server
    pub listen: SocketAddr,     // Address for WebSocket connections
    pub read_only: bool,        // Serve echo-only channels
    pub initial: Settings,      // Initial controller settings

    // Startup takeover
    pub takeover: Vec<String>,  // Patterns to reap before serving
    pub reap_timeout: Duration, // Deadline for takeover confirmation
    pub poll_interval: Duration, // Cadence of confirmation checks

    // Behavior flags
    pub debug: bool, // Enable debug logging
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Result<Self> {
        let mut config = Self::default();

        if let Some(listen) = args.listen {
            config.listen = listen
                .parse()
                .context(format!("Invalid listen address: {listen}"))?;
        }

        for entry in &args.set {
            let (key, value) = parse_setting(entry)?;
            config.initial.insert(key, value);
        }

        config.read_only = args.read_only;
        config.takeover = args.takeover;

        if let Some(secs) = args.reap_timeout {
            config.reap_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = args.poll_interval {
            config.poll_interval = Duration::from_secs(secs);
        }

        config.debug = args.debug;

        // Apply environment variable overrides
        config = env::apply_env_overrides(config)?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Build the takeover criteria, if any patterns were configured
    pub fn takeover_criteria(&self) -> Result<Option<MatchCriteria>> {
        if self.takeover.is_empty() {
            return Ok(None);
        }
        Ok(Some(MatchCriteria::from_patterns(&self.takeover)?))
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        // Patterns must compile under the safety limits
        self.takeover_criteria()?;

        if self.poll_interval.is_zero() {
            bail!("poll interval must be at least one second");
        }

        if self.poll_interval > self.reap_timeout && !self.reap_timeout.is_zero() {
            log::warn!(
                "Poll interval ({}s) exceeds reap timeout ({}s); only one check will run",
                self.poll_interval.as_secs(),
                self.reap_timeout.as_secs()
            );
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8890))),
            read_only: false,
            initial: Settings::new(),
            takeover: Vec::new(),
            reap_timeout: DEFAULT_REAP_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            debug: false,
        }
    }
}
