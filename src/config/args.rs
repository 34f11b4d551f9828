// Command-line argument parsing

use clap::Parser;

/// procwarden - process takeover and settings synchronization daemon
///
/// Reaps stale sibling processes matching configured command-line patterns,
/// then serves controller settings to any number of WebSocket clients.
#[derive(Parser, Debug)]
#[command(name = "procwarden")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Process takeover and settings synchronization daemon", long_about = None)]
pub struct Args {
    /// Address to listen on for settings connections (default: 127.0.0.1:8890)
    #[arg(short = 'l', long = "listen", value_name = "ADDR:PORT")]
    pub listen: Option<String>,

    /// Initial settings entry KEY=VALUE (can be used multiple times)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Serve echo-only channels; clients cannot change settings
    #[arg(long = "read-only")]
    pub read_only: bool,

    /// Before serving, terminate processes whose command line matches this
    /// regex (can be used multiple times; all patterns must match)
    #[arg(short = 't', long = "takeover", value_name = "REGEX")]
    pub takeover: Vec<String>,

    /// Seconds to wait for taken-over processes to exit (default: 5)
    #[arg(long = "reap-timeout", value_name = "SECONDS")]
    pub reap_timeout: Option<u64>,

    /// Seconds between reap confirmation checks (default: 1)
    #[arg(long = "poll-interval", value_name = "SECONDS")]
    pub poll_interval: Option<u64>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,
}

impl Args {
    /// Parse arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
