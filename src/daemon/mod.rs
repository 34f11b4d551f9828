// Daemon module - startup takeover and the serving loop

mod service;

pub use service::Service;

use crate::config::Config;
use anyhow::Result;

/// Run the procwarden daemon with the given configuration
pub async fn run(config: Config) -> Result<()> {
    Service::new(config).run().await
}
