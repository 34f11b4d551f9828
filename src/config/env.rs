// Environment variable configuration support

use super::Config;
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Apply environment variable overrides to configuration
pub fn apply_env_overrides(mut config: Config) -> Result<Config> {
    // Settings server
    if let Ok(val) = env::var("PROCWARDEN_LISTEN") {
        config.listen = val
            .parse()
            .context(format!("Invalid PROCWARDEN_LISTEN: {val}"))?;
    }
    if let Ok(val) = env::var("PROCWARDEN_READ_ONLY") {
        config.read_only = parse_bool(&val)?;
    }

    // Takeover timing
    if let Ok(val) = env::var("PROCWARDEN_REAP_TIMEOUT") {
        config.reap_timeout = Duration::from_secs(val.parse()?);
    }
    if let Ok(val) = env::var("PROCWARDEN_POLL_INTERVAL") {
        config.poll_interval = Duration::from_secs(val.parse()?);
    }

    // Behavior flags
    if let Ok(val) = env::var("PROCWARDEN_DEBUG") {
        config.debug = parse_bool(&val)?;
    }

    Ok(config)
}

/// Parse boolean value from string
/// Accepts: true/false, 1/0, yes/no, on/off (case-insensitive)
fn parse_bool(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("Invalid boolean value: {}", s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true").unwrap(), true);
        assert_eq!(parse_bool("TRUE").unwrap(), true);
        assert_eq!(parse_bool("1").unwrap(), true);
        assert_eq!(parse_bool("yes").unwrap(), true);
        assert_eq!(parse_bool("on").unwrap(), true);

        assert_eq!(parse_bool("false").unwrap(), false);
        assert_eq!(parse_bool("FALSE").unwrap(), false);
        assert_eq!(parse_bool("0").unwrap(), false);
        assert_eq!(parse_bool("no").unwrap(), false);
        assert_eq!(parse_bool("off").unwrap(), false);

        assert!(parse_bool("invalid").is_err());
    }
}
