// procwarden - process takeover and settings synchronization library

pub mod config;
pub mod daemon;
pub mod error;
pub mod exec;
pub mod procs;
pub mod server;
pub mod sync;

// Re-export commonly used types
pub use config::Config;
pub use error::Error;
pub use procs::{MatchCriteria, Matcher, ProcessRecord, Reaper};
pub use sync::{Controller, Settings, SettingsChannel};
