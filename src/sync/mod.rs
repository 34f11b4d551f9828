// Settings synchronization over persistent connections

mod channel;
mod controller;
mod message;
mod registry;

pub use channel::{ChannelMode, SettingsChannel};
pub use controller::Controller;
pub use message::{decode, encode, Settings};
pub use registry::{ChannelId, ConnectionRegistry};
