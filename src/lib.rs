//! SES Forwarder: relays mail received by SES to mapped destinations.

pub mod config;
pub mod error;
pub mod event;
pub mod forwarder;
pub mod pipeline;
pub mod services;

pub use config::ForwarderConfig;
pub use forwarder::{Forwarder, Overrides};
pub use pipeline::Outcome;
