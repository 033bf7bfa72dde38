//! Shared error plumbing used across all configurator crates.

pub mod error;

pub use error::FromMessage;
