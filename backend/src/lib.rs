//! Core library for the lending platform admin console.
//!
//! - `domain`: entities, entity managers, search and dashboard metrics.
//! - `outbound`: record store adapters.
//! - `config`: settings loaded from environment and configuration files.

pub mod config;
pub mod domain;
pub mod outbound;

#[cfg(test)]
mod test_support;

pub use config::{AdminSettings, SettingsError};
pub use domain::{Error, ErrorCode};
