//! Subhunt Core - Foundation crate for the subhunt subdomain discovery tool.
//!
//! This crate provides shared types, error handling and configuration management
//! that the browser, scanner and CLI crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes (`Domain`, `Subdomain`)
//!
//! # Example
//!
//! ```rust
//! use subhunt_core::{AppConfig, Domain};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! config.validate()?;
//!
//! let domain = Domain::new("  Example.COM ")?;
//! assert_eq!(domain.as_str(), "Example.COM");
//! assert_eq!(domain.key(), "example.com");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, BrowserConfig, OutputConfig, ScanningConfig, ServiceConfig};
pub use error::{ConfigError, ConfigResult, Result, SubhuntError};
pub use types::{Domain, Subdomain};
