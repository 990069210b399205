//! Browser automation for JavaScript-heavy reconnaissance sites.
//!
//! [`BrowserActions`] is the narrow capability the scanner drives; it is
//! implemented here by [`BrowserEngine`] on top of a Chromium session with
//! a fixed or randomized fingerprint and per-host navigation pacing.

pub mod actions;
pub mod engine;
pub mod error;
pub mod fingerprint;

pub use actions::{BrowserActions, WaitOutcome};
pub use engine::BrowserEngine;
pub use error::{BrowserError, Result};
pub use fingerprint::FingerprintConfig;
