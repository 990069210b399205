//! Subhunt Scanner - subdomain discovery through a reconnaissance web service.
//!
//! This crate drives a browser page through the service for each root domain,
//! pulls subdomain names out of whatever the page rendered, and persists them
//! incrementally to a line-delimited output file.
//!
//! # Features
//!
//! - Sequential per-domain scans on a single reused page
//! - Ordered extraction fallback: results table, script literals, visible text
//! - Candidate filtering on suffix, IPv4 shape and page-chrome noise tokens
//! - Append-per-domain checkpointing with a final sort and dedup pass
//! - Structured scan events for a separate presenter
//!
//! # Example
//!
//! ```rust,ignore
//! use subhunt_scanner::{load_domains, ResultStore, ScanOrchestrator, ScanSettings};
//! use std::sync::Arc;
//!
//! let domains = load_domains(&domain_file).await?;
//! let store = ResultStore::create("sublist.txt").await?;
//!
//! let mut orchestrator = ScanOrchestrator::new(
//!     Arc::new(browser_engine),
//!     store,
//!     ScanSettings::from(&config),
//! );
//!
//! let summary = orchestrator.run(&domains).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod error;
pub mod events;
pub mod extraction;
pub mod input;
pub mod orchestrator;
pub mod store;
pub mod validator;

// Re-export commonly used types
pub use error::{Result, ScanError};
pub use events::{ScanEvent, ScanObserver, ScanPhase, TracingObserver};
pub use extraction::{Extraction, ExtractionEngine, Strategy};
pub use input::load_domains;
pub use orchestrator::{DomainScanResult, RunSummary, ScanOrchestrator, ScanSettings};
pub use store::ResultStore;
pub use validator::{is_subdomain_of, Validator};
