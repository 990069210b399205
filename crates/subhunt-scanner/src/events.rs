//! Structured progress events.
//!
//! The orchestrator never prints. It reports what happened to a
//! [`ScanObserver`], and presentation lives with whoever implements it.

use crate::extraction::Strategy;
use crate::orchestrator::RunSummary;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use subhunt_core::{Domain, Subdomain};

/// Where a single domain's scan currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPhase {
    /// Loading the service page
    Navigating,
    /// Input field found and filled
    FormReady,
    /// Scan trigger clicked
    Submitted,
    /// The service signalled that results are rendered
    ResultsReady,
    /// The results signal never came; extraction proceeds anyway
    ResultsTimeout,
    /// Extraction finished
    Extracted,
    /// Results appended to the output file
    Persisted,
    /// Navigation or interaction failed; the domain yields nothing
    Failed,
}

impl ScanPhase {
    /// `Persisted` and `Failed` end a domain's scan.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, ScanPhase::Persisted | ScanPhase::Failed)
    }
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScanPhase::Navigating => "navigating",
            ScanPhase::FormReady => "form ready",
            ScanPhase::Submitted => "submitted",
            ScanPhase::ResultsReady => "results ready",
            ScanPhase::ResultsTimeout => "results timeout",
            ScanPhase::Extracted => "extracted",
            ScanPhase::Persisted => "persisted",
            ScanPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Something the orchestrator did or observed.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// Output file truncated, about to scan `total` domains
    RunStarted {
        /// Number of domains in the run
        total: usize,
        /// Output file
        output: PathBuf,
    },
    /// A domain's scan begins
    DomainStarted {
        /// 1-based position in the list
        index: usize,
        /// Number of domains in the run
        total: usize,
        /// Domain being scanned
        domain: Domain,
    },
    /// The domain moved to a new phase
    Phase {
        /// Domain being scanned
        domain: Domain,
        /// Phase just entered
        phase: ScanPhase,
    },
    /// A navigation attempt failed and will be retried
    Retrying {
        /// Domain being scanned
        domain: Domain,
        /// 1-based attempt that failed
        attempt: u32,
        /// Configured attempts
        max_attempts: u32,
        /// Failure description
        reason: String,
    },
    /// Extraction found subdomains and they were saved
    Found {
        /// Domain being scanned
        domain: Domain,
        /// Strategy that produced them
        strategy: Strategy,
        /// The subdomains, sorted
        subdomains: Vec<Subdomain>,
        /// Output file they were appended to
        output: PathBuf,
    },
    /// Every strategy came back empty
    NothingFound {
        /// Domain being scanned
        domain: Domain,
    },
    /// The domain's scan failed and was abandoned
    DomainFailed {
        /// Domain being scanned
        domain: Domain,
        /// Failure kind label
        kind: &'static str,
        /// Failure description
        reason: String,
    },
    /// Output finalized
    RunFinished {
        /// Totals for the run
        summary: RunSummary,
    },
}

/// Receives scan events.
pub trait ScanObserver: Send + Sync {
    /// Called synchronously for each event, in order.
    fn on_event(&self, event: &ScanEvent);
}

/// Forwards events to `tracing`. Used when no presenter is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ScanObserver for TracingObserver {
    fn on_event(&self, event: &ScanEvent) {
        match event {
            ScanEvent::RunStarted { total, output } => {
                tracing::info!("Scanning {} domains into {}", total, output.display());
            }
            ScanEvent::DomainStarted {
                index,
                total,
                domain,
            } => tracing::info!("[{}/{}] Processing: {}", index, total, domain),
            ScanEvent::Phase { domain, phase } => {
                tracing::debug!(%domain, %phase, "phase changed");
            }
            ScanEvent::Retrying {
                domain,
                attempt,
                max_attempts,
                reason,
            } => tracing::warn!(
                "Attempt {}/{} for {} failed: {}",
                attempt,
                max_attempts,
                domain,
                reason
            ),
            ScanEvent::Found {
                domain,
                strategy,
                subdomains,
                ..
            } => tracing::info!(
                "Found {} subdomains for {} via {}",
                subdomains.len(),
                domain,
                strategy
            ),
            ScanEvent::NothingFound { domain } => {
                tracing::info!("No subdomains found for {}", domain);
            }
            ScanEvent::DomainFailed {
                domain,
                kind,
                reason,
            } => tracing::error!("Error scanning {} ({}): {}", domain, kind, reason),
            ScanEvent::RunFinished { summary } => tracing::info!(
                "Scan complete: {} domains, {} unique subdomains",
                summary.domains_processed,
                summary.unique_subdomains
            ),
        }
    }
}
