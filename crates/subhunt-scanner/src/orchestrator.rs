//! Scan orchestrator for driving the reconnaissance service.
//!
//! This module provides the `ScanOrchestrator` which walks one browser page
//! through the service for each domain in turn, extracts what the page
//! rendered, and appends findings to the result store.
//!
//! Domains are scanned strictly one after another on the same page. Any
//! failure inside a single domain's scan is contained here: it is reported,
//! the domain yields nothing, and the loop moves on.

use crate::error::{Result, ScanError};
use crate::events::{ScanEvent, ScanObserver, ScanPhase, TracingObserver};
use crate::extraction::{Extraction, ExtractionEngine, Strategy, DOCUMENT_HTML_SCRIPT};
use crate::store::ResultStore;
use crate::validator::Validator;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use subhunt_browser::{BrowserActions, WaitOutcome};
use subhunt_core::{AppConfig, Domain, Subdomain};

/// Markers of an anti-bot interstitial in page HTML.
const CHALLENGE_MARKERS: &[&str] = &["captcha", "cf-challenge", "challenge-platform"];

/// Service URL, selectors and timing for one run.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Page holding the scan form
    pub service_url: String,
    /// Domain input field
    pub input_selector: String,
    /// Scan trigger
    pub submit_selector: String,
    /// Appears once results are rendered
    pub results_selector: String,
    /// Page load timeout
    pub navigation_timeout: Duration,
    /// Wait for the input field
    pub form_timeout: Duration,
    /// Wait for the results signal
    pub results_timeout: Duration,
    /// Pause after the results wait, whatever its outcome
    pub settle_delay: Duration,
    /// Navigation attempts before the domain fails
    pub navigation_attempts: u32,
    /// Base backoff between navigation attempts
    pub retry_delay: Duration,
}

impl From<&AppConfig> for ScanSettings {
    fn from(config: &AppConfig) -> Self {
        let service = &config.service;
        let scanning = &config.scanning;
        Self {
            service_url: service.url.clone(),
            input_selector: service.input_selector.clone(),
            submit_selector: service.submit_selector.clone(),
            results_selector: service.results_selector.clone(),
            navigation_timeout: Duration::from_secs(scanning.navigation_timeout_secs),
            form_timeout: Duration::from_secs(scanning.form_timeout_secs),
            results_timeout: Duration::from_secs(scanning.results_timeout_secs),
            settle_delay: Duration::from_millis(scanning.settle_delay_ms),
            navigation_attempts: scanning.navigation_attempts.max(1),
            retry_delay: Duration::from_millis(scanning.retry_delay_ms),
        }
    }
}

/// Outcome of scanning a single domain.
#[derive(Debug, Clone)]
pub struct DomainScanResult {
    /// Domain that was scanned
    pub domain: Domain,
    /// Terminal phase: `Persisted` or `Failed`
    pub phase: ScanPhase,
    /// Subdomains found and persisted
    pub subdomains: BTreeSet<Subdomain>,
    /// Strategy that produced them
    pub strategy: Option<Strategy>,
    /// The results signal never appeared
    pub results_timed_out: bool,
    /// Error message if scan failed
    pub error: Option<String>,
}

impl DomainScanResult {
    fn failed(domain: Domain, error: String) -> Self {
        Self {
            domain,
            phase: ScanPhase::Failed,
            subdomains: BTreeSet::new(),
            strategy: None,
            results_timed_out: false,
            error: Some(error),
        }
    }
}

/// Totals for a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Domains attempted
    pub domains_processed: usize,
    /// Domains whose scan failed
    pub domains_failed: usize,
    /// Lines in the finalized output file
    pub unique_subdomains: usize,
    /// Output file
    pub output: PathBuf,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the output was finalized
    pub finished_at: DateTime<Utc>,
}

/// Drives the service page for each domain and records the results.
pub struct ScanOrchestrator {
    /// Page used for every domain
    page: Arc<dyn BrowserActions>,
    /// Output file
    store: ResultStore,
    /// Candidate extraction
    engine: ExtractionEngine,
    /// Service selectors and timing
    settings: ScanSettings,
    /// Event sink
    observer: Arc<dyn ScanObserver>,
    /// Every subdomain persisted so far in this run
    found: BTreeSet<Subdomain>,
}

impl ScanOrchestrator {
    /// Create a new scan orchestrator.
    #[must_use]
    pub fn new(page: Arc<dyn BrowserActions>, store: ResultStore, settings: ScanSettings) -> Self {
        Self {
            page,
            store,
            engine: ExtractionEngine::default(),
            settings,
            observer: Arc::new(TracingObserver),
            found: BTreeSet::new(),
        }
    }

    /// Send events to `observer` instead of the log.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ScanObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Filter candidates with a custom validator.
    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.engine = ExtractionEngine::new(validator);
        self
    }

    /// Subdomains persisted so far, across all domains.
    #[must_use]
    pub fn found(&self) -> &BTreeSet<Subdomain> {
        &self.found
    }

    /// Scan every domain in order, then finalize the output file.
    ///
    /// Per-domain failures never abort the loop; only finalizing the output
    /// can fail the run.
    pub async fn run(&mut self, domains: &[Domain]) -> Result<RunSummary> {
        let started_at = Utc::now();
        let total = domains.len();
        self.emit(ScanEvent::RunStarted {
            total,
            output: self.store.path().to_path_buf(),
        });

        let mut domains_failed = 0;
        for (idx, domain) in domains.iter().enumerate() {
            self.emit(ScanEvent::DomainStarted {
                index: idx + 1,
                total,
                domain: domain.clone(),
            });

            let result = self.scan_domain(domain).await;
            if result.phase == ScanPhase::Failed {
                domains_failed += 1;
            }
        }

        let unique = self.store.finalize().await?;
        let summary = RunSummary {
            domains_processed: total,
            domains_failed,
            unique_subdomains: unique.len(),
            output: self.store.path().to_path_buf(),
            started_at,
            finished_at: Utc::now(),
        };
        self.emit(ScanEvent::RunFinished {
            summary: summary.clone(),
        });

        Ok(summary)
    }

    /// Scan a single domain through to `Persisted` or `Failed`.
    pub async fn scan_domain(&mut self, domain: &Domain) -> DomainScanResult {
        let (extraction, results_timed_out) = match self.scan_and_extract(domain).await {
            Ok(outcome) => outcome,
            Err(e) => return self.fail(domain, &e),
        };

        if let Err(e) = self.store.append_and_persist(&extraction.subdomains).await {
            return self.fail(domain, &e);
        }
        self.found.extend(extraction.subdomains.iter().cloned());
        self.phase(domain, ScanPhase::Persisted);

        match extraction.strategy {
            Some(strategy) if !extraction.is_empty() => self.emit(ScanEvent::Found {
                domain: domain.clone(),
                strategy,
                subdomains: extraction.subdomains.iter().cloned().collect(),
                output: self.store.path().to_path_buf(),
            }),
            _ => self.emit(ScanEvent::NothingFound {
                domain: domain.clone(),
            }),
        }

        DomainScanResult {
            domain: domain.clone(),
            phase: ScanPhase::Persisted,
            subdomains: extraction.subdomains,
            strategy: extraction.strategy,
            results_timed_out,
            error: None,
        }
    }

    /// Everything up to and including extraction.
    ///
    /// Returns the extraction and whether the results wait timed out.
    async fn scan_and_extract(&self, domain: &Domain) -> Result<(Extraction, bool)> {
        let outcome = self.drive_to_results(domain).await?;
        let results_timed_out = !outcome.is_ready();

        tokio::time::sleep(self.settings.settle_delay).await;

        let base_key = domain.key();
        let mut extraction = self.engine.extract(self.page.as_ref(), &base_key).await?;
        if extraction.is_empty() {
            tracing::debug!("Table and script strategies empty for {}, scanning page text", domain);
            extraction = self
                .engine
                .extract_visible_text(self.page.as_ref(), &base_key)
                .await?;
        }
        self.phase(domain, ScanPhase::Extracted);

        Ok((extraction, results_timed_out))
    }

    /// Navigate, fill, submit, and wait for the results signal.
    async fn drive_to_results(&self, domain: &Domain) -> Result<WaitOutcome> {
        self.phase(domain, ScanPhase::Navigating);
        self.navigate_with_retry(domain).await?;

        let form = self
            .page
            .wait_for_selector(&self.settings.input_selector, millis(self.settings.form_timeout))
            .await?;
        if !form.is_ready() {
            let reason = if self.challenge_present().await {
                "challenge page is blocking the scan form; solve it in the browser window"
                    .to_string()
            } else {
                format!(
                    "input field {} did not appear within {:?}",
                    self.settings.input_selector, self.settings.form_timeout
                )
            };
            return Err(navigation_failure(domain, reason));
        }

        self.page
            .fill_field(&self.settings.input_selector, "")
            .await
            .map_err(|e| navigation_failure(domain, e.to_string()))?;
        self.page
            .fill_field(&self.settings.input_selector, domain.as_str())
            .await
            .map_err(|e| navigation_failure(domain, e.to_string()))?;
        self.phase(domain, ScanPhase::FormReady);

        self.page
            .click(&self.settings.submit_selector)
            .await
            .map_err(|e| navigation_failure(domain, e.to_string()))?;
        self.phase(domain, ScanPhase::Submitted);

        let outcome = self
            .page
            .wait_for_selector(
                &self.settings.results_selector,
                millis(self.settings.results_timeout),
            )
            .await?;
        match outcome {
            WaitOutcome::Ready => self.phase(domain, ScanPhase::ResultsReady),
            WaitOutcome::TimedOut => {
                tracing::warn!(
                    "Timeout waiting for results for {}, checking what rendered",
                    domain
                );
                self.phase(domain, ScanPhase::ResultsTimeout);
            }
        }

        Ok(outcome)
    }

    /// Load the service page, retrying with linear backoff.
    async fn navigate_with_retry(&self, domain: &Domain) -> Result<()> {
        let attempts = self.settings.navigation_attempts.max(1);
        let timeout_ms = millis(self.settings.navigation_timeout);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.page.navigate(&self.settings.service_url, timeout_ms).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    last_error = e.to_string();
                    if attempt < attempts {
                        self.emit(ScanEvent::Retrying {
                            domain: domain.clone(),
                            attempt,
                            max_attempts: attempts,
                            reason: last_error.clone(),
                        });
                        tokio::time::sleep(backoff(self.settings.retry_delay, attempt)).await;
                    }
                }
            }
        }

        Err(navigation_failure(domain, last_error))
    }

    /// Best-effort check for an anti-bot interstitial.
    async fn challenge_present(&self) -> bool {
        match self.page.evaluate(DOCUMENT_HTML_SCRIPT, &[]).await {
            Ok(value) => value.as_str().is_some_and(detect_challenge),
            Err(e) => {
                tracing::debug!("Could not inspect page for a challenge: {}", e);
                false
            }
        }
    }

    fn fail(&self, domain: &Domain, error: &ScanError) -> DomainScanResult {
        tracing::error!("Error scanning {}: {}", domain, error);
        self.phase(domain, ScanPhase::Failed);
        self.emit(ScanEvent::DomainFailed {
            domain: domain.clone(),
            kind: error.kind(),
            reason: error.to_string(),
        });
        DomainScanResult::failed(domain.clone(), error.to_string())
    }

    fn phase(&self, domain: &Domain, phase: ScanPhase) {
        self.emit(ScanEvent::Phase {
            domain: domain.clone(),
            phase,
        });
    }

    fn emit(&self, event: ScanEvent) {
        self.observer.on_event(&event);
    }
}

fn navigation_failure(domain: &Domain, reason: String) -> ScanError {
    ScanError::NavigationFailure {
        domain: domain.to_string(),
        reason,
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Linear backoff before retry number `attempt + 1`.
fn backoff(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(attempt)
}

/// Detect CAPTCHA or anti-bot challenge markup in page HTML.
fn detect_challenge(html: &str) -> bool {
    let html = html.to_lowercase();
    CHALLENGE_MARKERS.iter().any(|marker| html.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config() {
        let settings = ScanSettings::from(&AppConfig::default());
        assert_eq!(settings.service_url, "https://subdomainfinder.c99.nl/");
        assert_eq!(settings.navigation_timeout, Duration::from_secs(60));
        assert_eq!(settings.results_timeout, Duration::from_secs(120));
        assert_eq!(settings.settle_delay, Duration::from_millis(3000));
        assert_eq!(settings.navigation_attempts, 2);
    }

    #[test]
    fn test_settings_clamp_attempts() {
        let mut config = AppConfig::default();
        config.scanning.navigation_attempts = 0;
        assert_eq!(ScanSettings::from(&config).navigation_attempts, 1);
    }

    #[test]
    fn test_timeouts_are_generous() {
        let settings = ScanSettings::from(&AppConfig::default());
        // The remote scan is slower than page load, which is slower than the form
        assert!(settings.results_timeout > settings.navigation_timeout);
        assert!(settings.navigation_timeout > settings.form_timeout);
    }

    #[test]
    fn test_challenge_detection() {
        assert!(detect_challenge(r#"<div class="g-recaptcha"></div>"#));
        assert!(detect_challenge(r#"<div id="cf-challenge-running"></div>"#));
        assert!(detect_challenge("<iframe title=\"hCaptcha\"></iframe>"));
        assert!(!detect_challenge(r#"<div class="search-results"></div>"#));
    }

    #[test]
    fn test_millis() {
        assert_eq!(millis(Duration::from_secs(2)), 2000);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_backoff_is_linear_and_saturates() {
        let base = Duration::from_secs(2);
        assert_eq!(backoff(base, 1), Duration::from_secs(2));
        assert_eq!(backoff(base, 3), Duration::from_secs(6));
        assert_eq!(backoff(Duration::MAX, 2), Duration::MAX);
    }
}
