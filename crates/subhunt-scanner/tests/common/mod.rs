#![allow(dead_code)]

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use subhunt_browser::{BrowserActions, BrowserError, WaitOutcome};
use subhunt_core::AppConfig;
use subhunt_scanner::extraction::{DOCUMENT_HTML_SCRIPT, VISIBLE_TEXT_SCRIPT};
use subhunt_scanner::{ScanEvent, ScanObserver, ScanPhase, ScanSettings};
use tokio::time::Instant;

/// What the service renders for one submitted domain.
#[derive(Debug, Clone, Default)]
pub struct Fixture {
    pub html: String,
    pub text: String,
    pub results_ready: bool,
}

impl Fixture {
    pub fn table(rows: &[&str]) -> Self {
        let rows: String = rows
            .iter()
            .map(|row| format!("<tr><td>{row}</td><td>203.0.113.7</td></tr>"))
            .collect();
        Self {
            html: format!(
                "<html><body><table><thead><tr><th>Subdomain</th><th>IP</th></tr></thead>\
                 <tbody>{rows}</tbody></table></body></html>"
            ),
            text: String::new(),
            results_ready: true,
        }
    }

    pub fn script(literals: &[&str]) -> Self {
        let quoted: Vec<String> = literals.iter().map(|l| format!("\"{l}\"")).collect();
        Self {
            html: format!(
                "<html><body><table><tbody></tbody></table>\
                 <script>var results = [{}];</script></body></html>",
                quoted.join(", ")
            ),
            text: String::new(),
            results_ready: true,
        }
    }

    pub fn text(text: &str) -> Self {
        Self {
            html: "<html><body><div id=\"out\"></div></body></html>".to_string(),
            text: text.to_string(),
            results_ready: true,
        }
    }

    pub fn timed_out(mut self) -> Self {
        self.results_ready = false;
        self
    }
}

/// In-memory stand-in for the service page.
///
/// Serves the fixture of whichever domain was last typed into the input.
pub struct MockPage {
    settings: ScanSettings,
    fixtures: HashMap<String, Fixture>,
    form_html: String,
    form_present: bool,
    failing_navigations: Mutex<u32>,
    current: Mutex<Option<String>>,
    calls: Mutex<Vec<String>>,
    results_waited_at: Mutex<Option<Instant>>,
    evaluated_at: Mutex<Vec<Instant>>,
}

impl MockPage {
    pub fn new(settings: &ScanSettings) -> Self {
        Self {
            settings: settings.clone(),
            fixtures: HashMap::new(),
            form_html: "<html><body><input id=\"domain9\"></body></html>".to_string(),
            form_present: true,
            failing_navigations: Mutex::new(0),
            current: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            results_waited_at: Mutex::new(None),
            evaluated_at: Mutex::new(Vec::new()),
        }
    }

    pub fn with_fixture(mut self, domain: &str, fixture: Fixture) -> Self {
        self.fixtures.insert(domain.to_string(), fixture);
        self
    }

    /// Make the next `count` navigations fail.
    pub fn failing_navigations(self, count: u32) -> Self {
        *self.failing_navigations.lock().unwrap() = count;
        self
    }

    /// The input field never appears; `html` is what the page shows instead.
    pub fn without_form(mut self, html: &str) -> Self {
        self.form_present = false;
        self.form_html = html.to_string();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// When the results wait returned.
    pub fn results_waited_at(&self) -> Option<Instant> {
        *self.results_waited_at.lock().unwrap()
    }

    /// When each in-page evaluation ran, in order.
    pub fn evaluated_at(&self) -> Vec<Instant> {
        self.evaluated_at.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn fixture(&self) -> Option<Fixture> {
        let current = self.current.lock().unwrap();
        current
            .as_ref()
            .and_then(|domain| self.fixtures.get(domain))
            .cloned()
    }
}

#[async_trait::async_trait]
impl BrowserActions for MockPage {
    async fn navigate(&self, url: &str, _timeout_ms: u64) -> subhunt_browser::Result<()> {
        self.record(format!("navigate {url}"));
        *self.current.lock().unwrap() = None;

        let mut failing = self.failing_navigations.lock().unwrap();
        if *failing > 0 {
            *failing -= 1;
            return Err(BrowserError::Timeout(format!("loading {url}")));
        }
        Ok(())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        _timeout_ms: u64,
    ) -> subhunt_browser::Result<WaitOutcome> {
        self.record(format!("wait {selector}"));
        let ready = if selector == self.settings.input_selector {
            self.form_present
        } else if selector == self.settings.results_selector {
            *self.results_waited_at.lock().unwrap() = Some(Instant::now());
            self.fixture().is_some_and(|f| f.results_ready)
        } else {
            false
        };
        Ok(if ready {
            WaitOutcome::Ready
        } else {
            WaitOutcome::TimedOut
        })
    }

    async fn fill_field(&self, selector: &str, value: &str) -> subhunt_browser::Result<()> {
        self.record(format!("fill {selector} {value:?}"));
        if !value.is_empty() {
            *self.current.lock().unwrap() = Some(value.to_string());
        }
        Ok(())
    }

    async fn click(&self, selector: &str) -> subhunt_browser::Result<()> {
        self.record(format!("click {selector}"));
        Ok(())
    }

    async fn evaluate(&self, script: &str, _args: &[Value]) -> subhunt_browser::Result<Value> {
        self.evaluated_at.lock().unwrap().push(Instant::now());
        let fixture = self.fixture();
        let value = if script == DOCUMENT_HTML_SCRIPT {
            match fixture {
                Some(f) => Value::String(f.html),
                None => Value::String(self.form_html.clone()),
            }
        } else if script == VISIBLE_TEXT_SCRIPT {
            fixture.map_or(Value::Null, |f| Value::String(f.text))
        } else {
            Value::Null
        };
        Ok(value)
    }
}

/// Collects every event for later assertions.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ScanEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<ScanEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn phases(&self) -> Vec<ScanPhase> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ScanEvent::Phase { phase, .. } => Some(phase),
                _ => None,
            })
            .collect()
    }
}

impl ScanObserver for RecordingObserver {
    fn on_event(&self, event: &ScanEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Default settings with no waiting between steps.
pub fn fast_settings() -> ScanSettings {
    let mut settings = ScanSettings::from(&AppConfig::default());
    settings.settle_delay = Duration::ZERO;
    settings.retry_delay = Duration::ZERO;
    settings
}
