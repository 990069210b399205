use crate::actions::{call_expression, extract_domain, BrowserActions, WaitOutcome};
use crate::error::{BrowserError, Result};
use crate::fingerprint::FingerprintConfig;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromiumConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures_util::stream::StreamExt;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use subhunt_core::BrowserConfig;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Interval between element lookups while waiting for a selector.
const SELECTOR_POLL_MS: u64 = 250;

/// Minimum spacing between navigations to the same host
#[derive(Debug)]
struct RateLimiter {
    last_access: HashMap<String, Instant>,
    min_delay: Duration,
}

impl RateLimiter {
    fn new(min_delay_ms: u64) -> Self {
        Self {
            last_access: HashMap::new(),
            min_delay: Duration::from_millis(min_delay_ms),
        }
    }

    /// Sleep until `domain` may be visited again, then record the visit.
    ///
    /// Returns how long the caller was held back.
    async fn wait_turn(&mut self, domain: &str) -> Duration {
        let mut waited = Duration::ZERO;
        if let Some(last) = self.last_access.get(domain) {
            let elapsed = last.elapsed();
            if elapsed < self.min_delay {
                waited = self.min_delay - elapsed;
                tokio::time::sleep(waited).await;
            }
        }
        self.last_access.insert(domain.to_string(), Instant::now());
        waited
    }
}

/// Chromium-backed browser with a single page reused for every action
pub struct BrowserEngine {
    browser: Browser,
    page: Page,
    fingerprint: FingerprintConfig,
    rate_limiter: Mutex<RateLimiter>,
    handler_task: JoinHandle<()>,
}

impl BrowserEngine {
    /// Launch Chromium according to `config` and open a blank page
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let fingerprint = FingerprintConfig::for_config(config);

        let mut builder = ChromiumConfig::builder()
            .no_sandbox()
            .arg("--disable-setuid-sandbox")
            .window_size(fingerprint.viewport_width, fingerprint.viewport_height)
            .viewport(Option::<Viewport>::None);
        if !config.headless {
            builder = builder.with_head();
        }
        let chromium_config = builder.build().map_err(BrowserError::ChromiumError)?;

        let (browser, mut handler) = Browser::launch(chromium_config)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        // Spawn browser handler
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        page.set_user_agent(SetUserAgentOverrideParams::new(
            fingerprint.user_agent.clone(),
        ))
        .await
        .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        tracing::info!(
            headless = config.headless,
            width = fingerprint.viewport_width,
            height = fingerprint.viewport_height,
            "Browser launched"
        );

        Ok(Self {
            browser,
            page,
            fingerprint,
            rate_limiter: Mutex::new(RateLimiter::new(config.min_navigation_interval_ms)),
            handler_task,
        })
    }

    /// Fingerprint the page was opened with
    pub fn fingerprint(&self) -> &FingerprintConfig {
        &self.fingerprint
    }

    /// Close the browser process and stop the event handler
    pub async fn shutdown(mut self) -> Result<()> {
        let closed = self
            .browser
            .close()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()));
        if closed.is_ok() {
            let _ = self.browser.wait().await;
        }
        self.handler_task.abort();
        closed.map(|_| ())
    }
}

/// `None` when the timeout reaches past what `Instant` can represent.
fn deadline_after(timeout_ms: u64) -> Option<Instant> {
    Instant::now().checked_add(Duration::from_millis(timeout_ms))
}

fn remaining_until(deadline: Option<Instant>) -> Duration {
    deadline.map_or(Duration::MAX, |d| d.saturating_duration_since(Instant::now()))
}

fn cdp_error(err: CdpError) -> BrowserError {
    match err {
        CdpError::JavascriptException(details) => BrowserError::ScriptError(details.text.clone()),
        other => BrowserError::ChromiumError(other.to_string()),
    }
}

#[async_trait::async_trait]
impl BrowserActions for BrowserEngine {
    async fn navigate(&self, url: &str, timeout_ms: u64) -> Result<()> {
        let host = extract_domain(url)?;
        let waited = self.rate_limiter.lock().await.wait_turn(&host).await;
        if !waited.is_zero() {
            tracing::debug!("Paced navigation to {} by {:?}", host, waited);
        }

        match tokio::time::timeout(Duration::from_millis(timeout_ms), self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(BrowserError::NavigationError(format!("{url}: {e}"))),
            Err(_) => Err(BrowserError::Timeout(format!(
                "loading {url} took longer than {timeout_ms} ms"
            ))),
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<WaitOutcome> {
        let deadline = deadline_after(timeout_ms);
        let poll = Duration::from_millis(SELECTOR_POLL_MS);

        loop {
            let remaining = remaining_until(deadline);
            if remaining.is_zero() {
                return Ok(WaitOutcome::TimedOut);
            }

            // A lookup can itself stall while the page is busy
            if let Ok(Ok(_)) =
                tokio::time::timeout(remaining, self.page.find_element(selector)).await
            {
                return Ok(WaitOutcome::Ready);
            }

            tokio::time::sleep(poll.min(remaining_until(deadline))).await;
        }
    }

    async fn fill_field(&self, selector: &str, value: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?;

        element.click().await.map_err(cdp_error)?;
        element
            .call_js_fn(
                "function() { this.value = ''; this.dispatchEvent(new Event('input', { bubbles: true })); }",
                false,
            )
            .await
            .map_err(cdp_error)?;

        if !value.is_empty() {
            element.type_str(value).await.map_err(cdp_error)?;
        }
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?;
        element.click().await.map_err(cdp_error)?;
        Ok(())
    }

    async fn evaluate(&self, script: &str, args: &[Value]) -> Result<Value> {
        let params = EvaluateParams::builder()
            .expression(call_expression(script, args))
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(BrowserError::ScriptError)?;

        let result = self
            .page
            .evaluate_expression(params)
            .await
            .map_err(cdp_error)?;

        Ok(result.value().cloned().unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_after_huge_timeout() {
        let deadline = deadline_after(u64::MAX);
        assert!(remaining_until(deadline) > Duration::from_secs(86_400));

        let deadline = deadline_after(0);
        assert_eq!(remaining_until(deadline), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_rate_limiter_first_visit_is_free() {
        let mut limiter = RateLimiter::new(100);
        assert_eq!(limiter.wait_turn("example.com").await, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_rate_limiter_paces_repeat_visits() {
        let mut limiter = RateLimiter::new(100);
        limiter.wait_turn("example.com").await;

        let started = Instant::now();
        let waited = limiter.wait_turn("example.com").await;
        assert!(waited > Duration::ZERO);
        assert!(started.elapsed() >= waited);

        // After the interval, no wait
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(limiter.wait_turn("example.com").await, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_rate_limiter_different_domains() {
        let mut limiter = RateLimiter::new(100);

        // Different domains should not interfere
        assert_eq!(limiter.wait_turn("example.com").await, Duration::ZERO);
        assert_eq!(limiter.wait_turn("other.com").await, Duration::ZERO);
    }
}
