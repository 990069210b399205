use crate::error::{BrowserError, Result};
use serde_json::Value;

/// Result of waiting for an element.
///
/// Both outcomes are normal; a timeout is not an error at this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The selector matched before the deadline
    Ready,
    /// The deadline passed without a match
    TimedOut,
}

impl WaitOutcome {
    /// Whether the element showed up.
    #[must_use]
    pub fn is_ready(self) -> bool {
        matches!(self, WaitOutcome::Ready)
    }
}

/// Browser actions for automation
#[async_trait::async_trait]
pub trait BrowserActions: Send + Sync {
    /// Navigate to a URL, giving up after `timeout_ms`
    async fn navigate(&self, url: &str, timeout_ms: u64) -> Result<()>;

    /// Wait for a selector to appear
    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<WaitOutcome>;

    /// Replace the value of a form field by selector
    async fn fill_field(&self, selector: &str, value: &str) -> Result<()>;

    /// Click an element by selector
    async fn click(&self, selector: &str) -> Result<()>;

    /// Run a JavaScript function source with positional arguments.
    ///
    /// The return value crosses the boundary as plain JSON; `undefined`
    /// becomes `Value::Null`.
    async fn evaluate(&self, script: &str, args: &[Value]) -> Result<Value>;
}

/// Helper to extract domain from URL
pub fn extract_domain(url: &str) -> Result<String> {
    let url = url::Url::parse(url)
        .map_err(|e| BrowserError::NavigationError(format!("Invalid URL: {}", e)))?;

    url.host_str()
        .ok_or_else(|| BrowserError::NavigationError("No host in URL".to_string()))
        .map(|s| s.to_string())
}

/// Build the expression that calls `script` with `args` spread in order.
pub fn call_expression(script: &str, args: &[Value]) -> String {
    let args = Value::Array(args.to_vec());
    format!("({})(...{})", script.trim(), args)
}
