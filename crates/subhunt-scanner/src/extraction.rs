//! Subdomain extraction from a rendered results page.
//!
//! The page is uncontrolled third-party markup, so extraction is an ordered
//! fallback:
//!
//! 1. [`Strategy::Table`] - first cell of each row in the first `<table>`.
//! 2. [`Strategy::ScriptContent`] - quoted domain literals inside `<script>` blocks.
//! 3. [`Strategy::VisibleText`] - whitespace tokens of the page's visible text.
//!
//! [`ExtractionEngine::extract`] covers the first two against one snapshot of
//! the document; the third is a separate call the orchestrator makes only when
//! the others come back empty. Every strategy returns a deduplicated set and
//! runs its candidates through the [`Validator`].

use crate::error::Result;
use crate::validator::{normalize, Validator};
use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;
use subhunt_browser::BrowserActions;
use subhunt_core::Subdomain;

/// Serializes the rendered document.
pub const DOCUMENT_HTML_SCRIPT: &str =
    "() => document.documentElement ? document.documentElement.outerHTML : ''";

/// Reads the text a user would see on the page.
pub const VISIBLE_TEXT_SCRIPT: &str = "() => document.body ? document.body.innerText : ''";

/// Which extraction strategy produced a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// First column of the results table
    Table,
    /// Domain literals embedded in inline scripts
    ScriptContent,
    /// Tokens of the visible page text
    VisibleText,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Table => "results table",
            Strategy::ScriptContent => "script content",
            Strategy::VisibleText => "visible text",
        };
        f.write_str(name)
    }
}

/// Subdomains found on a page and the strategy that found them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Validated, deduplicated subdomains
    pub subdomains: BTreeSet<Subdomain>,
    /// `None` when every strategy came back empty
    pub strategy: Option<Strategy>,
}

impl Extraction {
    fn from_strategy(strategy: Strategy, subdomains: BTreeSet<Subdomain>) -> Option<Self> {
        if subdomains.is_empty() {
            None
        } else {
            Some(Self {
                subdomains,
                strategy: Some(strategy),
            })
        }
    }

    /// No strategy found anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subdomains.is_empty()
    }
}

fn selector(css: &'static str, cell: &'static OnceLock<Selector>) -> &'static Selector {
    cell.get_or_init(|| Selector::parse(css).expect("valid selector"))
}

fn table_selector() -> &'static Selector {
    static TABLE: OnceLock<Selector> = OnceLock::new();
    selector("table", &TABLE)
}

fn row_selector() -> &'static Selector {
    static ROW: OnceLock<Selector> = OnceLock::new();
    selector("tr", &ROW)
}

fn cell_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    selector("td", &CELL)
}

fn header_selector() -> &'static Selector {
    static HEADER: OnceLock<Selector> = OnceLock::new();
    selector("td, th", &HEADER)
}

fn script_selector() -> &'static Selector {
    static SCRIPT: OnceLock<Selector> = OnceLock::new();
    selector("script", &SCRIPT)
}

/// Quoted `label(.label)+` literal with an alphabetic TLD.
fn quoted_domain_regex() -> &'static Regex {
    static QUOTED: OnceLock<Regex> = OnceLock::new();
    QUOTED.get_or_init(|| {
        Regex::new(r#"["']((?:[a-zA-Z0-9][-a-zA-Z0-9]*\.)+[a-zA-Z]{2,})["']"#)
            .expect("valid regex")
    })
}

/// Whole-token domain shape for free text.
fn domain_token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9.-]*\.[a-z]{2,}$").expect("valid regex"))
}

/// String content of an in-page evaluation result.
///
/// Anything other than a JSON string is treated as an empty page.
fn value_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => {
            tracing::debug!("ignoring non-string evaluation result: {}", other);
            String::new()
        }
    }
}

/// Runs the extraction strategies against page content.
#[derive(Debug, Clone, Default)]
pub struct ExtractionEngine {
    validator: Validator,
}

impl ExtractionEngine {
    /// Create an engine that filters candidates with `validator`.
    #[must_use]
    pub fn new(validator: Validator) -> Self {
        Self { validator }
    }

    /// The validator applied to every candidate.
    #[must_use]
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Snapshot the document and run the table and script strategies on it.
    pub async fn extract(&self, page: &dyn BrowserActions, base_key: &str) -> Result<Extraction> {
        let html = value_text(page.evaluate(DOCUMENT_HTML_SCRIPT, &[]).await?);

        for line in describe_tables(&html) {
            tracing::debug!("{}", line);
        }

        Ok(self.from_document(&html, base_key))
    }

    /// Last-resort scan of the page's visible text.
    pub async fn extract_visible_text(
        &self,
        page: &dyn BrowserActions,
        base_key: &str,
    ) -> Result<Extraction> {
        let text = value_text(page.evaluate(VISIBLE_TEXT_SCRIPT, &[]).await?);
        let found = self.from_text(&text, base_key);
        Ok(Extraction::from_strategy(Strategy::VisibleText, found).unwrap_or_default())
    }

    /// Table strategy, falling back to script content if the table yields nothing.
    #[must_use]
    pub fn from_document(&self, html: &str, base_key: &str) -> Extraction {
        let document = Html::parse_document(html);

        let table = self.table_candidates(&document, base_key);
        tracing::debug!("{} candidates from the results table", table.len());
        if let Some(extraction) = Extraction::from_strategy(Strategy::Table, table) {
            return extraction;
        }

        let scripts = self.script_candidates(&document, base_key);
        tracing::debug!("{} candidates from script content", scripts.len());
        Extraction::from_strategy(Strategy::ScriptContent, scripts).unwrap_or_default()
    }

    /// First `<td>` of every row in the first table.
    #[must_use]
    pub fn from_table(&self, html: &str, base_key: &str) -> BTreeSet<Subdomain> {
        self.table_candidates(&Html::parse_document(html), base_key)
    }

    /// Quoted domain literals in inline scripts.
    #[must_use]
    pub fn from_scripts(&self, html: &str, base_key: &str) -> BTreeSet<Subdomain> {
        self.script_candidates(&Html::parse_document(html), base_key)
    }

    /// Whitespace-separated tokens shaped like domains.
    #[must_use]
    pub fn from_text(&self, text: &str, base_key: &str) -> BTreeSet<Subdomain> {
        text.split_whitespace()
            .map(normalize)
            .filter(|token| domain_token_regex().is_match(token))
            .filter(|token| self.validator.is_subdomain_of(token, base_key))
            .map(|token| Subdomain::new(&token))
            .collect()
    }

    fn table_candidates(&self, document: &Html, base_key: &str) -> BTreeSet<Subdomain> {
        let Some(table) = document.select(table_selector()).next() else {
            return BTreeSet::new();
        };

        table
            .select(row_selector())
            .filter_map(|row| row.select(cell_selector()).next())
            .map(|cell| normalize(&cell.text().collect::<String>()))
            .filter(|text| self.validator.is_subdomain_of(text, base_key))
            .map(|text| Subdomain::new(&text))
            .collect()
    }

    fn script_candidates(&self, document: &Html, base_key: &str) -> BTreeSet<Subdomain> {
        let mut found = BTreeSet::new();
        for script in document.select(script_selector()) {
            let content = script.text().collect::<String>();
            for captures in quoted_domain_regex().captures_iter(&content) {
                let candidate = normalize(&captures[1]);
                if self.validator.is_subdomain_of(&candidate, base_key) {
                    found.insert(Subdomain::new(&candidate));
                }
            }
        }
        found
    }
}

/// One line per table: row count and the first row's cell texts.
///
/// Logged at debug level to help retune selectors when the service changes.
#[must_use]
pub fn describe_tables(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(table_selector())
        .enumerate()
        .filter_map(|(idx, table)| {
            let rows: Vec<_> = table.select(row_selector()).collect();
            let first = rows.first()?;
            let headers: Vec<String> = first
                .select(header_selector())
                .map(|cell| {
                    cell.text()
                        .collect::<String>()
                        .trim()
                        .chars()
                        .take(30)
                        .collect()
                })
                .collect();
            Some(format!(
                "Table {idx}: {} rows, headers: {}",
                rows.len(),
                headers.join(" | ")
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(set: &BTreeSet<Subdomain>) -> Vec<&str> {
        set.iter().map(Subdomain::as_str).collect()
    }

    const RESULTS_PAGE: &str = r#"
        <html><body>
            <table id="result_table">
                <thead><tr><th>Subdomain</th><th>IP</th><th>Cloudflare</th></tr></thead>
                <tbody>
                    <tr><td> WWW.example.com </td><td>93.184.216.34</td><td>off</td></tr>
                    <tr><td>mail.example.com</td><td>93.184.216.35</td><td>on</td></tr>
                    <tr><td>www.example.com</td><td>93.184.216.34</td><td>off</td></tr>
                    <tr><td>93.184.216.34</td><td></td><td></td></tr>
                    <tr><td>cloudflare.example.com</td><td></td><td></td></tr>
                </tbody>
            </table>
            <table><tr><td>Recent scans</td></tr><tr><td>other.org</td></tr></table>
        </body></html>
    "#;

    #[test]
    fn test_table_first_column() {
        let engine = ExtractionEngine::default();
        let found = engine.from_table(RESULTS_PAGE, "example.com");
        assert_eq!(names(&found), ["mail.example.com", "www.example.com"]);
    }

    #[test]
    fn test_table_only_reads_first_table() {
        let engine = ExtractionEngine::default();
        assert!(engine.from_table(RESULTS_PAGE, "other.org").is_empty());
    }

    #[test]
    fn test_no_table() {
        let engine = ExtractionEngine::default();
        assert!(engine.from_table("<html><body><p>x</p></body></html>", "example.com").is_empty());
    }

    #[test]
    fn test_script_literals() {
        let html = r#"
            <html><head>
            <script>var subs = ["api.example.com", 'Dev.Example.com', "api.example.com"];</script>
            <script>track("cdn.vendor.net"); var ip = "10.0.0.1";</script>
            <script>var label = "subdomain.example.com"; var bare = example.com;</script>
            </head><body></body></html>
        "#;
        let engine = ExtractionEngine::default();
        let found = engine.from_scripts(html, "example.com");
        assert_eq!(names(&found), ["api.example.com", "dev.example.com"]);
    }

    #[test]
    fn test_document_prefers_table() {
        let html = r#"
            <html><body>
            <table><tr><td>www.example.com</td></tr></table>
            <script>var s = ["api.example.com"];</script>
            </body></html>
        "#;
        let engine = ExtractionEngine::default();
        let extraction = engine.from_document(html, "example.com");
        assert_eq!(extraction.strategy, Some(Strategy::Table));
        assert_eq!(names(&extraction.subdomains), ["www.example.com"]);
    }

    #[test]
    fn test_document_falls_back_to_scripts() {
        let html = r#"
            <html><body>
            <table><thead><tr><th>Subdomain</th></tr></thead><tbody></tbody></table>
            <script>window.__results = {"hosts": ["api.example.com", "vpn.example.com"]};</script>
            </body></html>
        "#;
        let engine = ExtractionEngine::default();
        let extraction = engine.from_document(html, "example.com");
        assert_eq!(extraction.strategy, Some(Strategy::ScriptContent));
        assert_eq!(
            names(&extraction.subdomains),
            ["api.example.com", "vpn.example.com"]
        );
    }

    #[test]
    fn test_document_empty() {
        let engine = ExtractionEngine::default();
        let extraction = engine.from_document("", "example.com");
        assert!(extraction.is_empty());
        assert_eq!(extraction.strategy, None);
    }

    #[test]
    fn test_visible_text_tokens() {
        let text = "Results for example.com\nSHOP.example.com 1.2.3.4\n\
                    blog.example.com, docs.example.com\tcontact@example.com notexample.com";
        let engine = ExtractionEngine::default();
        let found = engine.from_text(text, "example.com");
        assert_eq!(
            names(&found),
            ["docs.example.com", "example.com", "notexample.com", "shop.example.com"]
        );
    }

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(Value::String("abc".to_string())), "abc");
        assert_eq!(value_text(Value::Null), "");
        assert_eq!(value_text(serde_json::json!(["a.example.com"])), "");
    }

    #[test]
    fn test_describe_tables() {
        let lines = describe_tables(RESULTS_PAGE);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Table 0: 6 rows, headers: Subdomain | IP | Cloudflare");
        assert!(lines[1].starts_with("Table 1: 2 rows"));
    }
}
