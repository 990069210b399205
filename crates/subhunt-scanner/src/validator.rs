//! Candidate filtering.
//!
//! Every string pulled off the page, whatever strategy produced it, passes
//! through [`Validator::is_subdomain_of`] before it is kept.
//!
//! The suffix check is a plain `ends_with` with no label boundary, so
//! `notexample.com` is accepted for `example.com`. Callers that need strict
//! matching must post-filter.

use regex::Regex;
use std::sync::OnceLock;

/// Noise tokens used when none are configured.
pub const DEFAULT_NOISE_TOKENS: &[&str] = &["subdomain", "cloudflare"];

fn ipv4_regex() -> &'static Regex {
    static IPV4_REGEX: OnceLock<Regex> = OnceLock::new();
    IPV4_REGEX.get_or_init(|| {
        Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$").expect("valid regex")
    })
}

/// Lowercase and trim a raw candidate.
#[must_use]
pub fn normalize(candidate: &str) -> String {
    candidate.trim().to_lowercase()
}

/// Decides whether a candidate string is a plausible subdomain of a base domain.
#[derive(Debug, Clone)]
pub struct Validator {
    noise_tokens: Vec<String>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_TOKENS.iter().copied())
    }
}

impl Validator {
    /// Create a validator that rejects candidates containing any of `noise_tokens`.
    pub fn new<I, S>(noise_tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let noise_tokens = noise_tokens
            .into_iter()
            .map(|token| normalize(token.as_ref()))
            .filter(|token| !token.is_empty())
            .collect();
        Self { noise_tokens }
    }

    /// Configured noise tokens, normalized.
    #[must_use]
    pub fn noise_tokens(&self) -> &[String] {
        &self.noise_tokens
    }

    /// `true` when `candidate` looks like a host under `base_key`.
    ///
    /// `base_key` is expected lowercased; it is normalized again here so the
    /// check stays total.
    #[must_use]
    pub fn is_subdomain_of(&self, candidate: &str, base_key: &str) -> bool {
        let candidate = normalize(candidate);
        let base_key = normalize(base_key);

        candidate.len() > 3
            && candidate.contains('.')
            && candidate.ends_with(&base_key)
            && !ipv4_regex().is_match(&candidate)
            && !self
                .noise_tokens
                .iter()
                .any(|token| candidate.contains(token.as_str()))
    }
}

/// [`Validator::is_subdomain_of`] with the default noise tokens.
#[must_use]
pub fn is_subdomain_of(candidate: &str, base_key: &str) -> bool {
    Validator::default().is_subdomain_of(candidate, base_key)
}
