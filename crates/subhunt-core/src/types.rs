//! Shared types used across subhunt.
//!
//! This module defines the newtypes that flow between the scanner stages.

use crate::error::SubhuntError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A root domain to investigate, as the operator wrote it (trimmed).
///
/// The original spelling is what gets typed into the service; comparisons
/// use [`Domain::key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Domain(String);

impl Domain {
    /// Create a new `Domain` from a raw input line.
    ///
    /// Any non-empty line is accepted as-is; the service decides what it
    /// can scan.
    ///
    /// # Errors
    /// Returns error if the trimmed value is empty.
    pub fn new(raw: impl Into<String>) -> Result<Self, SubhuntError> {
        let raw = raw.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(SubhuntError::Validation("domain must not be empty".to_string()));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased suffix key used to match subdomains of this domain.
    #[must_use]
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A discovered host name, normalized to trimmed lowercase.
///
/// Ordering is lexicographic on the normalized string, which is the order
/// of the final output file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Subdomain(String);

impl Subdomain {
    /// Normalize a raw string into a `Subdomain`.
    ///
    /// No validation happens here; callers filter candidates first.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Subdomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Subdomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_trims_and_keeps_case() {
        let domain = Domain::new("  Example.COM\t").expect("valid domain");
        assert_eq!(domain.as_str(), "Example.COM");
        assert_eq!(domain.key(), "example.com");
        assert_eq!(domain.to_string(), "Example.COM");
    }

    #[test]
    fn test_domain_rejects_blank() {
        assert!(Domain::new("").is_err());
        assert!(Domain::new("   ").is_err());
    }

    #[test]
    fn test_domain_keeps_inner_whitespace() {
        let domain = Domain::new("  Foo Bar.com ").expect("non-empty line");
        assert_eq!(domain.as_str(), "Foo Bar.com");
        assert_eq!(domain.key(), "foo bar.com");
    }

    #[test]
    fn test_subdomain_normalizes() {
        let sub = Subdomain::new(" WWW.Example.com ");
        assert_eq!(sub.as_str(), "www.example.com");
        assert_eq!(sub, Subdomain::new("www.example.com"));
    }

    #[test]
    fn test_subdomain_ordering() {
        let mut subs = vec![
            Subdomain::new("mail.example.com"),
            Subdomain::new("api.example.com"),
            Subdomain::new("b.example.com"),
        ];
        subs.sort();
        let names: Vec<&str> = subs.iter().map(Subdomain::as_str).collect();
        assert_eq!(names, ["api.example.com", "b.example.com", "mail.example.com"]);
    }
}
