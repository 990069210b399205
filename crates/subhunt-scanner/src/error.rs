use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Domain list not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("No domains found in {}", path.display())]
    EmptyInput { path: PathBuf },

    #[error("Navigation failed for {domain}: {reason}")]
    NavigationFailure { domain: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Browser error: {0}")]
    Browser(#[from] subhunt_browser::BrowserError),

    #[error(transparent)]
    Core(#[from] subhunt_core::SubhuntError),
}

impl ScanError {
    /// Short label used in status lines.
    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::InputNotFound { .. } => "input not found",
            ScanError::EmptyInput { .. } => "empty input",
            ScanError::NavigationFailure { .. } => "navigation failure",
            ScanError::Io(_) => "storage error",
            ScanError::Browser(_) => "browser error",
            ScanError::Core(_) => "invalid input",
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScanError::NavigationFailure {
            domain: "example.com".to_string(),
            reason: "timeout".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Navigation failed for example.com: timeout"
        );
        assert_eq!(err.kind(), "navigation failure");

        let err = ScanError::InputNotFound {
            path: PathBuf::from("domains.txt"),
        };
        assert_eq!(err.to_string(), "Domain list not found: domains.txt");
    }

    #[test]
    fn test_core_error_kind() {
        let err: ScanError = subhunt_core::Domain::new("   ").unwrap_err().into();
        assert_eq!(err.kind(), "invalid input");
        assert_eq!(err.to_string(), "validation error: domain must not be empty");
    }
}
