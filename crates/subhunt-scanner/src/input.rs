//! Domain list loading.

use crate::error::{Result, ScanError};
use std::path::Path;
use subhunt_core::Domain;

/// Read one domain per non-empty line, keeping file order.
///
/// Each trimmed line is taken as written. A missing file or a file with no
/// non-blank lines is an error, and both are reported before any browser
/// work starts.
pub async fn load_domains(path: &Path) -> Result<Vec<Domain>> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(ScanError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let contents = tokio::fs::read_to_string(path).await?;
    let domains = parse_domains(&contents)?;

    if domains.is_empty() {
        return Err(ScanError::EmptyInput {
            path: path.to_path_buf(),
        });
    }

    tracing::info!("Loaded {} domains from {}", domains.len(), path.display());
    Ok(domains)
}

fn parse_domains(contents: &str) -> Result<Vec<Domain>> {
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| Domain::new(line).map_err(ScanError::from))
        .collect()
}
