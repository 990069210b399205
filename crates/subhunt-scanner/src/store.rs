//! Line-delimited result file.
//!
//! During a run the file is append-only: one subdomain per line, flushed to
//! disk after each domain, so an interrupted run keeps everything finished
//! before the crash. [`ResultStore::finalize`] then rewrites it once as the
//! sorted, deduplicated union.

use crate::error::Result;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use subhunt_core::Subdomain;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Output file for discovered subdomains.
#[derive(Debug, Clone)]
pub struct ResultStore {
    path: PathBuf,
}

impl ResultStore {
    /// Create or truncate the output file for a fresh run.
    pub async fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, b"").await?;
        tracing::debug!("Output file ready: {}", path.display());
        Ok(Self { path })
    }

    /// Use an existing file without truncating it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the output file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append each subdomain as its own line and sync to disk.
    ///
    /// No deduplication against earlier lines; [`ResultStore::finalize`]
    /// takes care of that. Returns the number of lines written.
    pub async fn append_and_persist<'a, I>(&self, subdomains: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a Subdomain>,
    {
        let mut buf = String::new();
        let mut written = 0;
        for subdomain in subdomains {
            buf.push_str(subdomain.as_str());
            buf.push('\n');
            written += 1;
        }
        if written == 0 {
            return Ok(0);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(buf.as_bytes()).await?;
        file.flush().await?;
        file.sync_data().await?;

        Ok(written)
    }

    /// Read every line back as a set.
    pub async fn load(&self) -> Result<BTreeSet<Subdomain>> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(Subdomain::new)
            .collect())
    }

    /// Rewrite the file as its sorted, deduplicated content.
    ///
    /// Idempotent. Returns the unique subdomains now in the file.
    pub async fn finalize(&self) -> Result<Vec<Subdomain>> {
        let unique: Vec<Subdomain> = self.load().await?.into_iter().collect();

        let mut contents = String::new();
        for subdomain in &unique {
            contents.push_str(subdomain.as_str());
            contents.push('\n');
        }
        fs::write(&self.path, contents).await?;

        tracing::debug!(
            "Finalized {} with {} unique subdomains",
            self.path.display(),
            unique.len()
        );
        Ok(unique)
    }
}
