//! Configuration management for subhunt.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Longest accepted page, form or results timeout (one day).
pub const MAX_TIMEOUT_SECS: u64 = 86_400;

/// Longest accepted settle or retry delay (ten minutes).
pub const MAX_DELAY_MS: u64 = 600_000;

/// Most navigation attempts per domain.
pub const MAX_NAVIGATION_ATTEMPTS: u32 = 10;

/// Main application configuration.
///
/// This is loaded from `~/.config/subhunt/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote reconnaissance service and its page selectors
    pub service: ServiceConfig,
    /// Scan timing and filtering settings
    pub scanning: ScanningConfig,
    /// Browser automation settings
    pub browser: BrowserConfig,
    /// Output file settings
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path.
    ///
    /// Unlike [`AppConfig::load`], a missing file is an error here.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `SUBHUNT_HEADLESS`: Override browser headless mode (true/false)
    /// - `SUBHUNT_RESULTS_TIMEOUT_SECS`: Override the results wait timeout
    /// - `SUBHUNT_OUTPUT`: Override the default output file path
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides using the given variable lookup.
    ///
    /// Values that fail to parse are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("SUBHUNT_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Some(val) = lookup("SUBHUNT_RESULTS_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.scanning.results_timeout_secs = secs;
                tracing::debug!("Override scanning.results_timeout_secs from env: {}", secs);
            }
        }

        if let Some(val) = lookup("SUBHUNT_OUTPUT") {
            let val = val.trim();
            if !val.is_empty() {
                self.output.default_path = PathBuf::from(val);
                tracing::debug!("Override output.default_path from env: {}", val);
            }
        }
    }

    /// Check values that would otherwise only fail mid-run.
    pub fn validate(&self) -> ConfigResult<()> {
        let url = url::Url::parse(&self.service.url).map_err(|e| ConfigError::InvalidValue {
            field: "service.url".to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "service.url".to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let selectors = [
            ("service.input_selector", &self.service.input_selector),
            ("service.submit_selector", &self.service.submit_selector),
            ("service.results_selector", &self.service.results_selector),
        ];
        for (field, value) in selectors {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "selector must not be empty".to_string(),
                });
            }
        }

        let timeouts = [
            (
                "scanning.navigation_timeout_secs",
                self.scanning.navigation_timeout_secs,
            ),
            ("scanning.form_timeout_secs", self.scanning.form_timeout_secs),
            (
                "scanning.results_timeout_secs",
                self.scanning.results_timeout_secs,
            ),
        ];
        for (field, value) in timeouts {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "timeout must be greater than zero".to_string(),
                });
            }
            if value > MAX_TIMEOUT_SECS {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("timeout must not exceed {MAX_TIMEOUT_SECS} seconds"),
                });
            }
        }

        let delays = [
            ("scanning.settle_delay_ms", self.scanning.settle_delay_ms),
            ("scanning.retry_delay_ms", self.scanning.retry_delay_ms),
            (
                "browser.min_navigation_interval_ms",
                self.browser.min_navigation_interval_ms,
            ),
        ];
        for (field, value) in delays {
            if value > MAX_DELAY_MS {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("delay must not exceed {MAX_DELAY_MS} ms"),
                });
            }
        }

        if !(1..=MAX_NAVIGATION_ATTEMPTS).contains(&self.scanning.navigation_attempts) {
            return Err(ConfigError::InvalidValue {
                field: "scanning.navigation_attempts".to_string(),
                reason: format!("must be between 1 and {MAX_NAVIGATION_ATTEMPTS}"),
            });
        }

        Ok(())
    }

    /// Write configuration to `path` as a new file.
    ///
    /// Creates missing parent directories. An existing file is left
    /// untouched and reported as [`ConfigError::AlreadyExists`].
    pub fn save_new(&self, path: &Path) -> ConfigResult<()> {
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(ConfigError::AlreadyExists {
                    path: path.display().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        tracing::debug!("Saving config to {}", path.display());
        file.write_all(contents.as_bytes())?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/subhunt/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "subhunt", "subhunt").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// The reconnaissance web service driven by the browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Landing page holding the scan form
    pub url: String,
    /// Domain input field
    pub input_selector: String,
    /// Control that starts the remote scan
    pub submit_selector: String,
    /// Element that only exists once results are rendered
    pub results_selector: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: "https://subdomainfinder.c99.nl/".to_string(),
            input_selector: "input#domain9".to_string(),
            submit_selector: "button#scan_subdomains".to_string(),
            results_selector: r#"span[onclick*="copyAllSubdomains"]"#.to_string(),
        }
    }
}

/// Scan timing and filtering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanningConfig {
    /// Page load timeout in seconds
    pub navigation_timeout_secs: u64,
    /// Wait for the input field, in seconds
    pub form_timeout_secs: u64,
    /// Wait for the remote scan to render results, in seconds
    pub results_timeout_secs: u64,
    /// Pause after the results wait for late DOM updates
    pub settle_delay_ms: u64,
    /// Navigation attempts per domain before giving up
    pub navigation_attempts: u32,
    /// Base delay between navigation attempts
    pub retry_delay_ms: u64,
    /// Substrings that mark a candidate as page chrome rather than a host
    pub noise_tokens: Vec<String>,
}

impl Default for ScanningConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_secs: 60,
            form_timeout_secs: 30,
            results_timeout_secs: 120,
            settle_delay_ms: 3000,
            navigation_attempts: 2,
            retry_delay_ms: 2000,
            noise_tokens: vec!["subdomain".to_string(), "cloudflare".to_string()],
        }
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode. Off by default so an operator can solve challenges.
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// User agent presented to the service
    pub user_agent: String,
    /// Pick a random desktop user agent and viewport instead
    pub randomize_fingerprint: bool,
    /// Minimum spacing between navigations to the same host
    pub min_navigation_interval_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            window_width: 1280,
            window_height: 800,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            randomize_fingerprint: false,
            min_navigation_interval_ms: 1000,
        }
    }
}

/// Output file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output file offered when none is given
    pub default_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_path: PathBuf::from("sublist.txt"),
        }
    }
}
