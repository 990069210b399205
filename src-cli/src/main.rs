mod cli;
mod presenter;
mod prompt;

use anyhow::{Context, Result};
use cli::CommandLine;
use presenter::{print_lines, TerminalPresenter};
use std::path::PathBuf;
use std::sync::Arc;
use subhunt_browser::BrowserEngine;
use subhunt_core::AppConfig;
use subhunt_scanner::{load_domains, ResultStore, ScanOrchestrator, ScanSettings, Validator};
use tracing::{info, warn};

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = if verbose {
        "warn,subhunt=debug"
    } else {
        "warn,subhunt=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn load_config(args: &CommandLine) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let mut config = AppConfig::load_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            config.apply_env_overrides(|key| std::env::var(key).ok());
            config
        }
        None => AppConfig::load_with_env().context("failed to load config")?,
    };

    if args.headless {
        config.browser.headless = true;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn init_config() -> Result<()> {
    let path = AppConfig::config_path()?;
    AppConfig::default().save_new(&path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

fn domain_file(args: &CommandLine) -> Result<PathBuf> {
    if let Some(path) = &args.domains {
        return Ok(path.clone());
    }
    prompt::ask_path_stdio("Enter path to domain list file (one domain per line)", None)?
        .context("a domain list file is required")
}

fn output_file(args: &CommandLine, config: &AppConfig) -> Result<PathBuf> {
    if let Some(path) = &args.output {
        return Ok(path.clone());
    }
    let default = &config.output.default_path;
    Ok(prompt::ask_path_stdio("Enter output file path", Some(default.as_path()))?
        .unwrap_or_else(|| default.clone()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CommandLine::parse_args();
    init_tracing(args.verbose);

    if args.init_config {
        return init_config();
    }

    let config = load_config(&args)?;

    if !args.no_banner {
        print_lines(&presenter::banner());
    }
    info!("Starting subhunt v{}", env!("CARGO_PKG_VERSION"));

    // Input problems surface before a browser is ever started
    let domains = load_domains(&domain_file(&args)?).await?;
    print_lines(&presenter::domains_loaded(&domains));

    let output = output_file(&args, &config)?;
    let store = ResultStore::create(output.clone())
        .await
        .with_context(|| format!("failed to prepare output file {}", output.display()))?;
    println!("{}", presenter::output_ready(&output));

    print_lines(&presenter::browser_launching(config.browser.headless));
    let engine = Arc::new(
        BrowserEngine::launch(&config.browser)
            .await
            .context("failed to launch browser")?,
    );

    let mut orchestrator =
        ScanOrchestrator::new(engine.clone(), store, ScanSettings::from(&config))
            .with_validator(Validator::new(&config.scanning.noise_tokens))
            .with_observer(Arc::new(TerminalPresenter));
    let outcome = orchestrator.run(&domains).await;
    drop(orchestrator);

    match Arc::try_unwrap(engine) {
        Ok(engine) => {
            if let Err(e) = engine.shutdown().await {
                warn!("Browser did not shut down cleanly: {}", e);
            }
        }
        Err(_) => warn!("Browser still referenced at exit, leaving it to the process teardown"),
    }

    let summary = outcome.context("failed to finalize results")?;
    info!(
        "Processed {} domains ({} failed), {} unique subdomains",
        summary.domains_processed, summary.domains_failed, summary.unique_subdomains
    );
    Ok(())
}
