//! Colored terminal output for a scan run.
//!
//! Everything here goes to stdout. Logs go to stderr through `tracing`.

use colored::{ColoredString, Colorize};
use std::path::Path;
use subhunt_core::Domain;
use subhunt_scanner::{RunSummary, ScanEvent, ScanObserver, ScanPhase};

const WIDTH: usize = 50;

fn rule() -> String {
    "=".repeat(WIDTH)
}

pub fn banner() -> Vec<String> {
    let title = format!("SUBHUNT v{}", env!("CARGO_PKG_VERSION"));
    vec![
        rule().bright_black().to_string(),
        format!("{:^WIDTH$}", title).bright_green().bold().to_string(),
        format!("{:^WIDTH$}", "subdomain discovery via browser")
            .bright_black()
            .to_string(),
        rule().bright_black().to_string(),
    ]
}

pub fn domains_loaded(domains: &[Domain]) -> Vec<String> {
    let mut lines = vec![success(&format!("Loaded {} domains", domains.len())).to_string()];
    lines.extend(
        domains
            .iter()
            .map(|domain| format!("    {}", format!("• {domain}").cyan())),
    );
    lines
}

pub fn output_ready(path: &Path) -> String {
    success(&format!("Output file ready: {}", path.display())).to_string()
}

pub fn browser_launching(headless: bool) -> Vec<String> {
    if headless {
        vec![notice("Starting headless browser...").to_string()]
    } else {
        vec![
            notice("Starting browser...").to_string(),
            warning("If a captcha appears, solve it manually in the browser window").to_string(),
        ]
    }
}

fn success(msg: &str) -> ColoredString {
    format!("[+] {msg}").green()
}

fn notice(msg: &str) -> ColoredString {
    format!("[*] {msg}").yellow()
}

fn warning(msg: &str) -> ColoredString {
    format!("[!] {msg}").yellow()
}

fn failure(msg: &str) -> ColoredString {
    format!("[!] {msg}").red()
}

fn render_phase(phase: ScanPhase) -> Option<ColoredString> {
    match phase {
        ScanPhase::Submitted => Some("[*] Scan started... waiting for results".cyan()),
        ScanPhase::ResultsReady => Some(success("Results loaded")),
        ScanPhase::ResultsTimeout => Some(warning(
            "Timeout waiting for results, checking if any subdomains rendered...",
        )),
        _ => None,
    }
}

const TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S UTC";

fn render_summary(summary: &RunSummary) -> Vec<String> {
    let elapsed = summary.finished_at - summary.started_at;
    let mut lines = vec![String::new(), rule().green().to_string()];
    if summary.unique_subdomains == 0 {
        lines.push(failure("No subdomains found for any domain").to_string());
    } else {
        lines.push(success("SCAN COMPLETE!").bold().to_string());
        lines.push(
            success(&format!(
                "Total unique subdomains: {}",
                summary.unique_subdomains
            ))
            .to_string(),
        );
        lines.push(success(&format!("Results saved to: {}", summary.output.display())).to_string());
    }

    let processed = format!(
        "Domains processed: {} ({} failed)",
        summary.domains_processed, summary.domains_failed
    );
    lines.push(if summary.domains_failed > 0 {
        warning(&processed).to_string()
    } else {
        success(&processed).to_string()
    });
    for line in [
        format!("Started:  {}", summary.started_at.format(TIMESTAMP)),
        format!("Finished: {}", summary.finished_at.format(TIMESTAMP)),
        format!("Elapsed:  {}s", elapsed.num_seconds()),
    ] {
        lines.push(line.bright_black().to_string());
    }
    lines.push(rule().green().to_string());
    lines
}

/// Turn one event into the lines shown for it.
pub fn render(event: &ScanEvent) -> Vec<String> {
    match event {
        ScanEvent::RunStarted { .. } => Vec::new(),
        ScanEvent::DomainStarted {
            index,
            total,
            domain,
        } => vec![
            String::new(),
            rule().bold().to_string(),
            format!("[{index}/{total}] Processing: {domain}")
                .cyan()
                .to_string(),
            rule().bold().to_string(),
        ],
        ScanEvent::Phase { phase, .. } => render_phase(*phase)
            .map(|line| line.to_string())
            .into_iter()
            .collect(),
        ScanEvent::Retrying {
            attempt,
            max_attempts,
            reason,
            ..
        } => vec![warning(&format!(
            "Page load attempt {attempt}/{max_attempts} failed, retrying: {reason}"
        ))
        .to_string()],
        ScanEvent::Found {
            domain,
            strategy,
            subdomains,
            output,
        } => {
            let mut lines = vec![success(&format!(
                "Found {} subdomains for {} ({})",
                subdomains.len(),
                domain,
                strategy
            ))
            .to_string()];
            lines.extend(
                subdomains
                    .iter()
                    .map(|sub| format!("    {}", format!("→ {sub}").cyan())),
            );
            lines.push(
                success(&format!(
                    "Saved {} subdomains to {}",
                    subdomains.len(),
                    output.display()
                ))
                .to_string(),
            );
            lines
        }
        ScanEvent::NothingFound { domain } => {
            vec![warning(&format!("No subdomains found for {domain}")).to_string()]
        }
        ScanEvent::DomainFailed {
            domain,
            kind,
            reason,
        } => vec![failure(&format!("Error scanning {domain} ({kind}): {reason}")).to_string()],
        ScanEvent::RunFinished { summary } => render_summary(summary),
    }
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

/// Prints scan events as they happen.
#[derive(Debug, Default)]
pub struct TerminalPresenter;

impl ScanObserver for TerminalPresenter {
    fn on_event(&self, event: &ScanEvent) {
        print_lines(&render(event));
    }
}
