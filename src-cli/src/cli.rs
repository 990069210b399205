use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "subhunt", version)]
#[command(about = "Find subdomains through a browser-driven reconnaissance service.")]
pub struct CommandLine {
    /// File with one root domain per line
    #[arg(short, long, value_name = "FILE")]
    pub domains: Option<PathBuf>,

    /// File to write discovered subdomains to
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Load configuration from this file instead of the default location
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Show debug logs on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Skip the startup banner
    #[arg(long)]
    pub no_banner: bool,

    /// Write the default configuration file and exit
    #[arg(long)]
    pub init_config: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
