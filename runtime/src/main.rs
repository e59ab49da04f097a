//! `tc-unicode` — look up Han character attributes and meanings.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tc_unicode::cli::lookup_cmd::{self, Mode, SAMPLE_INPUTS};
use tc_unicode::LookupConfig;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "tc-unicode",
    version,
    about = "Look up CNS11643 attributes and dictionary meanings of Han characters"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Show the browser window instead of running headless
    #[arg(long, global = true)]
    headful: bool,

    /// Launch Chromium without its sandbox (containers)
    #[arg(long, global = true)]
    no_sandbox: bool,

    /// Chromium binary to launch
    #[arg(long, global = true, value_name = "PATH")]
    chromium: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Registry attributes for characters or hex code points (6578, U+2A838)
    Attrs {
        #[arg(required = true)]
        inputs: Vec<String>,
    },
    /// Basic dictionary explanation of characters
    Meaning {
        #[arg(required = true)]
        inputs: Vec<String>,
    },
    /// Attributes and meaning
    Lookup {
        #[arg(required = true)]
        inputs: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let directive = if cli.verbose {
        "tc_unicode=debug"
    } else {
        "tc_unicode=info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directive)),
        )
        .init();

    let mut config = LookupConfig::from_env();
    if cli.headful {
        config.browser.headless = false;
    }
    if cli.no_sandbox {
        config.browser.no_sandbox = true;
    }
    if let Some(path) = cli.chromium {
        config.browser.chromium_path = Some(path);
    }

    let (mode, inputs) = match cli.command {
        Some(Commands::Attrs { inputs }) => (Mode::Attributes, inputs),
        Some(Commands::Meaning { inputs }) => (Mode::Meaning, inputs),
        Some(Commands::Lookup { inputs }) => (Mode::Both, inputs),
        None => (
            Mode::Both,
            SAMPLE_INPUTS.iter().map(|s| s.to_string()).collect(),
        ),
    };

    info!("tc-unicode v{}", env!("CARGO_PKG_VERSION"));
    let failures = lookup_cmd::run(mode, &inputs, &config, cli.json).await;

    if failures > 0 {
        anyhow::bail!("{failures} of {} lookups failed", inputs.len());
    }
    Ok(())
}
