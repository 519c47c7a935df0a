//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use primerbook_core::pipeline::{self, BuildReport, ProgressReporter};
use primerbook_shared::{AppConfig, BuildConfig, init_config, load_config};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// primerbook: build the README and mdBook pages from numbered chapters.
#[derive(Parser)]
#[command(
    name = "primerbook",
    version,
    about = "Concatenate numbered markdown chapters into README.md and convert each for mdBook.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Project root holding the chapter files.
    #[arg(short = 'C', long = "dir", default_value = ".", global = true)]
    pub dir: PathBuf,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Defaults to `build`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Write README.md and the mdBook pages.
    Build,

    /// Report outputs that a build would create or change, without writing.
    Check,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a primerbook.toml with defaults into the project root.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "primerbook=info",
        1 => "primerbook=debug",
        _ => "primerbook=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command.unwrap_or(Command::Build) {
        Command::Build => cmd_build(&cli.dir),
        Command::Check => cmd_check(&cli.dir),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(&cli.dir),
            ConfigAction::Show => cmd_config_show(&cli.dir),
        },
    }
}

fn resolve_config(dir: &Path) -> Result<BuildConfig> {
    let config = load_config(dir)?;
    Ok(BuildConfig::new(dir, &config)?)
}

fn cmd_build(dir: &Path) -> Result<()> {
    let config = resolve_config(dir)?;
    info!(root = %dir.display(), "building");

    let reporter = CliProgress::new();
    let report = pipeline::build(&config, &reporter)?;

    println!();
    println!("  Book built.");
    println!("  Chapters: {}", report.chapters.len());
    println!("  README:   {}", report.readme_path.display());
    println!("  Pages:    {}", report.book_dir.display());
    println!("  Time:     {:.2}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_check(dir: &Path) -> Result<()> {
    let config = resolve_config(dir)?;
    let stale = pipeline::check(&config)?;

    if stale.is_empty() {
        println!("All outputs are up to date.");
        return Ok(());
    }

    for output in &stale {
        println!("  {:<8} {}", output.reason, output.path.display());
    }
    Err(eyre!(
        "{} output(s) out of date; run `primerbook build`",
        stale.len()
    ))
}

fn cmd_config_init(dir: &Path) -> Result<()> {
    let path = init_config(dir)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn cmd_config_show(dir: &Path) -> Result<()> {
    let config: AppConfig = load_config(dir)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn chapter_written(&self, file_name: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Converting [{current}/{total}] {file_name}"));
    }

    fn done(&self, _report: &BuildReport) {
        self.spinner.finish_and_clear();
    }
}
