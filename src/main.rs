use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use gitsmart::{report, Analyzer, Config, GitCli};

const CONFIG_FILE: &str = "gitsmart.toml";

#[derive(Parser)]
#[command(name = "gitsmart")]
#[command(about = "Intelligent git repository analysis")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Repository to analyze (default: current directory)
    #[arg(short, long, global = true, default_value = ".")]
    repo: String,

    /// Path to config file (default: gitsmart.toml at the repository root)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Show comprehensive repository analysis (default)
    Analysis,
    /// Show branch analysis and cleanup suggestions
    Branches,
    /// Show most frequently changed files
    Hotfiles,
    /// Show working tree cleanup suggestions
    Cleanup,
    /// Suggest commit messages for staged changes
    Suggest,
    /// Generate a code review checklist for the last commit
    Review,
    /// Run a security audit on the last commit
    Security,
    /// Show blame with commit context
    Blame {
        /// File to annotate
        file: String,
    },
    /// Analyze change impact for a file or component
    Impact {
        /// File path or component name
        target: String,
    },
    /// Merge conflict resolution guidance
    Resolve,
    /// Detect potential performance regressions
    Performance,
    /// Find documentation gaps
    Docs,
    /// Analyze git workflow patterns
    Workflow,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version go to stdout and succeed; usage errors exit 1
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose)?;

    let workdir = expand_path(&cli.repo)?;
    let repo = git2::Repository::discover(&workdir).with_context(|| {
        format!(
            "Not a git repository: {}. Run this command in a git repository",
            workdir.display()
        )
    })?;
    let repo_root = repo
        .workdir()
        .map(Path::to_path_buf)
        .context("Bare repositories are not supported")?;

    let config = match cli.config {
        Some(ref path) => {
            let path = expand_path(path)?;
            Config::load(&path).with_context(|| format!("Could not load {}", path.display()))?
        }
        None => Config::load_or_default(&repo_root.join(CONFIG_FILE))?,
    };

    let git = GitCli::new(
        &config.git.program,
        &workdir,
        config.limits.max_output_bytes,
    );
    tracing::info!("analyzing repository at {}", git.workdir().display());
    let analyzer = Analyzer::new(&git, &config, &workdir, &repo_root);
    let json = cli.json;

    match cli.command.unwrap_or(Commands::Analysis) {
        Commands::Analysis => emit(json, &analyzer.analysis(), report::print_analysis),
        Commands::Branches => emit(json, &analyzer.branches(), report::print_branches),
        Commands::Hotfiles => emit(json, &analyzer.hot_files(), report::print_hot_files),
        Commands::Cleanup => emit(json, &analyzer.cleanup(), report::print_cleanup),
        Commands::Suggest => emit(json, &analyzer.suggest(), report::print_suggestions),
        Commands::Review => emit(json, &analyzer.review(), |r| report::print_review(r.as_ref())),
        Commands::Security => {
            emit(json, &analyzer.security(), |r| report::print_security(r.as_ref()))
        }
        Commands::Blame { file } => emit(json, &analyzer.blame(&file)?, report::print_blame),
        Commands::Impact { target } => emit(json, &analyzer.impact(&target)?, report::print_impact),
        Commands::Resolve => emit(json, &analyzer.conflicts(), report::print_conflicts),
        Commands::Performance => emit(json, &analyzer.performance(), report::print_performance),
        Commands::Docs => emit(json, &analyzer.docs(), report::print_docs),
        Commands::Workflow => {
            emit(json, &analyzer.workflow(), |r| report::print_workflow(r.as_ref()))
        }
    }
}

/// Print a report either as JSON or through its terminal renderer
fn emit<T: Serialize>(json: bool, value: &T, render: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        render(value);
    }
    Ok(())
}

fn expand_path(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw)
        .with_context(|| format!("Could not expand path: {}", raw))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
