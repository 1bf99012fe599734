//! diffdoc CLI - Syntax-highlighted change reports from git history
//!
//! Compares two revisions of a repository (or two files) line by line and
//! renders every change with syntax colors, line numbers and row fills.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::*;
use config::DiffdocConfig;
use output::OutputFormat;

/// Syntax-highlighted change reports from git history.
///
/// diffdoc lists the files changed between two revisions, aligns the old and
/// new versions of each file and renders the changes as a colored report.
#[derive(Parser)]
#[command(name = "diffdoc")]
#[command(author, version)]
#[command(about = "Syntax-highlighted change reports from git history")]
#[command(propagate_version = true)]
#[command(after_help = "Examples:
  diffdoc report                    First commit to HEAD
  diffdoc report v1.0 v1.1 -C 3     Changes between tags, 3 lines of context
  diffdoc report -o changes.txt     Write a plain-text report
  diffdoc files old.py new.py       Compare two files on disk")]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format (overrides config default)
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Single-line JSON and a borderless legend
    #[arg(long, global = true)]
    compact: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Report the changes between two git revisions
    #[command(visible_alias = "r")]
    Report {
        /// Old revision (defaults to the first commit)
        from: Option<String>,

        /// New revision (defaults to HEAD)
        to: Option<String>,

        /// Repository to report on
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite the output file without asking
        #[arg(short, long)]
        force: bool,

        /// Unchanged lines around each change (default: whole files)
        #[arg(short = 'C', long)]
        context: Option<usize>,

        /// Theme name (see `diffdoc themes`)
        #[arg(short, long)]
        theme: Option<String>,

        /// Worker threads for diffing (default: one per CPU)
        #[arg(short = 'j', long)]
        threads: Option<usize>,
    },

    /// Compare two files on disk
    Files {
        /// Old version (a missing file counts as empty)
        old: PathBuf,

        /// New version (a missing file counts as empty)
        new: PathBuf,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite the output file without asking
        #[arg(short, long)]
        force: bool,

        /// Unchanged lines around each change (default: whole files)
        #[arg(short = 'C', long)]
        context: Option<usize>,

        /// Theme name (see `diffdoc themes`)
        #[arg(short, long)]
        theme: Option<String>,
    },

    /// List available themes
    Themes,

    /// List the languages rows can be highlighted as
    Languages,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,

        /// Show installation instructions instead of generating completions
        #[arg(long)]
        instructions: bool,
    },
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // A report reads its settings from the repository it reports on.
    let config_root = match &cli.command {
        Some(Commands::Report { repo, .. }) => repo.as_path(),
        _ => Path::new("."),
    };
    let mut config = DiffdocConfig::load(config_root);
    if cli.compact {
        config.output.compact = Some(true);
    }

    // Resolve output format: CLI flag > config default > Table
    let format = cli.format.unwrap_or_else(|| {
        config
            .default_format()
            .and_then(|f| f.parse().ok())
            .unwrap_or(OutputFormat::Table)
    });

    if let Some(use_color) = config.use_color() {
        colored::control::set_override(use_color);
    }

    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        println!();
        return Ok(());
    };

    match command {
        Commands::Report {
            from,
            to,
            repo,
            output,
            force,
            context,
            theme,
            threads,
        } => {
            let args = report::ReportArgs {
                from,
                to,
                repo,
                output,
                force,
                context,
                theme,
                threads,
            };
            report::run(args, &config, format, cli.quiet).await
        }

        Commands::Files {
            old,
            new,
            output,
            force,
            context,
            theme,
        } => {
            let args = files::FilesArgs {
                old,
                new,
                output,
                force,
                context,
                theme,
            };
            files::run(args, &config, format).await
        }

        Commands::Themes => themes::run(&config, format),

        Commands::Languages => languages::run(&config, format),

        Commands::Completions {
            shell,
            instructions,
        } => completions::run(shell, instructions, &mut Cli::command(), &config, format),
    }
}
