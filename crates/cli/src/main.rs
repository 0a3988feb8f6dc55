// Rollcall CLI - roster reconciliation from the command line

mod exit_codes;
mod roster;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "rollcall")]
#[command(about = "Multi-source participant roster reconciliation")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a reconciliation from a TOML config file
    #[command(after_help = "\
Examples:
  rollcall run roster.toml
  rollcall run roster.toml --json
  rollcall run roster.toml --output result.json

Exits 5 when the run leaves findings (unmatched signal events or
unallocated headcount slots); the result is still written.")]
    Run {
        /// Path to the roster .toml config file
        config: PathBuf,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file (overrides the config's output path)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate a roster config without running
    #[command(after_help = "\
Examples:
  rollcall validate roster.toml")]
    Validate {
        /// Path to the roster .toml config file
        config: PathBuf,
    },

    /// Run a reconciliation and list matching participants
    #[command(after_help = "\
Examples:
  rollcall filter roster.toml --where 'status=attended'
  rollcall filter roster.toml --where 'profession=Accountant' --where 'rsvp=accepted'
  rollcall filter roster.toml --search kuala --json")]
    Filter {
        /// Path to the roster .toml config file
        config: PathBuf,

        /// Field predicate, repeatable (ANDed).
        /// Fields: program, profession, category, source, rsvp, status
        #[arg(long, value_name = "EXPR")]
        r#where: Vec<String>,

        /// Case-insensitive substring search across display fields
        #[arg(long)]
        search: Option<String>,

        /// Output matching participants as JSON
        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  rollcall-engine ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  rollcall-engine ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: rollcall <command> [options]");
            eprintln!("       rollcall --help for more information");
            Ok(())
        }
        Some(Commands::Run { config, json, output }) => roster::cmd_run(config, json, output),
        Some(Commands::Validate { config }) => roster::cmd_validate(config),
        Some(Commands::Filter { config, r#where, search, json }) => {
            roster::cmd_filter(config, r#where, search, json)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
