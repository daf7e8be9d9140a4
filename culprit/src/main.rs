//! Find the unit responsible for a problem by disabling units and asking.
//!
//! Units live in a directory (`units/` by default, see `culprit.toml`). A
//! disabled unit is renamed with a `.disabled` suffix and renamed back once
//! the question about it has been answered.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use culprit::session::Mode;
use culprit::{cli, exit_codes, logging};

#[derive(Parser)]
#[command(
    name = "culprit",
    version,
    about = "Isolate the unit responsible for a problem by disabling units and asking"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Disable units one at a time and ask whether the problem persists.
    Scan,
    /// Bisect: disable half of the remaining units, ask, keep the implicated half.
    Search,
    /// Print the units a session would test.
    List,
    /// Write a default `culprit.toml` and create the unit directory.
    Init {
        /// Overwrite an existing config.
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            exit_codes::FATAL
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let root = std::env::current_dir().context("resolve working directory")?;
    match cli.command {
        Command::Scan => cli::run_mode(&root, Mode::Scan),
        Command::Search => cli::run_mode(&root, Mode::Search),
        Command::List => cli::list_units(&root),
        Command::Init { force } => cli::init_config(&root, force),
    }
}
