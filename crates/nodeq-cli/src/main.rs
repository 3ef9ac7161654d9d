//! nodeq CLI - command-line interface for nodeq
//!
//! Starts the interactive graph shell by default and offers a few
//! one-shot commands for inspecting graph files.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod repl;
mod session;

use config::Config;

#[derive(Parser)]
#[command(name = "nodeq")]
#[command(author = "nodeq Contributors")]
#[command(version)]
#[command(about = "Build, query and save directed graphs of named nodes", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./nodeq.json, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive shell (the default)
    Repl {
        /// Graph file to load on startup
        file: Option<PathBuf>,

        /// Read commands from a file instead of the terminal ('-' for stdin)
        #[arg(long)]
        script: Option<PathBuf>,

        /// Keep running a script after a failing command
        #[arg(long, requires = "script")]
        continue_on_error: bool,
    },

    /// Write a default config file
    Init {
        /// Directory to write nodeq.json into
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Print every node of a graph file with its children
    Show {
        /// Graph file
        file: PathBuf,
    },

    /// Validate a graph file and print statistics
    Check {
        /// Graph file
        file: PathBuf,
    },

    /// Export a graph file to JSON
    Export {
        /// Graph file
        file: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "nodeq-graph.json")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so they never mix with the shell transcript.
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    if !config.color {
        colored::control::set_override(false);
    }

    let command = cli.command.unwrap_or(Commands::Repl {
        file: None,
        script: None,
        continue_on_error: false,
    });

    let result = match command {
        Commands::Repl {
            file,
            script,
            continue_on_error,
        } => commands::repl(
            &config,
            file.as_deref(),
            script.as_deref(),
            continue_on_error,
        ),
        Commands::Init { path } => commands::init(&path),
        Commands::Show { file } => commands::show(&file),
        Commands::Check { file } => commands::check(&file),
        Commands::Export { file, output } => commands::export(&file, &output),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
