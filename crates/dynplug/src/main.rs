// SPDX-FileCopyrightText: 2026 Dynplug Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dynplug - dynamic plugin discovery and loading host.
//!
//! This is the binary entry point for inspecting and serving a plugin root.

mod check;
mod inspect;
mod watch;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dynplug_config::DynplugConfig;

/// Dynplug - dynamic plugin discovery and loading host.
#[derive(Parser, Debug)]
#[command(name = "dynplug", version, about, long_about = None)]
struct Cli {
    /// Configuration file to load instead of the standard locations.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List the packages found under the plugin root.
    Scan,
    /// Scan and load, then list the plugins that loaded.
    List,
    /// Run diagnostic checks against the plugin root.
    Check {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Load plugins and reload them whenever the configuration file changes.
    Watch,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            dynplug_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.host.log_level);

    let result = match cli.command {
        Some(Commands::Scan) => inspect::run_scan(&config).await,
        Some(Commands::List) => inspect::run_list(&config).await,
        Some(Commands::Check { plain }) => check::run_check(&config, plain).await,
        Some(Commands::Watch) => watch::run_watch(config, cli.config).await,
        None => {
            println!("dynplug: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn load_config(
    path: Option<&std::path::Path>,
) -> Result<DynplugConfig, Vec<dynplug_config::ConfigError>> {
    match path {
        Some(path) => dynplug_config::load_and_validate_path(path),
        None => dynplug_config::load_and_validate(),
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dynplug={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
