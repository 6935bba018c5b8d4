// src/main.rs: Phoenix hosted entrypoint
// Boots the control plane on the host OS: disks are directories, the console is this terminal.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use phoenix::config::DiskConfig;
use phoenix::{logging, Config, Kernel, Machine};

#[derive(Parser)]
#[command(
    name = "phoenix",
    version,
    about = "Phoenix control plane: boot, command shell, fault containment",
    long_about = "Boots the Phoenix control plane on the host. Each --disk directory is a block device whose part<N> subdirectories are partitions."
)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "PHOENIX_CONFIG")]
    config: Option<PathBuf>,

    /// Host directory to attach as a hard drive (repeatable)
    #[arg(short, long = "disk")]
    disks: Vec<PathBuf>,

    /// Show DEBUG log lines on the console
    #[arg(long)]
    debug: bool,

    /// tracing filter for stderr, used when PHOENIX_LOG is unset
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            return ExitCode::FAILURE;
        }
    };
    config
        .storage
        .disks
        .extend(cli.disks.into_iter().map(DiskConfig::hard_drive));
    if cli.debug {
        config.system.debug = true;
    }
    if let Some(level) = cli.log_level {
        config.system.log_level = level;
    }

    logging::init_tracing(&config.system.log_level);
    tracing::debug!(disks = config.storage.disks.len(), "configuration loaded");

    let machine = Machine::hosted(&config);
    Kernel::new(machine, config).start();
    ExitCode::SUCCESS
}
