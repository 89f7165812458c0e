mod cli;
mod config;
mod edit;
mod entry;
mod error;
mod manifest;
mod persist;
mod tui;

use clap::Parser;
use config::ResolvedConfig;
use crossterm::tty::IsTty;
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::OpenOptions;
use std::path::PathBuf;

fn main() {
    let cli_args = cli::Cli::parse();
    let work_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = config::resolve_config(&work_dir, cli_args.config.as_deref(), cli_args.overrides());
    init_logging(&config);

    // Headless action → CLI
    // --interactive, or bare invocation with a TTY → TUI
    // Otherwise → list entries
    let interactive =
        cli_args.interactive || (!cli_args.has_action() && std::io::stdout().is_tty());
    let result = if interactive {
        tui::run_tui(&config)
    } else {
        cli::run(cli_args, &config)
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Log to a file; the terminal belongs to the TUI. Failure is not fatal.
fn init_logging(config: &ResolvedConfig) {
    let Some(path) = &config.log_file else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = OpenOptions::new().create(true).append(true).open(path) {
        let _ = WriteLogger::init(config.log_level, log_config, log_file);
    }
    log::info!("manifest-edit starting on {}", config.manifest.display());
}
