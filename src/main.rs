mod cli;
mod commands;
mod config;
mod engine;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::Config;
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub config: Config,
    /// Config file that was loaded, `None` when running on defaults
    pub config_path: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "confport", &mut io::stdout());
        return Ok(());
    }

    let config_path = Config::locate(cli.config.as_deref())?;
    let config = Config::load(config_path.as_deref())?;
    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config,
        config_path,
    };
    log::debug!("verbosity {}", ctx.verbose);

    match cli.command {
        Command::Names(args) => commands::names::run(&ctx, args),
        Command::Export(args) => commands::export::run(&ctx, args),
        Command::Diff(args) => commands::diff::run(&ctx, args),
        Command::Config => commands::config::run(&ctx),
        Command::Completions { .. } => Ok(()),
    }
}
