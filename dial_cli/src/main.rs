mod cli;
mod commands;
mod error_fmt;
mod logging;
mod rt;

use clap::Parser;
use cli::{Cli, Commands, JSON_MODE};
use commands::ListenOpts;
use dial_core::DialError;
use eyre::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "command failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            println!("{}", error_fmt::format_error_json(&e));
        } else {
            eprintln!("{}", error_fmt::humanize(&e));
        }
        std::process::exit(error_fmt::exit_code_for_error(&e));
    }
}

fn run(cli: Cli) -> Result<()> {
    let cfg = dial_config::load_file(&cli.config).map_err(|e| DialError::Config(e.to_string()))?;
    cfg.validate()
        .map_err(|e| DialError::Config(e.to_string()))?;
    logging::init_tracing(cli.json, &cli.log_level, &cfg.logging);
    tracing::debug!(config = ?cli.config, "config loaded");

    match cli.cmd {
        Commands::Listen {
            simulate,
            once,
            rt,
            rt_prio,
            rt_lock,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = shutdown.clone();
            ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                .map_err(|e| eyre::eyre!("failed to install Ctrl-C handler: {e}"))?;
            commands::listen(
                &cfg,
                ListenOpts {
                    simulate: simulate.as_deref(),
                    once,
                    rt,
                    rt_prio,
                    rt_lock,
                },
                cli.json,
                shutdown,
            )
        }
        Commands::Simulate {
            number,
            gap_ms,
            realtime,
        } => commands::simulate(&cfg, &number, gap_ms, realtime, cli.json),
        Commands::SelfCheck => commands::self_check(&cfg, cli.json),
    }
}
