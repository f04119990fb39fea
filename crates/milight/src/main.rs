//! MiLight - command line control for MiLight Wi-Fi bulbs
//!
//! One-shot commands (`on`, `hue`, `true-color`, ...) talk to a single
//! receiver; `discover` lists receivers on the network; `ambient` keeps an
//! RGBW group in sync with the screen until interrupted.

mod cli;
mod commands;
mod config;
mod logging;
mod logging_setup;

use anyhow::{bail, Context, Result};
use clap::Parser;
use milight_ambient::CancellationToken;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cli::{Cli, Command, ConfigAction};
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(AppConfig::default_path);
    let config = match &config_path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    let mut log_config = config.logging.clone();
    match cli.verbose {
        0 => {}
        1 => log_config.level = "debug".to_string(),
        _ => log_config.level = "trace".to_string(),
    }
    let _log_guard = logging_setup::init(&log_config)?;

    match cli.command {
        Command::Discover { json, linger_ms } => {
            tokio::task::spawn_blocking(move || {
                commands::discover(Duration::from_millis(linger_ms), json, &mut std::io::stdout())
            })
            .await??;
        }
        Command::Monitors => commands::monitors(&mut std::io::stdout())?,
        Command::Config { action } => run_config(action, config_path, &config)?,
        Command::Ambient(args) => {
            let settings = commands::ambient_settings(config.ambient.clone(), &args);
            let receiver = config.receiver.clone();
            let address = cli.receiver.clone();
            let dry_run = cli.dry_run;

            let token = CancellationToken::new();
            let worker_token = token.clone();
            let worker = tokio::task::spawn_blocking(move || {
                let controller = commands::connect(address.as_deref(), &receiver, dry_run)?;
                commands::run_ambient(controller, &settings, &worker_token)
            });

            supervise(worker, &token, tokio::signal::ctrl_c()).await?;
        }
        Command::Light(command) => {
            let receiver = config.receiver.clone();
            let address = cli.receiver.clone();
            let dry_run = cli.dry_run;
            tokio::task::spawn_blocking(move || {
                let mut controller = commands::connect(address.as_deref(), &receiver, dry_run)?;
                commands::execute(&mut controller, &command)
            })
            .await??;
        }
    }

    Ok(())
}

/// Wait for the ambient worker, cancelling it when `interrupt` resolves.
///
/// A failed interrupt listener also cancels the worker, since nothing else
/// could stop it; its error is returned once the worker has finished.
async fn supervise<I>(
    mut worker: JoinHandle<Result<()>>,
    token: &CancellationToken,
    interrupt: I,
) -> Result<()>
where
    I: Future<Output = std::io::Result<()>>,
{
    tokio::select! {
        result = &mut worker => result?,
        signal = interrupt => {
            token.cancel();
            match signal {
                Ok(()) => {
                    info!("Interrupted, stopping ambient loop");
                    worker.await?
                }
                Err(e) => {
                    warn!("Failed to listen for Ctrl-C, stopping ambient loop: {}", e);
                    worker.await??;
                    Err(e).context("Failed to listen for Ctrl-C")
                }
            }
        }
    }
}

fn run_config(action: ConfigAction, path: Option<PathBuf>, config: &AppConfig) -> Result<()> {
    match action {
        ConfigAction::Path => match path {
            Some(path) => println!("{}", path.display()),
            None => bail!("No config directory on this system, pass --config"),
        },
        ConfigAction::Show => print!("{}", config.to_toml()?),
        ConfigAction::Write { force } => {
            let path = path.context("No config directory on this system, pass --config")?;
            if path.exists() && !force {
                bail!("{} already exists, use --force to replace it", path.display());
            }
            config.save(&path)?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}
