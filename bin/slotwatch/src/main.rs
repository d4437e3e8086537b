use clap::{Parser, Subcommand};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use slotwatch_browser::ChromeController;
use slotwatch_core::{Credentials, Settings};
use slotwatch_monitor::{run_check, watch};
use slotwatch_notify::{NotificationMessage, Notifier, SmtpNotifier};

#[derive(Parser)]
#[command(name = "slotwatch")]
#[command(about = "Visa appointment availability monitor", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single availability check and exit
    Check,

    /// Monitor continuously with a fixed delay between checks
    Watch {
        /// Seconds between checks (overrides CHECK_INTERVAL_SECS)
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose);

    // Missing credentials fail here, before any browser session exists.
    let credentials = Credentials::from_env()?;
    let mut settings = Settings::from_env();
    if let Commands::Watch {
        interval: Some(secs),
    } = &cli.command
    {
        settings.check_interval = Duration::from_secs(*secs);
    }

    let controller = ChromeController::new(settings.clone());
    let notifier = SmtpNotifier::new(&credentials, &settings)?;

    match cli.command {
        Commands::Check => {
            // Single-shot mode always exits 0: availability is communicated
            // by email, failures by the log.
            if let Err(e) = run_check(&controller, &credentials, &settings, &notifier).await {
                error!("Check failed: {}", e);
            }
            info!("Check complete. Exiting.");
        }
        Commands::Watch { .. } => {
            info!("Starting visa appointment monitor...");
            if let Err(e) = notifier.send(&NotificationMessage::monitor_started()).await {
                error!("Failed to send notification: {}", e);
            }

            let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Monitor stopped by user");
                    let _ = shutdown_tx.send(());
                }
            });

            let controller = &controller;
            let credentials = &credentials;
            let settings = &settings;
            let notifier = &notifier;
            watch::run(settings.check_interval, shutdown_rx, move || {
                run_check(controller, credentials, settings, notifier)
            })
            .await;
        }
    }

    Ok(())
}

/// Stdout plus `slotwatch.log` in the working directory. Initialized once;
/// never reconfigured mid-run. The returned guard must live for the whole
/// process so buffered file output is flushed on exit.
fn init_logging(verbose: bool) -> tracing_appender::non_blocking::WorkerGuard {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let file_appender = tracing_appender::rolling::never(".", "slotwatch.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}
