use std::future::Future;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use constcat::concat;
use edge_geolabel_kubeapi::KubeApi;
use edge_geolabel_updater::{
    ConfigurationError, CycleMetrics, GeoLocator, GeolocationUpdater, LifecycleState, Scheduler,
    SchedulerError,
};
use prometheus::Registry;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

mod config;
mod health;

const VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Parser)]
#[command(about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the geolocation updater and the health endpoints
    Start(config::Config),
    /// Print the version
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match Cli::parse().command {
        Command::Start(config) => start(config.validate()?).await,
        Command::Version => {
            println!("{VERSION}");
            Ok(())
        }
    }
}

async fn start(
    settings: config::Settings,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing::info!("Starting {VERSION}");

    let lifecycle = Arc::new(LifecycleState::new());
    let registry = Registry::new();

    let store = Arc::new(KubeApi::new().await?);
    let locator = GeoLocator::new(&settings.lookup_url, &settings.access_token)
        .map_err(ConfigurationError::Locator)?;
    let updater = GeolocationUpdater::new(&settings.node_name, Arc::new(locator), store)?
        .with_deadline(settings.cycle_timeout)
        .with_metrics(CycleMetrics::new(&registry)?);
    let scheduler =
        Scheduler::with_recurrence(settings.recurrence, updater, Arc::clone(&lifecycle));

    let scheduler = if settings.update_enabled {
        Some(scheduler)
    } else {
        tracing::info!("Public IP and geolocation updates are disabled");
        None
    };

    let listener = TcpListener::bind(&settings.http_addr).await?;
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Listening on http://{addr}");
    }
    serve(listener, lifecycle, registry, scheduler, shutdown_signal()).await?;

    tracing::info!("Stopped");
    Ok(())
}

/// Serves the health endpoints while the scheduler starts in the background.
///
/// Once `signal` fires the scheduler is stopped first, then the HTTP server
/// drains.
async fn serve(
    listener: TcpListener,
    lifecycle: Arc<LifecycleState>,
    registry: Registry,
    scheduler: Option<Scheduler>,
    signal: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let starting = scheduler.map(|mut scheduler| {
        tokio::spawn(async move { scheduler.start().await.map(|()| scheduler) })
    });

    let app = health::router(lifecycle, registry);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            signal.await;
            if let Some(starting) = starting {
                stop(starting).await;
            }
        })
        .await
}

async fn stop(starting: JoinHandle<Result<Scheduler, SchedulerError>>) {
    match starting.await {
        Ok(Ok(mut scheduler)) => {
            if let Err(err) = scheduler.stop().await {
                tracing::error!(?err, "Failed to stop the geolocation updater");
            }
        }
        Ok(Err(err)) => tracing::error!(?err, "Failed to start the geolocation updater"),
        Err(err) => tracing::error!(?err, "Geolocation updater start task failed"),
    }
}

/// Completes on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(?err, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    () = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(?err, "Cannot listen for SIGTERM");
                ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    ctrl_c.await;

    tracing::info!("Shutdown signal received");
}
