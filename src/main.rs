use awacs_server::Config;
use tracing::info;
use std::error::Error;
use std::future::Future;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use awacs_server::adapters::inbound::HttpLocatingService;
use awacs_server::adapters::outbound::{
    describe_kafka_setup, init_combined_logger, HttpLightController, KafkaTelemetrySink,
};
use awacs_server::application::{Collaborators, Scheduler};
use awacs_server::domains::logger::FileLogger;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Set the subscriber directly: the `log` facade belongs to fast_log.
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting AWACS server");

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let config = Config::load(&config_path)?;
    info!("Configuration loaded from {}", config_path);
    info!("Locating service: {}", config.locating.base_url);
    info!("Light controller: {} ({} zones)", config.lights.control_url, config.lights.zones.len());
    describe_kafka_setup(&config.kafka);

    let logger = init_combined_logger(config.logging.file.as_deref());

    let collaborators = Collaborators {
        source: Arc::new(HttpLocatingService::new(&config.locating)?),
        actuator: Arc::new(HttpLightController::new(&config.lights)?),
        sink: Arc::new(KafkaTelemetrySink::new(&config.kafka)?),
    };

    // Must be installed before the self-test; until then SIGINT kills the
    // process with the lights in whatever state the sweep left them.
    let shutdown = shutdown_signal()?;

    let mut scheduler = Scheduler::from_config(&config, collaborators, logger.clone());
    info!("Entering startup and cycle loop");
    let cycles = scheduler.serve(shutdown).await;

    logger.info(&format!("Stopped after {} cycles", cycles));
    FileLogger::flush();
    info!("AWACS server stopped");

    Ok(())
}

#[cfg(unix)]
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    Ok(async move {
        tokio::select! {
            _ = interrupt.recv() => info!("SIGINT received"),
            _ = terminate.recv() => info!("SIGTERM received"),
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    let ctrl_c = tokio::spawn(tokio::signal::ctrl_c());
    Ok(async move {
        if let Ok(Err(e)) = ctrl_c.await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    })
}
