//! Autosigner server.
//!
//! Provisions the session on the simulated network, starts the periodic
//! monitor and serves the push channel until Ctrl-C.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use autosigner::adapters::activity_log::FileActivityLog;
use autosigner::adapters::oracle::{HttpPositionOracle, InMemoryPositionOracle};
use autosigner::adapters::venue::SimulatedNetwork;
use autosigner::adapters::websocket::{push_router, PushState};
use autosigner::application::{
    provision_session, ActionTrigger, ConcurrencyGate, DeferredCheckpoints,
    DelegationOrchestrator, PeriodicMonitor, ProgressBus, SessionTerms, SubmissionVerifier,
};
use autosigner::config::AppConfig;
use autosigner::ports::PositionOracle;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    let binding = config.venue.binding()?;
    let network = SimulatedNetwork::new(config.venue.simulation_config()?);
    let ledger = Arc::new(network.ledger());
    let rollup = Arc::new(network.rollup());
    let verifier = SubmissionVerifier::new(config.orchestrator.receipt_retry());

    provision_session(
        ledger.as_ref(),
        &verifier,
        &binding,
        SessionTerms {
            ttl_secs: config.venue.session_ttl_secs,
            max_exposure: config.venue.max_exposure,
            strategy_mask: config.venue.strategy_mask(),
            range_low: config.venue.range_low,
            range_high: config.venue.range_high,
        },
    )
    .await?;

    let oracle: Arc<dyn PositionOracle> = match &config.oracle.endpoint {
        Some(endpoint) => {
            tracing::info!(endpoint = %endpoint, "Using HTTP position oracle");
            Arc::new(HttpPositionOracle::new(
                endpoint.clone(),
                config.oracle.timeout(),
            )?)
        }
        None => {
            tracing::info!("No oracle endpoint configured, serving a static snapshot");
            Arc::new(InMemoryPositionOracle::new(
                config.oracle.static_snapshot()?,
            ))
        }
    };

    let bus = ProgressBus::new(config.push.channel_capacity);
    let deferred = DeferredCheckpoints::new();

    let orchestrator = Arc::new(DelegationOrchestrator::new(
        oracle.clone(),
        ledger.clone(),
        rollup,
        bus.clone(),
        binding.clone(),
        deferred.clone(),
        config.orchestrator.orchestrator_config(),
    ));
    let gate = ConcurrencyGate::new();
    let trigger = ActionTrigger::new(gate.clone(), orchestrator, bus.clone());

    let monitor = PeriodicMonitor::new(
        oracle,
        ledger,
        Arc::new(FileActivityLog::new(&config.monitor.activity_log_path)),
        bus.clone(),
        binding,
        deferred,
        verifier,
        config.monitor.monitor_config(),
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor_task = tokio::spawn(async move { monitor.run(shutdown_rx).await });

    let addr = config.server.socket_addr()?;
    let state = PushState::new(
        trigger,
        bus,
        config.push.auth_token,
        config.push.triggers_per_minute,
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Push channel listening");

    axum::serve(listener, push_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if gate.is_held() {
        tracing::info!("Waiting for the in-flight workflow to finish");
    }
    gate.wait_idle().await;

    let _ = shutdown_tx.send(true);
    if let Err(e) = monitor_task.await {
        tracing::error!(error = %e, "Monitor task ended abnormally");
    }
    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
