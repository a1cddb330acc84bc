use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use board_master::adapters::http::{api_router, AppState};
use board_master::adapters::postgres::{
    PostgresCompletionRepository, PostgresCycleRepository, PostgresLearnerRepository,
    PostgresPointsLedger, PostgresTaskRepository,
};
use board_master::adapters::{InMemoryStore, SweepScheduler, SystemClock};
use board_master::config::AppConfig;
use board_master::ports::Clock;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    let calendar = config.schedule.calendar()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let state = match &config.database {
        Some(database) => {
            let pool = database.pool_options().connect(&database.url).await?;
            tracing::info!("Database connection pool created");

            if database.run_migrations {
                sqlx::migrate!("./migrations").run(&pool).await?;
                tracing::info!("Database migrations applied");
            }

            AppState {
                learners: Arc::new(PostgresLearnerRepository::new(pool.clone())),
                cycles: Arc::new(PostgresCycleRepository::new(pool.clone())),
                tasks: Arc::new(PostgresTaskRepository::new(pool.clone())),
                completions: Arc::new(PostgresCompletionRepository::new(pool.clone())),
                ledger: Arc::new(PostgresPointsLedger::new(pool)),
                clock,
                calendar,
            }
        }
        None => {
            tracing::warn!("No database configured, using the in-memory store");
            AppState::from_store(Arc::new(InMemoryStore::new()), clock, calendar)
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = config.schedule.sweep_enabled.then(|| {
        let scheduler = SweepScheduler::new(state.sweeper(), config.schedule.sweep_interval());
        tokio::spawn(scheduler.run(shutdown_rx))
    });

    let app = api_router(state, config.server.request_timeout());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        utc_offset_minutes = calendar.offset_minutes(),
        "Starting server"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped accepting connections");
    let _ = shutdown_tx.send(true);
    if let Some(handle) = scheduler {
        let _ = handle.await;
    }
    tracing::info!("Graceful shutdown complete");

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Resolves on SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
