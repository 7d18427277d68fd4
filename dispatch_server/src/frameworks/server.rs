// Framework bootstrap for the dispatch server runtime.

use crate::frameworks::config;
use crate::interface_adapters::routes;
use crate::interface_adapters::state::AppState;
use crate::use_cases::{DispatchSettings, Dispatcher};

use std::net::SocketAddr;
use std::{io::Result, sync::Arc};
use tokio::sync::Mutex;

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state();

    // Wire the HTTP routes and the staff socket.
    let app = routes::app(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state() -> Arc<AppState> {
    let settings = DispatchSettings {
        default_timeout: config::default_assignment_timeout(),
        resolved_memory: config::RESOLVED_MEMORY,
    };
    tracing::debug!(
        default_timeout_ms = settings.default_timeout.as_millis(),
        resolved_memory = settings.resolved_memory,
        "dispatcher configured"
    );

    Arc::new(AppState {
        dispatcher: Arc::new(Mutex::new(Dispatcher::new(settings))),
        outbox_capacity: config::OUTBOX_CAPACITY,
    })
}
