use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tracing::{error, info};

use waitlistd::config::Config;
use waitlistd::waitlist::store::{StoreConfig, WaitlistStore};
use waitlistd::waitlist::{Notifier, WaitlistService};
use waitlistd::{http, telemetry};

#[tokio::main]
async fn main() {
    telemetry::init();

    let config = Config::load();
    info!(version = env!("CARGO_PKG_VERSION"), "Starting waitlistd");

    let store_config = StoreConfig {
        path: Some(config.data_path.clone()),
        position_threshold: config.position_threshold,
    };
    let store = match WaitlistStore::connect(
        store_config,
        config.db_connect_tries,
        Duration::from_millis(config.db_connect_interval_ms),
    )
    .await
    {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!(error = %e, "Failed to open store after all retries");
            std::process::exit(1);
        }
    };

    let notifier = Notifier::new(
        config.mail_api_url.clone(),
        config.mail_api_key.clone(),
        config.mail_from.clone(),
    );
    if config.mail_api_url.is_none() {
        info!("MAIL_API_URL not set, notifications disabled");
    }

    let service = WaitlistService::new(store, notifier);
    let app = http::create_router(service, config.cors_allow_origin.as_deref());

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address)
        .await
        .expect("Failed to bind server address");
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    info!("Server shut down");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
