use std::sync::Arc;

use amped_server::config::AppConfig;
use amped_server::publisher::AnnotationPublisher;
use amped_server::refresh::{PeriodicScheduler, RefreshCoordinator};
use amped_server::stations::{FeedSource, MockStationClient, StationClient, StationClientConfig};
use amped_server::walking::WalkingTimes;
use amped_server::web::{AppState, create_router};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("amped_server=info")),
        )
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    // Pick the station feed
    let source = match &config.mock_data {
        Some(path) => {
            info!(path = %path.display(), "using mock station data");
            FeedSource::Mock(MockStationClient::from_file(path).expect("Failed to load mock data"))
        }
        None => {
            let mut client_config =
                StationClientConfig::new().with_timeout(config.http_timeout_secs);
            if let Some(url) = &config.feed_url {
                client_config = client_config.with_base_url(url);
            }
            let client =
                StationClient::new(client_config).expect("Failed to create station client");
            FeedSource::Http(client)
        }
    };

    let publisher = Arc::new(AnnotationPublisher::new());
    let coordinator = Arc::new(RefreshCoordinator::new(
        source,
        publisher,
        config.min_display_duration,
    ));

    // Initial load shows the loading indicator, like opening the map
    let outcome = coordinator.refresh(false).await;
    if !outcome.is_published() {
        warn!(?outcome, "initial station load failed; will retry on next tick");
    }

    // Silent background refresh
    let scheduler = PeriodicScheduler::new(coordinator.clone());
    scheduler.start(config.refresh_interval);

    let state = AppState::new(coordinator, WalkingTimes::default(), config.show_empty_stations);
    let app = create_router(state);

    let addr = config.bind_addr;
    info!("Amped listening on http://{addr}");
    info!("  GET  /                          - Status page");
    info!("  GET  /health                    - Health check");
    info!("  GET  /api/snapshot              - Published station snapshot");
    info!("  POST /api/refresh               - Refresh now");
    info!("  GET  /api/stations/:id/walk     - Walking time to a station");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");

    scheduler.stop();
}
