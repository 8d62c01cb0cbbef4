use std::error::Error;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use timetable_monitor::board::BoardBuilder;
use timetable_monitor::cache::{CacheConfig, CachedGateway};
use timetable_monitor::config::MonitorConfig;
use timetable_monitor::reconcile::ReconciliationCache;
use timetable_monitor::timetables::{MockGateway, TimetableClient, TimetableConfig};
use timetable_monitor::web::{AppState, FeedSource, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("timetable_monitor=info,tower_http=info")),
        )
        .init();

    let config = MonitorConfig::from_env()?;

    // Pick the feed source
    let source = match &config.mock_dir {
        Some(dir) => {
            let mock = MockGateway::from_dir(dir)?;
            info!(
                dir = %dir.display(),
                buckets = mock.available_buckets().len(),
                "serving fixture feeds"
            );
            FeedSource::Mock(mock)
        }
        None => {
            let mut client_config =
                TimetableConfig::new(config.station).with_base_url(&config.base_url);
            match &config.api_key {
                Some(key) => client_config = client_config.with_api_key(key),
                None => warn!("TIMETABLE_API_KEY not set. API calls may be rejected."),
            }
            let client = TimetableClient::new(client_config)?;
            FeedSource::Http(CachedGateway::new(client, &CacheConfig::default()))
        }
    };

    let builder = BoardBuilder::new(config.station, ReconciliationCache::new(source));
    let state = AppState::new(builder, config.board.clone());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(station = %config.station, addr = %config.bind, "timetable monitor listening");
    info!("  GET  /health  - Health check");
    info!("  GET  /board   - Departures and arrivals (?lookbehind=&lookahead=&at=)");
    info!("  GET  /stops   - Reconciled stops");

    axum::serve(listener, app).await?;
    Ok(())
}
