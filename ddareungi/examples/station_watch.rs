//! Fetch the live station directory and print the best stations near a
//! point.
//!
//! Usage: SEOUL_OPENAPI_KEY=... cargo run --example station_watch

use ddareungi::config::InstanceConfig;
use ddareungi::instance::build_api_instance;
use ddareungi::nearby::{NearbyConfig, nearby_stations};

// Hongdae-ish center for the demo.
const CENTER: (f64, f64) = (37.5563, 126.9220);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let api_key = std::env::var("SEOUL_OPENAPI_KEY")
        .expect("set SEOUL_OPENAPI_KEY to an Open Data Plaza key");

    let config = InstanceConfig::api("example", api_key);
    let instance = build_api_instance(&config)
        .await
        .expect("failed to build instance");

    let snapshot = instance
        .coordinator
        .request_refresh()
        .await
        .expect("refresh failed");
    println!(
        "generation {}: {} stations ({} issues)",
        snapshot.generation,
        snapshot.stations.len(),
        snapshot.errors.len()
    );

    let nearby = nearby_stations(
        CENTER.0,
        CENTER.1,
        &snapshot.stations,
        &NearbyConfig {
            max_results: 5,
            ..NearbyConfig::default()
        },
    );
    for station in nearby {
        println!(
            "{:>8}  {:4} bikes  {:7.1} m  {}",
            station.code.as_str(),
            station.bikes_total,
            station.distance_m,
            station.name
        );
    }
}
