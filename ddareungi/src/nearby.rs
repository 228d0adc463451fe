//! Nearby-station recommendation.
//!
//! Ranks directory stations around a center point (the home location or a
//! tracked entity's position) by available bikes, closest first among
//! equals. Pure computation over the latest snapshot; the caller decides
//! where the center comes from.

use crate::domain::{Station, StationCode};

/// Filters for the recommendation.
#[derive(Debug, Clone)]
pub struct NearbyConfig {
    /// Search radius around the center, in meters.
    pub radius_m: f64,
    /// Stations with fewer available bikes are dropped.
    pub min_bikes: u32,
    /// Result cap; 0 means unlimited.
    pub max_results: usize,
}

impl Default for NearbyConfig {
    fn default() -> Self {
        Self {
            radius_m: 500.0,
            min_bikes: 1,
            max_results: 0,
        }
    }
}

/// One recommended station.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyStation {
    pub code: StationCode,
    pub name: String,
    pub bikes_total: u32,
    /// Distance from the center, rounded to 0.1 m.
    pub distance_m: f64,
}

/// Great-circle distance in meters.
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;

    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

/// Stations within the radius, most bikes first, nearer first among ties.
///
/// Stations without coordinates (the upstream serves zeros when unknown)
/// are excluded.
pub fn nearby_stations(
    center_lat: f64,
    center_lon: f64,
    stations: &[Station],
    config: &NearbyConfig,
) -> Vec<NearbyStation> {
    let mut candidates: Vec<NearbyStation> = stations
        .iter()
        .filter(|s| s.lat != 0.0 && s.lon != 0.0)
        .filter_map(|s| {
            let distance = haversine_m(center_lat, center_lon, s.lat, s.lon);
            if distance > config.radius_m || s.bikes_total < config.min_bikes {
                return None;
            }
            Some(NearbyStation {
                code: s.code.clone(),
                name: s.name.clone(),
                bikes_total: s.bikes_total,
                distance_m: (distance * 10.0).round() / 10.0,
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.bikes_total.cmp(&a.bikes_total).then(
            a.distance_m
                .partial_cmp(&b.distance_m)
                .unwrap_or(std::cmp::Ordering::Equal),
        )
    });

    if config.max_results > 0 {
        candidates.truncate(config.max_results);
    }
    candidates
}
