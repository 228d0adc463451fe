//! Seoul Open Data Plaza station directory client.

use std::collections::HashSet;
use std::time::Duration;

use serde_json::Value;

use crate::domain::{Station, StationCode, split_numbered_name};

use super::error::DirectoryError;

/// Default base URL for the Open Data Plaza bike service.
const DEFAULT_BASE_URL: &str = "http://openapi.seoul.go.kr:8088";

/// Dataset name within the Open API URL scheme.
const RESOURCE: &str = "bikeList";

/// Delay base for page retries; the second attempt waits twice this.
const PAGE_RETRY_DELAY: Duration = Duration::from_millis(800);

/// Configuration for the directory client.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// Open API key, embedded in the URL path by the upstream scheme
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Rows per page (upstream caps at 1000)
    pub page_size: u32,
    /// Upper bound on pages fetched in one pass
    pub max_pages: u32,
    /// Retries per page before the whole fetch is aborted
    pub page_retries: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl DirectoryConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: 1000,
            max_pages: 10,
            page_retries: 2,
            timeout_secs: 25,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the page size (clamped to the upstream maximum of 1000).
    pub fn with_page_size(mut self, rows: u32) -> Self {
        self.page_size = rows.clamp(1, 1000);
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// One full directory fetch: the parsed stations plus how many upstream
/// rows were dropped because they failed to parse.
#[derive(Debug, Clone)]
pub struct DirectoryFetch {
    pub stations: Vec<Station>,
    pub skipped: usize,
}

/// Client for the station-list Open API.
///
/// No authentication beyond the key in the URL; the full list is paged
/// because the upstream caps each request at 1000 rows.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    http: reqwest::Client,
    config: DirectoryConfig,
}

impl DirectoryClient {
    /// Create a new directory client.
    pub fn new(config: DirectoryConfig) -> Result<Self, DirectoryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    fn page_url(&self, start: u32, end: u32) -> String {
        format!(
            "{}/{}/json/{}/{}/{}/",
            self.config.base_url, self.config.api_key, RESOURCE, start, end
        )
    }

    /// Validate the configured key with a minimal one-row request.
    pub async fn validate_key(&self) -> Result<(), DirectoryError> {
        self.fetch_page(1, 1).await.map(|_| ())
    }

    /// Fetch one page of raw rows.
    ///
    /// The upstream wraps both data and errors in a `RESULT` envelope with
    /// HTTP 200, so the envelope code is what decides success.
    async fn fetch_page(&self, start: u32, end: u32) -> Result<Vec<Value>, DirectoryError> {
        let url = self.page_url(start, end);

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(DirectoryError::Unauthorized {
                message: format!("http_{}", status.as_u16()),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Api {
                code: status.as_u16().to_string(),
                message: body,
            });
        }

        let body = response.text().await?;
        let payload: Value = serde_json::from_str(&body).map_err(|e| DirectoryError::Json {
            message: e.to_string(),
        })?;

        // Error envelopes omit the dataset root and put RESULT at top level.
        let root = payload.get("rentBikeStatus").unwrap_or(&payload);
        let result = root.get("RESULT").or_else(|| payload.get("RESULT"));

        let code = result
            .and_then(|r| r.get("CODE"))
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim()
            .to_string();
        let message = result
            .and_then(|r| r.get("MESSAGE"))
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim()
            .to_string();

        if code != "INFO-000" {
            // Key problems come back as INFO-100 / ERROR-500 with a message
            // mentioning the key; anything else is a plain API error.
            if message.contains("인증") || message.to_uppercase().contains("KEY") {
                return Err(DirectoryError::Unauthorized { message });
            }
            return Err(DirectoryError::Api { code, message });
        }

        let rows = root
            .get("row")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Ok(rows)
    }

    async fn fetch_page_with_retry(&self, start: u32, end: u32) -> Result<Vec<Value>, DirectoryError> {
        let mut last_err: Option<DirectoryError> = None;

        for attempt in 0..=self.config.page_retries {
            match self.fetch_page(start, end).await {
                Ok(rows) => return Ok(rows),
                // Retrying a rejected key never helps.
                Err(err @ DirectoryError::Unauthorized { .. }) => return Err(err),
                Err(err) => last_err = Some(err),
            }

            if attempt < self.config.page_retries {
                tokio::time::sleep(PAGE_RETRY_DELAY * (attempt + 1)).await;
            }
        }

        Err(DirectoryError::Paging {
            start,
            end,
            message: last_err.map(|e| e.to_string()).unwrap_or_default(),
        })
    }

    /// Fetch the full station directory by paging.
    ///
    /// The upstream `list_total_count` is unreliable (it sometimes reports
    /// the page size instead of the total), so paging stops when a page
    /// comes back shorter than the page size. Rows that fail to parse are
    /// skipped and counted; a whole page failing aborts the fetch, since a
    /// missing page would silently drop stations.
    pub async fn fetch_all(&self) -> Result<DirectoryFetch, DirectoryError> {
        let mut stations = Vec::new();
        let mut seen = HashSet::new();
        let mut skipped = 0usize;
        let mut start = 1u32;

        for _ in 0..self.config.max_pages {
            let end = start + self.config.page_size - 1;
            let rows = self.fetch_page_with_retry(start, end).await?;
            let row_count = rows.len();

            for row in &rows {
                match row_to_station(row) {
                    Some(station) => {
                        // First occurrence wins; codes are unique per snapshot.
                        if seen.insert(station.code.clone()) {
                            stations.push(station);
                        }
                    }
                    None => skipped += 1,
                }
            }

            if row_count < self.config.page_size as usize {
                break;
            }
            start += self.config.page_size;
        }

        tracing::debug!(
            stations = stations.len(),
            skipped,
            "directory fetch complete"
        );

        Ok(DirectoryFetch { stations, skipped })
    }
}

/// Convert one upstream row into a `Station`.
///
/// The portal serves every field as a string; counts and coordinates that
/// fail to parse fall back to zero, but a row without a valid canonical
/// code is unusable and is skipped.
fn row_to_station(row: &Value) -> Option<Station> {
    let code = StationCode::parse(row.get("stationId")?.as_str()?.trim()).ok()?;

    let raw_name = row
        .get("stationName")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let (numeric_id, title) = split_numbered_name(raw_name);

    let bikes_total = value_u32(row.get("parkingBikeTotCnt")).unwrap_or(0);
    let bikes_general =
        value_u32(row.get("parkingBikeTotCntGeneral")).unwrap_or(bikes_total);
    let bikes_sprout = value_u32(row.get("parkingBikeTotCntTeen")).unwrap_or(0);
    let bikes_repair = value_u32(row.get("parkingBikeTotCntRepair")).unwrap_or(0);

    Some(Station {
        code,
        numeric_id,
        name: if title.is_empty() {
            raw_name.trim().to_string()
        } else {
            title.to_string()
        },
        lat: value_f64(row.get("stationLatitude")).unwrap_or(0.0),
        lon: value_f64(row.get("stationLongitude")).unwrap_or(0.0),
        bikes_total,
        bikes_general,
        bikes_sprout,
        bikes_repair,
    })
}

fn value_u32(v: Option<&Value>) -> Option<u32> {
    let v = v?;
    if let Some(n) = v.as_u64() {
        return u32::try_from(n).ok();
    }
    v.as_str()?.trim().parse().ok()
}

fn value_f64(v: Option<&Value>) -> Option<f64> {
    let v = v?;
    if let Some(n) = v.as_f64() {
        return Some(n);
    }
    v.as_str()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn config_defaults() {
        let config = DirectoryConfig::new("test-key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.page_size, 1000);
        assert_eq!(config.max_pages, 10);
        assert_eq!(config.timeout_secs, 25);
    }

    #[test]
    fn config_builder() {
        let config = DirectoryConfig::new("test-key")
            .with_base_url("http://localhost:8080")
            .with_page_size(5000)
            .with_timeout(5);
        assert_eq!(config.base_url, "http://localhost:8080");
        // clamped to the upstream cap
        assert_eq!(config.page_size, 1000);
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn page_url_shape() {
        let client = DirectoryClient::new(DirectoryConfig::new("KEY")).unwrap();
        assert_eq!(
            client.page_url(1, 1000),
            "http://openapi.seoul.go.kr:8088/KEY/json/bikeList/1/1000/"
        );
    }

    #[test]
    fn row_conversion_parses_string_fields() {
        let row = json!({
            "stationId": "ST-3685",
            "stationName": "102. 망원역 1번출구 앞",
            "stationLatitude": "37.5556488",
            "stationLongitude": "126.9101334",
            "parkingBikeTotCnt": "12",
            "parkingBikeTotCntGeneral": "10",
            "parkingBikeTotCntTeen": "2",
        });

        let station = row_to_station(&row).unwrap();
        assert_eq!(station.code.as_str(), "ST-3685");
        assert_eq!(station.numeric_id, Some(102));
        assert_eq!(station.name, "망원역 1번출구 앞");
        assert_eq!(station.bikes_total, 12);
        assert_eq!(station.bikes_general, 10);
        assert_eq!(station.bikes_sprout, 2);
        assert_eq!(station.bikes_repair, 0);
        assert!((station.lat - 37.5556488).abs() < 1e-9);
    }

    #[test]
    fn row_without_breakdown_defaults_general_to_total() {
        let row = json!({
            "stationId": "ST-1",
            "stationName": "1. somewhere",
            "parkingBikeTotCnt": "7",
        });

        let station = row_to_station(&row).unwrap();
        assert_eq!(station.bikes_total, 7);
        assert_eq!(station.bikes_general, 7);
    }

    #[test]
    fn row_without_station_id_is_skipped() {
        assert!(row_to_station(&json!({ "stationName": "no id" })).is_none());
        assert!(row_to_station(&json!({ "stationId": "garbage" })).is_none());
    }

    #[test]
    fn numeric_json_fields_are_accepted_too() {
        let row = json!({
            "stationId": "ST-2",
            "stationName": "2. elsewhere",
            "parkingBikeTotCnt": 3,
            "stationLatitude": 37.5,
        });

        let station = row_to_station(&row).unwrap();
        assert_eq!(station.bikes_total, 3);
        assert!((station.lat - 37.5).abs() < 1e-9);
    }
}
