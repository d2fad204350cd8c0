//! Bike-share station availability HTTP client.

use serde::Deserialize;
use tracing::warn;

use crate::domain::{Coordinate, Station, StationId};

use super::error::StationError;
use super::source::StationSource;

/// Default base URL for the station availability feed.
const DEFAULT_BASE_URL: &str = "https://amped-feed.example.com/api/v1";

/// Longest response body excerpt kept in a JSON error.
const ERROR_BODY_LIMIT: usize = 500;

/// Wire location object.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationDto {
    pub lat: f64,
    pub lng: f64,
}

/// Wire representation of one station, as served by the feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationDto {
    pub station_id: String,
    pub station_name: String,
    pub location: LocationDto,
    pub total_bikes_available: u32,
    pub ebikes_available: u32,
    #[serde(default)]
    pub is_offline: bool,
}

impl StationDto {
    /// Validate into a domain `Station`.
    fn into_station(self) -> Result<Station, crate::domain::DomainError> {
        Ok(Station {
            id: StationId::parse(&self.station_id)?,
            name: self.station_name,
            location: Coordinate::new(self.location.lat, self.location.lng)?,
            total_bikes_available: self.total_bikes_available,
            ebikes_available: self.ebikes_available,
            is_offline: self.is_offline,
        })
    }
}

/// Convert wire records to domain stations.
///
/// Records that fail validation are logged and skipped rather than failing
/// the whole batch.
pub(crate) fn convert_stations(dtos: Vec<StationDto>) -> Vec<Station> {
    dtos.into_iter()
        .filter_map(|dto| {
            let raw_id = dto.station_id.clone();
            match dto.into_station() {
                Ok(station) => Some(station),
                Err(e) => {
                    warn!(station_id = %raw_id, error = %e, "skipping invalid station record");
                    None
                }
            }
        })
        .collect()
}

/// Parse a feed response body (a JSON array of stations).
pub(crate) fn parse_stations(body: &str) -> Result<Vec<Station>, StationError> {
    let dtos: Vec<StationDto> = serde_json::from_str(body).map_err(|e| StationError::Json {
        message: e.to_string(),
        body: Some(body.chars().take(ERROR_BODY_LIMIT).collect()),
    })?;
    Ok(convert_stations(dtos))
}

/// Configuration for the station feed client.
#[derive(Debug, Clone)]
pub struct StationClientConfig {
    /// Base URL for the feed
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header sent with each request
    pub user_agent: String,
}

impl StationClientConfig {
    /// Create a config pointing at the default feed.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            user_agent: concat!("amped-server/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for StationClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the station availability feed.
#[derive(Debug, Clone)]
pub struct StationClient {
    http: reqwest::Client,
    base_url: String,
}

impl StationClient {
    /// Create a new feed client.
    pub fn new(config: StationClientConfig) -> Result<Self, StationError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch every station from the feed.
    pub async fn fetch_all(&self) -> Result<Vec<Station>, StationError> {
        let url = format!("{}/stations", self.base_url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(StationError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StationError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        parse_stations(&body)
    }
}

impl StationSource for StationClient {
    async fn fetch_stations(&self) -> Result<Vec<Station>, StationError> {
        self.fetch_all().await
    }
}
