use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::services::{check_status, ServiceError};

const KOREA: &str = "한국";
const DEFAULT_KOREAN_CITY: &str = "서울";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// `"37.5665, 126.9780"`: the label used when no place name is known.
    pub fn label(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Place name for the coordinates, or `None` when the service knows no name.
    async fn reverse_geocode(&self, at: Coordinates) -> Result<Option<String>, ServiceError>;

    async fn locate_by_ip(&self) -> Result<String, ServiceError>;
}

#[derive(Debug, Default, Deserialize)]
pub struct ReverseGeocodeResponse {
    pub display_name: Option<String>,
    #[serde(default)]
    pub address: ReverseGeocodeAddress,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReverseGeocodeAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub country_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IpLookupResponse {
    pub city: Option<String>,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Korean addresses are shortened to `{city}, 한국`; others use the full display name.
pub fn place_name(response: &ReverseGeocodeResponse) -> Option<String> {
    let display = non_blank(&response.display_name)?;
    let address = &response.address;
    if address.country_code.as_deref() == Some("kr") {
        let locality = non_blank(&address.city)
            .or_else(|| non_blank(&address.town))
            .or_else(|| non_blank(&address.village))
            .unwrap_or_default();
        return Some(format!("{locality}, {KOREA}"));
    }
    Some(display.to_string())
}

pub fn ip_place_name(response: &IpLookupResponse) -> String {
    if response.country_code.as_deref() == Some("KR") {
        let city = non_blank(&response.city).unwrap_or(DEFAULT_KOREAN_CITY);
        return format!("{city}, {KOREA}");
    }
    format!(
        "{}, {}",
        non_blank(&response.city).unwrap_or_default(),
        non_blank(&response.country_name).unwrap_or_default()
    )
}

/// Nominatim-style reverse geocoding plus an ipapi-style IP lookup.
pub struct HttpLocationProvider {
    client: Client,
    reverse_url: String,
    ip_url: String,
}

impl HttpLocationProvider {
    pub fn new(client: Client, reverse_url: impl Into<String>, ip_url: impl Into<String>) -> Self {
        Self {
            client,
            reverse_url: reverse_url.into(),
            ip_url: ip_url.into(),
        }
    }
}

#[async_trait]
impl LocationProvider for HttpLocationProvider {
    async fn reverse_geocode(&self, at: Coordinates) -> Result<Option<String>, ServiceError> {
        let response = self
            .client
            .get(&self.reverse_url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", at.latitude.to_string()),
                ("lon", at.longitude.to_string()),
                ("zoom", "10".to_string()),
            ])
            .send()
            .await?;
        let body: ReverseGeocodeResponse = check_status(response).await?.json().await?;
        Ok(place_name(&body))
    }

    async fn locate_by_ip(&self) -> Result<String, ServiceError> {
        let response = self.client.get(&self.ip_url).send().await?;
        let body: IpLookupResponse = check_status(response).await?.json().await?;
        Ok(ip_place_name(&body))
    }
}

/// Resolves a display location for the contact block.
///
/// With coordinates: reverse geocode, then IP lookup if the service is down, then
/// the formatted coordinates. Without coordinates: IP lookup only.
pub async fn detect_location(
    provider: &dyn LocationProvider,
    coordinates: Option<Coordinates>,
) -> Result<String, ServiceError> {
    if let Some(at) = coordinates {
        match provider.reverse_geocode(at).await {
            Ok(Some(name)) => return Ok(name),
            Ok(None) => return Ok(at.label()),
            Err(e) => warn!("Reverse geocoding failed, trying IP lookup: {e}"),
        }
    }

    match provider.locate_by_ip().await {
        Ok(name) => {
            info!("Location resolved by IP lookup");
            Ok(name)
        }
        Err(e) => {
            warn!("IP location lookup failed: {e}");
            match coordinates {
                Some(at) => Ok(at.label()),
                None => Err(ServiceError::LocationUnavailable),
            }
        }
    }
}
