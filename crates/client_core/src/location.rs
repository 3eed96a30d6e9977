//! Device position providers.
//!
//! A desktop has no browser geolocation, so the position comes either from a
//! configured JSON endpoint or from the configured fallback coordinates.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::{domain::Coordinates, error::FormError};
use tracing::{debug, warn};
use url::Url;

use crate::{
    http::{build_client, parse_base_url},
    Geolocator,
};

#[derive(Debug, Deserialize)]
struct PositionPayload {
    #[serde(alias = "lat")]
    latitude: f64,
    #[serde(alias = "lon", alias = "lng")]
    longitude: f64,
}

fn validate(position: Coordinates) -> Result<Coordinates> {
    let Coordinates {
        latitude,
        longitude,
    } = position;
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(anyhow!(
            "position out of range: latitude={latitude} longitude={longitude}"
        ));
    }
    Ok(position)
}

/// Reads a single current position from an HTTP endpoint.
pub struct HttpGeolocator {
    http: Client,
    url: Url,
}

impl HttpGeolocator {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: build_client(timeout)?,
            url: parse_base_url(url)?,
        })
    }

    async fn read_position(&self) -> Result<Coordinates> {
        let payload: PositionPayload = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .context("failed to reach geolocation endpoint")?
            .error_for_status()?
            .json()
            .await
            .context("invalid geolocation payload")?;
        validate(Coordinates::new(payload.latitude, payload.longitude))
    }
}

#[async_trait]
impl Geolocator for HttpGeolocator {
    async fn current_position(&self) -> Result<Coordinates, FormError> {
        let position = self.read_position().await.map_err(|err| {
            warn!("geolocation lookup failed: {err:#}");
            FormError::geolocation(format!("{err:#}"))
        })?;
        debug!(
            latitude = position.latitude,
            longitude = position.longitude,
            "resolved device position"
        );
        Ok(position)
    }
}

/// Position known up front, or none at all.
pub struct FixedGeolocator {
    position: Option<Coordinates>,
}

impl FixedGeolocator {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> Result<Coordinates, FormError> {
        match self.position {
            Some(position) => validate(position).map_err(|err| FormError::geolocation(err.to_string())),
            None => Err(FormError::geolocation(
                "no geolocation endpoint or default position configured",
            )),
        }
    }
}

#[cfg(test)]
#[path = "tests/location_tests.rs"]
mod tests;
