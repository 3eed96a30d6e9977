//! Client for the geo-division service (states and their cities).

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{City, GeoState},
    error::{FormError, Resource},
    protocol::{CityPayload, GeoStatePayload},
};
use tracing::{debug, warn};
use url::Url;

use crate::{
    config::Settings,
    http::{build_client, endpoint},
    GeoDivisionApi,
};

#[derive(Clone)]
pub struct IbgeClient {
    http: Client,
    base_url: Url,
}

impl IbgeClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: build_client(timeout)?,
            base_url,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(settings.geo_base()?, settings.request_timeout())
    }

    async fn fetch_states(&self) -> Result<Vec<GeoState>> {
        let mut url = endpoint(&self.base_url, &["estados"])?;
        url.query_pairs_mut().append_pair("orderBy", "nome");

        let states: Vec<GeoStatePayload> = self
            .http
            .get(url)
            .send()
            .await
            .context("failed to reach geo-division service")?
            .error_for_status()?
            .json()
            .await
            .context("invalid state list payload")?;
        Ok(states.into_iter().map(GeoState::from).collect())
    }

    async fn fetch_cities(&self, state: &str) -> Result<Vec<City>> {
        let url = endpoint(&self.base_url, &["estados", state, "municipios"])?;
        let cities: Vec<CityPayload> = self
            .http
            .get(url)
            .send()
            .await
            .context("failed to reach geo-division service")?
            .error_for_status()?
            .json()
            .await
            .context("invalid city list payload")?;
        Ok(cities.into_iter().map(|city| city.nome).collect())
    }
}

#[async_trait]
impl GeoDivisionApi for IbgeClient {
    async fn list_states(&self) -> Result<Vec<GeoState>, FormError> {
        let states = self.fetch_states().await.map_err(|err| {
            warn!("state list fetch failed: {err:#}");
            FormError::fetch(Resource::States, format!("{err:#}"))
        })?;
        debug!(count = states.len(), "loaded state list");
        Ok(states)
    }

    async fn list_cities(&self, state: &str) -> Result<Vec<City>, FormError> {
        let cities = self.fetch_cities(state).await.map_err(|err| {
            warn!(state, "city list fetch failed: {err:#}");
            FormError::fetch(Resource::Cities, format!("{err:#}"))
        })?;
        debug!(state, count = cities.len(), "loaded city list");
        Ok(cities)
    }
}

#[cfg(test)]
#[path = "tests/geo_tests.rs"]
mod tests;
