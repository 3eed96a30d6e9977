use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::{City, CollectItem, Coordinates, GeoState},
    error::FormError,
    protocol::CreatePointRequest,
};
use tracing::info;

pub mod catalog;
pub mod config;
pub mod form;
pub mod geo;
mod http;
pub mod location;

pub use catalog::HttpCatalogClient;
pub use config::{load_settings, Settings};
pub use form::{FetchOutcome, FetchRequest, FormPhase, FormState, Slice, SubmitRejected};
pub use geo::IbgeClient;
pub use location::{FixedGeolocator, HttpGeolocator};

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_items(&self) -> Result<Vec<CollectItem>, FormError>;
    async fn create_point(&self, request: &CreatePointRequest) -> Result<(), FormError>;
}

#[async_trait]
pub trait GeoDivisionApi: Send + Sync {
    async fn list_states(&self) -> Result<Vec<GeoState>, FormError>;
    async fn list_cities(&self, state: &str) -> Result<Vec<City>, FormError>;
}

#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, FormError>;
}

/// The external services the form talks to.
#[derive(Clone)]
pub struct Services {
    pub catalog: Arc<dyn CatalogApi>,
    pub geo: Arc<dyn GeoDivisionApi>,
    pub locator: Arc<dyn Geolocator>,
}

impl Services {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let locator: Arc<dyn Geolocator> = match &settings.geolocation_url {
            Some(url) => Arc::new(HttpGeolocator::new(url, settings.request_timeout())?),
            None => Arc::new(FixedGeolocator::new(settings.fallback_position)),
        };
        info!(
            api = %settings.api_base_url,
            geo = %settings.geo_base_url,
            "configured collect point services"
        );

        Ok(Self {
            catalog: Arc::new(HttpCatalogClient::from_settings(settings)?),
            geo: Arc::new(IbgeClient::from_settings(settings)?),
            locator,
        })
    }

    pub async fn fetch(&self, request: FetchRequest) -> FetchOutcome {
        match request {
            FetchRequest::Location => FetchOutcome::Location(self.locator.current_position().await),
            FetchRequest::Items => FetchOutcome::Items(self.catalog.list_items().await),
            FetchRequest::States => FetchOutcome::States(self.geo.list_states().await),
            FetchRequest::Cities { state, generation } => FetchOutcome::Cities {
                generation,
                result: self.geo.list_cities(&state).await,
            },
        }
    }

    pub async fn submit(&self, request: &CreatePointRequest) -> Result<(), FormError> {
        self.catalog.create_point(request).await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
