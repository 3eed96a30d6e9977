//! Client for the collect point API: the item catalog and point submission.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::CollectItem,
    error::{FormError, Resource},
    protocol::{CollectItemPayload, CreatePointRequest},
};
use tracing::{info, warn};
use url::Url;

use crate::{
    config::Settings,
    http::{build_client, endpoint},
    CatalogApi,
};

#[derive(Clone)]
pub struct HttpCatalogClient {
    http: Client,
    base_url: Url,
}

impl HttpCatalogClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: build_client(timeout)?,
            base_url,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(settings.api_base()?, settings.request_timeout())
    }

    async fn fetch_items(&self) -> Result<Vec<CollectItem>> {
        let url = endpoint(&self.base_url, &["items"])?;
        let items: Vec<CollectItemPayload> = self
            .http
            .get(url)
            .send()
            .await
            .context("failed to reach item catalog")?
            .error_for_status()?
            .json()
            .await
            .context("invalid item catalog payload")?;
        Ok(items.into_iter().map(CollectItem::from).collect())
    }

    async fn post_point(&self, request: &CreatePointRequest) -> Result<()> {
        let url = endpoint(&self.base_url, &["points"])?;
        self.http
            .post(url)
            .json(request)
            .send()
            .await
            .context("failed to reach collect point endpoint")?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    async fn list_items(&self) -> Result<Vec<CollectItem>, FormError> {
        match self.fetch_items().await {
            Ok(items) => {
                info!(count = items.len(), "loaded item catalog");
                Ok(items)
            }
            Err(err) => {
                warn!("item catalog fetch failed: {err:#}");
                Err(FormError::fetch(Resource::Items, format!("{err:#}")))
            }
        }
    }

    async fn create_point(&self, request: &CreatePointRequest) -> Result<(), FormError> {
        self.post_point(request).await.map_err(|err| {
            warn!(name = %request.name, "collect point submission failed: {err:#}");
            FormError::submission(format!("{err:#}"))
        })?;
        info!(
            name = %request.name,
            items = request.collect_items.len(),
            "collect point created"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
