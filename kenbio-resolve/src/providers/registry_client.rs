//! Registry (GBIF) API client
//!
//! Endpoints used:
//! - `GET /geocode/gadm/browse/{countryCode}`
//! - `GET /occurrence/search`
//! - `GET /species/{key}`

use super::http::{build_client, decode_json, endpoint};
use super::wire::{RawOccurrencePage, RawRegion, RawSpecies};
use super::RegistryApi;
use crate::error::ProviderResult;
use crate::models::OccurrenceSearch;
use kenbio_common::config::{get_user_agent, RegistryConfig};
use reqwest::Client;
use std::time::Duration;

/// Registry API client
pub struct RegistryClient {
    client: Client,
    base_url: String,
}

impl RegistryClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> ProviderResult<Self> {
        Ok(Self {
            client: build_client(timeout, connect_timeout, &get_user_agent())?,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &RegistryConfig) -> ProviderResult<Self> {
        Self::new(
            config.base_url.clone(),
            config.timeout(),
            config.connect_timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Query string for an occurrence search
///
/// Optional filters are omitted rather than sent empty.
pub(crate) fn occurrence_params(country: &str, search: &OccurrenceSearch) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("country", country.to_string()),
        ("gadmGid", search.region_id.clone()),
        ("limit", search.limit.to_string()),
        ("offset", search.offset.to_string()),
    ];

    if let Some(kingdom) = search.kingdom {
        params.push(("kingdomKey", kingdom.to_string()));
    }
    if let Some(class) = search.class {
        params.push(("classKey", class.to_string()));
    }
    if search.require_image {
        params.push(("mediaType", "StillImage".to_string()));
    }

    params
}

#[async_trait::async_trait]
impl RegistryApi for RegistryClient {
    async fn browse_regions(&self, gadm_code: &str) -> ProviderResult<Vec<RawRegion>> {
        let url = endpoint(&self.base_url, &format!("geocode/gadm/browse/{}", gadm_code));
        tracing::debug!(url = %url, "Querying Registry region browse");

        let response = self.client.get(&url).send().await?;
        decode_json(response, &format!("country {}", gadm_code)).await
    }

    async fn search_occurrences(
        &self,
        country: &str,
        search: &OccurrenceSearch,
    ) -> ProviderResult<RawOccurrencePage> {
        let url = endpoint(&self.base_url, "occurrence/search");
        let params = occurrence_params(country, search);
        tracing::debug!(url = %url, region = %search.region_id, "Querying Registry occurrences");

        let response = self.client.get(&url).query(&params).send().await?;
        decode_json(response, &format!("occurrences for {}", search.region_id)).await
    }

    async fn species(&self, key: u64) -> ProviderResult<RawSpecies> {
        let url = endpoint(&self.base_url, &format!("species/{}", key));
        tracing::debug!(url = %url, "Querying Registry species");

        let response = self.client.get(&url).send().await?;
        decode_json(response, &format!("species {}", key)).await
    }
}
