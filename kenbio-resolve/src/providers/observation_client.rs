//! Observation Service (iNaturalist) API client
//!
//! Endpoints used:
//! - `GET /places/autocomplete`
//! - `GET /observations/species_counts`
//! - `GET /taxa/{id}`
//! - `POST /computervision/score_image` (multipart)

use super::http::{build_client, decode_json, endpoint};
use super::wire::{RawPlace, RawPlaceResponse, RawSpeciesCountsResponse, RawTaxaResponse, RawTaxon, RawVisionResponse};
use super::{ObservationApi, SpeciesCountsQuery};
use crate::error::ProviderResult;
use crate::models::GeoPoint;
use kenbio_common::config::{get_user_agent, ObservationConfig};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;

/// Observation Service API client
pub struct ObservationClient {
    client: Client,
    base_url: String,
}

impl ObservationClient {
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

    pub fn from_config(config: &ObservationConfig) -> ProviderResult<Self> {
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

/// Query string for the species-count aggregate
///
/// Verifiable observations with photos only, species rank only, most
/// observed first.
pub(crate) fn species_counts_params(query: &SpeciesCountsQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![("place_id", query.place_id.clone())];

    if let Some(taxon_id) = query.taxon_id {
        params.push(("taxon_id", taxon_id.to_string()));
    }

    params.extend([
        ("per_page", query.per_page.to_string()),
        ("page", query.page.to_string()),
        ("verifiable", "true".to_string()),
        ("photos", "true".to_string()),
        ("order_by", "observations_count".to_string()),
        ("hrank", "species".to_string()),
        ("lrank", "species".to_string()),
    ]);

    params
}

/// Best-effort content type from magic bytes
fn sniff_image_mime(image: &[u8]) -> &'static str {
    match image {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => "application/octet-stream",
    }
}

#[async_trait::async_trait]
impl ObservationApi for ObservationClient {
    async fn autocomplete_places(&self, query: &str, per_page: u32) -> ProviderResult<Vec<RawPlace>> {
        let url = endpoint(&self.base_url, "places/autocomplete");
        tracing::debug!(url = %url, q = %query, per_page, "Querying place autocomplete");

        let response = self
            .client
            .get(&url)
            .query(&[("q", query.to_string()), ("per_page", per_page.to_string())])
            .send()
            .await?;

        let body: RawPlaceResponse = decode_json(response, &format!("places matching '{}'", query)).await?;
        Ok(body.results)
    }

    async fn species_counts(&self, query: &SpeciesCountsQuery) -> ProviderResult<RawSpeciesCountsResponse> {
        let url = endpoint(&self.base_url, "observations/species_counts");
        let params = species_counts_params(query);
        tracing::debug!(url = %url, place_id = %query.place_id, taxon_id = ?query.taxon_id, "Querying species counts");

        let response = self.client.get(&url).query(&params).send().await?;
        decode_json(response, &format!("species counts for place {}", query.place_id)).await
    }

    async fn taxon(&self, taxon_id: u64) -> ProviderResult<Option<RawTaxon>> {
        let url = endpoint(&self.base_url, &format!("taxa/{}", taxon_id));
        tracing::debug!(url = %url, "Querying taxon");

        let response = self.client.get(&url).send().await?;
        let body: RawTaxaResponse = decode_json(response, &format!("taxon {}", taxon_id)).await?;
        Ok(body.results.into_iter().next())
    }

    async fn score_image(&self, image: Vec<u8>, point: GeoPoint) -> ProviderResult<RawVisionResponse> {
        let url = endpoint(&self.base_url, "computervision/score_image");
        let mime = sniff_image_mime(&image);
        tracing::debug!(url = %url, bytes = image.len(), mime, "Submitting image for scoring");

        let part = Part::bytes(image).file_name("image").mime_str(mime)?;
        let form = Form::new()
            .part("image", part)
            .text("lat", point.latitude.to_string())
            .text("lng", point.longitude.to_string());

        let response = self.client.post(&url).multipart(form).send().await?;
        decode_json(response, "image score").await
    }
}
