//! Upstream provider seams
//!
//! Services depend on these traits rather than on HTTP, so each stage can
//! be exercised against a substituted upstream. The reqwest adapters are
//! [`RegistryClient`] and [`ObservationClient`].

pub mod http;
pub mod observation_client;
pub mod registry_client;
pub mod wire;

#[cfg(test)]
pub(crate) mod testing;

use crate::error::ProviderResult;
use crate::models::{GeoPoint, OccurrenceSearch};
use wire::{
    RawOccurrencePage, RawPlace, RawRegion, RawSpecies, RawSpeciesCountsResponse, RawTaxon,
    RawVisionResponse,
};

pub use observation_client::ObservationClient;
pub use registry_client::RegistryClient;

/// Query for the Observation Service species-count aggregate
///
/// The verifiable/photos/rank/order constraints are fixed by the adapter;
/// only the varying parts are carried here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesCountsQuery {
    pub place_id: String,
    pub taxon_id: Option<u64>,
    pub per_page: u32,
    pub page: u32,
}

/// Administrative-boundary and raw-occurrence provider
#[async_trait::async_trait]
pub trait RegistryApi: Send + Sync {
    /// Level-1 regions for a GADM country code
    async fn browse_regions(&self, gadm_code: &str) -> ProviderResult<Vec<RawRegion>>;

    /// Raw occurrence search restricted to `country` (ISO alpha-2)
    async fn search_occurrences(
        &self,
        country: &str,
        search: &OccurrenceSearch,
    ) -> ProviderResult<RawOccurrencePage>;

    /// Species record by Registry key; `NotFound` when the key is unknown
    async fn species(&self, key: u64) -> ProviderResult<RawSpecies>;
}

/// Citizen-science observation and vision-identification provider
#[async_trait::async_trait]
pub trait ObservationApi: Send + Sync {
    /// Free-text place autocomplete, candidates in provider relevance order
    async fn autocomplete_places(&self, query: &str, per_page: u32)
        -> ProviderResult<Vec<RawPlace>>;

    async fn species_counts(
        &self,
        query: &SpeciesCountsQuery,
    ) -> ProviderResult<RawSpeciesCountsResponse>;

    /// Taxon record by id; `Ok(None)` when the provider returns no result
    async fn taxon(&self, taxon_id: u64) -> ProviderResult<Option<RawTaxon>>;

    /// Computer-vision scoring of an image biased towards `point`
    async fn score_image(&self, image: Vec<u8>, point: GeoPoint)
        -> ProviderResult<RawVisionResponse>;
}
