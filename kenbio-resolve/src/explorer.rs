//! Component wiring
//!
//! [`Explorer`] builds every service from a [`TomlConfig`] and exposes the
//! read operations consumers call. Components stay public for callers that
//! need one stage on its own.

use crate::error::ProviderResult;
use crate::models::{
    AggregateRequest, GeoPoint, IdentificationCandidate, OccurrenceAggregate, OccurrencePage,
    OccurrenceSearch, Region, RegistrySpecies, ResolvedPlace, TaxonDetail,
};
use crate::providers::{ObservationApi, ObservationClient, RegistryApi, RegistryClient};
use crate::services::{
    verify_regions, CountryQualifiedMatch, ObservationQuery, OccurrenceQuery, PlaceResolver,
    RegionCatalog, TaxonDetailFetcher, VerificationReport, VisionIdentifier,
};
use futures::stream::{self, StreamExt};
use kenbio_common::config::TomlConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Regions aggregated at once by [`Explorer::aggregates_for_regions`]
pub const DEFAULT_REGION_CONCURRENCY: usize = 4;

/// Aggregates for one region of a multi-region query
#[derive(Debug, Clone)]
pub struct RegionAggregates {
    pub region: Region,
    pub place: ResolvedPlace,
    pub aggregates: Vec<OccurrenceAggregate>,
}

/// All services for one country, sharing two provider clients
pub struct Explorer {
    pub catalog: RegionCatalog,
    pub resolver: Arc<PlaceResolver>,
    pub observations: ObservationQuery,
    pub taxon_detail: TaxonDetailFetcher,
    pub vision: VisionIdentifier,
    pub occurrences: OccurrenceQuery,
}

impl Explorer {
    /// Build HTTP clients and services from configuration
    pub fn from_config(config: &TomlConfig) -> ProviderResult<Self> {
        let registry: Arc<dyn RegistryApi> = Arc::new(RegistryClient::from_config(&config.registry)?);
        let observation: Arc<dyn ObservationApi> =
            Arc::new(ObservationClient::from_config(&config.observation)?);

        info!(
            country = %config.country.gadm_code,
            registry = %config.registry.base_url,
            observation = %config.observation.base_url,
            overrides = config.place_overrides.len(),
            "Explorer configured"
        );

        Ok(Self::with_providers(config, registry, observation))
    }

    /// Wire services over caller-supplied providers
    pub fn with_providers(
        config: &TomlConfig,
        registry: Arc<dyn RegistryApi>,
        observation: Arc<dyn ObservationApi>,
    ) -> Self {
        let catalog = RegionCatalog::new(
            registry.clone(),
            config.country.gadm_code.clone(),
            config.cache.region_ttl(),
        );

        let mut resolver = PlaceResolver::new(
            observation.clone(),
            Arc::new(CountryQualifiedMatch::new(config.country.qualifier.clone())),
            config.observation.autocomplete_per_page,
        )
        .with_overrides(
            config
                .place_overrides
                .iter()
                .map(|(name, id)| (name.as_str(), id.to_string())),
        );
        if let Some(ttl) = config.cache.place_ttl() {
            resolver = resolver.with_cache(ttl);
        }
        let resolver = Arc::new(resolver);

        let mut taxon_detail = TaxonDetailFetcher::new(observation.clone());
        if let Some(ttl) = config.cache.detail_ttl() {
            taxon_detail = taxon_detail.with_cache(ttl);
        }

        let default_point = GeoPoint::new(
            config.observation.default_latitude,
            config.observation.default_longitude,
        );

        Self {
            catalog,
            observations: ObservationQuery::new(resolver.clone(), observation.clone()),
            resolver,
            taxon_detail,
            vision: VisionIdentifier::new(observation, default_point),
            occurrences: OccurrenceQuery::new(registry, config.country.iso2.clone()),
        }
    }

    pub async fn list_regions(&self) -> Vec<Region> {
        self.catalog.list_regions().await
    }

    pub async fn resolve_place(&self, region_name: &str) -> ResolvedPlace {
        self.resolver.resolve(region_name).await
    }

    pub async fn get_aggregates(
        &self,
        region_name: &str,
        taxon_scope: Option<u64>,
        limit: u32,
    ) -> Vec<OccurrenceAggregate> {
        self.observations
            .get_aggregates(region_name, taxon_scope, limit)
            .await
    }

    pub async fn get_taxon_detail(&self, taxon_id: u64) -> Option<TaxonDetail> {
        self.taxon_detail.get_detail(taxon_id).await
    }

    pub async fn identify(
        &self,
        image: &[u8],
        lat: Option<f64>,
        lon: Option<f64>,
    ) -> Vec<IdentificationCandidate> {
        self.vision.identify(image, lat, lon).await
    }

    pub async fn search_occurrences(&self, search: &OccurrenceSearch) -> OccurrencePage {
        self.occurrences.search(search).await
    }

    pub async fn registry_species(&self, key: u64) -> Option<RegistrySpecies> {
        self.occurrences.species(key).await
    }

    /// Aggregates for several regions, at most `concurrency` in flight
    ///
    /// Results come back in input order. Regions are independent; one
    /// failing leaves the others untouched.
    pub async fn aggregates_for_regions(
        &self,
        regions: &[Region],
        request: &AggregateRequest,
        concurrency: usize,
    ) -> Vec<RegionAggregates> {
        stream::iter(regions.iter().cloned())
            .map(|region| async move {
                let place = self.resolver.resolve(&region.name).await;
                let aggregates = self.observations.fetch_aggregates(&place, request).await;
                RegionAggregates {
                    region,
                    place,
                    aggregates,
                }
            })
            .buffered(concurrency.max(1))
            .collect()
            .await
    }

    /// Resolve every catalog region, paced
    pub async fn verify(&self, pacing: Duration, cancel: &CancellationToken) -> VerificationReport {
        let regions = self.catalog.list_regions().await;
        verify_regions(&regions, &self.resolver, pacing, cancel).await
    }
}
