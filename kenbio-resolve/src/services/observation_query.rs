//! Species-occurrence aggregates for a region
//!
//! Two linear stages: resolve the region name to a place, then fetch the
//! provider's species-count aggregate for that place. Either stage failing
//! yields an empty list.

use super::place_resolver::PlaceResolver;
use crate::models::{AggregateRequest, OccurrenceAggregate, ResolvedPlace};
use crate::normalize;
use crate::providers::{ObservationApi, SpeciesCountsQuery};
use std::sync::Arc;
use tracing::{debug, warn};

/// Largest page the species-count endpoint serves
pub const MAX_PAGE_SIZE: u32 = 500;

/// Aggregated species counts per region
pub struct ObservationQuery {
    resolver: Arc<PlaceResolver>,
    observation: Arc<dyn ObservationApi>,
}

impl ObservationQuery {
    pub fn new(resolver: Arc<PlaceResolver>, observation: Arc<dyn ObservationApi>) -> Self {
        Self {
            resolver,
            observation,
        }
    }

    /// Most-observed species first, first page
    pub async fn get_aggregates(
        &self,
        region_name: &str,
        taxon_scope: Option<u64>,
        limit: u32,
    ) -> Vec<OccurrenceAggregate> {
        self.query(region_name, &AggregateRequest::new(taxon_scope, limit))
            .await
    }

    /// Resolve then aggregate
    pub async fn query(&self, region_name: &str, request: &AggregateRequest) -> Vec<OccurrenceAggregate> {
        let place = self.resolver.resolve(region_name).await;
        self.fetch_aggregates(&place, request).await
    }

    /// Second stage only, for an already resolved place
    ///
    /// Provider order (descending observation count) is kept as returned.
    pub async fn fetch_aggregates(
        &self,
        place: &ResolvedPlace,
        request: &AggregateRequest,
    ) -> Vec<OccurrenceAggregate> {
        let Some(place_id) = place.place_id.as_deref() else {
            warn!(region = %place.query_name, "Place id not found, no aggregates available");
            return Vec::new();
        };

        if request.limit == 0 {
            return Vec::new();
        }

        let query = SpeciesCountsQuery {
            place_id: place_id.to_string(),
            taxon_id: request.taxon_scope,
            per_page: request.limit.min(MAX_PAGE_SIZE),
            page: request.page.max(1),
        };

        let body = match self.observation.species_counts(&query).await {
            Ok(body) => body,
            Err(e) => {
                warn!(
                    region = %place.query_name,
                    place_id = %place_id,
                    taxon_scope = ?request.taxon_scope,
                    error = %e,
                    "Species count query failed"
                );
                return Vec::new();
            }
        };

        let received = body.results.len();
        let aggregates: Vec<OccurrenceAggregate> = body
            .results
            .into_iter()
            .filter_map(normalize::occurrence_aggregate)
            .collect();

        if aggregates.len() != received {
            debug!(
                received,
                kept = aggregates.len(),
                "Dropped species count entries without a usable taxon"
            );
        }

        if !is_descending(&aggregates) {
            warn!(
                place_id = %place_id,
                "Provider returned species counts out of observation-count order"
            );
        }

        debug!(
            region = %place.query_name,
            place_id = %place_id,
            count = aggregates.len(),
            total = ?body.total_results,
            "Fetched species aggregates"
        );

        aggregates
    }
}

/// Aggregates whose common or scientific name contains `term`, ignoring case
///
/// Order is kept; a blank term keeps everything.
pub fn filter_aggregates(aggregates: &[OccurrenceAggregate], term: &str) -> Vec<OccurrenceAggregate> {
    let needle = term.trim().to_lowercase();
    aggregates
        .iter()
        .filter(|a| {
            needle.is_empty()
                || a.taxon.scientific_name.to_lowercase().contains(&needle)
                || a
                    .taxon
                    .common_name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

fn is_descending(aggregates: &[OccurrenceAggregate]) -> bool {
    aggregates
        .windows(2)
        .all(|pair| pair[0].observation_count >= pair[1].observation_count)
}
