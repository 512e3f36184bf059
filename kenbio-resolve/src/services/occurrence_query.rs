//! Raw Registry occurrences by region id
//!
//! The Registry shares the region id space, so no place resolution is
//! involved. Records are passed through unnormalized.

use crate::models::{OccurrencePage, OccurrenceSearch, RegistrySpecies};
use crate::normalize;
use crate::providers::RegistryApi;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Largest page the occurrence search serves
pub const MAX_OCCURRENCE_LIMIT: u32 = 300;

/// Occurrence search and species lookup against the Registry
pub struct OccurrenceQuery {
    registry: Arc<dyn RegistryApi>,
    country_iso2: String,
}

impl OccurrenceQuery {
    pub fn new(registry: Arc<dyn RegistryApi>, country_iso2: impl Into<String>) -> Self {
        Self {
            registry,
            country_iso2: country_iso2.into(),
        }
    }

    /// One page of occurrences; `{ total: 0, records: [] }` on any failure
    ///
    /// `limit = 0` is a count-only query.
    pub async fn search(&self, search: &OccurrenceSearch) -> OccurrencePage {
        if search.region_id.trim().is_empty() {
            // Without a region filter the Registry would answer for the whole country
            warn!("Occurrence search without a region id");
            return OccurrencePage::empty();
        }

        let mut search = search.clone();
        search.limit = search.limit.min(MAX_OCCURRENCE_LIMIT);

        match self.registry.search_occurrences(&self.country_iso2, &search).await {
            Ok(raw) => {
                let page = OccurrencePage {
                    total: raw.count.unwrap_or(raw.results.len() as u64),
                    records: raw.results,
                };
                debug!(
                    region = %search.region_id,
                    total = page.total,
                    returned = page.records.len(),
                    "Fetched occurrences"
                );
                page
            }
            Err(e) => {
                warn!(region = %search.region_id, error = %e, "Occurrence search failed");
                OccurrencePage::empty()
            }
        }
    }

    /// Registry species record, `None` when unknown or on failure
    pub async fn species(&self, key: u64) -> Option<RegistrySpecies> {
        if key == 0 {
            return None;
        }

        match self.registry.species(key).await {
            Ok(raw) => Some(normalize::registry_species(raw, key)),
            Err(e) if e.is_not_found() => {
                info!(key, "Registry species not found");
                None
            }
            Err(e) => {
                warn!(key, error = %e, "Registry species lookup failed");
                None
            }
        }
    }
}
