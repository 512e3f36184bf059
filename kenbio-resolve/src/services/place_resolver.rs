//! Region name → Observation Service place resolution
//!
//! The Observation Service has no notion of a county, so a region name is
//! looked up through its global free-text autocomplete and one candidate is
//! picked. The pick is a precision heuristic: a same-named place elsewhere
//! can still win when no candidate carries the country qualifier. Known
//! misses are fixed with per-region overrides, not by changing the rule.
//!
//! Bulk callers must pace their calls; the resolver does not throttle.

use crate::models::{PlaceCandidate, ResolvedPlace};
use crate::normalize;
use crate::providers::ObservationApi;
use moka::future::Cache;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Picks one autocomplete candidate for a region name
///
/// Implementations must be pure: same inputs, same choice.
pub trait PlaceMatchStrategy: Send + Sync {
    /// Strategy name for diagnostics
    fn name(&self) -> &'static str;

    /// Chosen candidate, or `None` to report the name as unresolved
    fn choose<'a>(&self, query: &str, candidates: &'a [PlaceCandidate]) -> Option<&'a PlaceCandidate>;
}

/// First candidate whose label contains `qualifier`, else the first candidate
///
/// Candidate order is the provider's relevance ranking and is trusted.
pub fn choose_place<'a>(qualifier: &str, candidates: &'a [PlaceCandidate]) -> Option<&'a PlaceCandidate> {
    candidates
        .iter()
        .find(|c| c.label().contains(qualifier))
        .or_else(|| candidates.first())
}

/// Default strategy: prefer country-qualified candidates
#[derive(Debug, Clone)]
pub struct CountryQualifiedMatch {
    qualifier: String,
}

impl CountryQualifiedMatch {
    pub fn new(qualifier: impl Into<String>) -> Self {
        Self {
            qualifier: qualifier.into(),
        }
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }
}

impl PlaceMatchStrategy for CountryQualifiedMatch {
    fn name(&self) -> &'static str {
        "country-qualified"
    }

    fn choose<'a>(&self, _query: &str, candidates: &'a [PlaceCandidate]) -> Option<&'a PlaceCandidate> {
        choose_place(&self.qualifier, candidates)
    }
}

/// Most resolutions kept by [`PlaceResolver::with_cache`]
pub const MAX_CACHED_PLACES: u64 = 1_024;

/// Cache and override key: case and surrounding whitespace are ignored
fn lookup_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Resolves region names to Observation Service place ids
pub struct PlaceResolver {
    observation: Arc<dyn ObservationApi>,
    strategy: Arc<dyn PlaceMatchStrategy>,
    per_page: u32,
    overrides: HashMap<String, String>,
    cache: Option<Cache<String, ResolvedPlace>>,
}

impl PlaceResolver {
    pub fn new(
        observation: Arc<dyn ObservationApi>,
        strategy: Arc<dyn PlaceMatchStrategy>,
        per_page: u32,
    ) -> Self {
        Self {
            observation,
            strategy,
            per_page: per_page.max(1),
            overrides: HashMap::new(),
            cache: None,
        }
    }

    /// Fixed place ids for region names the heuristic gets wrong
    ///
    /// Blank names or ids are skipped: an empty place id would scope the
    /// aggregate query to nothing.
    pub fn with_overrides<I, N, P>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (N, P)>,
        N: AsRef<str>,
        P: Into<String>,
    {
        for (name, id) in overrides {
            let name = name.as_ref();
            let id: String = id.into();
            let id = id.trim();
            if name.trim().is_empty() || id.is_empty() {
                warn!(region = %name, "Ignoring place override with a blank name or id");
                continue;
            }
            self.overrides.insert(lookup_key(name), id.to_string());
        }
        self
    }

    /// Keep successful resolutions for `ttl`, at most [`MAX_CACHED_PLACES`]
    pub fn with_cache(mut self, ttl: Duration) -> Self {
        self.cache = Some(
            Cache::builder()
                .max_capacity(MAX_CACHED_PLACES)
                .time_to_live(ttl)
                .build(),
        );
        self
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Resolve a region name
    ///
    /// Never fails: transport errors and empty candidate lists both yield
    /// `place_id: None`.
    pub async fn resolve(&self, name: &str) -> ResolvedPlace {
        let query = name.trim();
        if query.is_empty() {
            debug!("Blank region name, nothing to resolve");
            return ResolvedPlace::unresolved(name);
        }

        let key = lookup_key(query);

        if let Some(place_id) = self.overrides.get(&key) {
            debug!(region = %query, place_id = %place_id, "Using configured place override");
            return ResolvedPlace {
                query_name: name.to_string(),
                place_id: Some(place_id.clone()),
                matched_name: None,
            };
        }

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&key).await {
                return ResolvedPlace {
                    query_name: name.to_string(),
                    ..hit
                };
            }
        }

        let raw = match self.observation.autocomplete_places(query, self.per_page).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(region = %query, error = %e, "Place autocomplete failed");
                return ResolvedPlace::unresolved(name);
            }
        };

        let candidates: Vec<PlaceCandidate> = raw.into_iter().filter_map(normalize::place_candidate).collect();

        let Some(chosen) = self.strategy.choose(query, &candidates) else {
            info!(region = %query, strategy = self.strategy.name(), "No place candidates");
            return ResolvedPlace::unresolved(name);
        };

        info!(
            region = %query,
            place_id = %chosen.id,
            label = %chosen.label(),
            candidates = candidates.len(),
            "Resolved region to place"
        );

        let resolved = ResolvedPlace {
            query_name: name.to_string(),
            place_id: Some(chosen.id.clone()),
            matched_name: chosen.name.clone().or_else(|| chosen.display_name.clone()),
        };

        if let Some(cache) = &self.cache {
            cache.insert(key, resolved.clone()).await;
        }

        resolved
    }
}
