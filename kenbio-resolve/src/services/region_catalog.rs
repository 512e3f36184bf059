//! Region catalog
//!
//! Canonical list of administrative regions for the configured country,
//! fetched from the Registry and kept for the process lifetime (or the
//! configured TTL). Transport failures degrade to an empty list and are
//! never cached, so the next call retries.

use crate::models::Region;
use crate::normalize;
use crate::providers::RegistryApi;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

struct CachedRegions {
    fetched_at: Instant,
    regions: Vec<Region>,
}

/// Region catalog backed by the Registry
pub struct RegionCatalog {
    registry: Arc<dyn RegistryApi>,
    gadm_code: String,
    /// `None` keeps the list for the process lifetime
    ttl: Option<Duration>,
    cached: Mutex<Option<CachedRegions>>,
}

impl RegionCatalog {
    pub fn new(registry: Arc<dyn RegistryApi>, gadm_code: impl Into<String>, ttl: Option<Duration>) -> Self {
        Self {
            registry,
            gadm_code: gadm_code.into(),
            ttl,
            cached: Mutex::new(None),
        }
    }

    /// All regions, in Registry order
    ///
    /// Never fails: a transport error yields an empty list.
    pub async fn list_regions(&self) -> Vec<Region> {
        // Held across the fetch so concurrent callers share one request
        let mut cached = self.cached.lock().await;

        if let Some(entry) = cached.as_ref() {
            let fresh = self.ttl.map_or(true, |ttl| entry.fetched_at.elapsed() < ttl);
            if fresh {
                return entry.regions.clone();
            }
        }

        let raw = match self.registry.browse_regions(&self.gadm_code).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(country = %self.gadm_code, error = %e, "Failed to fetch region list");
                return Vec::new();
            }
        };

        let received = raw.len();
        let mut seen = HashSet::new();
        let regions: Vec<Region> = raw
            .into_iter()
            .filter_map(normalize::region)
            .filter(|r| seen.insert(r.id.clone()))
            .collect();

        if regions.len() != received {
            debug!(
                received,
                kept = regions.len(),
                "Dropped region records without id/name or with duplicate ids"
            );
        }

        if regions.is_empty() {
            warn!(country = %self.gadm_code, "Registry returned no regions");
            return regions;
        }

        info!(country = %self.gadm_code, count = regions.len(), "Loaded region catalog");
        *cached = Some(CachedRegions {
            fetched_at: Instant::now(),
            regions: regions.clone(),
        });

        regions
    }

    /// Drop the cached list; the next `list_regions` refetches
    pub async fn refresh(&self) {
        *self.cached.lock().await = None;
    }

    /// Regions whose name contains `term`, ignoring case, in catalog order
    ///
    /// A blank term matches every region.
    pub async fn search(&self, term: &str) -> Vec<Region> {
        let needle = term.trim().to_lowercase();
        let regions = self.list_regions().await;
        if needle.is_empty() {
            return regions;
        }
        regions
            .into_iter()
            .filter(|r| r.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Canonical name for a Registry region id
    pub async fn region_name(&self, region_id: &str) -> Option<String> {
        self.list_regions()
            .await
            .into_iter()
            .find(|r| r.id == region_id)
            .map(|r| r.name)
    }

    /// Name for display, falling back to the id itself when unknown
    pub async fn display_name(&self, region_id: &str) -> String {
        match self.region_name(region_id).await {
            Some(name) => name,
            None => {
                debug!(region_id, "Region id not in catalog, using id as name");
                region_id.to_string()
            }
        }
    }
}
