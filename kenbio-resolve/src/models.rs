//! Typed records produced by the resolution layer
//!
//! Everything here is built by [`crate::normalize`]; optional provider fields
//! are `None`, never placeholder text.

use serde::{Deserialize, Serialize};

/// Administrative region (county) as issued by the Registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    /// Registry identifier (GADM gid, e.g. "KEN.30_1")
    pub id: String,
    /// Canonical name, used as the join key into the Observation Service
    pub name: String,
}

/// Outcome of resolving a region name to an Observation Service place
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPlace {
    pub query_name: String,
    /// `None` means "no results available", not an error
    pub place_id: Option<String>,
    pub matched_name: Option<String>,
}

impl ResolvedPlace {
    pub fn unresolved(query_name: impl Into<String>) -> Self {
        Self {
            query_name: query_name.into(),
            place_id: None,
            matched_name: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.place_id.is_some()
    }
}

/// One autocomplete candidate, in provider relevance order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceCandidate {
    pub id: String,
    pub display_name: Option<String>,
    pub name: Option<String>,
}

impl PlaceCandidate {
    /// Label shown to users: display name, else short name, else empty
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("")
    }
}

/// Normalized taxon as it appears in aggregate and identification lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonSummary {
    pub id: u64,
    pub scientific_name: String,
    pub common_name: Option<String>,
    pub iconic_group: Option<String>,
    pub photo_url: Option<String>,
}

/// Distinct species with its observation count in a place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceAggregate {
    pub taxon: TaxonSummary,
    pub observation_count: u64,
}

/// Descriptive record for a single taxon, fetched on demand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonDetail {
    pub id: u64,
    pub rank: Option<String>,
    pub iconic_group: Option<String>,
    pub is_extinct: bool,
    pub summary_html: Option<String>,
    /// At most [`crate::normalize::MAX_DETAIL_PHOTOS`], deduplicated, large preferred over medium
    pub photo_urls: Vec<String>,
    pub scientific_name: Option<String>,
    pub common_name: Option<String>,
    pub wikipedia_url: Option<String>,
    pub observations_count: Option<u64>,
}

/// Ranked vision-model candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentificationCandidate {
    pub taxon: TaxonSummary,
    /// Score in [0, 1]
    pub confidence: f64,
}

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Parameters for an aggregated species-count query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateRequest {
    /// Observation Service taxon id to restrict to (e.g. birds = 3)
    pub taxon_scope: Option<u64>,
    /// Page size; clamped to the provider maximum
    pub limit: u32,
    /// 1-based page number
    pub page: u32,
}

impl AggregateRequest {
    pub const fn new(taxon_scope: Option<u64>, limit: u32) -> Self {
        Self {
            taxon_scope,
            limit,
            page: 1,
        }
    }

    pub const fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }
}

/// Registry occurrence search scoped to one region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceSearch {
    /// Registry region id (GADM gid)
    pub region_id: String,
    pub kingdom: Option<u32>,
    pub class: Option<u32>,
    pub limit: u32,
    pub offset: u32,
    /// Only records carrying still-image media
    pub require_image: bool,
}

impl OccurrenceSearch {
    pub fn new(region_id: impl Into<String>) -> Self {
        Self {
            region_id: region_id.into(),
            kingdom: None,
            class: None,
            limit: 20,
            offset: 0,
            require_image: true,
        }
    }
}

/// One page of raw Registry occurrence records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OccurrencePage {
    pub total: u64,
    /// Records are passed through as returned; their shape varies by dataset
    pub records: Vec<serde_json::Value>,
}

impl OccurrencePage {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Registry species record with the fields consumers read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySpecies {
    pub key: u64,
    pub scientific_name: Option<String>,
    pub canonical_name: Option<String>,
    pub vernacular_name: Option<String>,
    pub kingdom: Option<String>,
    pub rank: Option<String>,
    pub taxonomic_status: Option<String>,
}
