//! In-memory provider fakes for unit tests
//!
//! Replies are canned per request key and can be swapped between calls;
//! every request is recorded so tests can assert what was (not) sent.

use super::wire::*;
use super::{ObservationApi, RegistryApi, SpeciesCountsQuery};
use crate::error::{ProviderError, ProviderResult};
use crate::models::{GeoPoint, OccurrenceSearch};
use std::collections::HashMap;
use std::sync::Mutex;

/// Canned provider reply
#[derive(Debug, Clone)]
pub(crate) enum Reply<T> {
    Ok(T),
    NotFound,
    Fail(&'static str),
}

impl<T: Clone> Reply<T> {
    fn to_result(&self, what: &str) -> ProviderResult<T> {
        match self {
            Reply::Ok(value) => Ok(value.clone()),
            Reply::NotFound => Err(ProviderError::NotFound(what.to_string())),
            Reply::Fail(msg) => Err(ProviderError::Network(msg.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Autocomplete { query: String, per_page: u32 },
    SpeciesCounts(SpeciesCountsQuery),
    Taxon(u64),
    ScoreImage { bytes: usize, point: GeoPoint },
    BrowseRegions(String),
    SearchOccurrences { country: String, search: OccurrenceSearch },
    Species(u64),
}

pub(crate) fn place(id: u64, display_name: &str) -> RawPlace {
    RawPlace {
        id: Some(id.to_string()),
        display_name: Some(display_name.to_string()),
        name: display_name.split(',').next().map(|s| s.trim().to_string()),
    }
}

pub(crate) fn taxon(id: u64, name: &str) -> RawTaxon {
    RawTaxon {
        id: Some(id),
        name: Some(name.to_string()),
        ..Default::default()
    }
}

pub(crate) fn count(observations: u64, taxon: RawTaxon) -> RawSpeciesCount {
    RawSpeciesCount {
        count: Some(observations),
        taxon: Some(taxon),
    }
}

pub(crate) fn photo(large: Option<&str>, medium: Option<&str>) -> RawTaxonPhoto {
    RawTaxonPhoto {
        photo: Some(RawPhoto {
            large_url: large.map(str::to_string),
            medium_url: medium.map(str::to_string),
            ..Default::default()
        }),
    }
}

pub(crate) fn region(id: &str, name: &str) -> RawRegion {
    RawRegion {
        id: Some(id.to_string()),
        name: Some(name.to_string()),
    }
}

/// Fake Observation Service
pub(crate) struct FakeObservation {
    places: Mutex<HashMap<String, Reply<Vec<RawPlace>>>>,
    counts: Mutex<Reply<RawSpeciesCountsResponse>>,
    taxa: Mutex<HashMap<u64, Reply<Option<RawTaxon>>>>,
    vision: Mutex<Reply<RawVisionResponse>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeObservation {
    pub(crate) fn new() -> Self {
        Self {
            places: Mutex::new(HashMap::new()),
            counts: Mutex::new(Reply::Ok(RawSpeciesCountsResponse::default())),
            taxa: Mutex::new(HashMap::new()),
            vision: Mutex::new(Reply::Ok(RawVisionResponse::default())),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn set_places(&self, query: &str, reply: Reply<Vec<RawPlace>>) {
        self.places.lock().unwrap().insert(query.to_string(), reply);
    }

    pub(crate) fn set_counts(&self, reply: Reply<RawSpeciesCountsResponse>) {
        *self.counts.lock().unwrap() = reply;
    }

    pub(crate) fn set_taxon(&self, id: u64, reply: Reply<Option<RawTaxon>>) {
        self.taxa.lock().unwrap().insert(id, reply);
    }

    pub(crate) fn set_vision(&self, reply: Reply<RawVisionResponse>) {
        *self.vision.lock().unwrap() = reply;
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl ObservationApi for FakeObservation {
    async fn autocomplete_places(&self, query: &str, per_page: u32) -> ProviderResult<Vec<RawPlace>> {
        self.record(Call::Autocomplete {
            query: query.to_string(),
            per_page,
        });
        let reply = self
            .places
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or(Reply::Ok(Vec::new()));
        reply.to_result(query)
    }

    async fn species_counts(&self, query: &SpeciesCountsQuery) -> ProviderResult<RawSpeciesCountsResponse> {
        self.record(Call::SpeciesCounts(query.clone()));
        self.counts.lock().unwrap().to_result("species counts")
    }

    async fn taxon(&self, taxon_id: u64) -> ProviderResult<Option<RawTaxon>> {
        self.record(Call::Taxon(taxon_id));
        let reply = self
            .taxa
            .lock()
            .unwrap()
            .get(&taxon_id)
            .cloned()
            .unwrap_or(Reply::NotFound);
        reply.to_result("taxon")
    }

    async fn score_image(&self, image: Vec<u8>, point: GeoPoint) -> ProviderResult<RawVisionResponse> {
        self.record(Call::ScoreImage {
            bytes: image.len(),
            point,
        });
        self.vision.lock().unwrap().to_result("image score")
    }
}

/// Fake Registry
pub(crate) struct FakeRegistry {
    regions: Mutex<Reply<Vec<RawRegion>>>,
    occurrences: Mutex<Reply<RawOccurrencePage>>,
    species: Mutex<HashMap<u64, RawSpecies>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeRegistry {
    pub(crate) fn new() -> Self {
        Self {
            regions: Mutex::new(Reply::Ok(Vec::new())),
            occurrences: Mutex::new(Reply::Ok(RawOccurrencePage::default())),
            species: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn set_regions(&self, reply: Reply<Vec<RawRegion>>) {
        *self.regions.lock().unwrap() = reply;
    }

    pub(crate) fn set_occurrences(&self, reply: Reply<RawOccurrencePage>) {
        *self.occurrences.lock().unwrap() = reply;
    }

    pub(crate) fn set_species(&self, key: u64, species: RawSpecies) {
        self.species.lock().unwrap().insert(key, species);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl RegistryApi for FakeRegistry {
    async fn browse_regions(&self, gadm_code: &str) -> ProviderResult<Vec<RawRegion>> {
        self.record(Call::BrowseRegions(gadm_code.to_string()));
        self.regions.lock().unwrap().to_result(gadm_code)
    }

    async fn search_occurrences(
        &self,
        country: &str,
        search: &OccurrenceSearch,
    ) -> ProviderResult<RawOccurrencePage> {
        self.record(Call::SearchOccurrences {
            country: country.to_string(),
            search: search.clone(),
        });
        self.occurrences.lock().unwrap().to_result("occurrences")
    }

    async fn species(&self, key: u64) -> ProviderResult<RawSpecies> {
        self.record(Call::Species(key));
        self.species
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("species {}", key)))
    }
}
