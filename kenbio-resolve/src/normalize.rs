//! Wire record → typed record conversion
//!
//! All "missing field" decisions live here, one function per entity.
//! Blank strings count as missing. Records without an identifier cannot be
//! joined on and are dropped.

use crate::models::{
    IdentificationCandidate, OccurrenceAggregate, PlaceCandidate, Region, RegistrySpecies,
    TaxonDetail, TaxonSummary,
};
use crate::providers::wire::{
    RawPhoto, RawPlace, RawRegion, RawSpecies, RawSpeciesCount, RawTaxon, RawTaxonPhoto,
    RawVisionResult,
};

/// Photo cap for taxon detail
pub const MAX_DETAIL_PHOTOS: usize = 10;

/// Trimmed non-empty string, else `None`
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn region(raw: RawRegion) -> Option<Region> {
    Some(Region {
        id: present(raw.id)?,
        name: present(raw.name)?,
    })
}

pub fn place_candidate(raw: RawPlace) -> Option<PlaceCandidate> {
    Some(PlaceCandidate {
        id: present(raw.id)?,
        display_name: present(raw.display_name),
        name: present(raw.name),
    })
}

/// Thumbnail for list views: medium, else square, else the bare url
fn summary_photo(photo: Option<RawPhoto>) -> Option<String> {
    let photo = photo?;
    present(photo.medium_url)
        .or_else(|| present(photo.square_url))
        .or_else(|| present(photo.url))
}

pub fn taxon_summary(raw: RawTaxon) -> Option<TaxonSummary> {
    let id = raw.id.filter(|id| *id > 0)?;
    Some(TaxonSummary {
        id,
        scientific_name: present(raw.name).unwrap_or_default(),
        common_name: present(raw.preferred_common_name),
        iconic_group: present(raw.iconic_taxon_name),
        photo_url: summary_photo(raw.default_photo),
    })
}

pub fn occurrence_aggregate(raw: RawSpeciesCount) -> Option<OccurrenceAggregate> {
    Some(OccurrenceAggregate {
        taxon: taxon_summary(raw.taxon?)?,
        observation_count: raw.count.unwrap_or(0),
    })
}

/// Large-then-medium photo URLs, unusable entries skipped, duplicates
/// removed, capped at [`MAX_DETAIL_PHOTOS`]
pub fn detail_photo_urls(photos: Vec<RawTaxonPhoto>) -> Vec<String> {
    let mut urls: Vec<String> = Vec::with_capacity(MAX_DETAIL_PHOTOS);

    for entry in photos {
        if urls.len() == MAX_DETAIL_PHOTOS {
            break;
        }
        let Some(photo) = entry.photo else { continue };
        let Some(url) = present(photo.large_url).or_else(|| present(photo.medium_url)) else {
            continue;
        };
        if !urls.contains(&url) {
            urls.push(url);
        }
    }

    urls
}

pub fn taxon_detail(raw: RawTaxon) -> Option<TaxonDetail> {
    let id = raw.id.filter(|id| *id > 0)?;
    Some(TaxonDetail {
        id,
        rank: present(raw.rank),
        iconic_group: present(raw.iconic_taxon_name),
        is_extinct: raw.extinct.unwrap_or(false),
        summary_html: present(raw.wikipedia_summary),
        photo_urls: detail_photo_urls(raw.taxon_photos),
        scientific_name: present(raw.name),
        common_name: present(raw.preferred_common_name),
        wikipedia_url: present(raw.wikipedia_url),
        observations_count: raw.observations_count,
    })
}

/// A score the provider actually filled in: positive and finite
fn populated(score: Option<f64>) -> Option<f64> {
    score.filter(|s| s.is_finite() && *s > 0.0)
}

/// First populated score of combined, vision, frequency, as a fraction
///
/// Zero, negative and non-finite scores count as unpopulated. Scores on a
/// percent scale, (1, 100], are divided by 100; anything above that is
/// capped at 1.
pub fn vision_confidence(raw: &RawVisionResult) -> f64 {
    let Some(score) = populated(raw.combined_score)
        .or_else(|| populated(raw.vision_score))
        .or_else(|| populated(raw.frequency_score))
    else {
        return 0.0;
    };

    if score <= 1.0 {
        score
    } else if score <= 100.0 {
        score / 100.0
    } else {
        1.0
    }
}

pub fn identification_candidate(raw: RawVisionResult) -> Option<IdentificationCandidate> {
    let confidence = vision_confidence(&raw);
    Some(IdentificationCandidate {
        taxon: taxon_summary(raw.taxon?)?,
        confidence,
    })
}

pub fn registry_species(raw: RawSpecies, requested_key: u64) -> RegistrySpecies {
    RegistrySpecies {
        key: raw.key.unwrap_or(requested_key),
        scientific_name: present(raw.scientific_name),
        canonical_name: present(raw.canonical_name),
        vernacular_name: present(raw.vernacular_name),
        kingdom: present(raw.kingdom),
        rank: present(raw.rank),
        taxonomic_status: present(raw.taxonomic_status),
    }
}
