//! Wire shapes of both providers' JSON responses
//!
//! Every field the provider may omit or send as `null` is optional here.
//! Turning these into typed records is [`crate::normalize`]'s job.

use serde::{Deserialize, Deserializer};

/// Accepts `null` wherever a default-able collection is expected
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Int(u64),
    Text(String),
}

/// Identifier sent either as a JSON number or a JSON string
fn flexible_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<IdRepr>::deserialize(deserializer)? {
        Some(IdRepr::Int(id)) => Some(id.to_string()),
        Some(IdRepr::Text(id)) => Some(id),
        None => None,
    })
}

/// Numeric identifier that occasionally arrives quoted
fn flexible_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<IdRepr>::deserialize(deserializer)? {
        Some(IdRepr::Int(id)) => Some(id),
        Some(IdRepr::Text(id)) => id.trim().parse().ok(),
        None => None,
    })
}

// ============================================================================
// Registry
// ============================================================================

/// `GET /geocode/gadm/browse/{countryCode}` element
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRegion {
    #[serde(default, deserialize_with = "flexible_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// `GET /occurrence/search` body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOccurrencePage {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<serde_json::Value>,
}

/// `GET /species/{key}` body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSpecies {
    #[serde(default, deserialize_with = "flexible_u64")]
    pub key: Option<u64>,
    #[serde(default)]
    pub scientific_name: Option<String>,
    #[serde(default)]
    pub canonical_name: Option<String>,
    #[serde(default)]
    pub vernacular_name: Option<String>,
    #[serde(default)]
    pub kingdom: Option<String>,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub taxonomic_status: Option<String>,
}

// ============================================================================
// Observation Service
// ============================================================================

/// `GET /places/autocomplete` body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPlaceResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<RawPlace>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPlace {
    #[serde(default, deserialize_with = "flexible_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// `GET /observations/species_counts` body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSpeciesCountsResponse {
    #[serde(default)]
    pub total_results: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<RawSpeciesCount>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSpeciesCount {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub taxon: Option<RawTaxon>,
}

/// `GET /taxa/{id}` body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTaxaResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<RawTaxon>,
}

/// Taxon object, shared by species counts, taxa and vision responses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTaxon {
    #[serde(default, deserialize_with = "flexible_u64")]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub preferred_common_name: Option<String>,
    #[serde(default)]
    pub iconic_taxon_name: Option<String>,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub extinct: Option<bool>,
    #[serde(default)]
    pub wikipedia_summary: Option<String>,
    #[serde(default)]
    pub wikipedia_url: Option<String>,
    #[serde(default)]
    pub observations_count: Option<u64>,
    #[serde(default)]
    pub default_photo: Option<RawPhoto>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub taxon_photos: Vec<RawTaxonPhoto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTaxonPhoto {
    #[serde(default)]
    pub photo: Option<RawPhoto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPhoto {
    #[serde(default)]
    pub large_url: Option<String>,
    #[serde(default)]
    pub medium_url: Option<String>,
    #[serde(default)]
    pub square_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// `POST /computervision/score_image` body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVisionResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<RawVisionResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVisionResult {
    #[serde(default)]
    pub taxon: Option<RawTaxon>,
    #[serde(default)]
    pub combined_score: Option<f64>,
    #[serde(default)]
    pub vision_score: Option<f64>,
    #[serde(default)]
    pub frequency_score: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_ids_accept_numbers_and_strings() {
        let body: RawPlaceResponse = serde_json::from_str(
            r#"{"results":[{"id":7681,"display_name":"Nairobi, KE"},{"id":"abc","name":"X"}]}"#,
        )
        .unwrap();
        assert_eq!(body.results[0].id.as_deref(), Some("7681"));
        assert_eq!(body.results[1].id.as_deref(), Some("abc"));
        assert!(body.results[1].display_name.is_none());
    }

    #[test]
    fn test_null_results_become_empty() {
        let body: RawSpeciesCountsResponse =
            serde_json::from_str(r#"{"total_results":0,"results":null}"#).unwrap();
        assert!(body.results.is_empty());

        let body: RawTaxaResponse = serde_json::from_str("{}").unwrap();
        assert!(body.results.is_empty());
    }

    #[test]
    fn test_taxon_tolerates_sparse_records() {
        let taxon: RawTaxon =
            serde_json::from_str(r#"{"id":"42","name":"Panthera leo","taxon_photos":null}"#)
                .unwrap();
        assert_eq!(taxon.id, Some(42));
        assert!(taxon.preferred_common_name.is_none());
        assert!(taxon.taxon_photos.is_empty());
        assert!(taxon.extinct.is_none());
    }

    #[test]
    fn test_species_record_camel_case() {
        let species: RawSpecies = serde_json::from_str(
            r#"{"key":5219404,"scientificName":"Panthera leo (Linnaeus, 1758)","canonicalName":"Panthera leo","vernacularName":"Lion","kingdom":"Animalia","rank":"SPECIES"}"#,
        )
        .unwrap();
        assert_eq!(species.key, Some(5219404));
        assert_eq!(species.vernacular_name.as_deref(), Some("Lion"));
        assert!(species.taxonomic_status.is_none());
    }
}
