//! In-process fake of both upstream providers
//!
//! One axum server answers the Registry and Observation Service paths
//! (they do not overlap), so both clients can point at the same base URL.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use kenbio_common::config::TomlConfig;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Request as seen by the fake upstream
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Vec<u8>,
}

#[derive(Clone, Default)]
struct Shared {
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl Shared {
    fn record(&self, uri: &Uri, query: &HashMap<String, String>, body: &[u8]) {
        self.requests.lock().unwrap().push(Recorded {
            path: uri.path().to_string(),
            query: query.clone(),
            body: body.to_vec(),
        });
    }
}

/// Running fake upstream
pub struct FakeUpstream {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeUpstream {
    pub async fn start() -> Self {
        let shared = Shared::default();
        let requests = shared.requests.clone();

        let app = Router::new()
            .route("/geocode/gadm/browse/:code", get(browse_regions))
            .route("/occurrence/search", get(occurrence_search))
            .route("/species/:key", get(species))
            .route("/places/autocomplete", get(autocomplete))
            .route("/observations/species_counts", get(species_counts))
            .route("/taxa/:id", get(taxon))
            .route("/computervision/score_image", post(score_image))
            .with_state(shared);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    /// Configuration pointing both providers at this server
    pub fn config(&self) -> TomlConfig {
        let mut config = TomlConfig::default();
        config.registry.base_url = self.base_url.clone();
        config.observation.base_url = self.base_url.clone();
        config
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests().into_iter().filter(|r| r.path == path).collect()
    }
}

async fn browse_regions(
    State(shared): State<Shared>,
    uri: Uri,
    Path(code): Path<String>,
) -> Response {
    shared.record(&uri, &HashMap::new(), &[]);
    match code.as_str() {
        "KEN" => Json(json!([
            {"id": "KEN.1_1", "name": "Baringo"},
            {"id": "KEN.30_1", "name": "Nairobi"},
            {"id": "KEN.30_1", "name": "Nairobi"},
            {"id": "KEN.31_1"},
            {"id": "KEN.28_1", "name": "Mombasa"}
        ]))
        .into_response(),
        "ERR" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn occurrence_search(
    State(shared): State<Shared>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    shared.record(&uri, &query, &[]);
    if query.get("gadmGid").map(String::as_str) == Some("KEN.0_1") {
        return (StatusCode::SERVICE_UNAVAILABLE, "maintenance").into_response();
    }
    Json(json!({
        "offset": 0,
        "limit": 20,
        "endOfRecords": false,
        "count": 5120,
        "results": [
            {"key": 4011, "scientificName": "Panthera leo", "kingdomKey": 1},
            {"key": 4012, "scientificName": "Acacia tortilis", "kingdomKey": 6}
        ]
    }))
    .into_response()
}

async fn species(State(shared): State<Shared>, uri: Uri, Path(key): Path<u64>) -> Response {
    shared.record(&uri, &HashMap::new(), &[]);
    if key != 5219404 {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({
        "key": 5219404,
        "scientificName": "Panthera leo (Linnaeus, 1758)",
        "canonicalName": "Panthera leo",
        "vernacularName": "Lion",
        "kingdom": "Animalia",
        "rank": "SPECIES",
        "taxonomicStatus": "ACCEPTED"
    }))
    .into_response()
}

async fn autocomplete(
    State(shared): State<Shared>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    shared.record(&uri, &query, &[]);
    let results = match query.get("q").map(String::as_str) {
        Some("Nairobi") => json!([
            {"id": 120, "name": "Nairobi", "display_name": "Nairobi, US"},
            {"id": 7681, "name": "Nairobi", "display_name": "Nairobi, Kenya"}
        ]),
        Some("Baringo") => json!([{"id": "9001", "name": "Baringo", "display_name": null}]),
        Some("Mombasa") => {
            return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
        }
        _ => json!([]),
    };
    Json(json!({"total_results": results.as_array().map_or(0, Vec::len), "results": results}))
        .into_response()
}

async fn species_counts(
    State(shared): State<Shared>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    shared.record(&uri, &query, &[]);
    if query.get("place_id").map(String::as_str) != Some("7681") {
        return Json(json!({"total_results": 0, "results": []})).into_response();
    }
    Json(json!({
        "total_results": 3,
        "page": 1,
        "per_page": 60,
        "results": [
            {"count": 412, "taxon": {
                "id": 12727, "name": "Pycnonotus barbatus",
                "preferred_common_name": "Common Bulbul", "iconic_taxon_name": "Aves",
                "default_photo": {"medium_url": "https://static/p/1/medium.jpg",
                                  "square_url": "https://static/p/1/square.jpg"}
            }},
            {"count": 230, "taxon": {
                "id": 43151, "name": "Giraffa camelopardalis",
                "iconic_taxon_name": "Mammalia", "default_photo": null
            }},
            {"count": 230, "taxon": {"id": 47219, "name": "Apis mellifera"}},
            {"count": 5, "taxon": null}
        ]
    }))
    .into_response()
}

async fn taxon(State(shared): State<Shared>, uri: Uri, Path(id): Path<u64>) -> Response {
    shared.record(&uri, &HashMap::new(), &[]);
    let photo = |n: u32| json!({"photo": {"large_url": format!("https://static/p/{}/large.jpg", n),
                                           "medium_url": format!("https://static/p/{}/medium.jpg", n)}});
    match id {
        41 => Json(json!({"total_results": 1, "results": [{
            "id": 41, "name": "Loxodonta africana", "rank": "species",
            "iconic_taxon_name": "Mammalia", "extinct": false,
            "preferred_common_name": "African Bush Elephant",
            "wikipedia_summary": "The <i>African bush elephant</i> is the largest living land animal.",
            "taxon_photos": []
        }]}))
        .into_response(),
        3 => {
            let photos: Vec<Value> = (1..=14).map(photo).collect();
            Json(json!({"total_results": 1, "results": [{
                "id": 3, "name": "Aves", "rank": "class", "iconic_taxon_name": "Aves",
                "taxon_photos": photos
            }]}))
            .into_response()
        }
        77 => Json(json!({"total_results": 0, "results": []})).into_response(),
        500 => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn score_image(State(shared): State<Shared>, uri: Uri, body: Bytes) -> impl IntoResponse {
    shared.record(&uri, &HashMap::new(), &body);
    Json(json!({"results": [
        {"combined_score": 87.5, "vision_score": 0.9,
         "taxon": {"id": 12727, "name": "Pycnonotus barbatus", "iconic_taxon_name": "Aves"}},
        {"vision_score": 0.42,
         "taxon": {"id": 13851, "name": "Passer domesticus"}},
        {"frequency_score": 0.1}
    ]}))
}
