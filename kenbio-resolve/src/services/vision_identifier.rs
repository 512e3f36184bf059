//! Image-based species identification
//!
//! The provider weighs candidates with locality priors, so an image is
//! always scored against a point: the caller's, or the configured default.

use crate::models::{GeoPoint, IdentificationCandidate};
use crate::normalize;
use crate::providers::ObservationApi;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Submits images to the vision scoring endpoint
pub struct VisionIdentifier {
    observation: Arc<dyn ObservationApi>,
    default_point: GeoPoint,
}

impl VisionIdentifier {
    pub fn new(observation: Arc<dyn ObservationApi>, default_point: GeoPoint) -> Self {
        Self {
            observation,
            default_point,
        }
    }

    /// Point actually sent: both coordinates, or the default
    ///
    /// A lone latitude or longitude is treated as no location.
    pub fn bias_point(&self, lat: Option<f64>, lon: Option<f64>) -> GeoPoint {
        match (lat, lon) {
            (Some(latitude), Some(longitude)) if latitude.is_finite() && longitude.is_finite() => {
                GeoPoint::new(latitude, longitude)
            }
            _ => self.default_point,
        }
    }

    /// Ranked candidates in provider order
    ///
    /// Empty when nothing matched, the payload was empty, or the call
    /// failed; only the logs tell these apart.
    pub async fn identify(&self, image: &[u8], lat: Option<f64>, lon: Option<f64>) -> Vec<IdentificationCandidate> {
        if image.is_empty() {
            warn!("Empty image payload, skipping identification");
            return Vec::new();
        }

        let point = self.bias_point(lat, lon);
        debug!(
            bytes = image.len(),
            lat = point.latitude,
            lng = point.longitude,
            "Identifying image"
        );

        let body = match self.observation.score_image(image.to_vec(), point).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Image identification failed");
                return Vec::new();
            }
        };

        let candidates: Vec<IdentificationCandidate> = body
            .results
            .into_iter()
            .filter_map(normalize::identification_candidate)
            .collect();

        match candidates.first() {
            Some(top) => info!(
                taxon_id = top.taxon.id,
                name = %top.taxon.scientific_name,
                confidence = top.confidence,
                candidates = candidates.len(),
                "Image identified"
            ),
            None => info!("Image identification returned no match"),
        }

        candidates
    }
}
