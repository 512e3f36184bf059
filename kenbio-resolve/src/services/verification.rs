//! Bulk region → place verification
//!
//! Resolves every catalog region in turn to find names the match heuristic
//! cannot place. Calls are paced (200ms by default) to stay under the
//! Observation Service's informal rate limit; the pacing lives here, in the
//! caller, not in the resolver.
//!
//! Pacing bounds the call rate: successive autocomplete calls *start* at
//! least `pacing` apart. It is not an extra pause after each response, so a
//! lookup slower than `pacing` is followed by the next one immediately.
//! Calls never overlap since each is awaited before the next begins.

use super::place_resolver::PlaceResolver;
use crate::models::Region;
use chrono::{DateTime, Utc};
use governor::{Quota, RateLimiter};
use serde::Serialize;
use std::fmt::Write as _;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Pause between successive autocomplete calls
pub const DEFAULT_PACING: Duration = Duration::from_millis(200);

/// Region that resolved to a place
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedRegion {
    pub region: Region,
    pub place_id: String,
    pub matched_name: Option<String>,
}

/// Outcome of a verification run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Regions in the input
    pub total: usize,
    /// Regions actually checked before completion or cancellation
    pub checked: usize,
    pub verified: Vec<VerifiedRegion>,
    /// Regions that need a name override
    pub failures: Vec<Region>,
    pub cancelled: bool,
}

impl VerificationReport {
    pub fn all_verified(&self) -> bool {
        !self.cancelled && self.failures.is_empty()
    }

    /// `[place_overrides]` block with one placeholder line per failure
    pub fn overrides_template(&self) -> String {
        let mut out = String::from("[place_overrides]\n");
        for region in &self.failures {
            let _ = writeln!(out, "# {} (GID: {})", region.name, region.id);
            let _ = writeln!(out, "# \"{}\" = <place id>", region.name.replace('"', "\\\""));
        }
        out
    }
}

/// Resolve each region in order, starting calls at least `pacing` apart
///
/// Stops early, with `cancelled = true`, once `cancel` fires.
pub async fn verify_regions(
    regions: &[Region],
    resolver: &PlaceResolver,
    pacing: Duration,
    cancel: &CancellationToken,
) -> VerificationReport {
    let started_at = Utc::now();
    let limiter = Quota::with_period(pacing).map(RateLimiter::direct);

    let mut verified = Vec::new();
    let mut failures = Vec::new();
    let mut checked = 0;
    let mut cancelled = false;

    info!(total = regions.len(), pacing_ms = pacing.as_millis() as u64, "Verifying regions");

    for region in regions {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }

        if let Some(limiter) = &limiter {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                _ = limiter.until_ready() => {}
            }
        }

        let resolved = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                cancelled = true;
                break;
            }
            resolved = resolver.resolve(&region.name) => resolved,
        };
        checked += 1;

        match resolved.place_id {
            Some(place_id) => verified.push(VerifiedRegion {
                region: region.clone(),
                place_id,
                matched_name: resolved.matched_name,
            }),
            None => {
                warn!(region = %region.name, gid = %region.id, "No place match found");
                failures.push(region.clone());
            }
        }
    }

    let report = VerificationReport {
        started_at,
        finished_at: Utc::now(),
        total: regions.len(),
        checked,
        verified,
        failures,
        cancelled,
    };

    info!(
        verified = report.verified.len(),
        failures = report.failures.len(),
        checked = report.checked,
        cancelled = report.cancelled,
        "Verification finished"
    );

    report
}
