//! On-demand taxon detail

use crate::models::TaxonDetail;
use crate::normalize;
use crate::providers::ObservationApi;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Most details kept by [`TaxonDetailFetcher::with_cache`]
pub const MAX_CACHED_DETAILS: u64 = 512;

/// Fetches a single taxon's descriptive record and photo set
pub struct TaxonDetailFetcher {
    observation: Arc<dyn ObservationApi>,
    cache: Option<Cache<u64, TaxonDetail>>,
}

impl TaxonDetailFetcher {
    pub fn new(observation: Arc<dyn ObservationApi>) -> Self {
        Self {
            observation,
            cache: None,
        }
    }

    /// Keep fetched details for a short `ttl`
    pub fn with_cache(mut self, ttl: Duration) -> Self {
        self.cache = Some(
            Cache::builder()
                .max_capacity(MAX_CACHED_DETAILS)
                .time_to_live(ttl)
                .build(),
        );
        self
    }

    /// Detail for `taxon_id`, or `None` when the id is 0, unknown to the
    /// provider, or the provider call fails
    ///
    /// A taxon without usable photos still yields a detail with an empty
    /// `photo_urls`.
    pub async fn get_detail(&self, taxon_id: u64) -> Option<TaxonDetail> {
        if taxon_id == 0 {
            debug!("Taxon id 0, nothing to fetch");
            return None;
        }

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&taxon_id).await {
                return Some(hit);
            }
        }

        let raw = match self.observation.taxon(taxon_id).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!(taxon_id, "Taxon lookup returned no record");
                return None;
            }
            Err(e) if e.is_not_found() => {
                info!(taxon_id, "Taxon not found");
                return None;
            }
            Err(e) => {
                warn!(taxon_id, error = %e, "Taxon lookup failed");
                return None;
            }
        };

        let Some(detail) = normalize::taxon_detail(raw) else {
            warn!(taxon_id, "Taxon record has no usable id");
            return None;
        };

        debug!(taxon_id, photos = detail.photo_urls.len(), "Fetched taxon detail");

        if let Some(cache) = &self.cache {
            cache.insert(taxon_id, detail.clone()).await;
        }

        Some(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::MAX_DETAIL_PHOTOS;
    use crate::providers::testing::{photo, taxon, Call, FakeObservation, Reply};

    #[tokio::test]
    async fn test_zero_id_makes_no_call() {
        let fake = Arc::new(FakeObservation::new());
        let fetcher = TaxonDetailFetcher::new(fake.clone());

        assert!(fetcher.get_detail(0).await.is_none());
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_taxon_is_none() {
        let fake = Arc::new(FakeObservation::new());
        let fetcher = TaxonDetailFetcher::new(fake.clone());
        assert!(fetcher.get_detail(404).await.is_none());

        fake.set_taxon(5, Reply::Ok(None));
        assert!(fetcher.get_detail(5).await.is_none());
    }

    #[tokio::test]
    async fn test_transport_error_is_none() {
        let fake = Arc::new(FakeObservation::new());
        fake.set_taxon(9, Reply::Fail("dns"));
        assert!(TaxonDetailFetcher::new(fake.clone()).get_detail(9).await.is_none());
    }

    #[tokio::test]
    async fn test_zero_photos_gives_empty_urls_not_none() {
        let fake = Arc::new(FakeObservation::new());
        fake.set_taxon(41, Reply::Ok(Some(taxon(41, "Loxodonta africana"))));

        let detail = TaxonDetailFetcher::new(fake.clone()).get_detail(41).await.unwrap();
        assert_eq!(detail.id, 41);
        assert!(detail.photo_urls.is_empty());
    }

    #[tokio::test]
    async fn test_photos_capped_and_filtered() {
        let fake = Arc::new(FakeObservation::new());
        let mut raw = taxon(3, "Aves");
        raw.extinct = Some(false);
        raw.wikipedia_summary = Some("<b>Birds</b> are...".into());
        raw.taxon_photos = (0..15)
            .map(|i| {
                if i % 3 == 0 {
                    photo(None, None)
                } else {
                    photo(None, Some(&format!("https://img/{}-m.jpg", i)))
                }
            })
            .collect();
        fake.set_taxon(3, Reply::Ok(Some(raw)));

        let detail = TaxonDetailFetcher::new(fake.clone()).get_detail(3).await.unwrap();
        assert_eq!(detail.photo_urls.len(), MAX_DETAIL_PHOTOS);
        assert!(detail.photo_urls.iter().all(|u| u.ends_with("-m.jpg")));
        assert_eq!(detail.summary_html.as_deref(), Some("<b>Birds</b> are..."));
    }

    #[tokio::test]
    async fn test_cache_hit_skips_provider() {
        let fake = Arc::new(FakeObservation::new());
        fake.set_taxon(7, Reply::Ok(Some(taxon(7, "Acacia"))));
        let fetcher = TaxonDetailFetcher::new(fake.clone()).with_cache(Duration::from_secs(60));

        fetcher.get_detail(7).await;
        fetcher.get_detail(7).await;
        assert_eq!(fake.calls(), vec![Call::Taxon(7)]);
    }

    #[tokio::test]
    async fn test_cached_detail_expires() {
        let fake = Arc::new(FakeObservation::new());
        fake.set_taxon(8, Reply::Ok(Some(taxon(8, "Ficus"))));
        let fetcher = TaxonDetailFetcher::new(fake.clone()).with_cache(Duration::from_millis(50));

        fetcher.get_detail(8).await;
        tokio::time::sleep(Duration::from_millis(120)).await;
        fetcher.get_detail(8).await;
        assert_eq!(fake.calls(), vec![Call::Taxon(8), Call::Taxon(8)]);
    }
}
