//! Fetch-or-serve wrapper around a departure source.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::policy::TtlPolicy;
use super::store::{CacheStatus, DepartureCache};
use crate::domain::{NetworkTime, network_now};
use crate::trafiklab::{DepartureSource, DeparturesResponse, TrafiklabError};

/// Departure source with a single-slot cache in front.
///
/// The cache is not keyed by site. While a board is fresh it is returned
/// for every site id, including ones it was not fetched for.
#[derive(Debug)]
pub struct CachedDepartures<S> {
    source: S,
    cache: DepartureCache,
}

impl<S: DepartureSource> CachedDepartures<S> {
    /// Create a new cached source with an empty cache.
    pub fn new(source: S, policy: TtlPolicy) -> Self {
        Self {
            source,
            cache: DepartureCache::new(policy),
        }
    }

    /// Get the departure board for `site_id`, using the cache if fresh.
    ///
    /// A fetched board is stored with the time the fetch completed.
    pub async fn get_departures(
        &self,
        site_id: &str,
    ) -> Result<Arc<DeparturesResponse>, TrafiklabError> {
        self.get_or_fetch(site_id, network_now(), network_now).await
    }

    /// As [`get_departures`](Self::get_departures), with an explicit clock.
    ///
    /// `now` is used both for the freshness check and as the fetch time of
    /// a newly stored board.
    pub async fn get_departures_at(
        &self,
        site_id: &str,
        now: NetworkTime,
    ) -> Result<Arc<DeparturesResponse>, TrafiklabError> {
        self.get_or_fetch(site_id, now, || now).await
    }

    /// Serve the cached board if fresh at `now`, otherwise fetch and store
    /// it stamped with `fetched_at()`. A failed fetch leaves any stale
    /// board in place.
    async fn get_or_fetch<F>(
        &self,
        site_id: &str,
        now: NetworkTime,
        fetched_at: F,
    ) -> Result<Arc<DeparturesResponse>, TrafiklabError>
    where
        F: FnOnce() -> NetworkTime,
    {
        let policy = self.cache.policy();

        if let Some(cached) = self.cache.fresh(&now).await {
            debug!(
                site_id,
                ttl_secs = policy.current_ttl(&now).as_secs(),
                period = policy.period(&now).as_str(),
                "cache hit"
            );
            return Ok(cached);
        }

        info!(
            site_id,
            period = policy.period(&now).as_str(),
            "cache miss, fetching from Trafiklab"
        );

        let board = self
            .source
            .fetch_departures(site_id)
            .await
            .inspect_err(|e| warn!(site_id, error = %e, "failed to fetch departures"))?;

        let board = Arc::new(board);
        self.cache.put(board.clone(), fetched_at()).await;

        Ok(board)
    }

    /// Access the underlying source for calls that bypass the cache.
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &DepartureCache {
        &self.cache
    }

    /// Empty the cache.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
        info!("cache cleared");
    }

    /// Cache snapshot at `now`.
    pub async fn cache_status(&self, now: &NetworkTime) -> CacheStatus {
        self.cache.status(now).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::TimeDelta;

    use crate::domain::parse_civil;
    use crate::trafiklab::{RawDeparture, StopPoint, convert_departures, station_name};

    /// In-memory source that counts fetches.
    #[derive(Default)]
    struct CountingSource {
        boards: HashMap<String, DeparturesResponse>,
        fetches: AtomicUsize,
        fail_with_status: Option<u16>,
    }

    impl CountingSource {
        fn with_board(mut self, site_id: &str, name: &str, departures: usize) -> Self {
            let board = DeparturesResponse {
                departures: Some(vec![RawDeparture::default(); departures]),
                stops: Some(vec![StopPoint {
                    name: Some(name.to_string()),
                }]),
            };
            self.boards.insert(site_id.to_string(), board);
            self
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    impl DepartureSource for CountingSource {
        async fn fetch_departures(
            &self,
            site_id: &str,
        ) -> Result<DeparturesResponse, TrafiklabError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(status) = self.fail_with_status {
                return Err(TrafiklabError::Api {
                    status,
                    excerpt: "upstream down".into(),
                });
            }
            self.boards
                .get(site_id)
                .cloned()
                .ok_or_else(|| TrafiklabError::NotFound {
                    site_id: site_id.to_string(),
                })
        }
    }

    /// Source that takes a while to answer.
    struct SlowSource {
        delay: std::time::Duration,
    }

    impl DepartureSource for SlowSource {
        async fn fetch_departures(
            &self,
            _site_id: &str,
        ) -> Result<DeparturesResponse, TrafiklabError> {
            tokio::time::sleep(self.delay).await;
            Ok(DeparturesResponse::default())
        }
    }

    fn at(s: &str) -> NetworkTime {
        parse_civil(s).unwrap()
    }

    #[tokio::test]
    async fn miss_fetches_and_stores() {
        let source = CountingSource::default().with_board("1", "Helenelund", 3);
        let cached = CachedDepartures::new(source, TtlPolicy::default());
        let now = at("2025-10-17T12:00:00");

        let board = cached.get_departures_at("1", now).await.unwrap();
        assert_eq!(station_name(&board), "Helenelund");
        assert_eq!(cached.source().fetches(), 1);
        assert!(cached.cache().is_valid(&now).await);
    }

    #[tokio::test]
    async fn hit_does_not_fetch() {
        let source = CountingSource::default().with_board("1", "Helenelund", 3);
        let cached = CachedDepartures::new(source, TtlPolicy::default());
        let now = at("2025-10-17T12:00:00");

        cached.get_departures_at("1", now).await.unwrap();
        cached
            .get_departures_at("1", now + TimeDelta::seconds(60))
            .await
            .unwrap();

        assert_eq!(cached.source().fetches(), 1);
    }

    #[tokio::test]
    async fn expired_entry_is_refetched() {
        let source = CountingSource::default().with_board("1", "Helenelund", 3);
        let cached = CachedDepartures::new(source, TtlPolicy::default());
        let now = at("2025-10-17T12:00:00");

        cached.get_departures_at("1", now).await.unwrap();
        cached
            .get_departures_at("1", now + TimeDelta::seconds(121))
            .await
            .unwrap();

        assert_eq!(cached.source().fetches(), 2);
    }

    #[tokio::test]
    async fn fresh_entry_is_served_for_any_site() {
        let source = CountingSource::default()
            .with_board("1", "Helenelund", 3)
            .with_board("2", "Sollentuna", 5);
        let cached = CachedDepartures::new(source, TtlPolicy::default());
        let now = at("2025-10-17T12:00:00");

        cached.get_departures_at("1", now).await.unwrap();
        let board = cached.get_departures_at("2", now).await.unwrap();

        // The slot is global: site 2 gets site 1's board.
        assert_eq!(station_name(&board), "Helenelund");
        assert_eq!(cached.source().fetches(), 1);
    }

    #[tokio::test]
    async fn not_found_leaves_cache_untouched() {
        let source = CountingSource::default().with_board("1", "Helenelund", 3);
        let cached = CachedDepartures::new(source, TtlPolicy::default());
        let now = at("2025-10-17T12:00:00");

        cached.get_departures_at("1", now).await.unwrap();
        let before = cached.cache().get().await;
        assert!(before.is_some());

        let later = now + TimeDelta::minutes(10);
        let err = cached.get_departures_at("unknown", later).await.unwrap_err();
        assert!(matches!(err, TrafiklabError::NotFound { .. }));
        assert_eq!(cached.cache().get().await, before);
    }

    #[tokio::test]
    async fn failure_keeps_stale_board() {
        let source = CountingSource {
            fail_with_status: Some(503),
            ..CountingSource::default()
        };
        let cached = CachedDepartures::new(source, TtlPolicy::default());
        let t0 = at("2025-10-17T12:00:00");
        let stale = Arc::new(DeparturesResponse::default());
        cached.cache().put(stale.clone(), t0).await;

        let later = t0 + TimeDelta::minutes(5);
        let err = cached.get_departures_at("1", later).await.unwrap_err();
        assert!(matches!(err, TrafiklabError::Api { status: 503, .. }));

        assert_eq!(cached.cache().get().await, Some(stale));
        assert!(!cached.cache().is_valid(&later).await);
    }

    #[tokio::test]
    async fn clear_forces_refetch() {
        let source = CountingSource::default().with_board("1", "Helenelund", 3);
        let cached = CachedDepartures::new(source, TtlPolicy::default());
        let now = at("2025-10-17T12:00:00");

        cached.get_departures_at("1", now).await.unwrap();
        cached.clear_cache().await;
        cached.get_departures_at("1", now).await.unwrap();

        assert_eq!(cached.source().fetches(), 2);
    }

    #[tokio::test]
    async fn twelve_departures_become_ten() {
        let source = CountingSource::default().with_board("1", "Helenelund", 12);
        let cached = CachedDepartures::new(source, TtlPolicy::default());
        let now = at("2025-10-17T12:00:00");

        let board = cached.get_departures_at("1", now).await.unwrap();
        assert_eq!(convert_departures(&board, &now).len(), 10);
    }

    #[tokio::test]
    async fn status_passes_through() {
        let source = CountingSource::default().with_board("1", "Helenelund", 1);
        let cached = CachedDepartures::new(source, TtlPolicy::default());
        let now = at("2025-10-17T12:00:00");

        assert!(!cached.cache_status(&now).await.cached);
        cached.get_departures_at("1", now).await.unwrap();
        assert!(cached.cache_status(&now).await.valid);
    }

    #[tokio::test]
    async fn slow_fetch_is_stamped_when_it_completes() {
        let delay = std::time::Duration::from_millis(1200);
        let cached = CachedDepartures::new(SlowSource { delay }, TtlPolicy::default());

        let requested = network_now();
        cached.get_departures("1").await.unwrap();

        let status = cached.cache_status(&network_now()).await;
        let fetched_at = status.fetched_at.unwrap();
        assert!(fetched_at - requested >= TimeDelta::milliseconds(1200));
        assert!(status.age.unwrap() < TimeDelta::seconds(1));
    }
}
