//! Single-slot cache for the last fetched board.
//!
//! The slot is process-wide and not keyed by site: whatever was fetched last
//! is served to every caller until it expires.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use tokio::sync::RwLock;

use super::policy::{Period, TtlPolicy};
use crate::domain::NetworkTime;
use crate::trafiklab::DeparturesResponse;

/// A cached board and when it was fetched.
#[derive(Debug, Clone)]
struct CacheEntry {
    board: Arc<DeparturesResponse>,
    fetched_at: NetworkTime,
}

impl CacheEntry {
    fn age(&self, now: &NetworkTime) -> TimeDelta {
        now.signed_duration_since(self.fetched_at)
    }

    fn is_fresh(&self, now: &NetworkTime, ttl: Duration) -> bool {
        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        self.age(now) < ttl
    }
}

/// Point-in-time view of the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStatus {
    /// Whether the slot holds a board.
    pub cached: bool,

    /// When the held board was fetched.
    pub fetched_at: Option<NetworkTime>,

    /// Time since the fetch.
    pub age: Option<TimeDelta>,

    /// Whether the held board would be served.
    pub valid: bool,

    /// Time left before expiry, floored at zero.
    pub expires_in: Option<TimeDelta>,

    /// TTL in force at the time of the snapshot.
    pub ttl: Duration,

    pub period: Period,
}

/// Process-wide cache holding at most one departure board.
///
/// Reads and writes go through one lock around the whole entry, so a
/// board is never observed with another write's timestamp.
#[derive(Debug)]
pub struct DepartureCache {
    slot: RwLock<Option<CacheEntry>>,
    policy: TtlPolicy,
}

impl DepartureCache {
    /// Create an empty cache.
    pub fn new(policy: TtlPolicy) -> Self {
        Self {
            slot: RwLock::new(None),
            policy,
        }
    }

    pub fn policy(&self) -> &TtlPolicy {
        &self.policy
    }

    /// Whether the held board is younger than the TTL in force at `now`.
    /// Always false when empty.
    pub async fn is_valid(&self, now: &NetworkTime) -> bool {
        let ttl = self.policy.current_ttl(now);
        self.slot
            .read()
            .await
            .as_ref()
            .is_some_and(|entry| entry.is_fresh(now, ttl))
    }

    /// The held board, fresh or not.
    pub async fn get(&self) -> Option<Arc<DeparturesResponse>> {
        self.slot.read().await.as_ref().map(|entry| entry.board.clone())
    }

    /// The held board, only if it is still valid at `now`.
    ///
    /// Checks and reads under one lock, so a concurrent [`clear`](Self::clear)
    /// cannot land in between.
    pub async fn fresh(&self, now: &NetworkTime) -> Option<Arc<DeparturesResponse>> {
        let ttl = self.policy.current_ttl(now);
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|entry| entry.is_fresh(now, ttl))
            .map(|entry| entry.board.clone())
    }

    /// Replace the held board.
    pub async fn put(&self, board: Arc<DeparturesResponse>, fetched_at: NetworkTime) {
        *self.slot.write().await = Some(CacheEntry { board, fetched_at });
    }

    /// Empty the slot.
    pub async fn clear(&self) {
        *self.slot.write().await = None;
    }

    /// Snapshot for the status endpoint.
    pub async fn status(&self, now: &NetworkTime) -> CacheStatus {
        let period = self.policy.period(now);
        let ttl = self.policy.ttl_for(period);
        let entry = self.slot.read().await.clone();

        match entry {
            Some(entry) => {
                let age = entry.age(now);
                let ttl_delta = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
                CacheStatus {
                    cached: true,
                    fetched_at: Some(entry.fetched_at),
                    age: Some(age),
                    valid: entry.is_fresh(now, ttl),
                    expires_in: Some((ttl_delta - age).max(TimeDelta::zero())),
                    ttl,
                    period,
                }
            }
            None => CacheStatus {
                cached: false,
                fetched_at: None,
                age: None,
                valid: false,
                expires_in: None,
                ttl,
                period,
            },
        }
    }
}

impl Default for DepartureCache {
    fn default() -> Self {
        Self::new(TtlPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parse_civil;
    use crate::trafiklab::StopPoint;

    fn at(s: &str) -> NetworkTime {
        parse_civil(s).unwrap()
    }

    fn board(name: &str) -> Arc<DeparturesResponse> {
        Arc::new(DeparturesResponse {
            departures: Some(Vec::new()),
            stops: Some(vec![StopPoint {
                name: Some(name.to_string()),
            }]),
        })
    }

    #[tokio::test]
    async fn new_cache_is_empty_and_invalid() {
        let cache = DepartureCache::default();
        let now = at("2025-10-17T12:00:00");

        assert!(!cache.is_valid(&now).await);
        assert!(cache.get().await.is_none());
        assert!(cache.fresh(&now).await.is_none());
    }

    #[tokio::test]
    async fn put_then_valid() {
        let cache = DepartureCache::default();
        let t0 = at("2025-10-17T12:00:00");

        cache.put(board("A"), t0).await;
        assert!(cache.is_valid(&t0).await);
        assert_eq!(cache.get().await, Some(board("A")));
    }

    #[tokio::test]
    async fn day_ttl_boundary() {
        let cache = DepartureCache::default();
        let t0 = at("2025-10-17T12:00:00");
        cache.put(board("A"), t0).await;

        let just_before = t0 + TimeDelta::seconds(120) - TimeDelta::milliseconds(1);
        let exactly = t0 + TimeDelta::seconds(120);
        let just_after = t0 + TimeDelta::seconds(120) + TimeDelta::milliseconds(1);

        assert!(cache.is_valid(&just_before).await);
        assert!(!cache.is_valid(&exactly).await);
        assert!(!cache.is_valid(&just_after).await);
    }

    #[tokio::test]
    async fn night_ttl_boundary() {
        let cache = DepartureCache::default();
        let t0 = at("2025-10-17T03:00:00");
        cache.put(board("A"), t0).await;

        assert!(cache.is_valid(&(t0 + TimeDelta::seconds(599))).await);
        assert!(!cache.is_valid(&(t0 + TimeDelta::seconds(601))).await);
    }

    #[tokio::test]
    async fn ttl_is_chosen_at_read_time() {
        // Fetched at night, read after 07:00: the shorter day TTL applies.
        let cache = DepartureCache::default();
        let t0 = at("2025-10-17T06:58:00");
        cache.put(board("A"), t0).await;

        assert!(cache.is_valid(&at("2025-10-17T06:59:59")).await);
        assert!(!cache.is_valid(&at("2025-10-17T07:02:30")).await);
    }

    #[tokio::test]
    async fn get_ignores_expiry_but_fresh_does_not() {
        let cache = DepartureCache::default();
        let t0 = at("2025-10-17T12:00:00");
        cache.put(board("A"), t0).await;

        let later = t0 + TimeDelta::minutes(30);
        assert!(cache.get().await.is_some());
        assert!(cache.fresh(&later).await.is_none());
    }

    #[tokio::test]
    async fn clear_invalidates() {
        let cache = DepartureCache::default();
        let t0 = at("2025-10-17T12:00:00");
        cache.put(board("A"), t0).await;

        cache.clear().await;
        assert!(!cache.is_valid(&t0).await);
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn put_overwrites() {
        let cache = DepartureCache::default();
        let t0 = at("2025-10-17T12:00:00");
        cache.put(board("A"), t0).await;
        cache.put(board("B"), t0 + TimeDelta::seconds(10)).await;

        assert_eq!(cache.get().await, Some(board("B")));
        let status = cache.status(&(t0 + TimeDelta::seconds(10))).await;
        assert_eq!(status.age, Some(TimeDelta::zero()));
    }

    #[tokio::test]
    async fn status_of_empty_cache() {
        let cache = DepartureCache::default();
        let status = cache.status(&at("2025-10-17T02:00:00")).await;

        assert!(!status.cached);
        assert!(!status.valid);
        assert_eq!(status.age, None);
        assert_eq!(status.expires_in, None);
        assert_eq!(status.ttl, Duration::from_secs(600));
        assert_eq!(status.period, Period::Night);
    }

    #[tokio::test]
    async fn status_reports_age_and_expiry() {
        let cache = DepartureCache::default();
        let t0 = at("2025-10-17T12:00:00");
        cache.put(board("A"), t0).await;

        let status = cache.status(&(t0 + TimeDelta::seconds(45))).await;
        assert!(status.cached);
        assert!(status.valid);
        assert_eq!(status.fetched_at, Some(t0));
        assert_eq!(status.age, Some(TimeDelta::seconds(45)));
        assert_eq!(status.expires_in, Some(TimeDelta::seconds(75)));
        assert_eq!(status.period, Period::Day);

        let status = cache.status(&(t0 + TimeDelta::seconds(500))).await;
        assert!(!status.valid);
        assert_eq!(status.expires_in, Some(TimeDelta::zero()));
    }

    #[tokio::test]
    async fn concurrent_writers_never_tear() {
        let cache = Arc::new(DepartureCache::default());
        let t0 = at("2025-10-17T12:00:00");

        let writers: Vec<_> = (0..16)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    cache.put(board(&i.to_string()), t0 + TimeDelta::seconds(i)).await;
                })
            })
            .collect();
        for w in writers {
            w.await.unwrap();
        }

        // Whichever write won, its board and timestamp belong together.
        let status = cache.status(&(t0 + TimeDelta::seconds(20))).await;
        let fetched_offset = (status.fetched_at.unwrap() - t0).num_seconds();
        let held = cache.get().await.unwrap();
        let name = held.stops.as_ref().unwrap()[0].name.clone().unwrap();
        assert_eq!(name, fetched_offset.to_string());
    }
}
