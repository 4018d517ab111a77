//! Memoization for natal charts and time-bucketed transit results.

use crate::chart::ChartOutcome;
use crate::transit::Transit;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Natal charts keyed by [`crate::chart::BirthInput::cache_key`]. Entries never expire.
#[derive(Default)]
pub struct ChartCache {
    charts: RwLock<HashMap<String, Arc<ChartOutcome>>>,
}

impl ChartCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<Arc<ChartOutcome>> {
        self.charts.read().await.get(key).cloned()
    }

    /// Store an outcome, keeping the first one if a concurrent build got there earlier.
    pub async fn insert(&self, key: String, outcome: ChartOutcome) -> Arc<ChartOutcome> {
        let mut charts = self.charts.write().await;
        charts
            .entry(key)
            .or_insert_with(|| Arc::new(outcome))
            .clone()
    }

    pub async fn len(&self) -> usize {
        self.charts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.charts.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.charts.write().await.clear();
    }
}

type BucketKey = (i64, String);

/// Transit lists keyed by (time bucket, chart key).
///
/// A lookup only ever matches the bucket containing `now`, so results from an
/// earlier bucket are recomputed rather than served. Stale buckets are dropped on insert.
pub struct TransitCache {
    bucket_secs: i64,
    entries: RwLock<HashMap<BucketKey, Arc<Vec<Transit>>>>,
}

impl TransitCache {
    pub fn new(bucket: Duration) -> Self {
        Self {
            bucket_secs: bucket.as_secs().max(1) as i64,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn bucket_of(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp().div_euclid(self.bucket_secs)
    }

    pub async fn get(&self, now: DateTime<Utc>, chart_key: &str) -> Option<Arc<Vec<Transit>>> {
        let bucket = self.bucket_of(now);
        let found = self
            .entries
            .read()
            .await
            .get(&(bucket, chart_key.to_string()))
            .cloned();
        if found.is_some() {
            log::debug!("Transit cache hit for bucket {}", bucket);
        } else {
            log::debug!("Transit cache miss for bucket {}", bucket);
        }
        found
    }

    pub async fn insert(
        &self,
        now: DateTime<Utc>,
        chart_key: String,
        transits: Vec<Transit>,
    ) -> Arc<Vec<Transit>> {
        let bucket = self.bucket_of(now);
        let transits = Arc::new(transits);
        let mut entries = self.entries.write().await;
        entries.retain(|(b, _), _| *b >= bucket);
        entries.insert((bucket, chart_key), transits.clone());
        transits
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
