use crate::chart::BirthChart;
use crate::service::Astrologer;
use crate::transit::{Transit, TransitError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

#[derive(Debug, Clone)]
pub struct FeedUpdate {
    pub at: DateTime<Utc>,
    pub transits: Arc<Vec<Transit>>,
    /// False when the list was served unchanged from the current cache bucket.
    pub fresh: bool,
}

/// Periodic transit re-evaluation for one natal chart.
pub struct TransitFeed {
    astrologer: Arc<Astrologer>,
    chart: Arc<BirthChart>,
    interval: Duration,
    last_poll: Option<Instant>,
    last: Option<Arc<Vec<Transit>>>,
}

impl TransitFeed {
    pub fn new(astrologer: Arc<Astrologer>, chart: Arc<BirthChart>, interval: Duration) -> Self {
        Self {
            astrologer,
            chart,
            interval,
            last_poll: None,
            last: None,
        }
    }

    pub fn chart(&self) -> &BirthChart {
        &self.chart
    }

    /// Wait out the rest of the interval, then evaluate at the current time.
    pub async fn poll(&mut self) -> Result<FeedUpdate, TransitError> {
        if let Some(last) = self.last_poll {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                sleep(self.interval - elapsed).await;
            }
        }
        self.last_poll = Some(Instant::now());
        self.poll_at(Utc::now()).await
    }

    /// Evaluate at `now` without throttling.
    pub async fn poll_at(&mut self, now: DateTime<Utc>) -> Result<FeedUpdate, TransitError> {
        let transits = match self.astrologer.transits(now, &self.chart).await {
            Ok(transits) => transits,
            Err(e) => {
                log::warn!("Transit evaluation failed: {}", e);
                return Err(e);
            }
        };
        let fresh = !matches!(&self.last, Some(previous) if Arc::ptr_eq(previous, &transits));
        self.last = Some(transits.clone());
        Ok(FeedUpdate {
            at: now,
            transits,
            fresh,
        })
    }
}
