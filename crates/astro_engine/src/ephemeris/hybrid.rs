use crate::bodies::Body;
use crate::ephemeris::analytic::AnalyticProvider;
use crate::ephemeris::types::{Backend, EphemerisError, EphemerisProvider, PlanetPosition};
use crate::time::JulianDay;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Tries the precise backend first and answers from the analytic model when the
/// precise one is unavailable, timed out or stopped.
///
/// Fallback is never silent: each substitution is logged, counted, and visible on
/// the returned position through [`PlanetPosition::backend`]. A per-body
/// `CalculationFailed` from the precise backend is passed through unchanged.
pub struct HybridProvider {
    precise: Option<Arc<dyn EphemerisProvider>>,
    analytic: AnalyticProvider,
    fallbacks: AtomicUsize,
}

impl HybridProvider {
    pub fn new(precise: Option<Arc<dyn EphemerisProvider>>, analytic: AnalyticProvider) -> Self {
        if precise.is_none() {
            log::warn!("Precise ephemeris not available; all positions will be approximate");
        }
        Self {
            precise,
            analytic,
            fallbacks: AtomicUsize::new(0),
        }
    }

    /// Analytic-only hybrid, used when the precise backend failed to start.
    pub fn analytic_only(analytic: AnalyticProvider) -> Self {
        Self::new(None, analytic)
    }

    pub fn has_precise(&self) -> bool {
        self.precise.is_some()
    }

    /// Number of positions answered by the analytic model instead of the precise one.
    pub fn fallback_count(&self) -> usize {
        self.fallbacks.load(Ordering::Relaxed)
    }

    fn fallback(
        &self,
        body: Body,
        julian_day: JulianDay,
        reason: &EphemerisError,
    ) -> Result<PlanetPosition, EphemerisError> {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
        log::warn!(
            "Falling back to analytic ephemeris for {} at JD {}: {}",
            body,
            julian_day.value(),
            reason
        );
        self.analytic.compute(body, julian_day)
    }
}

#[async_trait]
impl EphemerisProvider for HybridProvider {
    fn name(&self) -> &str {
        "hybrid"
    }

    fn preferred_backend(&self) -> Backend {
        Backend::Precise
    }

    async fn position_of(
        &self,
        body: Body,
        julian_day: JulianDay,
    ) -> Result<PlanetPosition, EphemerisError> {
        let Some(precise) = &self.precise else {
            self.fallbacks.fetch_add(1, Ordering::Relaxed);
            return self.analytic.compute(body, julian_day);
        };

        match precise.position_of(body, julian_day).await {
            Ok(position) => Ok(position),
            Err(e) if e.is_unavailable() => self.fallback(body, julian_day, &e),
            Err(e) => Err(e),
        }
    }
}
