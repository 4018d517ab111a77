use crate::aspects::AspectDetector;
use crate::bodies::Body;
use crate::cache::{ChartCache, TransitCache};
use crate::chart::{BirthChart, BirthInput, ChartBuilder, ChartError, ChartOutcome};
use crate::config::{BackendChoice, EngineSettings};
use crate::ephemeris::{
    AnalyticProvider, EphemerisError, EphemerisProvider, HybridProvider, PreciseProvider,
};
use crate::synastry::{compatibility, Compatibility};
use crate::time::JulianDay;
use crate::transit::{DailyInsight, Transit, TransitEngine, TransitError};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Entry point wiring one ephemeris provider into chart building, transit
/// evaluation and the caches in front of them.
pub struct Astrologer {
    settings: EngineSettings,
    provider: Arc<dyn EphemerisProvider>,
    precise: Option<Arc<PreciseProvider>>,
    builder: ChartBuilder,
    engine: TransitEngine,
    detector: AspectDetector,
    charts: ChartCache,
    transits: TransitCache,
}

impl Astrologer {
    /// Select and start the backend named in `settings`.
    ///
    /// `precise` fails when the data files are missing; `hybrid` degrades to the
    /// analytic model instead.
    pub fn from_settings(settings: EngineSettings) -> Result<Self, EphemerisError> {
        let analytic = AnalyticProvider::with_retrograde_mode(settings.retrograde_mode);
        let (provider, precise): (Arc<dyn EphemerisProvider>, Option<Arc<PreciseProvider>>) =
            match settings.backend {
                BackendChoice::Analytic => (Arc::new(analytic) as Arc<dyn EphemerisProvider>, None),
                BackendChoice::Precise => {
                    let precise = Arc::new(PreciseProvider::start(
                        settings.ephemeris_path.clone(),
                        settings.precise_timeout(),
                    )?);
                    (precise.clone() as Arc<dyn EphemerisProvider>, Some(precise))
                }
                BackendChoice::Hybrid => {
                    match PreciseProvider::start(
                        settings.ephemeris_path.clone(),
                        settings.precise_timeout(),
                    ) {
                        Ok(precise) => {
                            let precise = Arc::new(precise);
                            let hybrid = HybridProvider::new(
                                Some(precise.clone() as Arc<dyn EphemerisProvider>),
                                analytic,
                            );
                            (Arc::new(hybrid) as Arc<dyn EphemerisProvider>, Some(precise))
                        }
                        Err(e) => {
                            log::warn!(
                                "Precise ephemeris unavailable, using analytic model: {}",
                                e
                            );
                            (
                                Arc::new(HybridProvider::analytic_only(analytic))
                                    as Arc<dyn EphemerisProvider>,
                                None,
                            )
                        }
                    }
                }
            };

        log::info!(
            "Astrologer ready: backend {} via {}",
            settings.backend,
            provider.name()
        );
        let mut astrologer = Self::with_provider(provider, settings);
        astrologer.precise = precise;
        Ok(astrologer)
    }

    /// Use an already constructed provider; `settings.backend` is ignored.
    pub fn with_provider(provider: Arc<dyn EphemerisProvider>, settings: EngineSettings) -> Self {
        let detector = AspectDetector::with_orbs(settings.orbs);
        let builder = ChartBuilder::new(provider.clone())
            .with_house_system(settings.house_system)
            .with_detector(detector.clone())
            .with_chiron(settings.include_chiron);
        let engine = TransitEngine::new(provider.clone())
            .with_detector(detector.clone())
            .with_ingresses(settings.include_sign_ingresses);
        let transits = TransitCache::new(settings.transit_bucket());

        Self {
            settings,
            provider,
            precise: None,
            builder,
            engine,
            detector,
            charts: ChartCache::new(),
            transits,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn provider(&self) -> &Arc<dyn EphemerisProvider> {
        &self.provider
    }

    pub fn engine(&self) -> &TransitEngine {
        &self.engine
    }

    /// Natal chart for `input`, built once per birth input.
    ///
    /// Charts carrying [`crate::chart::ChartWarning::DegradedPrecision`] are returned
    /// but not memoized, so a later call can pick up the precise backend once it answers again.
    pub async fn natal_chart(&self, input: &BirthInput) -> Result<Arc<ChartOutcome>, ChartError> {
        let key = input.cache_key();
        if let Some(outcome) = self.charts.get(&key).await {
            return Ok(outcome);
        }
        let outcome = self.builder.build_chart(input).await?;
        if outcome.is_degraded() {
            log::debug!("Not memoizing degraded chart {}", key);
            return Ok(Arc::new(outcome));
        }
        Ok(self.charts.insert(key, outcome).await)
    }

    /// Transits at `now`, reused within the current time bucket.
    pub async fn transits(
        &self,
        now: DateTime<Utc>,
        chart: &BirthChart,
    ) -> Result<Arc<Vec<Transit>>, TransitError> {
        let key = chart.input.cache_key();
        if let Some(cached) = self.transits.get(now, &key).await {
            return Ok(cached);
        }
        let transits = self.engine.evaluate(now, chart).await?;
        Ok(self.transits.insert(now, key, transits).await)
    }

    pub async fn daily_insight(
        &self,
        now: DateTime<Utc>,
        chart: &BirthChart,
    ) -> Result<DailyInsight, TransitError> {
        let transits = self.transits(now, chart).await?;
        let julian_day = JulianDay::from_datetime(now);
        let sun = self.essential_longitude(Body::Sun, julian_day).await?;
        let moon = self.essential_longitude(Body::Moon, julian_day).await?;
        Ok(DailyInsight::compose(now, &transits, sun, moon))
    }

    pub fn compatibility(&self, first: &BirthChart, second: &BirthChart) -> Compatibility {
        compatibility(&self.detector, first, second)
    }

    /// Stop the precise worker, if one was started. Later precise calls fail over
    /// to the analytic model under the hybrid backend.
    pub fn shutdown(&self) {
        if let Some(precise) = &self.precise {
            precise.shutdown();
        }
    }

    async fn essential_longitude(
        &self,
        body: Body,
        julian_day: JulianDay,
    ) -> Result<f64, TransitError> {
        self.provider
            .position_of(body, julian_day)
            .await
            .map(|p| p.longitude)
            .map_err(|source| TransitError::EssentialBodyMissing { body, source })
    }
}
