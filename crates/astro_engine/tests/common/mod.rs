#![allow(dead_code)]

use astro_engine::chart::BirthInput;
use astro_engine::ephemeris::{Backend, EphemerisError, EphemerisProvider, PlanetPosition};
use astro_engine::time::JulianDay;
use astro_engine::Body;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Answers from a fixed longitude table; unknown bodies fail to resolve.
pub struct ScriptedProvider {
    longitudes: HashMap<Body, f64>,
    speed: f64,
    backend: Backend,
}

impl ScriptedProvider {
    pub fn new(longitudes: &[(Body, f64)]) -> Self {
        Self {
            longitudes: longitudes.iter().copied().collect(),
            speed: 1.0,
            backend: Backend::Precise,
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }
}

#[async_trait]
impl EphemerisProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn preferred_backend(&self) -> Backend {
        self.backend
    }

    async fn position_of(
        &self,
        body: Body,
        julian_day: JulianDay,
    ) -> Result<PlanetPosition, EphemerisError> {
        match self.longitudes.get(&body) {
            Some(&longitude) => Ok(PlanetPosition::new(
                body,
                longitude,
                0.0,
                1.0,
                self.speed,
                self.backend,
            )),
            None => Err(EphemerisError::CalculationFailed {
                body,
                julian_day: julian_day.value(),
                message: "not scripted".to_string(),
            }),
        }
    }
}

/// Always unavailable, counting how often it was asked.
#[derive(Default)]
pub struct FailingProvider {
    calls: AtomicUsize,
}

impl FailingProvider {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EphemerisProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    fn preferred_backend(&self) -> Backend {
        Backend::Precise
    }

    async fn position_of(
        &self,
        _body: Body,
        _julian_day: JulianDay,
    ) -> Result<PlanetPosition, EphemerisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(EphemerisError::Unavailable {
            path: "/nonexistent".to_string(),
            message: "no data files".to_string(),
        })
    }
}

/// Fails with a fixed backend error until marked healthy, then answers from a
/// scripted longitude table.
pub struct FlakyProvider {
    error: EphemerisError,
    healthy: AtomicBool,
    calls: AtomicUsize,
    inner: ScriptedProvider,
}

impl FlakyProvider {
    pub fn new(error: EphemerisError, longitudes: &[(Body, f64)]) -> Self {
        Self {
            error,
            healthy: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            inner: ScriptedProvider::new(longitudes),
        }
    }

    pub fn timing_out(longitudes: &[(Body, f64)]) -> Self {
        Self::new(
            EphemerisError::Timeout {
                body: Body::Sun,
                millis: 2000,
            },
            longitudes,
        )
    }

    pub fn stopped(longitudes: &[(Body, f64)]) -> Self {
        Self::new(EphemerisError::WorkerStopped, longitudes)
    }

    pub fn recover(&self) {
        self.healthy.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EphemerisProvider for FlakyProvider {
    fn name(&self) -> &str {
        "flaky"
    }

    fn preferred_backend(&self) -> Backend {
        Backend::Precise
    }

    async fn position_of(
        &self,
        body: Body,
        julian_day: JulianDay,
    ) -> Result<PlanetPosition, EphemerisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.healthy.load(Ordering::SeqCst) {
            self.inner.position_of(body, julian_day).await
        } else {
            Err(self.error.clone())
        }
    }
}

/// Every chart body spread over the zodiac, Sun at 10° and Moon at 130°.
pub fn full_sky() -> Vec<(Body, f64)> {
    vec![
        (Body::Sun, 10.0),
        (Body::Moon, 130.0),
        (Body::Mercury, 25.0),
        (Body::Venus, 47.0),
        (Body::Mars, 200.0),
        (Body::Jupiter, 75.0),
        (Body::Saturn, 300.0),
        (Body::Uranus, 330.0),
        (Body::Neptune, 345.0),
        (Body::Pluto, 285.0),
        (Body::NorthNode, 160.0),
    ]
}

pub fn london_2000() -> BirthInput {
    BirthInput {
        year: 2000,
        month: 1,
        day: 1,
        hour: 12,
        minute: 0,
        second: 0.0,
        timezone_offset_hours: 0.0,
        latitude: 51.5074,
        longitude: -0.1278,
        city: Some("London".to_string()),
        country: Some("UK".to_string()),
    }
}
