use crate::bodies::Body;
use crate::time::JulianDay;
use crate::zodiac::{degree_in_sign, normalize_degrees, ZodiacSign};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during ephemeris calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EphemerisError {
    #[error("Ephemeris unavailable at path: {path}. {message}")]
    Unavailable { path: String, message: String },
    #[error("Failed to calculate position for {body} at JD {julian_day}: {message}")]
    CalculationFailed {
        body: Body,
        julian_day: f64,
        message: String,
    },
    #[error("Ephemeris call for {body} timed out after {millis} ms")]
    Timeout { body: Body, millis: u64 },
    #[error("Ephemeris worker is not running")]
    WorkerStopped,
}

impl EphemerisError {
    /// True when the backend itself cannot serve requests, as opposed to one body failing.
    /// These are the cases a hybrid provider answers from the analytic model instead.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            EphemerisError::Unavailable { .. }
                | EphemerisError::Timeout { .. }
                | EphemerisError::WorkerStopped
        )
    }
}

/// Which calculation produced a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Swiss Ephemeris data files.
    Precise,
    /// Mean-longitude polynomials; low precision.
    Analytic,
}

/// Planetary position data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetPosition {
    pub body: Body,
    /// Ecliptic longitude in degrees, always in [0, 360)
    pub longitude: f64,
    /// Ecliptic latitude in degrees
    pub latitude: f64,
    /// Distance in AU
    pub distance: f64,
    /// Speed in longitude (degrees per day)
    pub speed: f64,
    pub retrograde: bool,
    pub backend: Backend,
}

impl PlanetPosition {
    /// Build a position, normalizing longitude and deriving retrograde from speed.
    pub fn new(
        body: Body,
        longitude: f64,
        latitude: f64,
        distance: f64,
        speed: f64,
        backend: Backend,
    ) -> Self {
        Self {
            body,
            longitude: normalize_degrees(longitude),
            latitude,
            distance,
            speed,
            retrograde: speed < 0.0,
            backend,
        }
    }

    pub fn with_retrograde(mut self, retrograde: bool) -> Self {
        self.retrograde = retrograde;
        self
    }

    pub fn sign(&self) -> ZodiacSign {
        ZodiacSign::from_longitude(self.longitude)
    }

    pub fn degree_in_sign(&self) -> f64 {
        degree_in_sign(self.longitude)
    }
}

/// Source of body positions for a given instant.
#[async_trait]
pub trait EphemerisProvider: Send + Sync {
    fn name(&self) -> &str;

    /// The backend this provider answers with when everything is healthy.
    fn preferred_backend(&self) -> Backend;

    async fn position_of(
        &self,
        body: Body,
        julian_day: JulianDay,
    ) -> Result<PlanetPosition, EphemerisError>;

    /// Resolve several bodies, keeping per-body failures.
    async fn positions_of(
        &self,
        bodies: &[Body],
        julian_day: JulianDay,
    ) -> Vec<(Body, Result<PlanetPosition, EphemerisError>)> {
        let mut results = Vec::with_capacity(bodies.len());
        for &body in bodies {
            results.push((body, self.position_of(body, julian_day).await));
        }
        results
    }
}
