use crate::aspects::Aspect;
use crate::bodies::Body;
use crate::ephemeris::{Backend, PlanetPosition};
use crate::houses::{HouseError, HouseSystemKind};
use crate::time::{JulianDay, TimeError};
use crate::zodiac::ZodiacSign;
use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error(transparent)]
    InvalidDate(#[from] TimeError),
    #[error("Invalid location: latitude {latitude}, longitude {longitude}")]
    InvalidLocation { latitude: f64, longitude: f64 },
    #[error(transparent)]
    HouseCalculationFailed(#[from] HouseError),
    #[error("Chart build failed: {reason}")]
    ChartBuildFailed { reason: String },
}

/// Geographic location coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lon: f64,
}

/// Birth moment and place. City and country are labels only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthInput {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    #[serde(default)]
    pub second: f64,
    /// Hours east of UTC
    #[serde(default)]
    pub timezone_offset_hours: f64,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl BirthInput {
    pub fn from_naive(
        local: NaiveDateTime,
        timezone_offset_hours: f64,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            year: local.year(),
            month: local.month(),
            day: local.day(),
            hour: local.hour(),
            minute: local.minute(),
            second: f64::from(local.second()),
            timezone_offset_hours,
            latitude,
            longitude,
            city: None,
            country: None,
        }
    }

    pub fn with_place(mut self, city: impl Into<String>, country: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self.country = Some(country.into());
        self
    }

    pub fn location(&self) -> GeoLocation {
        GeoLocation {
            lat: self.latitude,
            lon: self.longitude,
        }
    }

    /// Memoization key over the computational fields; labels are ignored.
    pub fn cache_key(&self) -> String {
        format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:09.6}{:+.4}@{:.6},{:.6}",
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.timezone_offset_hours,
            self.latitude,
            self.longitude
        )
    }
}

/// A body placed in the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPlanet {
    #[serde(flatten)]
    pub position: PlanetPosition,
    pub sign: ZodiacSign,
    /// 1..=12
    pub house: u8,
}

impl ChartPlanet {
    pub fn body(&self) -> Body {
        self.position.body
    }

    pub fn longitude(&self) -> f64 {
        self.position.longitude
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct House {
    pub number: u8,
    pub cusp: f64,
    pub sign: ZodiacSign,
}

/// Which backends produced a chart's positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartBackend {
    Precise,
    Analytic,
    Mixed,
}

impl ChartBackend {
    pub fn summarize(backends: impl IntoIterator<Item = Backend>) -> Self {
        let mut precise = false;
        let mut analytic = false;
        for backend in backends {
            match backend {
                Backend::Precise => precise = true,
                Backend::Analytic => analytic = true,
            }
        }
        match (precise, analytic) {
            (true, true) => ChartBackend::Mixed,
            (true, false) => ChartBackend::Precise,
            _ => ChartBackend::Analytic,
        }
    }
}

/// Immutable natal chart snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthChart {
    pub input: BirthInput,
    pub julian_day: JulianDay,
    pub location: GeoLocation,
    pub house_system: HouseSystemKind,
    pub ascendant: f64,
    pub midheaven: f64,
    pub planets: Vec<ChartPlanet>,
    pub houses: Vec<House>,
    pub aspects: Vec<Aspect>,
    pub backend: ChartBackend,
}

impl BirthChart {
    pub fn planet(&self, body: Body) -> Option<&ChartPlanet> {
        self.planets.iter().find(|p| p.body() == body)
    }

    pub fn sun_sign(&self) -> Option<ZodiacSign> {
        self.planet(Body::Sun).map(|p| p.sign)
    }

    pub fn moon_sign(&self) -> Option<ZodiacSign> {
        self.planet(Body::Moon).map(|p| p.sign)
    }

    pub fn rising_sign(&self) -> ZodiacSign {
        ZodiacSign::from_longitude(self.ascendant)
    }

    pub fn positions(&self) -> Vec<PlanetPosition> {
        self.planets.iter().map(|p| p.position.clone()).collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartWarning {
    /// A non-essential body could not be resolved and is absent from the chart.
    BodyOmitted { body: Body, reason: String },
    /// The precise backend was preferred but these bodies came from the analytic model.
    DegradedPrecision { bodies: Vec<Body> },
}

/// A chart plus anything that went wrong on the way to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOutcome {
    pub chart: BirthChart,
    pub warnings: Vec<ChartWarning>,
}

impl ChartOutcome {
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }

    /// True when the precise backend was preferred but some positions are approximate.
    pub fn is_degraded(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, ChartWarning::DegradedPrecision { .. }))
    }
}
