//! House cusps and angles.
//!
//! The ascendant here is the simplified one derived directly from local sidereal
//! time (`LST° mod 360`), with the midheaven a fixed quadrant after it. House systems
//! are strategies over that pair of angles. Quadrant systems (Placidus, Koch...)
//! need full spherical trigonometry with the observer latitude and can be added as
//! further [`HouseSystem`] implementations without touching callers.

use crate::time::JulianDay;
use crate::zodiac::{normalize_degrees, ZodiacSign};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HouseError {
    #[error("House calculation failed: {message}")]
    HouseCalculationFailed { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseSystemKind {
    #[default]
    Equal,
    WholeSign,
}

impl HouseSystemKind {
    pub fn strategy(self) -> Arc<dyn HouseSystem> {
        match self {
            HouseSystemKind::Equal => Arc::new(EqualHouse),
            HouseSystemKind::WholeSign => Arc::new(WholeSignHouse),
        }
    }
}

impl fmt::Display for HouseSystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HouseSystemKind::Equal => f.write_str("equal"),
            HouseSystemKind::WholeSign => f.write_str("whole_sign"),
        }
    }
}

impl FromStr for HouseSystemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "equal" => Ok(HouseSystemKind::Equal),
            "whole_sign" => Ok(HouseSystemKind::WholeSign),
            other => Err(format!(
                "Invalid house system: {}. Valid systems: [\"equal\", \"whole_sign\"]",
                other
            )),
        }
    }
}

/// Strategy placing the twelve cusps from the chart angles.
pub trait HouseSystem: Send + Sync {
    fn kind(&self) -> HouseSystemKind;

    /// Cusps 1..12, each normalized to [0, 360).
    fn cusps(
        &self,
        ascendant: f64,
        midheaven: f64,
        latitude: f64,
    ) -> Result<[f64; 12], HouseError>;

    /// Whether every house spans exactly 30° from cusp 1.
    fn equal_arcs(&self) -> bool {
        true
    }
}

/// Cusp `i` at `ascendant + i × 30°`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualHouse;

impl HouseSystem for EqualHouse {
    fn kind(&self) -> HouseSystemKind {
        HouseSystemKind::Equal
    }

    fn cusps(
        &self,
        ascendant: f64,
        _midheaven: f64,
        _latitude: f64,
    ) -> Result<[f64; 12], HouseError> {
        let mut cusps = [0.0; 12];
        for (i, cusp) in cusps.iter_mut().enumerate() {
            *cusp = normalize_degrees(ascendant + i as f64 * 30.0);
        }
        Ok(cusps)
    }
}

/// Each house is the whole sign, starting with the sign holding the ascendant.
#[derive(Debug, Clone, Copy, Default)]
pub struct WholeSignHouse;

impl HouseSystem for WholeSignHouse {
    fn kind(&self) -> HouseSystemKind {
        HouseSystemKind::WholeSign
    }

    fn cusps(
        &self,
        ascendant: f64,
        _midheaven: f64,
        _latitude: f64,
    ) -> Result<[f64; 12], HouseError> {
        let first = ZodiacSign::index_of(ascendant);
        let mut cusps = [0.0; 12];
        for (i, cusp) in cusps.iter_mut().enumerate() {
            *cusp = ((first + i) % 12) as f64 * 30.0;
        }
        Ok(cusps)
    }
}

/// Angles and cusps for one instant and place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseCusps {
    pub system: HouseSystemKind,
    pub local_sidereal_time: f64,
    pub ascendant: f64,
    pub midheaven: f64,
    pub cusps: [f64; 12],
    equal_arcs: bool,
}

impl HouseCusps {
    /// House number 1..=12 containing `longitude`.
    pub fn house_of(&self, longitude: f64) -> u8 {
        let offset = normalize_degrees(longitude - self.cusps[0]);
        if self.equal_arcs {
            return ((offset / 30.0).floor() as u8).min(11) + 1;
        }
        for i in 0..11 {
            if offset < normalize_degrees(self.cusps[i + 1] - self.cusps[0]) {
                return i as u8 + 1;
            }
        }
        12
    }
}

/// Local sidereal time in hours, from Greenwich mean sidereal time plus east longitude.
pub fn local_sidereal_time_hours(julian_day: JulianDay, longitude: f64) -> f64 {
    let days = julian_day.value() - JulianDay::J2000.value();
    let t = julian_day.centuries_since_j2000();
    let gmst = 280.46061837 + 360.98564736629 * days + 0.000387933 * t * t;
    normalize_degrees(gmst + longitude) / 15.0
}

#[derive(Clone)]
pub struct HouseCalculator {
    system: Arc<dyn HouseSystem>,
}

impl Default for HouseCalculator {
    fn default() -> Self {
        Self::new(Arc::new(EqualHouse))
    }
}

impl HouseCalculator {
    pub fn new(system: Arc<dyn HouseSystem>) -> Self {
        Self { system }
    }

    pub fn for_kind(kind: HouseSystemKind) -> Self {
        Self::new(kind.strategy())
    }

    pub fn system(&self) -> HouseSystemKind {
        self.system.kind()
    }

    /// Ascendant, midheaven and twelve cusps for a Julian Day and geographic position.
    pub fn compute_houses(
        &self,
        julian_day: JulianDay,
        latitude: f64,
        longitude: f64,
    ) -> Result<HouseCusps, HouseError> {
        if !julian_day.value().is_finite() || !latitude.is_finite() || !longitude.is_finite() {
            return Err(HouseError::HouseCalculationFailed {
                message: "non-finite input".to_string(),
            });
        }
        if latitude.abs() >= 90.0 {
            return Err(HouseError::HouseCalculationFailed {
                message: format!("latitude {} is at or beyond a pole", latitude),
            });
        }
        if longitude.abs() > 180.0 {
            return Err(HouseError::HouseCalculationFailed {
                message: format!("longitude {} outside [-180, 180]", longitude),
            });
        }

        let lst = local_sidereal_time_hours(julian_day, longitude);
        let ascendant = normalize_degrees(lst * 15.0);
        let midheaven = normalize_degrees(ascendant + 90.0);
        let cusps = self.system.cusps(ascendant, midheaven, latitude)?;

        Ok(HouseCusps {
            system: self.system.kind(),
            local_sidereal_time: lst,
            ascendant,
            midheaven,
            cusps,
            equal_arcs: self.system.equal_arcs(),
        })
    }
}

/// Equal-house cusps, the system every chart is guaranteed to support.
pub fn compute_houses(
    julian_day: JulianDay,
    latitude: f64,
    longitude: f64,
) -> Result<HouseCusps, HouseError> {
    HouseCalculator::default().compute_houses(julian_day, latitude, longitude)
}
