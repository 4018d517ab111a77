use crate::bodies::Body;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectType {
    Conjunction,
    Sextile,
    Square,
    Trine,
    Opposition,
}

impl AspectType {
    pub const ALL: [AspectType; 5] = [
        AspectType::Conjunction,
        AspectType::Sextile,
        AspectType::Square,
        AspectType::Trine,
        AspectType::Opposition,
    ];

    /// Exact angle for this aspect (0, 60, 90, 120, 180)
    pub fn angle(self) -> f64 {
        match self {
            AspectType::Conjunction => 0.0,
            AspectType::Sextile => 60.0,
            AspectType::Square => 90.0,
            AspectType::Trine => 120.0,
            AspectType::Opposition => 180.0,
        }
    }

    pub fn default_max_orb(self) -> f64 {
        match self {
            AspectType::Sextile => 6.0,
            _ => 8.0,
        }
    }

    pub fn is_harmonic(self) -> bool {
        matches!(self, AspectType::Sextile | AspectType::Trine)
    }

    pub fn name(self) -> &'static str {
        match self {
            AspectType::Conjunction => "conjunction",
            AspectType::Sextile => "sextile",
            AspectType::Square => "square",
            AspectType::Trine => "trine",
            AspectType::Opposition => "opposition",
        }
    }
}

impl fmt::Display for AspectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Maximum orb per aspect type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbTable {
    pub conjunction: f64,
    pub sextile: f64,
    pub square: f64,
    pub trine: f64,
    pub opposition: f64,
}

impl Default for OrbTable {
    fn default() -> Self {
        Self {
            conjunction: AspectType::Conjunction.default_max_orb(),
            sextile: AspectType::Sextile.default_max_orb(),
            square: AspectType::Square.default_max_orb(),
            trine: AspectType::Trine.default_max_orb(),
            opposition: AspectType::Opposition.default_max_orb(),
        }
    }
}

impl OrbTable {
    pub fn max_orb(&self, aspect_type: AspectType) -> f64 {
        match aspect_type {
            AspectType::Conjunction => self.conjunction,
            AspectType::Sextile => self.sextile,
            AspectType::Square => self.square,
            AspectType::Trine => self.trine,
            AspectType::Opposition => self.opposition,
        }
    }

    pub fn with_max_orb(mut self, aspect_type: AspectType, orb: f64) -> Self {
        match aspect_type {
            AspectType::Conjunction => self.conjunction = orb,
            AspectType::Sextile => self.sextile = orb,
            AspectType::Square => self.square = orb,
            AspectType::Trine => self.trine = orb,
            AspectType::Opposition => self.opposition = orb,
        }
        self
    }
}

/// Result of matching one angular separation against the aspect table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectMatch {
    pub aspect_type: AspectType,
    /// Separation actually observed, [0, 180]
    pub separation: f64,
    /// Deviation from the exact angle
    pub orb: f64,
}

/// An aspect between two bodies. The pair is unordered; `first` always sorts before `second`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aspect {
    pub first: Body,
    pub second: Body,
    pub aspect_type: AspectType,
    pub orb: f64,
    /// Whether the bodies are moving toward exactness
    pub is_applying: bool,
}

impl Aspect {
    pub fn involves(&self, body: Body) -> bool {
        self.first == body || self.second == body
    }
}
