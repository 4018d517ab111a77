use crate::aspects::AspectType;
use crate::bodies::Body;
use crate::ephemeris::EphemerisError;
use crate::zodiac::ZodiacSign;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitError {
    #[error("Current position of {body} unavailable: {source}")]
    EssentialBodyMissing {
        body: Body,
        #[source]
        source: EphemerisError,
    },
    #[error(transparent)]
    Ephemeris(#[from] EphemerisError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Influence {
    Harmonious,
    Challenging,
    Transformative,
    Neutral,
}

impl Influence {
    pub fn name(self) -> &'static str {
        match self {
            Influence::Harmonious => "harmonious",
            Influence::Challenging => "challenging",
            Influence::Transformative => "transformative",
            Influence::Neutral => "neutral",
        }
    }
}

/// Strength bucket derived from intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Major,
    Moderate,
    Minor,
    Subtle,
}

impl Impact {
    pub fn from_intensity(intensity: f64) -> Self {
        if intensity >= 0.8 {
            Impact::Major
        } else if intensity >= 0.5 {
            Impact::Moderate
        } else if intensity >= 0.2 {
            Impact::Minor
        } else {
            Impact::Subtle
        }
    }

    pub fn priority(self) -> u8 {
        match self {
            Impact::Major => 4,
            Impact::Moderate => 3,
            Impact::Minor => 2,
            Impact::Subtle => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransitKind {
    /// Transiting body aspecting a natal body.
    Aspect,
    /// Transiting body within a few degrees of entering `sign`.
    SignIngress { sign: ZodiacSign },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TransitWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transit {
    pub transiting: Body,
    /// Absent for sign ingresses
    pub natal: Option<Body>,
    pub kind: TransitKind,
    pub aspect_type: AspectType,
    pub orb: f64,
    pub influence: Influence,
    /// `max(0, 1 - orb / max_orb)`
    pub intensity: f64,
    pub impact: Impact,
    pub window: TransitWindow,
    pub peak: DateTime<Utc>,
    pub transiting_retrograde: bool,
    /// Plain structural summary, e.g. "Venus trine natal Sun"
    pub summary: String,
    /// Lookup key for the interpretation text layer
    pub interpretation_key: String,
}

impl Transit {
    pub fn is_active_at(&self, instant: DateTime<Utc>) -> bool {
        self.window.contains(instant)
    }
}
