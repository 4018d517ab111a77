//! Day-level summary of the strongest transits.

use crate::transit::types::{Influence, Transit};
use crate::zodiac::normalize_degrees;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How many of the ranked transits feed a daily insight.
pub const KEY_TRANSIT_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LunarPhase {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl LunarPhase {
    const ORDER: [LunarPhase; 8] = [
        LunarPhase::NewMoon,
        LunarPhase::WaxingCrescent,
        LunarPhase::FirstQuarter,
        LunarPhase::WaxingGibbous,
        LunarPhase::FullMoon,
        LunarPhase::WaningGibbous,
        LunarPhase::LastQuarter,
        LunarPhase::WaningCrescent,
    ];

    /// Phase from the Moon's elongation east of the Sun, in 45° steps.
    ///
    /// Each phase starts at its boundary: [0°, 45°) is new moon, [45°, 90°)
    /// waxing crescent, and so on.
    pub fn from_longitudes(sun: f64, moon: f64) -> Self {
        let elongation = normalize_degrees(moon - sun);
        Self::ORDER[((elongation / 45.0).floor() as usize) % 8]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionalTone {
    Uplifting,
    Challenging,
    Transformative,
    Peaceful,
}

impl EmotionalTone {
    pub fn from_transits(transits: &[Transit]) -> Self {
        let count = |influence: Influence| {
            transits.iter().filter(|t| t.influence == influence).count()
        };
        let harmonious = count(Influence::Harmonious);
        let challenging = count(Influence::Challenging);
        if count(Influence::Transformative) > 0 {
            EmotionalTone::Transformative
        } else if challenging > harmonious {
            EmotionalTone::Challenging
        } else if harmonious > 0 {
            EmotionalTone::Uplifting
        } else {
            EmotionalTone::Peaceful
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyInsight {
    pub date: DateTime<Utc>,
    pub lunar_phase: LunarPhase,
    pub tone: EmotionalTone,
    /// Share of harmonious transits among the key transits, [0, 1]
    pub energy_level: f64,
    pub key_transits: Vec<Transit>,
}

impl DailyInsight {
    /// Summarize ranked transits; only the first few are considered.
    pub fn compose(date: DateTime<Utc>, ranked: &[Transit], sun: f64, moon: f64) -> Self {
        let key_transits: Vec<Transit> = ranked.iter().take(KEY_TRANSIT_COUNT).cloned().collect();
        let harmonious = key_transits
            .iter()
            .filter(|t| t.influence == Influence::Harmonious)
            .count();
        Self {
            date,
            lunar_phase: LunarPhase::from_longitudes(sun, moon),
            tone: EmotionalTone::from_transits(&key_transits),
            energy_level: harmonious as f64 / key_transits.len().max(1) as f64,
            key_transits,
        }
    }
}
