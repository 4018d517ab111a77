//! Compatibility between two natal charts.

use crate::aspects::{AspectDetector, AspectType};
use crate::bodies::Body;
use crate::chart::BirthChart;
use serde::{Deserialize, Serialize};

/// Score when the charts share no aspects.
pub const NEUTRAL_SCORE: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynastryAspect {
    /// Body from the first chart
    pub first: Body,
    /// Body from the second chart
    pub second: Body,
    pub aspect_type: AspectType,
    pub orb: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compatibility {
    /// Mean aspect score, [0, 100]
    pub overall_score: f64,
    pub aspects: Vec<SynastryAspect>,
}

pub fn aspect_score(aspect_type: AspectType) -> f64 {
    match aspect_type {
        AspectType::Conjunction => 70.0,
        AspectType::Trine => 85.0,
        AspectType::Sextile => 75.0,
        AspectType::Square => 45.0,
        AspectType::Opposition => 40.0,
    }
}

/// Cross-chart aspects and their mean score.
pub fn compatibility(
    detector: &AspectDetector,
    first: &BirthChart,
    second: &BirthChart,
) -> Compatibility {
    let aspects: Vec<SynastryAspect> = detector
        .scan_between(&first.positions(), &second.positions())
        .into_iter()
        .map(|(a, b, found)| SynastryAspect {
            first: a.body,
            second: b.body,
            aspect_type: found.aspect_type,
            orb: found.orb,
            score: aspect_score(found.aspect_type),
        })
        .collect();

    let overall_score = if aspects.is_empty() {
        NEUTRAL_SCORE
    } else {
        let total: f64 = aspects.iter().map(|a| a.score).sum();
        (total / aspects.len() as f64).clamp(0.0, 100.0)
    };

    Compatibility {
        overall_score,
        aspects,
    }
}
