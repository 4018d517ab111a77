//! Mean-longitude ephemeris that needs no data files.
//!
//! Each body's longitude is a quadratic in Julian centuries since J2000. The
//! coefficients describe mean motion only, so positions can be several degrees
//! off (more for the inner planets, whose heliocentric mean longitude stands in
//! for the geocentric one). Good enough for approximate charts, not for anything
//! that needs real accuracy.

use crate::bodies::Body;
use crate::ephemeris::types::{Backend, EphemerisError, EphemerisProvider, PlanetPosition};
use crate::time::JulianDay;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Half-width of the central difference used for speed, in days.
const SPEED_STEP_DAYS: f64 = 0.01;

struct MeanElements {
    l0: f64,
    l1: f64,
    l2: f64,
    /// Mean distance in AU, 0 for the node.
    distance: f64,
    /// Threshold for the sine heuristic; `None` means the body never reads retrograde there.
    sine_threshold: Option<f64>,
}

const fn elements(
    l0: f64,
    l1: f64,
    l2: f64,
    distance: f64,
    sine_threshold: Option<f64>,
) -> MeanElements {
    MeanElements {
        l0,
        l1,
        l2,
        distance,
        sine_threshold,
    }
}

fn mean_elements(body: Body) -> Option<MeanElements> {
    let e = match body {
        Body::Sun => elements(280.46646, 36000.76983, 0.0003032, 1.0, None),
        Body::Moon => elements(218.3164477, 481267.88123421, -0.0015786, 0.002_57, None),
        Body::Mercury => elements(252.250906, 149472.6746358, -0.00000535, 0.387, Some(0.2)),
        Body::Venus => elements(181.979801, 58517.8156760, 0.00000165, 0.723, Some(0.1)),
        Body::Mars => elements(355.433, 19140.299, 0.000181, 1.524, Some(0.15)),
        Body::Jupiter => elements(34.351519, 3034.90567, -0.00008501, 5.203, Some(0.3)),
        Body::Saturn => elements(50.077444, 1222.1138488, 0.00021004, 9.537, Some(0.35)),
        Body::Uranus => elements(314.055005, 428.466669, 0.000688, 19.19, Some(0.4)),
        Body::Neptune => elements(304.348665, 218.486200, 0.000108, 30.07, Some(0.4)),
        Body::Pluto => elements(238.968, 144.96, 0.0, 39.48, Some(0.45)),
        // Mean ascending node, Meeus ch. 47
        Body::NorthNode => elements(125.04452, -1934.136261, 0.0020708, 0.0, None),
        Body::Chiron => return None,
    };
    Some(e)
}

/// How the analytic backend fills the retrograde flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrogradeMode {
    /// Retrograde means negative speed, with speed taken as a central difference of
    /// the mean-longitude model. Mean motion is direct for every planet, so only the
    /// node ever reads retrograde.
    #[default]
    MeanMotion,
    /// Approximation: retrograde when `sin(longitude)` falls below a per-body
    /// threshold. It has no physical basis and should be treated as low confidence.
    SineHeuristic,
}

#[derive(Debug, Clone, Default)]
pub struct AnalyticProvider {
    retrograde_mode: RetrogradeMode,
}

impl AnalyticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retrograde_mode(retrograde_mode: RetrogradeMode) -> Self {
        Self { retrograde_mode }
    }

    pub fn retrograde_mode(&self) -> RetrogradeMode {
        self.retrograde_mode
    }

    /// Synchronous position calculation.
    pub fn compute(
        &self,
        body: Body,
        julian_day: JulianDay,
    ) -> Result<PlanetPosition, EphemerisError> {
        let el = mean_elements(body).ok_or_else(|| EphemerisError::CalculationFailed {
            body,
            julian_day: julian_day.value(),
            message: "no analytic model for this body".to_string(),
        })?;
        if !julian_day.value().is_finite() {
            return Err(EphemerisError::CalculationFailed {
                body,
                julian_day: julian_day.value(),
                message: "non-finite Julian Day".to_string(),
            });
        }

        let longitude_at = |jd: JulianDay| {
            let t = jd.centuries_since_j2000();
            el.l0 + el.l1 * t + el.l2 * t * t
        };

        // Unwrapped longitudes, so the difference never straddles 0/360.
        let speed = (longitude_at(julian_day.plus_days(SPEED_STEP_DAYS))
            - longitude_at(julian_day.plus_days(-SPEED_STEP_DAYS)))
            / (2.0 * SPEED_STEP_DAYS);

        let position = PlanetPosition::new(
            body,
            longitude_at(julian_day),
            0.0,
            el.distance,
            speed,
            Backend::Analytic,
        );

        Ok(match (self.retrograde_mode, el.sine_threshold) {
            (RetrogradeMode::MeanMotion, _) => position,
            (RetrogradeMode::SineHeuristic, Some(threshold)) => {
                let retrograde = position.longitude.to_radians().sin() < threshold;
                position.with_retrograde(retrograde)
            }
            (RetrogradeMode::SineHeuristic, None) => position,
        })
    }
}

#[async_trait]
impl EphemerisProvider for AnalyticProvider {
    fn name(&self) -> &str {
        "analytic"
    }

    fn preferred_backend(&self) -> Backend {
        Backend::Analytic
    }

    async fn position_of(
        &self,
        body: Body,
        julian_day: JulianDay,
    ) -> Result<PlanetPosition, EphemerisError> {
        self.compute(body, julian_day)
    }
}
