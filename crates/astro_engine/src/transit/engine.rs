use crate::aspects::{AspectDetector, AspectType};
use crate::bodies::{Body, TRANSITING_BODIES};
use crate::chart::BirthChart;
use crate::ephemeris::{EphemerisProvider, PlanetPosition};
use crate::time::JulianDay;
use crate::transit::classify::classify_influence;
use crate::transit::types::{Impact, Influence, Transit, TransitError, TransitKind, TransitWindow};
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;
use std::sync::Arc;

/// Degrees from a sign boundary within which a body counts as ingressing.
pub const INGRESS_ORB: f64 = 2.0;
/// Active window for sign ingresses, in days.
pub const INGRESS_WINDOW_DAYS: f64 = 7.0;

/// Compares current sky positions against a fixed natal chart.
#[derive(Clone)]
pub struct TransitEngine {
    provider: Arc<dyn EphemerisProvider>,
    detector: AspectDetector,
    bodies: Vec<Body>,
    include_ingresses: bool,
}

impl TransitEngine {
    pub fn new(provider: Arc<dyn EphemerisProvider>) -> Self {
        Self {
            provider,
            detector: AspectDetector::default(),
            bodies: TRANSITING_BODIES.to_vec(),
            include_ingresses: true,
        }
    }

    pub fn with_detector(mut self, detector: AspectDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_bodies(mut self, bodies: &[Body]) -> Self {
        self.bodies = bodies.to_vec();
        self
    }

    pub fn with_ingresses(mut self, include: bool) -> Self {
        self.include_ingresses = include;
        self
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Current positions of every transiting body.
    ///
    /// Sun and Moon are required; other bodies that fail to resolve are skipped.
    pub async fn current_positions(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<PlanetPosition>, TransitError> {
        let julian_day = JulianDay::from_datetime(now);
        let mut positions = Vec::with_capacity(self.bodies.len());
        for (body, result) in self.provider.positions_of(&self.bodies, julian_day).await {
            match result {
                Ok(position) => positions.push(position),
                Err(source) if body.is_essential() => {
                    return Err(TransitError::EssentialBodyMissing { body, source });
                }
                Err(e) => log::warn!("Skipping transiting {}: {}", body, e),
            }
        }
        Ok(positions)
    }

    /// Every transit active at `now`, strongest first.
    pub async fn evaluate(
        &self,
        now: DateTime<Utc>,
        chart: &BirthChart,
    ) -> Result<Vec<Transit>, TransitError> {
        let positions = self.current_positions(now).await?;
        Ok(self.evaluate_positions(now, &positions, chart))
    }

    /// Match already-resolved transiting positions against the natal planets.
    pub fn evaluate_positions(
        &self,
        now: DateTime<Utc>,
        transiting: &[PlanetPosition],
        chart: &BirthChart,
    ) -> Vec<Transit> {
        let mut transits = Vec::new();

        for current in transiting {
            for natal in &chart.planets {
                let Some(found) = self.detector.detect(current.longitude, natal.longitude()) else {
                    continue;
                };
                let max_orb = self.detector.orbs().max_orb(found.aspect_type);
                transits.push(aspect_transit(
                    now,
                    current,
                    natal.body(),
                    found.aspect_type,
                    found.orb,
                    max_orb,
                ));
            }

            if self.include_ingresses {
                let max_orb = self.detector.orbs().max_orb(AspectType::Conjunction);
                if let Some(ingress) = ingress_transit(now, current, max_orb) {
                    transits.push(ingress);
                }
            }
        }

        sort_transits(&mut transits);
        log::debug!(
            "{} transits against chart {} from {} positions",
            transits.len(),
            chart.input.cache_key(),
            transiting.len()
        );
        transits
    }
}

fn aspect_transit(
    now: DateTime<Utc>,
    current: &PlanetPosition,
    natal: Body,
    aspect_type: AspectType,
    orb: f64,
    max_orb: f64,
) -> Transit {
    let influence = classify_influence(current.body, natal, aspect_type);
    let intensity = intensity(orb, max_orb);
    Transit {
        transiting: current.body,
        natal: Some(natal),
        kind: TransitKind::Aspect,
        aspect_type,
        orb,
        influence,
        intensity,
        impact: Impact::from_intensity(intensity),
        window: centered_window(now, current.body.transit_base_days()),
        peak: now - days(orb / 2.0),
        transiting_retrograde: current.retrograde,
        summary: format!(
            "{} {} natal {}",
            current.body.display_name(),
            aspect_type.name(),
            natal.display_name()
        ),
        interpretation_key: format!(
            "transit.{}.{}.{}.{}",
            current.body.id(),
            aspect_type.name(),
            natal.id(),
            influence.name()
        ),
    }
}

/// Ingresses are scored like a conjunction with the boundary, so `max_orb` is the
/// conjunction orb rather than [`INGRESS_ORB`].
fn ingress_transit(
    now: DateTime<Utc>,
    current: &PlanetPosition,
    max_orb: f64,
) -> Option<Transit> {
    let degree = current.degree_in_sign();
    let (sign, orb) = if degree < INGRESS_ORB {
        (current.sign(), degree)
    } else if degree > 30.0 - INGRESS_ORB {
        (current.sign().next(), 30.0 - degree)
    } else {
        return None;
    };
    let intensity = intensity(orb, max_orb);
    Some(Transit {
        transiting: current.body,
        natal: None,
        kind: TransitKind::SignIngress { sign },
        aspect_type: AspectType::Conjunction,
        orb,
        influence: Influence::Transformative,
        intensity,
        impact: Impact::from_intensity(intensity),
        window: centered_window(now, INGRESS_WINDOW_DAYS),
        peak: now,
        transiting_retrograde: current.retrograde,
        summary: format!("{} entering {:?}", current.body.display_name(), sign),
        interpretation_key: format!("ingress.{}.{}", current.body.id(), sign.name()),
    })
}

fn intensity(orb: f64, max_orb: f64) -> f64 {
    if max_orb <= 0.0 {
        return 0.0;
    }
    (1.0 - orb / max_orb).max(0.0)
}

fn days(value: f64) -> Duration {
    Duration::milliseconds((value * 86_400_000.0).round() as i64)
}

fn centered_window(now: DateTime<Utc>, length_days: f64) -> TransitWindow {
    let half = days(length_days / 2.0);
    TransitWindow {
        start: now - half,
        end: now + half,
    }
}

/// Impact priority, then intensity, then body order so equal transits keep a stable order.
fn sort_transits(transits: &mut [Transit]) {
    transits.sort_by(|a, b| {
        b.impact
            .priority()
            .cmp(&a.impact.priority())
            .then(b.intensity.partial_cmp(&a.intensity).unwrap_or(Ordering::Equal))
            .then(a.transiting.cmp(&b.transiting))
            .then(a.natal.cmp(&b.natal))
            .then(a.aspect_type.cmp(&b.aspect_type))
    });
}
