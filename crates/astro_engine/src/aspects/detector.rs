use crate::aspects::types::{Aspect, AspectMatch, AspectType, OrbTable};
use crate::ephemeris::PlanetPosition;
use crate::zodiac::{angular_separation, normalize_degrees};
use std::cmp::Ordering;

/// Matches angular separations against the five major aspects.
#[derive(Debug, Clone, Default)]
pub struct AspectDetector {
    orbs: OrbTable,
}

impl AspectDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_orbs(orbs: OrbTable) -> Self {
        Self { orbs }
    }

    pub fn orbs(&self) -> &OrbTable {
        &self.orbs
    }

    /// Aspect formed by two longitudes, if any target angle is within its orb.
    ///
    /// Symmetric in its arguments. When several targets match (only possible with
    /// enlarged orbs) the tightest one wins.
    pub fn detect(&self, lon_a: f64, lon_b: f64) -> Option<AspectMatch> {
        let separation = angular_separation(lon_a, lon_b);
        AspectType::ALL
            .iter()
            .filter_map(|&aspect_type| {
                let orb = (separation - aspect_type.angle()).abs();
                (orb <= self.orbs.max_orb(aspect_type)).then_some(AspectMatch {
                    aspect_type,
                    separation,
                    orb,
                })
            })
            .min_by(|a, b| a.orb.partial_cmp(&b.orb).unwrap_or(Ordering::Equal))
    }

    /// Aspect between two resolved positions, with the applying flag from their speeds.
    pub fn aspect_between(&self, a: &PlanetPosition, b: &PlanetPosition) -> Option<Aspect> {
        let found = self.detect(a.longitude, b.longitude)?;
        let (first, second) = if a.body <= b.body { (a, b) } else { (b, a) };
        Some(Aspect {
            first: first.body,
            second: second.body,
            aspect_type: found.aspect_type,
            orb: found.orb,
            is_applying: is_aspect_applying(
                first.longitude,
                second.longitude,
                first.speed,
                second.speed,
                found.aspect_type.angle(),
                found.separation,
            ),
        })
    }

    /// Every aspect within one set of positions, each unordered pair visited once,
    /// tightest orb first.
    pub fn scan(&self, positions: &[PlanetPosition]) -> Vec<Aspect> {
        let mut aspects = Vec::new();
        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                if positions[i].body == positions[j].body {
                    continue;
                }
                if let Some(aspect) = self.aspect_between(&positions[i], &positions[j]) {
                    aspects.push(aspect);
                }
            }
        }
        sort_by_orb(&mut aspects);
        aspects
    }

    /// Aspects between two different sets (synastry), tightest orb first.
    pub fn scan_between(
        &self,
        left: &[PlanetPosition],
        right: &[PlanetPosition],
    ) -> Vec<(PlanetPosition, PlanetPosition, AspectMatch)> {
        let mut found = Vec::new();
        for a in left {
            for b in right {
                if let Some(m) = self.detect(a.longitude, b.longitude) {
                    found.push((a.clone(), b.clone(), m));
                }
            }
        }
        found.sort_by(|x, y| {
            x.2.orb
                .partial_cmp(&y.2.orb)
                .unwrap_or(Ordering::Equal)
                .then(x.0.body.cmp(&y.0.body))
                .then(x.1.body.cmp(&y.1.body))
        });
        found
    }
}

fn sort_by_orb(aspects: &mut [Aspect]) {
    aspects.sort_by(|a, b| {
        a.orb
            .partial_cmp(&b.orb)
            .unwrap_or(Ordering::Equal)
            .then(a.first.cmp(&b.first))
            .then(a.second.cmp(&b.second))
    });
}

/// Determine if an aspect is applying (approaching exact) or separating.
fn is_aspect_applying(
    lon1: f64,
    lon2: f64,
    speed1: f64,
    speed2: f64,
    aspect_angle: f64,
    current_angle: f64,
) -> bool {
    let relative_speed = speed1 - speed2;

    // Direction is unreliable when the bodies move together.
    if relative_speed.abs() < 0.01 {
        return current_angle < aspect_angle + 0.5;
    }

    let signed_diff = signed_difference(lon1 - lon2);
    let current_distance = (current_angle - aspect_angle).abs();

    // Project a tenth of a day forward and see whether the orb shrinks.
    let time_step = 0.1;
    let future_angle = signed_difference(signed_diff + relative_speed * time_step).abs();
    let future_distance = (future_angle - aspect_angle).abs();

    future_distance < current_distance
}

/// Wrap a longitude difference into (-180, 180].
fn signed_difference(diff: f64) -> f64 {
    let wrapped = normalize_degrees(diff);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}
