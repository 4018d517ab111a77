//! Influence table for transits.

use crate::aspects::AspectType;
use crate::bodies::Body;
use crate::transit::types::Influence;
use std::collections::HashSet;

lazy_static::lazy_static! {
    static ref HARMONIOUS: HashSet<Body> =
        [Body::Venus, Body::Jupiter, Body::Sun, Body::Moon].into_iter().collect();
    static ref CHALLENGING: HashSet<Body> =
        [Body::Mars, Body::Saturn, Body::Uranus, Body::Neptune, Body::Pluto].into_iter().collect();
    static ref TRANSFORMATIVE: HashSet<Body> =
        [Body::Pluto, Body::Uranus, Body::Neptune].into_iter().collect();
}

/// Classify a transit by aspect and bodies. Orb plays no part.
///
/// Trines and sextiles are harmonious, squares and oppositions challenging.
/// Conjunctions go by body: transformative when an outer planet is involved,
/// harmonious when both bodies are benefic lights, challenging when either is a
/// malefic, neutral otherwise.
pub fn classify_influence(transiting: Body, natal: Body, aspect_type: AspectType) -> Influence {
    match aspect_type {
        AspectType::Trine | AspectType::Sextile => Influence::Harmonious,
        AspectType::Square | AspectType::Opposition => Influence::Challenging,
        AspectType::Conjunction => {
            let either = |set: &HashSet<Body>| set.contains(&transiting) || set.contains(&natal);
            if either(&TRANSFORMATIVE) {
                Influence::Transformative
            } else if HARMONIOUS.contains(&transiting) && HARMONIOUS.contains(&natal) {
                Influence::Harmonious
            } else if either(&CHALLENGING) {
                Influence::Challenging
            } else {
                Influence::Neutral
            }
        }
    }
}
