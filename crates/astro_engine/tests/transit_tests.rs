mod common;

use approx::assert_relative_eq;
use astro_engine::aspects::{AspectDetector, AspectType};
use astro_engine::chart::{BirthChart, ChartBuilder};
use astro_engine::ephemeris::{Backend, PlanetPosition};
use astro_engine::synastry::compatibility;
use astro_engine::transit::{
    EmotionalTone, Impact, Influence, LunarPhase, Transit, TransitEngine, TransitError,
    TransitKind,
};
use astro_engine::{Astrologer, Body, EngineSettings, TransitFeed, ZodiacSign};
use chrono::{DateTime, Duration, TimeZone, Utc};
use common::{full_sky, london_2000, ScriptedProvider};
use std::sync::Arc;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 20, 10, 5, 0)
        .single()
        .unwrap()
}

async fn natal_chart() -> BirthChart {
    ChartBuilder::new(Arc::new(ScriptedProvider::new(&full_sky())))
        .build_chart(&london_2000())
        .await
        .unwrap()
        .chart
}

fn engine() -> TransitEngine {
    TransitEngine::new(Arc::new(ScriptedProvider::new(&full_sky())))
}

fn moving(body: Body, longitude: f64) -> PlanetPosition {
    PlanetPosition::new(body, longitude, 0.0, 1.0, 1.0, Backend::Precise)
}

fn natal_of(transits: &[Transit], natal: Body) -> &Transit {
    transits.iter().find(|t| t.natal == Some(natal)).unwrap()
}

#[tokio::test]
async fn test_venus_transits_ranked() {
    let chart = natal_chart().await;
    let transits = engine().evaluate_positions(now(), &[moving(Body::Venus, 130.0)], &chart);

    let natal: Vec<_> = transits.iter().map(|t| t.natal).collect();
    assert_eq!(
        natal,
        vec![Some(Body::Sun), Some(Body::Moon), Some(Body::Jupiter), Some(Body::Venus)]
    );

    let trine = &transits[0];
    assert_eq!(trine.aspect_type, AspectType::Trine);
    assert_eq!(trine.influence, Influence::Harmonious);
    assert_eq!(trine.impact, Impact::Major);
    assert_relative_eq!(trine.intensity, 1.0);
    assert_eq!(trine.summary, "Venus trine natal Sun");
    assert_eq!(trine.interpretation_key, "transit.venus.trine.sun.harmonious");

    let conjunction = &transits[1];
    assert_eq!(conjunction.aspect_type, AspectType::Conjunction);
    assert_eq!(conjunction.influence, Influence::Harmonious);

    let square = &transits[3];
    assert_eq!(square.aspect_type, AspectType::Square);
    assert_eq!(square.influence, Influence::Challenging);
    assert_relative_eq!(square.orb, 7.0, epsilon = 1e-9);
    assert_relative_eq!(square.intensity, 0.125, epsilon = 1e-9);
    assert_eq!(square.impact, Impact::Subtle);
}

#[tokio::test]
async fn test_influence_independent_of_orb() {
    let chart = natal_chart().await;
    let engine = engine();
    let exact = engine.evaluate_positions(now(), &[moving(Body::Mars, 100.0)], &chart);
    let wide = engine.evaluate_positions(now(), &[moving(Body::Mars, 107.0)], &chart);

    let exact = natal_of(&exact, Body::Sun);
    let wide = natal_of(&wide, Body::Sun);
    assert_eq!(exact.aspect_type, AspectType::Square);
    assert_eq!(wide.aspect_type, AspectType::Square);
    assert_eq!(exact.influence, wide.influence);
    assert_eq!(exact.influence, Influence::Challenging);
    assert!(exact.intensity > wide.intensity);
}

#[tokio::test]
async fn test_windows_follow_body_speed() {
    let chart = natal_chart().await;
    let transits = engine().evaluate_positions(
        now(),
        &[moving(Body::Moon, 130.0), moving(Body::Pluto, 285.0)],
        &chart,
    );

    let moon = transits
        .iter()
        .find(|t| t.transiting == Body::Moon && t.natal == Some(Body::Moon))
        .unwrap();
    assert_eq!(moon.window.duration(), Duration::hours(12));
    assert_eq!(moon.window.start, now() - Duration::hours(6));
    assert!(moon.is_active_at(now()));
    assert_eq!(moon.peak, now());

    let pluto = transits
        .iter()
        .find(|t| t.transiting == Body::Pluto && t.natal == Some(Body::Pluto))
        .unwrap();
    assert_eq!(pluto.influence, Influence::Transformative);
    assert_eq!(pluto.window.duration(), Duration::days(150));
}

#[tokio::test]
async fn test_peak_estimate_from_orb() {
    let chart = natal_chart().await;
    // Square to natal Sun with a 4° orb
    let transits = engine().evaluate_positions(now(), &[moving(Body::Jupiter, 104.0)], &chart);
    let square = natal_of(&transits, Body::Sun);
    assert_relative_eq!(square.orb, 4.0, epsilon = 1e-9);
    assert_eq!(square.peak, now() - Duration::days(2));
    assert_eq!(square.window.duration(), Duration::days(14));
}

#[tokio::test]
async fn test_sign_ingress() {
    let chart = natal_chart().await;
    let transits = engine().evaluate_positions(now(), &[moving(Body::Mars, 29.0)], &chart);

    let ingress = transits.iter().find(|t| t.natal.is_none()).unwrap();
    assert_eq!(ingress.kind, TransitKind::SignIngress { sign: ZodiacSign::Taurus });
    assert_eq!(ingress.aspect_type, AspectType::Conjunction);
    assert_eq!(ingress.influence, Influence::Transformative);
    assert_relative_eq!(ingress.orb, 1.0, epsilon = 1e-9);
    // Scored against the 8° conjunction orb
    assert_relative_eq!(ingress.intensity, 0.875, epsilon = 1e-9);
    assert_eq!(ingress.impact, Impact::Major);
    assert_eq!(ingress.window.duration(), Duration::days(7));
    assert_eq!(ingress.interpretation_key, "ingress.mars.taurus");

    let without = engine()
        .with_ingresses(false)
        .evaluate_positions(now(), &[moving(Body::Mars, 29.0)], &chart);
    assert!(without.iter().all(|t| t.natal.is_some()));
    assert_eq!(without.len(), transits.len() - 1);
}

#[tokio::test]
async fn test_evaluate_is_ordered_and_deterministic() {
    let chart = natal_chart().await;
    let engine = engine();
    let first = engine.evaluate(now(), &chart).await.unwrap();
    let second = engine.evaluate(now(), &chart).await.unwrap();
    assert_eq!(first, second);
    assert!(!first.is_empty());

    for pair in first.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.impact.priority() >= b.impact.priority());
        if a.impact == b.impact {
            assert!(a.intensity >= b.intensity);
        }
    }
}

#[tokio::test]
async fn test_missing_transiting_moon_is_an_error() {
    let chart = natal_chart().await;
    let sky: Vec<_> = full_sky()
        .into_iter()
        .filter(|(body, _)| *body != Body::Moon)
        .collect();
    let engine = TransitEngine::new(Arc::new(ScriptedProvider::new(&sky)));
    let result = engine.evaluate(now(), &chart).await;
    assert!(matches!(
        result,
        Err(TransitError::EssentialBodyMissing { body: Body::Moon, .. })
    ));
}

#[tokio::test]
async fn test_missing_transiting_outer_planet_is_skipped() {
    let chart = natal_chart().await;
    let sky: Vec<_> = full_sky()
        .into_iter()
        .filter(|(body, _)| *body != Body::Pluto)
        .collect();
    let engine = TransitEngine::new(Arc::new(ScriptedProvider::new(&sky)));
    let transits = engine.evaluate(now(), &chart).await.unwrap();
    assert!(transits.iter().all(|t| t.transiting != Body::Pluto));
    assert!(!transits.is_empty());
}

#[tokio::test]
async fn test_transits_cached_per_bucket() {
    let astrologer = Astrologer::with_provider(
        Arc::new(ScriptedProvider::new(&full_sky())),
        EngineSettings::default(),
    );
    let chart = astrologer.natal_chart(&london_2000()).await.unwrap();

    let first = astrologer.transits(now(), &chart.chart).await.unwrap();
    let later = astrologer
        .transits(now() + Duration::minutes(30), &chart.chart)
        .await
        .unwrap();
    assert!(Arc::ptr_eq(&first, &later));

    let next_hour = astrologer
        .transits(now() + Duration::hours(1), &chart.chart)
        .await
        .unwrap();
    assert!(!Arc::ptr_eq(&first, &next_hour));
    assert_eq!(first.len(), next_hour.len());
}

#[tokio::test]
async fn test_daily_insight() {
    let astrologer = Astrologer::with_provider(
        Arc::new(ScriptedProvider::new(&full_sky())),
        EngineSettings::default(),
    );
    let chart = astrologer.natal_chart(&london_2000()).await.unwrap();
    let insight = astrologer.daily_insight(now(), &chart.chart).await.unwrap();

    assert_eq!(insight.key_transits.len(), 5);
    assert_eq!(insight.tone, EmotionalTone::Uplifting);
    assert_relative_eq!(insight.energy_level, 0.8);
    // Moon 120° ahead of the Sun
    assert_eq!(insight.lunar_phase, LunarPhase::FirstQuarter);
}

#[tokio::test]
async fn test_feed_reports_fresh_results_per_bucket() {
    let astrologer = Arc::new(Astrologer::with_provider(
        Arc::new(ScriptedProvider::new(&full_sky())),
        EngineSettings::default(),
    ));
    let chart = astrologer.natal_chart(&london_2000()).await.unwrap();
    let mut feed = TransitFeed::new(
        astrologer.clone(),
        Arc::new(chart.chart.clone()),
        std::time::Duration::from_secs(60),
    );

    assert!(feed.poll_at(now()).await.unwrap().fresh);
    assert!(!feed.poll_at(now() + Duration::minutes(1)).await.unwrap().fresh);
    assert!(feed.poll_at(now() + Duration::hours(1)).await.unwrap().fresh);
}

#[tokio::test]
async fn test_synastry_scores() {
    let pair = |sun: f64, moon: f64| {
        ChartBuilder::new(Arc::new(ScriptedProvider::new(&[
            (Body::Sun, sun),
            (Body::Moon, moon),
        ])))
        .with_bodies(&[Body::Sun, Body::Moon])
    };
    let a = pair(10.0, 130.0)
        .build_chart(&london_2000())
        .await
        .unwrap()
        .chart;
    let b = pair(0.0, 15.0)
        .build_chart(&london_2000())
        .await
        .unwrap()
        .chart;
    let c = pair(40.0, 220.0)
        .build_chart(&london_2000())
        .await
        .unwrap()
        .chart;

    let detector = AspectDetector::new();
    let same = compatibility(&detector, &a, &a);
    assert_eq!(same.aspects.len(), 4);
    assert_relative_eq!(same.overall_score, 77.5);

    let none = compatibility(&detector, &b, &c);
    assert!(none.aspects.is_empty());
    assert_eq!(none.overall_score, 50.0);
}
