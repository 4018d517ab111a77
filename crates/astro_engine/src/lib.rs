//! Natal chart and transit computation.
//!
//! Positions come from an [`ephemeris::EphemerisProvider`]: the Swiss Ephemeris
//! backed [`ephemeris::PreciseProvider`], the mean-element
//! [`ephemeris::AnalyticProvider`], or a [`ephemeris::HybridProvider`] that prefers
//! the first and falls back to the second. Charts and transits are built on top of
//! whichever provider is chosen and are deterministic for a given provider.

pub mod aspects;
pub mod bodies;
pub mod cache;
pub mod chart;
pub mod config;
pub mod ephemeris;
pub mod feed;
pub mod houses;
pub mod service;
pub mod synastry;
pub mod time;
pub mod transit;
pub mod zodiac;

pub use aspects::{Aspect, AspectDetector, AspectType};
pub use bodies::Body;
pub use chart::{BirthChart, BirthInput, ChartBuilder, ChartError, ChartOutcome, ChartWarning};
pub use config::{BackendChoice, EngineSettings};
pub use ephemeris::{Backend, EphemerisError, EphemerisProvider, PlanetPosition};
pub use feed::TransitFeed;
pub use houses::{HouseCalculator, HouseSystemKind};
pub use service::Astrologer;
pub use time::{to_julian_day, JulianDay, TimeError};
pub use transit::{DailyInsight, Influence, Transit, TransitEngine, TransitError};
pub use zodiac::ZodiacSign;
