pub mod classify;
pub mod engine;
pub mod insight;
pub mod types;

pub use classify::classify_influence;
pub use engine::TransitEngine;
pub use insight::{DailyInsight, EmotionalTone, LunarPhase};
pub use types::{Impact, Influence, Transit, TransitError, TransitKind, TransitWindow};
