use crate::aspects::OrbTable;
use crate::ephemeris::RetrogradeMode;
use crate::houses::HouseSystemKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    /// Swiss Ephemeris only; startup fails without data files.
    Precise,
    Analytic,
    /// Precise with analytic fallback
    #[default]
    Hybrid,
}

impl fmt::Display for BackendChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendChoice::Precise => f.write_str("precise"),
            BackendChoice::Analytic => f.write_str("analytic"),
            BackendChoice::Hybrid => f.write_str("hybrid"),
        }
    }
}

impl FromStr for BackendChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "precise" => Ok(BackendChoice::Precise),
            "analytic" => Ok(BackendChoice::Analytic),
            "hybrid" => Ok(BackendChoice::Hybrid),
            other => Err(format!(
                "Invalid backend: {}. Valid backends: [\"precise\", \"analytic\", \"hybrid\"]",
                other
            )),
        }
    }
}

/// Engine configuration. Every field has a default, so an empty table is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub backend: BackendChoice,
    /// Swiss Ephemeris data directory; see [`crate::ephemeris::resolve_ephemeris_path`]
    pub ephemeris_path: Option<PathBuf>,
    pub precise_timeout_ms: u64,
    pub house_system: HouseSystemKind,
    pub include_chiron: bool,
    pub include_sign_ingresses: bool,
    pub transit_bucket_secs: u64,
    pub retrograde_mode: RetrogradeMode,
    pub orbs: OrbTable,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            backend: BackendChoice::Hybrid,
            ephemeris_path: None,
            precise_timeout_ms: 2000,
            house_system: HouseSystemKind::Equal,
            include_chiron: false,
            include_sign_ingresses: true,
            transit_bucket_secs: 3600,
            retrograde_mode: RetrogradeMode::MeanMotion,
            orbs: OrbTable::default(),
        }
    }
}

impl EngineSettings {
    pub fn precise_timeout(&self) -> Duration {
        Duration::from_millis(self.precise_timeout_ms)
    }

    /// Transit cache bucket width; zero is treated as one second.
    pub fn transit_bucket(&self) -> Duration {
        Duration::from_secs(self.transit_bucket_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aspects::AspectType;

    #[test]
    fn test_partial_settings_keep_defaults() {
        let json = r#"{"backend": "analytic", "orbs": {"trine": 6.0}}"#;
        let settings: EngineSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.backend, BackendChoice::Analytic);
        assert_eq!(settings.orbs.max_orb(AspectType::Trine), 6.0);
        assert_eq!(settings.orbs.max_orb(AspectType::Square), 8.0);
        assert_eq!(settings.precise_timeout_ms, 2000);
        assert!(settings.include_sign_ingresses);
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("Hybrid".parse::<BackendChoice>(), Ok(BackendChoice::Hybrid));
        assert!("placidus".parse::<BackendChoice>().is_err());
    }
}
