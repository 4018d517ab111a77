use astro_engine::chart::BirthInput;
use astro_engine::config::{BackendChoice, EngineSettings};
use astro_engine::ephemeris::resolve_ephemeris_path;
use astro_engine::ephemeris::swiss::validate_ephemeris_dir;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

pub const EPHEMERIS_PATH_ENV: &str = "SWISS_EPHEMERIS_PATH";
pub const BACKEND_ENV: &str = "ASTRO_BACKEND";

#[derive(Debug, Clone, Default, Deserialize)]
struct RootConfigToml {
    #[serde(default)]
    engine: Option<EngineSettings>,
    #[serde(default)]
    birth: Option<BirthInput>,
}

/// Try common relative paths for `configs/astro.toml`, from the repo root or a crate dir.
pub fn read_astro_toml_text() -> anyhow::Result<String> {
    let paths = ["configs/astro.toml", "../../configs/astro.toml"];
    for p in &paths {
        if let Ok(c) = fs::read_to_string(p) {
            return Ok(c);
        }
    }
    anyhow::bail!("Could not load astro.toml from {:?}", paths);
}

/// Parse the `[engine]` table. A missing table yields the defaults.
pub fn parse_engine_settings(text: &str) -> anyhow::Result<EngineSettings> {
    let root: RootConfigToml = toml::from_str(text)
        .map_err(|e| anyhow::anyhow!("Failed to parse astro.toml engine settings: {e}"))?;
    Ok(root.engine.unwrap_or_default())
}

/// Parse the optional `[birth]` table used as the default chart subject.
pub fn parse_birth_input(text: &str) -> anyhow::Result<Option<BirthInput>> {
    let root: RootConfigToml = toml::from_str(text)
        .map_err(|e| anyhow::anyhow!("Failed to parse astro.toml birth data: {e}"))?;
    Ok(root.birth)
}

/// Apply environment overrides through `lookup` (normally `std::env::var`).
///
/// `ASTRO_BACKEND` replaces the configured backend. `SWISS_EPHEMERIS_PATH` only
/// fills in a path the file left unset.
pub fn apply_overrides<F>(mut settings: EngineSettings, lookup: F) -> anyhow::Result<EngineSettings>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(backend) = lookup(BACKEND_ENV) {
        settings.backend = backend
            .parse::<BackendChoice>()
            .map_err(|e| anyhow::anyhow!("{BACKEND_ENV}: {e}"))?;
    }
    if settings.ephemeris_path.is_none() {
        settings.ephemeris_path = lookup(EPHEMERIS_PATH_ENV).map(PathBuf::from);
    }
    Ok(settings)
}

/// Reject settings that cannot start. Only the `precise` backend needs data files up front.
pub fn validate_engine_settings(settings: &EngineSettings) -> anyhow::Result<()> {
    if settings.precise_timeout_ms == 0 {
        anyhow::bail!("engine.precise_timeout_ms must be greater than zero");
    }
    for (name, orb) in [
        ("conjunction", settings.orbs.conjunction),
        ("sextile", settings.orbs.sextile),
        ("square", settings.orbs.square),
        ("trine", settings.orbs.trine),
        ("opposition", settings.orbs.opposition),
    ] {
        if !orb.is_finite() || orb < 0.0 {
            anyhow::bail!("engine.orbs.{name} must be a non-negative number, got {orb}");
        }
    }
    if settings.backend == BackendChoice::Precise {
        let path = resolve_ephemeris_path(settings.ephemeris_path.clone());
        validate_ephemeris_dir(&path).map_err(|e| {
            anyhow::anyhow!("backend = \"precise\" but ephemeris data is unusable: {e}")
        })?;
    }
    Ok(())
}

pub fn load_engine_settings() -> anyhow::Result<EngineSettings> {
    let text = read_astro_toml_text()?;
    let settings = parse_engine_settings(&text)?;
    let settings = apply_overrides(settings, |key| std::env::var(key).ok())?;
    validate_engine_settings(&settings)?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use astro_engine::aspects::AspectType;
    use astro_engine::houses::HouseSystemKind;

    #[test]
    fn test_parse_engine_table() {
        let text = r#"
            [engine]
            backend = "analytic"
            house_system = "whole_sign"
            include_chiron = true
            transit_bucket_secs = 900

            [engine.orbs]
            sextile = 4.0
        "#;
        let settings = parse_engine_settings(text).unwrap();
        assert_eq!(settings.backend, BackendChoice::Analytic);
        assert_eq!(settings.house_system, HouseSystemKind::WholeSign);
        assert!(settings.include_chiron);
        assert_eq!(settings.transit_bucket_secs, 900);
        assert_eq!(settings.orbs.max_orb(AspectType::Sextile), 4.0);
        assert_eq!(settings.orbs.max_orb(AspectType::Trine), 8.0);
    }

    #[test]
    fn test_missing_table_uses_defaults() {
        let settings = parse_engine_settings("[other]\nkey = 1\n").unwrap();
        assert_eq!(settings, EngineSettings::default());
    }

    #[test]
    fn test_parse_birth_table() {
        let text = r#"
            [birth]
            year = 1990
            month = 7
            day = 14
            hour = 6
            minute = 30
            timezone_offset_hours = -4.0
            latitude = 40.7128
            longitude = -74.006
            city = "New York"
        "#;
        let birth = parse_birth_input(text).unwrap().unwrap();
        assert_eq!(birth.year, 1990);
        assert_eq!(birth.second, 0.0);
        assert_eq!(birth.city.as_deref(), Some("New York"));
        assert_eq!(birth.country, None);
        assert!(parse_birth_input("[engine]\n").unwrap().is_none());
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(parse_engine_settings("[engine]\nbackend = \"quantum\"\n").is_err());
        assert!(parse_engine_settings("[engine]\nhouse_system = \"koch\"\n").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let settings = apply_overrides(EngineSettings::default(), |key| match key {
            BACKEND_ENV => Some("analytic".to_string()),
            EPHEMERIS_PATH_ENV => Some("/data/ephe".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(settings.backend, BackendChoice::Analytic);
        assert_eq!(settings.ephemeris_path, Some(PathBuf::from("/data/ephe")));

        let mut configured = EngineSettings::default();
        configured.ephemeris_path = Some(PathBuf::from("/from/file"));
        let settings = apply_overrides(configured, |key| {
            (key == EPHEMERIS_PATH_ENV).then(|| "/from/env".to_string())
        })
        .unwrap();
        assert_eq!(settings.ephemeris_path, Some(PathBuf::from("/from/file")));

        assert!(apply_overrides(EngineSettings::default(), |_| Some("nope".to_string())).is_err());
    }

    #[test]
    fn test_validate_precise_requires_data() {
        let mut settings = EngineSettings::default();
        assert!(validate_engine_settings(&settings).is_ok());

        settings.backend = BackendChoice::Precise;
        settings.ephemeris_path = Some(PathBuf::from("/definitely/missing/ephe"));
        assert!(validate_engine_settings(&settings).is_err());
    }

    #[test]
    fn test_validate_rejects_negative_orb() {
        let mut settings = EngineSettings::default();
        settings.orbs.trine = -1.0;
        assert!(validate_engine_settings(&settings).is_err());
    }
}
