use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

pub(crate) const SETTINGS_ENV_VAR: &str = "FAREAST_SETTINGS";

/// Tunables read once at startup. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) logical_width: u32,
    pub(crate) logical_height: u32,
    pub(crate) enable_music: bool,
    pub(crate) volume: f32,
    /// Fixed RNG seed for reproducible runs. Absent means a fresh seed.
    pub(crate) rng_seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            logical_width: 800,
            logical_height: 800,
            enable_music: true,
            volume: 0.15,
            rng_seed: None,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path} at {json_path}: {source}")]
    Parse {
        path: PathBuf,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid setting {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Loads settings from `path`, or defaults when no path is given.
pub(crate) fn load_settings(path: Option<&Path>) -> Result<Settings, SettingsError> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };

    let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = parse_settings(&raw, path)?;
    validate_settings(&settings)?;
    info!(
        path = %path.display(),
        logical_width = settings.logical_width,
        logical_height = settings.logical_height,
        enable_music = settings.enable_music,
        volume = settings.volume,
        "settings_loaded"
    );
    Ok(settings)
}

pub(crate) fn settings_path_from_env() -> Option<PathBuf> {
    std::env::var_os(SETTINGS_ENV_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn parse_settings(raw: &str, path: &Path) -> Result<Settings, SettingsError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
        let json_path = error.path().to_string();
        SettingsError::Parse {
            path: path.to_path_buf(),
            json_path,
            source: error.into_inner(),
        }
    })
}

fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if settings.logical_width == 0 {
        return Err(SettingsError::Invalid {
            field: "logical_width",
            message: "must be positive".to_string(),
        });
    }
    if settings.logical_height == 0 {
        return Err(SettingsError::Invalid {
            field: "logical_height",
            message: "must be positive".to_string(),
        });
    }
    if !(0.0..=1.0).contains(&settings.volume) {
        return Err(SettingsError::Invalid {
            field: "volume",
            message: format!("expected 0.0..=1.0, got {}", settings.volume),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn settings_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write settings");
        file
    }

    #[test]
    fn missing_path_yields_defaults() {
        let settings = load_settings(None).expect("defaults");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.logical_width, 800);
        assert!((settings.volume - 0.15).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let file = settings_file(r#"{ "volume": 0.5, "rng_seed": 7 }"#);
        let settings = load_settings(Some(file.path())).expect("settings");

        assert_eq!(settings.rng_seed, Some(7));
        assert!((settings.volume - 0.5).abs() < f32::EPSILON);
        assert_eq!(settings.logical_height, 800);
        assert!(settings.enable_music);
    }

    #[test]
    fn parse_error_reports_json_path() {
        let file = settings_file(r#"{ "enable_music": "loud" }"#);
        let error = load_settings(Some(file.path())).expect_err("type mismatch");

        match error {
            SettingsError::Parse { json_path, .. } => assert_eq!(json_path, "enable_music"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let file = settings_file(r#"{ "fullscreen": true }"#);
        assert!(matches!(
            load_settings(Some(file.path())),
            Err(SettingsError::Parse { .. })
        ));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let file = settings_file(r#"{ "volume": 3.0 }"#);
        assert!(matches!(
            load_settings(Some(file.path())),
            Err(SettingsError::Invalid { field: "volume", .. })
        ));

        let file = settings_file(r#"{ "logical_width": 0 }"#);
        assert!(matches!(
            load_settings(Some(file.path())),
            Err(SettingsError::Invalid {
                field: "logical_width",
                ..
            })
        ));
    }

    #[test]
    fn unreadable_path_is_a_read_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            load_settings(Some(&missing)),
            Err(SettingsError::Read { .. })
        ));
    }
}
