use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::i18n::Language;

pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];
pub const DATA_DIR_VAR: &str = "VALORA_DATA_DIR";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: Option<PathBuf>,
    pub estimate_model: String,
    pub speech_model: String,
    pub voice: String,
    pub language: Language,
    pub ui_scale: f32,
    /// Never written to disk; comes from the environment.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            estimate_model: "gemini-3-flash-preview".to_string(),
            speech_model: "gemini-2.5-flash-preview-tts".to_string(),
            voice: "Kore".to_string(),
            language: Language::En,
            ui_scale: 1.0,
            api_key: None,
        }
    }
}

impl AppConfig {
    pub fn settings_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "Valora", "ValoraPricing")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
    }

    /// Settings file (if any) plus environment overrides.
    pub fn load() -> Self {
        let mut config = Self::settings_path()
            .map(|path| Self::from_file(&path))
            .unwrap_or_default();
        config.apply_env(|name| std::env::var(name).ok());
        config
    }

    pub fn from_file(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "settings unreadable, using defaults");
                return Self::default();
            }
        };
        match serde_json::from_str::<Self>(&raw) {
            Ok(config) => {
                info!(path = %path.display(), "settings loaded");
                config.sanitized()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "settings invalid, using defaults");
                Self::default()
            }
        }
    }

    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        self.api_key = API_KEY_VARS
            .iter()
            .filter_map(|name| var(name))
            .find(|key| !key.trim().is_empty());
        if let Some(dir) = var(DATA_DIR_VAR).filter(|d| !d.trim().is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    fn sanitized(mut self) -> Self {
        self.ui_scale = if self.ui_scale.is_finite() {
            self.ui_scale.clamp(0.75, 2.0)
        } else {
            1.0
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(AppConfig::from_file(&dir.path().join("none.json")), AppConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"language":"ar","ui_scale":9.0}"#).unwrap();

        let config = AppConfig::from_file(&path);
        assert_eq!(config.language, Language::Ar);
        assert_eq!(config.ui_scale, 2.0);
        assert_eq!(config.voice, "Kore");
    }

    #[test]
    fn invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "[1, 2").unwrap();
        assert_eq!(AppConfig::from_file(&path), AppConfig::default());
    }

    #[test]
    fn env_overrides_key_and_data_dir() {
        let env: HashMap<&str, &str> = [("API_KEY", "fallback"), (DATA_DIR_VAR, "/tmp/valora")]
            .into_iter()
            .collect();
        let mut config = AppConfig::default();
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.api_key.as_deref(), Some("fallback"));
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/valora")));
    }

    #[test]
    fn gemini_key_wins_over_generic_key() {
        let mut config = AppConfig::default();
        config.apply_env(|name| match name {
            "GEMINI_API_KEY" => Some("primary".into()),
            "API_KEY" => Some("fallback".into()),
            _ => None,
        });
        assert_eq!(config.api_key.as_deref(), Some("primary"));
    }
}
