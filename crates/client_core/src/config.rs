use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Result;
use serde::Deserialize;
use shared::domain::Coordinates;
use url::Url;

use crate::http::parse_base_url;

pub const SETTINGS_FILE_NAME: &str = "collect_point.toml";
pub const DEFAULT_MAP_ZOOM: u8 = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base_url: String,
    pub geo_base_url: String,
    pub geolocation_url: Option<String>,
    pub fallback_position: Option<Coordinates>,
    pub map_zoom: u8,
    pub request_timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3333".into(),
            geo_base_url: "https://servicodados.ibge.gov.br/api/v1/localidades".into(),
            geolocation_url: None,
            fallback_position: None,
            map_zoom: DEFAULT_MAP_ZOOM,
            request_timeout_seconds: 10,
        }
    }
}

impl Settings {
    pub fn api_base(&self) -> Result<Url> {
        parse_base_url(&self.api_base_url)
    }

    pub fn geo_base(&self) -> Result<Url> {
        parse_base_url(&self.geo_base_url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds.max(1))
    }

    /// Map center used until (or unless) the device position resolves.
    pub fn fallback_center(&self) -> Coordinates {
        self.fallback_position.unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    api_url: Option<String>,
    geo_url: Option<String>,
    geolocation_url: Option<String>,
    default_latitude: Option<f64>,
    default_longitude: Option<f64>,
    map_zoom: Option<u8>,
    request_timeout_seconds: Option<u64>,
}

/// Working-directory file first, then the per-user config directory.
pub fn resolve_settings_path() -> Option<PathBuf> {
    let local = PathBuf::from(SETTINGS_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("collect_point").join(SETTINGS_FILE_NAME))
        .filter(|path| path.is_file())
}

pub fn load_settings() -> Settings {
    let path = resolve_settings_path();
    load_settings_from(path.as_deref(), |name| std::env::var(name).ok())
}

pub fn load_settings_from(path: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Some(path) = path {
        match fs::read_to_string(path) {
            Ok(raw) => match toml::from_str::<FileSettings>(&raw) {
                Ok(file_cfg) => apply_file_settings(&mut settings, file_cfg),
                Err(err) => {
                    tracing::warn!(path = %path.display(), "ignoring malformed settings file: {err}");
                }
            },
            Err(err) => {
                tracing::warn!(path = %path.display(), "could not read settings file: {err}");
            }
        }
    }

    apply_env_overrides(&mut settings, env);
    settings
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.api_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.geo_url {
        settings.geo_base_url = v;
    }
    if let Some(v) = file_cfg.geolocation_url {
        settings.geolocation_url = Some(v);
    }
    if let (Some(latitude), Some(longitude)) = (file_cfg.default_latitude, file_cfg.default_longitude)
    {
        settings.fallback_position = Some(Coordinates::new(latitude, longitude));
    }
    if let Some(v) = file_cfg.map_zoom {
        settings.map_zoom = v;
    }
    if let Some(v) = file_cfg.request_timeout_seconds {
        settings.request_timeout_seconds = v;
    }
}

fn first_non_empty(env: &impl Fn(&str) -> Option<String>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env(name))
        .map(|value| value.trim().to_string())
        .rfind(|value| !value.is_empty())
}

fn apply_env_overrides(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = first_non_empty(&env, &["COLLECT_POINT_API_URL", "APP__API_URL"]) {
        settings.api_base_url = v;
    }
    if let Some(v) = first_non_empty(&env, &["COLLECT_POINT_GEO_URL", "APP__GEO_URL"]) {
        settings.geo_base_url = v;
    }
    if let Some(v) = first_non_empty(&env, &["APP__GEOLOCATION_URL"]) {
        settings.geolocation_url = Some(v);
    }

    let latitude = first_non_empty(&env, &["APP__DEFAULT_LATITUDE"]).and_then(|v| v.parse().ok());
    let longitude =
        first_non_empty(&env, &["APP__DEFAULT_LONGITUDE"]).and_then(|v| v.parse().ok());
    if let (Some(latitude), Some(longitude)) = (latitude, longitude) {
        settings.fallback_position = Some(Coordinates::new(latitude, longitude));
    }

    if let Some(v) = first_non_empty(&env, &["APP__MAP_ZOOM"]) {
        if let Ok(parsed) = v.parse::<u8>() {
            settings.map_zoom = parsed;
        }
    }
    if let Some(v) = first_non_empty(&env, &["APP__REQUEST_TIMEOUT_SECONDS"]) {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_seconds = parsed;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
