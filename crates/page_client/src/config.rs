use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;
use shared::protocol::SUBMIT_ROUTE;
use tracing::warn;
use url::Url;

use crate::toggle::ToggleMode;

pub const SETTINGS_FILE: &str = "client.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientSettings {
    pub base_url: String,
    pub submit_path: String,
    pub row_class: String,
    pub done_opacity: String,
    pub toggle_mode: ToggleMode,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".into(),
            submit_path: SUBMIT_ROUTE.into(),
            row_class: "card".into(),
            done_opacity: "0.5".into(),
            toggle_mode: ToggleMode::default(),
        }
    }
}

impl ClientSettings {
    /// `submit_path` is resolved against `base_url` like a link: an absolute
    /// path such as `/submit` replaces any path on the base, a relative one
    /// such as `submit` is appended after the base's last `/`.
    pub fn submit_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(self.base_url.trim())?.join(&self.submit_path)
    }
}

/// Defaults, then `client.toml` in the working directory, then the environment.
pub fn load_settings() -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(Path::new(SETTINGS_FILE)) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file(settings: &mut ClientSettings, raw: &str) {
    let file_cfg = match toml::from_str::<HashMap<String, String>>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!("ignoring malformed {SETTINGS_FILE}: {err}");
            return;
        }
    };

    if let Some(v) = file_cfg.get("base_url") {
        settings.base_url = v.clone();
    }
    if let Some(v) = file_cfg.get("submit_path") {
        settings.submit_path = v.clone();
    }
    if let Some(v) = file_cfg.get("row_class") {
        settings.row_class = v.clone();
    }
    if let Some(v) = file_cfg.get("done_opacity") {
        set_opacity(settings, v);
    }
    if let Some(v) = file_cfg.get("toggle_mode") {
        set_toggle_mode(settings, v);
    }
}

fn apply_env(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("SUBMIT_BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = lookup("APP__BASE_URL") {
        settings.base_url = v;
    }

    if let Some(v) = lookup("APP__SUBMIT_PATH") {
        settings.submit_path = v;
    }

    if let Some(v) = lookup("APP__ROW_CLASS") {
        settings.row_class = v;
    }

    if let Some(v) = lookup("APP__DONE_OPACITY") {
        set_opacity(settings, &v);
    }

    if let Some(v) = lookup("APP__TOGGLE_MODE") {
        set_toggle_mode(settings, &v);
    }
}

fn set_opacity(settings: &mut ClientSettings, raw: &str) {
    match raw.trim().parse::<f32>() {
        Ok(parsed) if (0.0..=1.0).contains(&parsed) => settings.done_opacity = raw.trim().to_string(),
        _ => warn!("ignoring done_opacity '{raw}': expected a number between 0 and 1"),
    }
}

fn set_toggle_mode(settings: &mut ClientSettings, raw: &str) {
    match raw.parse::<ToggleMode>() {
        Ok(mode) => settings.toggle_mode = mode,
        Err(err) => warn!("ignoring toggle_mode: {err}"),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
