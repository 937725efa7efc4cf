//! Adds, replaces or removes one query parameter and navigates to the result.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::navigation::Navigator;

/// How an existing parameter decides between removal and overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleMode {
    /// Remove only when the current value equals the requested one,
    /// otherwise overwrite.
    #[default]
    ValueSensitive,
    /// Remove whenever the parameter is present.
    PresenceOnly,
}

impl ToggleMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ToggleMode::ValueSensitive => "value_sensitive",
            ToggleMode::PresenceOnly => "presence_only",
        }
    }
}

impl fmt::Display for ToggleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToggleMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "value_sensitive" | "value" => Ok(ToggleMode::ValueSensitive),
            "presence_only" | "presence" => Ok(ToggleMode::PresenceOnly),
            other => Err(format!("unknown toggle mode '{other}'")),
        }
    }
}

/// Returns `url` with `name` toggled. An emptied query drops the `?`.
pub fn toggle_query_param(url: &Url, name: &str, value: &str, mode: ToggleMode) -> Url {
    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let current = pairs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, existing)| existing.as_str());

    let remove = match (mode, current) {
        (_, None) => false,
        (ToggleMode::PresenceOnly, Some(_)) => true,
        (ToggleMode::ValueSensitive, Some(existing)) => existing == value,
    };
    debug!(param = name, value, mode = %mode, remove, "toggling query parameter");

    if remove {
        pairs.retain(|(key, _)| key != name);
    } else {
        set_param(&mut pairs, name, value);
    }

    let mut next = url.clone();
    if pairs.is_empty() {
        next.set_query(None);
    } else {
        next.query_pairs_mut().clear().extend_pairs(pairs.iter());
    }
    next
}

// Replaces the first occurrence in place and drops the rest, or appends.
fn set_param(pairs: &mut Vec<(String, String)>, name: &str, value: &str) {
    match pairs.iter().position(|(key, _)| key == name) {
        Some(first) => {
            pairs[first].1 = value.to_string();
            let mut index = 0;
            pairs.retain(|(key, _)| {
                let keep = key != name || index == first;
                index += 1;
                keep
            });
        }
        None => pairs.push((name.to_string(), value.to_string())),
    }
}

/// Toggles parameters on the navigator's current location.
pub struct QueryToggle<N: Navigator> {
    navigator: N,
    mode: ToggleMode,
}

impl<N: Navigator> QueryToggle<N> {
    pub fn new(navigator: N, mode: ToggleMode) -> Self {
        Self { navigator, mode }
    }

    pub fn mode(&self) -> ToggleMode {
        self.mode
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Computes the toggled URL, navigates to it and returns it.
    pub fn toggle(&self, name: &str, value: &str) -> Url {
        let next = toggle_query_param(&self.navigator.current_url(), name, value, self.mode);
        self.navigator.navigate(next.clone());
        next
    }
}

#[cfg(test)]
#[path = "tests/toggle_tests.rs"]
mod tests;
