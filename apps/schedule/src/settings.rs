use std::{
    fs,
    io::ErrorKind,
    path::Path,
    time::Duration,
};

use anyhow::{bail, Context, Result};
use client_core::TimelineRoutes;

pub const DEFAULT_SETTINGS_FILE: &str = "schedule.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub timeline_url: String,
    pub speakers_path: String,
    pub sessions_path: String,
    pub database_url: String,
    pub refresh_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeline_url: "http://127.0.0.1:8080/api".into(),
            speakers_path: "speakers".into(),
            sessions_path: "sessions".into(),
            database_url: "sqlite://./data/schedule.db".into(),
            refresh_timeout_secs: client_core::DEFAULT_REFRESH_TIMEOUT.as_secs(),
            request_timeout_secs: client_core::DEFAULT_REQUEST_TIMEOUT.as_secs(),
        }
    }
}

impl Settings {
    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.refresh_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn routes(&self) -> TimelineRoutes {
        TimelineRoutes {
            speakers_path: self.speakers_path.clone(),
            sessions_path: self.sessions_path.clone(),
        }
    }
}

/// Defaults, then the settings file, then environment overrides.
///
/// A missing default `schedule.toml` is fine; a missing explicit `path` is not.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();

    let file = path.unwrap_or(Path::new(DEFAULT_SETTINGS_FILE));
    match fs::read_to_string(file) {
        Ok(raw) => apply_file_overrides(&mut settings, &raw)
            .with_context(|| format!("invalid settings file '{}'", file.display()))?,
        Err(err) if err.kind() == ErrorKind::NotFound && path.is_none() => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", file.display()))
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

pub(crate) fn apply_file_overrides(settings: &mut Settings, raw: &str) -> Result<()> {
    let table: toml::Table = raw.parse().context("settings file is not valid TOML")?;

    for (key, value) in &table {
        match key.as_str() {
            "timeline_url" => settings.timeline_url = string_value(key, value)?,
            "speakers_path" => settings.speakers_path = string_value(key, value)?,
            "sessions_path" => settings.sessions_path = string_value(key, value)?,
            "database_url" => settings.database_url = string_value(key, value)?,
            "refresh_timeout_secs" => settings.refresh_timeout_secs = seconds_value(key, value)?,
            "request_timeout_secs" => settings.request_timeout_secs = seconds_value(key, value)?,
            other => tracing::warn!(key = other, "ignoring unknown settings key"),
        }
    }

    Ok(())
}

fn string_value(key: &str, value: &toml::Value) -> Result<String> {
    match value.as_str() {
        Some(text) => Ok(text.to_string()),
        None => bail!("'{key}' must be a string"),
    }
}

fn seconds_value(key: &str, value: &toml::Value) -> Result<u64> {
    match value.as_integer().map(u64::try_from) {
        Some(Ok(secs)) => Ok(secs),
        _ => bail!("'{key}' must be a non-negative integer number of seconds"),
    }
}

pub(crate) fn apply_env_overrides(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("SCHEDULE_TIMELINE_URL") {
        settings.timeline_url = v;
    }
    if let Some(v) = env("APP__TIMELINE_URL") {
        settings.timeline_url = v;
    }

    if let Some(v) = env("APP__SPEAKERS_PATH") {
        settings.speakers_path = v;
    }
    if let Some(v) = env("APP__SESSIONS_PATH") {
        settings.sessions_path = v;
    }

    if let Some(v) = env("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = env("APP__REFRESH_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.refresh_timeout_secs = parsed,
            Err(_) => tracing::warn!(value = %v, "ignoring invalid APP__REFRESH_TIMEOUT_SECS"),
        }
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = parsed,
            Err(_) => tracing::warn!(value = %v, "ignoring invalid APP__REQUEST_TIMEOUT_SECS"),
        }
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
