use std::{fs, net::SocketAddr, path::Path};

use anyhow::{bail, Context};
use serde::Deserialize;

const SETTINGS_FILE: &str = "server.toml";
const PLACEHOLDER_API_KEY: &str = "your_gemini_api_key_here";
const MAX_TOKENS_RANGE: std::ops::RangeInclusive<u32> = 100..=8000;
const TEMPERATURE_RANGE: std::ops::RangeInclusive<f32> = 0.0..=2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_max_tokens: u32,
    pub gemini_temperature: f32,
    pub allowed_origins: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            gemini_api_key: None,
            gemini_model: "gemini-2.0-flash-exp".into(),
            gemini_max_tokens: 1500,
            gemini_temperature: 0.7,
            allowed_origins: vec!["*".into()],
        }
    }
}

/// Optional keys accepted in `server.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    host: Option<String>,
    port: Option<u16>,
    gemini_api_key: Option<String>,
    gemini_model: Option<String>,
    gemini_max_tokens: Option<u32>,
    gemini_temperature: Option<f32>,
    allowed_origins: Option<Vec<String>>,
}

impl Settings {
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }

    /// Rejects settings the service cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.gemini_api_key.as_deref().map(str::trim) {
            None | Some("") | Some(PLACEHOLDER_API_KEY) => bail!("GEMINI_API_KEY must be set"),
            Some(_) => {}
        }
        if !MAX_TOKENS_RANGE.contains(&self.gemini_max_tokens) {
            bail!(
                "GEMINI_MAX_TOKENS must be between {} and {}",
                MAX_TOKENS_RANGE.start(),
                MAX_TOKENS_RANGE.end()
            );
        }
        if !TEMPERATURE_RANGE.contains(&self.gemini_temperature) {
            bail!(
                "GEMINI_TEMPERATURE must be between {} and {}",
                TEMPERATURE_RANGE.start(),
                TEMPERATURE_RANGE.end()
            );
        }
        Ok(())
    }

    fn apply_file(&mut self, raw: &str) -> anyhow::Result<()> {
        let file: FileSettings = toml::from_str(raw).context("failed to parse server.toml")?;
        if let Some(v) = file.host {
            self.host = v;
        }
        if let Some(v) = file.port {
            self.port = v;
        }
        if let Some(v) = file.gemini_api_key {
            self.gemini_api_key = Some(v);
        }
        if let Some(v) = file.gemini_model {
            self.gemini_model = v;
        }
        if let Some(v) = file.gemini_max_tokens {
            self.gemini_max_tokens = v;
        }
        if let Some(v) = file.gemini_temperature {
            self.gemini_temperature = v;
        }
        if let Some(v) = file.allowed_origins {
            self.allowed_origins = v;
        }
        Ok(())
    }

    /// Environment wins over the file. `APP__` names win over plain ones.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        let var = |name: &str| lookup(&format!("APP__{name}")).or_else(|| lookup(name));

        if let Some(v) = var("HOST") {
            self.host = v;
        }
        if let Some(v) = var("PORT") {
            self.port = v.parse().with_context(|| format!("invalid PORT '{v}'"))?;
        }
        if let Some(v) = var("GEMINI_API_KEY") {
            self.gemini_api_key = Some(v);
        }
        if let Some(v) = var("GEMINI_MODEL") {
            self.gemini_model = v;
        }
        if let Some(v) = var("GEMINI_MAX_TOKENS") {
            self.gemini_max_tokens = v
                .parse()
                .with_context(|| format!("invalid GEMINI_MAX_TOKENS '{v}'"))?;
        }
        if let Some(v) = var("GEMINI_TEMPERATURE") {
            self.gemini_temperature = v
                .parse()
                .with_context(|| format!("invalid GEMINI_TEMPERATURE '{v}'"))?;
        }
        if let Some(v) = var("ALLOWED_ORIGINS") {
            self.allowed_origins = split_origins(&v);
        }
        Ok(())
    }
}

pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_from(Path::new(SETTINGS_FILE), |name| std::env::var(name).ok())
}

fn load_settings_from(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();
    if let Ok(raw) = fs::read_to_string(path) {
        settings.apply_file(&raw)?;
    }
    settings.apply_env(lookup)?;
    Ok(settings)
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
