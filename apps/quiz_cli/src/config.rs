use std::{fs, path::Path};

use anyhow::{anyhow, Context};
use client_core::StalePolicy;
use serde::Deserialize;

const SETTINGS_FILE: &str = "quiz_cli.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub api_url: String,
    pub stale_policy: StalePolicy,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8000/".into(),
            stale_policy: StalePolicy::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    api_url: Option<String>,
    stale_policy: Option<String>,
}

fn parse_policy(raw: &str) -> anyhow::Result<StalePolicy> {
    raw.parse().map_err(|e: String| anyhow!(e))
}

pub fn load_settings() -> anyhow::Result<ClientSettings> {
    load_settings_from(Path::new(SETTINGS_FILE), |name| std::env::var(name).ok())
}

fn load_settings_from(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        let file: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        if let Some(v) = file.api_url {
            settings.api_url = v;
        }
        if let Some(v) = file.stale_policy {
            settings.stale_policy = parse_policy(&v)?;
        }
    }

    if let Some(v) = lookup("APP__API_URL").or_else(|| lookup("API_URL")) {
        settings.api_url = v;
    }
    if let Some(v) = lookup("APP__STALE_POLICY") {
        settings.stale_policy = parse_policy(&v)?;
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    fn temp_settings(contents: &str) -> std::path::PathBuf {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("quiz_cli_settings_{suffix}.toml"));
        fs::write(&path, contents).expect("write settings");
        path
    }

    #[test]
    fn defaults_point_at_local_service() {
        let settings =
            load_settings_from(Path::new("/nonexistent/quiz_cli.toml"), env_from(&[]))
                .expect("load");
        assert_eq!(settings, ClientSettings::default());
        assert_eq!(settings.stale_policy, StalePolicy::DiscardStale);
    }

    #[test]
    fn env_overrides_file() {
        let path = temp_settings(
            "api_url = \"http://file.example/api\"\nstale_policy = \"last_writer_wins\"\n",
        );
        let settings = load_settings_from(
            &path,
            env_from(&[
                ("API_URL", "http://plain.example/"),
                ("APP__API_URL", "http://prefixed.example/"),
            ]),
        )
        .expect("load");

        assert_eq!(settings.api_url, "http://prefixed.example/");
        assert_eq!(settings.stale_policy, StalePolicy::LastWriterWins);
        fs::remove_file(path).expect("cleanup");
    }

    #[test]
    fn unknown_stale_policy_is_rejected() {
        let err = load_settings_from(
            Path::new("/nonexistent/quiz_cli.toml"),
            env_from(&[("APP__STALE_POLICY", "newest")]),
        )
        .expect_err("must fail");
        assert!(err.to_string().contains("unknown stale policy"));
    }
}
