use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use url::Url;

pub const SETTINGS_FILE: &str = "classifier.toml";
pub const DEFAULT_FEEDBACK_URL: &str = "https://forms.gle/nEDWZtvmoXPkpiQr5";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub server_url: String,
    /// No timeout is applied unless configured.
    pub request_timeout: Option<Duration>,
    pub feedback_url: String,
    pub project_types: Vec<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            request_timeout: None,
            feedback_url: DEFAULT_FEEDBACK_URL.into(),
            project_types: vec![
                "Construction".into(),
                "Procurement".into(),
                "Consulting".into(),
                "IT Services".into(),
            ],
        }
    }
}

impl ClientSettings {
    /// Applies command-line flags on top of file and environment settings.
    pub fn with_cli_overrides(
        mut self,
        server_url: Option<String>,
        request_timeout_secs: Option<u64>,
    ) -> anyhow::Result<Self> {
        if let Some(server_url) = server_url {
            self.server_url = normalize_server_url(&server_url)?;
        }
        if let Some(secs) = request_timeout_secs {
            self.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        Ok(self)
    }
}

/// Resolves settings from defaults, `classifier.toml` in the working
/// directory and the process environment, in that order.
pub fn load_settings() -> anyhow::Result<ClientSettings> {
    load_settings_from(Path::new(SETTINGS_FILE), |name| std::env::var(name).ok())
}

pub fn load_settings_from(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(file) {
        let file_cfg = toml::from_str::<HashMap<String, String>>(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", file.display()))?;
        apply_overrides(&mut settings, |key| file_cfg.get(key).cloned())?;
    }

    apply_overrides(&mut settings, |key| match key {
        "server_url" => env("APP__SERVER_URL").or_else(|| env("CLASSIFIER_SERVER_URL")),
        "request_timeout_secs" => env("APP__REQUEST_TIMEOUT_SECS"),
        "feedback_url" => env("APP__FEEDBACK_URL"),
        "project_types" => env("APP__PROJECT_TYPES"),
        _ => None,
    })?;

    settings.server_url = normalize_server_url(&settings.server_url)?;
    Ok(settings)
}

fn apply_overrides(
    settings: &mut ClientSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = lookup("server_url") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("request_timeout_secs") {
        settings.request_timeout = parse_timeout(&v)?;
    }
    if let Some(v) = lookup("feedback_url") {
        settings.feedback_url = v;
    }
    if let Some(v) = lookup("project_types") {
        settings.project_types = parse_project_types(&v);
    }
    Ok(())
}

/// `0` or an empty value disables the timeout.
fn parse_timeout(raw: &str) -> anyhow::Result<Option<Duration>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let secs = raw
        .parse::<u64>()
        .with_context(|| format!("request timeout must be whole seconds, got '{raw}'"))?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

fn parse_project_types(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn normalize_server_url(raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    let parsed = Url::parse(raw).with_context(|| format!("invalid server url '{raw}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("server url must use http or https, got '{raw}'");
    }
    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
