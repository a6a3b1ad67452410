use std::{collections::HashMap, fs, path::Path};

use anyhow::{bail, Context};
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub site_url: String,
    pub api_token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".into(),
            site_url: "http://localhost:3000".into(),
            api_token: None,
        }
    }
}

impl Settings {
    /// Command-line flags win over every other layer.
    pub fn with_overrides(mut self, api_url: Option<String>, api_token: Option<String>) -> Self {
        if let Some(v) = api_url {
            self.api_url = v;
        }
        if let Some(v) = api_token {
            self.api_token = non_blank(v);
        }
        self
    }
}

/// Defaults, then the TOML file, then the environment.
///
/// An explicit `config_path` must exist; the implicit `dashboard.toml` is optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match config_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            apply_file(&mut settings, &raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
        }
        None => {
            if let Ok(raw) = fs::read_to_string(DEFAULT_CONFIG_FILE) {
                apply_file(&mut settings, &raw)
                    .with_context(|| format!("invalid config file '{DEFAULT_CONFIG_FILE}'"))?;
            }
        }
    }

    apply_env(&mut settings, |name| std::env::var(name).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg = toml::from_str::<HashMap<String, String>>(raw)?;
    if let Some(v) = file_cfg.get("api_url") {
        settings.api_url = v.clone();
    }
    if let Some(v) = file_cfg.get("site_url") {
        settings.site_url = v.clone();
    }
    if let Some(v) = file_cfg.get("api_token") {
        settings.api_token = non_blank(v.clone());
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("NEXT_PUBLIC_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = lookup("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = lookup("NEXT_PUBLIC_SITE_URL") {
        settings.site_url = v;
    }
    if let Some(v) = lookup("APP__SITE_URL") {
        settings.site_url = v;
    }

    if let Some(v) = lookup("DASHBOARD_API_TOKEN") {
        settings.api_token = non_blank(v);
    }
    if let Some(v) = lookup("APP__API_TOKEN") {
        settings.api_token = non_blank(v);
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Trims and drops trailing slashes so route paths can be appended verbatim.
pub fn prepare_base_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        bail!("base url must not be empty");
    }

    let parsed = Url::parse(trimmed).with_context(|| format!("invalid base url '{trimmed}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!(
            "unsupported scheme '{}' in base url '{trimmed}'",
            parsed.scheme()
        );
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
