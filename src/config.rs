//! Builder configuration: rule limits, URL allow-list, and agent settings.
//!
//! Every field has a default, so an absent config file yields the stock
//! rule tables. A present file must carry a supported `schema_version`.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_SCHEMA_VERSION: u32 = 1;
/// Environment override for the config file location.
pub const CONFIG_ENV: &str = "GORB_CONFIG";
/// Environment fallback for the conversational agent command.
pub const LM_COMMAND_ENV: &str = "GORB_LM_COMMAND";

const DEFAULT_APPROVED_DOMAINS: [&str; 6] = [
    "salesforce.com",
    "help.salesforce.com",
    "trailhead.salesforce.com",
    "play.vidyard.com",
    "developer.salesforce.com",
    "via.placeholder.com",
];
const DEFAULT_TRAILHEAD_DOMAIN: &str = "trailhead.salesforce.com";

fn default_approved_domains() -> Vec<String> {
    DEFAULT_APPROVED_DOMAINS
        .iter()
        .map(|domain| domain.to_string())
        .collect()
}

fn default_trailhead_domain() -> String {
    DEFAULT_TRAILHEAD_DOMAIN.to_string()
}

/// Top-level builder config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuilderConfig {
    pub schema_version: u32,
    /// Hosts (and their subdomains) accepted without a warning.
    #[serde(default = "default_approved_domains")]
    pub approved_domains: Vec<String>,
    /// Host every badge URL is expected to mention.
    #[serde(default = "default_trailhead_domain")]
    pub trailhead_domain: String,
    #[serde(default)]
    pub limits: Limits,
    /// Shell command used by `gorb chat` when no `--lm` is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lm_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inference: Option<InferenceConfig>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        default_config()
    }
}

/// Numeric ceilings and floors used by the canonical rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    pub max_badges: usize,
    pub max_step_links: usize,
    pub feature_set_min_features: usize,
    pub benefits_min: usize,
    pub benefits_max: usize,
    pub benefit_title_max: usize,
    pub benefit_description_max: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_badges: 3,
            max_step_links: 3,
            feature_set_min_features: 2,
            benefits_min: 2,
            benefits_max: 4,
            benefit_title_max: 50,
            benefit_description_max: 150,
        }
    }
}

/// OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InferenceConfig {
    /// Base URL, e.g. `http://localhost:11434`.
    pub url: String,
    pub model: String,
    /// Name of the environment variable holding the bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

/// Stock configuration.
pub fn default_config() -> BuilderConfig {
    BuilderConfig {
        schema_version: CONFIG_SCHEMA_VERSION,
        approved_domains: default_approved_domains(),
        trailhead_domain: default_trailhead_domain(),
        limits: Limits::default(),
        lm_command: None,
        inference: None,
    }
}

/// Pretty JSON of the stock config, suitable as a starting file.
pub fn config_stub() -> Result<String> {
    serde_json::to_string_pretty(&default_config()).context("serialize config stub")
}

/// Pick the config file: explicit path, then `$GORB_CONFIG`, then the user
/// config dir when that file exists.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(value) = env::var_os(CONFIG_ENV).filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(value));
    }
    dirs::config_dir()
        .map(|dir| dir.join("gorb").join("config.json"))
        .filter(|path| path.is_file())
}

/// Read and validate a config file.
pub fn load_config(path: &Path) -> Result<BuilderConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: BuilderConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config JSON {}", path.display()))?;
    validate_config(&config).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

/// Resolve and load the effective config, falling back to defaults.
pub fn load_effective_config(explicit: Option<&Path>) -> Result<BuilderConfig> {
    match resolve_config_path(explicit) {
        Some(path) => {
            let config = load_config(&path)?;
            tracing::debug!(path = %path.display(), "loaded config");
            Ok(config)
        }
        None => Ok(default_config()),
    }
}

/// Reject configs the rule tables cannot be built from.
pub fn validate_config(config: &BuilderConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported config schema_version {}",
            config.schema_version
        ));
    }
    if config.approved_domains.is_empty() {
        return Err(anyhow!("approved_domains must list at least one domain"));
    }
    if let Some(domain) = config
        .approved_domains
        .iter()
        .find(|domain| !is_bare_host(domain))
    {
        return Err(anyhow!(
            "approved_domains entries must be bare host names (got {domain:?})"
        ));
    }
    if !is_bare_host(&config.trailhead_domain) {
        return Err(anyhow!(
            "trailhead_domain must be a bare host name (got {:?})",
            config.trailhead_domain
        ));
    }

    let limits = &config.limits;
    for (label, value) in [
        ("max_badges", limits.max_badges),
        ("max_step_links", limits.max_step_links),
        ("feature_set_min_features", limits.feature_set_min_features),
        ("benefit_title_max", limits.benefit_title_max),
        ("benefit_description_max", limits.benefit_description_max),
    ] {
        if value == 0 {
            return Err(anyhow!("limits.{label} must be greater than zero"));
        }
    }
    if limits.benefits_min > limits.benefits_max {
        return Err(anyhow!(
            "limits.benefits_min ({}) exceeds limits.benefits_max ({})",
            limits.benefits_min,
            limits.benefits_max
        ));
    }

    if let Some(command) = config.lm_command.as_deref() {
        if command.trim().is_empty() {
            return Err(anyhow!("lm_command must be non-empty when set"));
        }
    }
    if let Some(inference) = config.inference.as_ref() {
        url::Url::parse(&inference.url)
            .with_context(|| format!("inference.url is not a valid URL: {:?}", inference.url))?;
        if inference.model.trim().is_empty() {
            return Err(anyhow!("inference.model must be non-empty"));
        }
    }
    Ok(())
}

/// Agent command: flag, then config, then `$GORB_LM_COMMAND`.
pub fn resolve_lm_command(flag: Option<&str>, config: &BuilderConfig) -> Option<String> {
    flag.map(str::to_string)
        .or_else(|| config.lm_command.clone())
        .or_else(|| env::var(LM_COMMAND_ENV).ok())
        .filter(|command| !command.trim().is_empty())
}

fn is_bare_host(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '.' || ch == '-')
        && !value.starts_with('.')
        && !value.ends_with('.')
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
