//! TOML configuration.
//!
//! Every section is optional. A missing file yields [`Config::minimal`], so the
//! demo runs with nothing but the provider API key in the environment.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8888".to_string()
}

/// Settings for the external chat-completion provider.
#[derive(Debug, Deserialize, Clone)]
pub struct CompletionConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Name of the environment variable holding the bearer token.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Transport-level timeout. Unset means the call is awaited to completion.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key_env: default_api_key_env(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: None,
        }
    }
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}
fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    500
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
        }
    }
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8888/api/rag-query".to_string()
}

impl Config {
    /// Built-in defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }
}

/// Loads the config at `path`, falling back to [`Config::minimal`] when the
/// file does not exist. A file that exists but fails to parse or validate is
/// an error.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::minimal())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&content)?;
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    let completion = &config.completion;
    if !(0.0..=2.0).contains(&completion.temperature) {
        anyhow::bail!("completion.temperature must be in [0.0, 2.0]");
    }
    if completion.max_tokens == 0 {
        anyhow::bail!("completion.max_tokens must be > 0");
    }
    if completion.timeout_secs == Some(0) {
        anyhow::bail!("completion.timeout_secs must be > 0 when set");
    }
    if completion.api_key_env.trim().is_empty() {
        anyhow::bail!("completion.api_key_env must not be empty");
    }

    if config.client.endpoint.trim().is_empty() {
        anyhow::bail!("client.endpoint must not be empty");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:8888");
        assert_eq!(cfg.completion.model, "gpt-3.5-turbo");
        assert!((cfg.completion.temperature - 0.7).abs() < 1e-6);
        assert_eq!(cfg.completion.max_tokens, 500);
        assert_eq!(cfg.completion.api_key_env, "OPENAI_API_KEY");
        assert!(cfg.completion.timeout_secs.is_none());
        assert_eq!(cfg.client.endpoint, "http://127.0.0.1:8888/api/rag-query");
    }

    #[test]
    fn test_partial_sections() {
        let cfg = parse_config(
            r#"
[server]
bind = "0.0.0.0:9000"

[completion]
model = "gpt-4o-mini"
timeout_secs = 20
"#,
        )
        .unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:9000");
        assert_eq!(cfg.completion.model, "gpt-4o-mini");
        assert_eq!(cfg.completion.max_tokens, 500);
        assert_eq!(cfg.completion.timeout_secs, Some(20));
    }

    #[test]
    fn test_rejects_out_of_range_temperature() {
        let err = parse_config("[completion]\ntemperature = 3.5\n").unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn test_rejects_zero_max_tokens() {
        let err = parse_config("[completion]\nmax_tokens = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_tokens"));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        assert!(parse_config("[completion]\ntimeout_secs = 0\n").is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cfg = load_config_or_default(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:8888");
    }

    #[test]
    fn test_invalid_file_is_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("rag.toml");
        std::fs::write(&path, "[server\nbind = ").unwrap();
        assert!(load_config_or_default(&path).is_err());
    }
}
