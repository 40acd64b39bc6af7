/*!
common/src/lib.rs

Shared configuration types for Timeliner.

This file provides:
- Config data structures (deserialized from TOML)
- An async loader for a TOML config file, with default/override merging
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// News search API configuration section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsConfig {
    /// Search endpoint URL (e.g. "https://newsapi.org/v2/everything")
    pub endpoint: Option<String>,
    /// Name of the environment variable holding the search API key
    pub api_key_env: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// Generative-text API configuration section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the generation service
    pub api_url: Option<String>,
    /// Name of the environment variable holding the generation API key
    pub api_key_env: Option<String>,
    pub model: Option<String>,
    pub max_output_tokens: Option<u32>,
    pub timeout_seconds: Option<u64>,
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub news: Option<NewsConfig>,
    pub llm: Option<LlmConfig>,
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        if let Some(path) = default_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read default config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse default configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        if let Some(path) = override_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read override config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse override configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        Ok(cfg)
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn config_from_string() {
        let toml = r#"
            [news]
            endpoint = "https://newsapi.org/v2/everything"
            api_key_env = "NEWSAPI_KEY"
            timeout_seconds = 15

            [llm]
            model = "gemini-2.0-flash"
            max_output_tokens = 512
        "#;

        let cfg: Config = toml::from_str(toml).expect("parse config");
        let news = cfg.news.expect("news section");
        assert_eq!(news.api_key_env.as_deref(), Some("NEWSAPI_KEY"));
        assert_eq!(news.timeout_seconds, Some(15));
        let llm = cfg.llm.expect("llm section");
        assert_eq!(llm.model.as_deref(), Some("gemini-2.0-flash"));
        assert_eq!(llm.max_output_tokens, Some(512));
    }

    #[test]
    fn empty_config_has_no_sections() {
        let cfg: Config = toml::from_str("").expect("parse empty config");
        assert!(cfg.news.is_none());
        assert!(cfg.llm.is_none());
    }

    #[tokio::test]
    async fn override_takes_precedence_over_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");

        let default_path = dir.path().join("config.default.toml");
        let mut f = std::fs::File::create(&default_path).expect("create default");
        writeln!(
            f,
            "[news]\nendpoint = \"https://newsapi.org/v2/everything\"\napi_key_env = \"NEWSAPI_KEY\"\n\n[llm]\nmodel = \"gemini-2.0-flash\""
        )
        .expect("write default");

        let override_path = dir.path().join("config.toml");
        let mut f = std::fs::File::create(&override_path).expect("create override");
        writeln!(f, "[llm]\nmodel = \"gemini-2.5-pro\"").expect("write override");

        let cfg = Config::load_with_defaults(Some(&default_path), Some(&override_path))
            .await
            .expect("load merged config");

        // Override replaces the model but keeps untouched default keys
        assert_eq!(cfg.llm.unwrap().model.as_deref(), Some("gemini-2.5-pro"));
        let news = cfg.news.expect("news section kept from defaults");
        assert_eq!(news.api_key_env.as_deref(), Some("NEWSAPI_KEY"));
    }

    #[tokio::test]
    async fn missing_files_yield_empty_config() {
        let cfg = Config::load_with_defaults(
            Some(Path::new("does-not-exist.default.toml")),
            Some(Path::new("does-not-exist.toml")),
        )
        .await
        .expect("load with no files");
        assert!(cfg.news.is_none());
        assert!(cfg.llm.is_none());
    }
}
