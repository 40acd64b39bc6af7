// Timeline summarizer with deterministic fallback
use std::time::Duration;
use tracing::{info, warn};

use super::remote::{ChatCompletions, GenerateContent, TextCompletion};
use super::{build_prompt, field_or, GenerationStrategy};
use crate::fetch::Article;
use common::LlmConfig;

const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 512;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Turns fetched articles into a TIMELINE / SUMMARY / KEY FACTS text block.
/// Tries each generation strategy once, in order; any failure degrades to the
/// deterministic fallback. Never returns an error.
pub struct TimelineSummarizer {
    strategies: Vec<Box<dyn GenerationStrategy>>,
    max_output_tokens: u32,
}

impl TimelineSummarizer {
    pub fn new(strategies: Vec<Box<dyn GenerationStrategy>>, max_output_tokens: u32) -> Self {
        Self {
            strategies,
            max_output_tokens,
        }
    }

    /// Build a summarizer from the `[llm]` config section. When the API key
    /// env var the config names is unset, the strategy list stays empty and
    /// summarize() short-circuits to the fallback without any network call.
    pub fn from_config(config: &LlmConfig) -> Self {
        let max_output_tokens = config
            .max_output_tokens
            .unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS);

        let env_name = config.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV);
        let api_key = match std::env::var(env_name).ok().filter(|k| !k.is_empty()) {
            Some(key) => key,
            None => {
                info!(
                    env = env_name,
                    "generation API key not set, using fallback summaries only"
                );
                return Self::new(Vec::new(), max_output_tokens);
            }
        };

        let base_url = config
            .api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let base_url = base_url.trim_end_matches('/').to_string();
        let model = config
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let timeout = Duration::from_secs(config.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS));

        let strategies: Vec<Box<dyn GenerationStrategy>> = vec![
            Box::new(GenerateContent::new(
                base_url.clone(),
                api_key.clone(),
                model.clone(),
                timeout,
            )),
            Box::new(ChatCompletions::new(
                format!("{}/v1beta/openai/chat/completions", base_url),
                api_key.clone(),
                model.clone(),
                timeout,
            )),
            Box::new(TextCompletion::new(
                format!("{}/v1beta/openai/completions", base_url),
                api_key,
                model,
                timeout,
            )),
        ];

        Self::new(strategies, max_output_tokens)
    }

    pub async fn summarize(&self, articles: &[Article]) -> String {
        if self.strategies.is_empty() {
            return fallback_summary(articles);
        }

        let prompt = build_prompt(articles);
        for strategy in &self.strategies {
            match strategy.generate(&prompt, self.max_output_tokens).await {
                Ok(text) if !text.trim().is_empty() => {
                    info!(strategy = strategy.name(), "generation succeeded");
                    return text;
                }
                Ok(_) => {
                    warn!(strategy = strategy.name(), "generation returned empty text");
                }
                Err(e) => {
                    warn!(strategy = strategy.name(), error = %e, "generation failed");
                }
            }
        }

        warn!("all generation strategies failed, using deterministic fallback");
        fallback_summary(articles)
    }
}

/// Deterministic summary used when generation is unavailable or fails.
/// Pure function of the input: same articles, byte-identical output.
pub fn fallback_summary(articles: &[Article]) -> String {
    let lines: Vec<String> = articles
        .iter()
        .map(|a| {
            format!(
                "- ({}) {}",
                field_or(&a.published, "No date"),
                field_or(&a.headline, "No headline")
            )
        })
        .collect();

    let headlines: Vec<&str> = articles
        .iter()
        .take(5)
        .map(|a| a.headline.as_str())
        .collect();

    let timeline = if lines.is_empty() {
        "TIMELINE".to_string()
    } else {
        format!("TIMELINE\n{}", lines.join("\n"))
    };
    let summary = if headlines.is_empty() {
        "SUMMARY".to_string()
    } else {
        format!("SUMMARY\n{}", headlines.join(" / "))
    };
    let key_facts = "KEY FACTS\n- Facts are from source headlines.".to_string();

    [timeline, summary, key_facts].join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(headline: &str, published: &str) -> Article {
        Article {
            headline: headline.to_string(),
            summary: String::new(),
            url: String::new(),
            published: published.to_string(),
            source: String::new(),
        }
    }

    #[test]
    fn fallback_for_empty_input() {
        assert_eq!(
            fallback_summary(&[]),
            "TIMELINE\n\nSUMMARY\n\nKEY FACTS\n- Facts are from source headlines."
        );
    }

    #[test]
    fn fallback_single_article_uses_date_placeholder() {
        let out = fallback_summary(&[article("X", "")]);
        assert!(out.contains("- (No date) X"));
        assert!(out.contains("SUMMARY\nX"));
    }

    #[test]
    fn fallback_has_sections_in_order_and_is_idempotent() {
        let articles = vec![
            article("First", "2023-01-01"),
            article("Second", "2023-01-02"),
        ];
        let out = fallback_summary(&articles);

        let timeline = out.find("TIMELINE").expect("TIMELINE header");
        let summary = out.find("SUMMARY").expect("SUMMARY header");
        let facts = out.find("KEY FACTS").expect("KEY FACTS header");
        assert!(timeline < summary && summary < facts);
        assert_eq!(out.matches("TIMELINE").count(), 1);
        assert_eq!(out.matches("KEY FACTS").count(), 1);

        assert_eq!(out, fallback_summary(&articles));
    }

    #[test]
    fn fallback_keeps_input_order_and_caps_summary_at_five() {
        let articles: Vec<Article> = (1..=7)
            .map(|i| article(&format!("Headline {i}"), &format!("2023-01-0{i}")))
            .collect();
        let out = fallback_summary(&articles);

        let first = out.find("Headline 1").expect("first headline");
        let last = out.find("- (2023-01-07) Headline 7").expect("last timeline line");
        assert!(first < last);

        assert_eq!(
            out.lines().find(|l| l.starts_with("Headline 1 /")),
            Some("Headline 1 / Headline 2 / Headline 3 / Headline 4 / Headline 5")
        );
    }

    #[tokio::test]
    async fn summarize_without_strategies_returns_fallback() {
        let articles = vec![article("Solo", "2023-05-05")];
        let summarizer = TimelineSummarizer::new(Vec::new(), 512);
        assert_eq!(
            summarizer.summarize(&articles).await,
            fallback_summary(&articles)
        );
    }
}
