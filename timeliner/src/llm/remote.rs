use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::GenerationStrategy;

/// Native generateContent call shape.
///
/// POST {base}/v1beta/models/{model}:generateContent with the API key in the
/// x-goog-api-key header; text comes back in candidates[0].content.parts[].
pub struct GenerateContent {
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl GenerateContent {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    async fn call(&self, prompt: &str, max_output_tokens: u32) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let req_body = GenerateContentRequest {
            contents: vec![ContentBlock {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig { max_output_tokens },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&req_body)
            .send()
            .await
            .context("generateContent HTTP request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("generateContent API error {}: {}", status, body);
        }

        let resp_body: GenerateContentResponse = response
            .json()
            .await
            .context("failed to parse generateContent response")?;

        let candidate = resp_body
            .candidates
            .first()
            .context("generateContent response has no candidates")?;

        let text: String = candidate
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        Ok(text)
    }
}

#[async_trait::async_trait]
impl GenerationStrategy for GenerateContent {
    fn name(&self) -> &'static str {
        "generate-content"
    }

    async fn generate(&self, prompt: &str, max_output_tokens: u32) -> Result<String> {
        tokio::time::timeout(self.timeout, self.call(prompt, max_output_tokens))
            .await
            .context("generateContent request timed out")?
    }
}

/// OpenAI-compatible chat completions call shape; text comes back in
/// choices[0].message.content.
pub struct ChatCompletions {
    url: String,
    api_key: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl ChatCompletions {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            model: model.into(),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    async fn call(&self, prompt: &str, max_output_tokens: u32) -> Result<String> {
        let req_body = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: max_output_tokens,
        };

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&req_body)
            .send()
            .await
            .context("chat completions HTTP request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("chat completions API error {}: {}", status, body);
        }

        let resp_body: ChatResponse = response
            .json()
            .await
            .context("failed to parse chat completions response")?;

        let choice = resp_body
            .choices
            .first()
            .context("chat completions response has no choices")?;
        Ok(choice.message.content.clone())
    }
}

#[async_trait::async_trait]
impl GenerationStrategy for ChatCompletions {
    fn name(&self) -> &'static str {
        "chat-completions"
    }

    async fn generate(&self, prompt: &str, max_output_tokens: u32) -> Result<String> {
        tokio::time::timeout(self.timeout, self.call(prompt, max_output_tokens))
            .await
            .context("chat completions request timed out")?
    }
}

/// Legacy text completions call shape; text comes back in choices[0].text.
pub struct TextCompletion {
    url: String,
    api_key: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl TextCompletion {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            model: model.into(),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    async fn call(&self, prompt: &str, max_output_tokens: u32) -> Result<String> {
        let req_body = CompletionRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            max_tokens: max_output_tokens,
        };

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&req_body)
            .send()
            .await
            .context("text completion HTTP request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("text completion API error {}: {}", status, body);
        }

        let resp_body: CompletionResponse = response
            .json()
            .await
            .context("failed to parse text completion response")?;

        let choice = resp_body
            .choices
            .first()
            .context("text completion response has no choices")?;
        Ok(choice.text.clone())
    }
}

#[async_trait::async_trait]
impl GenerationStrategy for TextCompletion {
    fn name(&self) -> &'static str {
        "text-completion"
    }

    async fn generate(&self, prompt: &str, max_output_tokens: u32) -> Result<String> {
        tokio::time::timeout(self.timeout, self.call(prompt, max_output_tokens))
            .await
            .context("text completion request timed out")?
    }
}

// generateContent request/response structures
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<ContentBlock>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContentBlock {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ContentBlock,
}

// OpenAI-compatible request/response structures
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Message,
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    prompt: String,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}
