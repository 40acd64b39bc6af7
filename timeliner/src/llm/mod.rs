use anyhow::Result;

use crate::fetch::Article;

/// One request/response interaction pattern against the generation service.
/// Strategies are tried in a fixed order by the summarizer; each returns the
/// extracted text or an error, and is attempted exactly once per invocation.
#[async_trait::async_trait]
pub trait GenerationStrategy: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Generate completion text for a prompt
    async fn generate(&self, prompt: &str, max_output_tokens: u32) -> Result<String>;
}

pub mod remote;
pub mod summarizer;

/// Build the generation prompt from normalized articles. One line per
/// article; missing dates and headlines get placeholder text.
pub fn build_prompt(articles: &[Article]) -> String {
    let lines: Vec<String> = articles
        .iter()
        .map(|a| {
            format!(
                "- ({}) {} — {}",
                field_or(&a.published, "No date"),
                field_or(&a.headline, "No headline"),
                a.summary
            )
        })
        .collect();

    format!(
        "You are a concise event summarizer. Given the list of article headlines and short summaries below, \
         produce three outputs:\n\n\
         1) A chronological timeline (date → event) with 1-2 lines per milestone.\n\
         2) A short event summary (3-5 sentences).\n\
         3) Key facts bullet list.\n\n\
         OUTPUT in plain text with clear section headers: TIMELINE, SUMMARY, KEY FACTS.\n\n\
         ARTICLES:\n{}\n\n\
         Provide the output now.",
        lines.join("\n")
    )
}

pub(crate) fn field_or<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}
