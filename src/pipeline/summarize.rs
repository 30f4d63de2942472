//! Summarization stage.
//!
//! [`ExtractiveSummarizer`] is local and deterministic: sentences are scored
//! by the frequency of their content words and the best N are returned in
//! their original order. [`LlmSummarizer`] asks a chat model instead.
//!
//! [`summarize_and_translate`] never fails: a missing summary or a failed
//! translation of it is reported as `None` on the [`SummaryResult`].

use crate::error::StageError;
use crate::language::TargetLanguage;
use crate::output::SummaryResult;
use crate::pipeline::llm::{complete, ChatSettings};
use crate::pipeline::normalize::split_sentences;
use crate::pipeline::translate::{translate_text, Translator};
use crate::prompts::SUMMARY_SYSTEM_PROMPT;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, LLMProvider};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_SUMMARY_SENTENCES: usize = 3;

/// A summarization backend.
#[async_trait]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &str;

    async fn summarize(&self, text: &str) -> Result<String, StageError>;
}

// ── Extractive ──────────────────────────────────────────────────────────────

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any",
        "are", "as", "at", "be", "because", "been", "before", "being", "below", "between",
        "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during",
        "each", "few", "for", "from", "further", "had", "has", "have", "having", "he", "her",
        "here", "hers", "herself", "him", "himself", "his", "how", "i", "if", "in", "into",
        "is", "it", "its", "itself", "just", "me", "more", "most", "my", "myself", "no", "nor",
        "not", "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours",
        "ourselves", "out", "over", "own", "same", "she", "should", "so", "some", "such",
        "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there",
        "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
        "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom",
        "why", "will", "with", "would", "you", "your", "yours", "yourself", "yourselves",
    ]
    .into_iter()
    .collect()
});

fn content_words(sentence: &str) -> impl Iterator<Item = String> + '_ {
    sentence
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .filter(|w| !STOP_WORDS.contains(w.as_str()))
}

/// Frequency-based sentence extraction.
#[derive(Debug, Clone)]
pub struct ExtractiveSummarizer {
    sentences: usize,
}

impl ExtractiveSummarizer {
    pub fn new(sentences: usize) -> Self {
        Self {
            sentences: sentences.max(1),
        }
    }

    /// Pick the highest-scoring sentences, returned in document order.
    pub fn select<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let sentences = split_sentences(text);
        if sentences.len() <= self.sentences {
            return sentences;
        }

        let mut freq: HashMap<String, usize> = HashMap::new();
        for sentence in &sentences {
            for word in content_words(sentence) {
                *freq.entry(word).or_default() += 1;
            }
        }
        let max = freq.values().copied().max().unwrap_or(1) as f64;

        let mut scored: Vec<(usize, f64)> = sentences
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let score = content_words(s)
                    .map(|w| freq.get(&w).copied().unwrap_or(0) as f64 / max)
                    .sum::<f64>();
                (i, score)
            })
            .collect();

        // Highest score first; earlier sentence wins a tie.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        let mut keep: Vec<usize> = scored.iter().take(self.sentences).map(|(i, _)| *i).collect();
        keep.sort_unstable();

        keep.into_iter().map(|i| sentences[i]).collect()
    }
}

impl Default for ExtractiveSummarizer {
    fn default() -> Self {
        Self::new(DEFAULT_SUMMARY_SENTENCES)
    }
}

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    fn name(&self) -> &str {
        "extractive"
    }

    async fn summarize(&self, text: &str) -> Result<String, StageError> {
        Ok(self.select(text).join(" "))
    }
}

// ── LLM ─────────────────────────────────────────────────────────────────────

/// Abstractive summary by chat completion.
pub struct LlmSummarizer {
    provider: Arc<dyn LLMProvider>,
    settings: ChatSettings,
}

impl LlmSummarizer {
    pub fn new(provider: Arc<dyn LLMProvider>, settings: ChatSettings) -> Self {
        Self { provider, settings }
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    fn name(&self) -> &str {
        "llm"
    }

    async fn summarize(&self, text: &str) -> Result<String, StageError> {
        let messages = vec![
            ChatMessage::system(SUMMARY_SYSTEM_PROMPT),
            ChatMessage::user(text),
        ];
        complete(&self.provider, &messages, &self.settings)
            .await
            .map(|s| s.trim().to_string())
            .map_err(|e| StageError::SummaryFailed {
                backend: "llm".to_string(),
                detail: e.to_string(),
            })
    }
}

// ── Summary + translation ───────────────────────────────────────────────────

/// Summarize `text`, then translate the summary into `target`.
pub async fn summarize_and_translate(
    summarizer: &dyn Summarizer,
    translator: &dyn Translator,
    text: &str,
    target: &TargetLanguage,
) -> SummaryResult {
    if text.trim().is_empty() {
        return SummaryResult::default();
    }

    info!("Summarizing {} chars via {}", text.chars().count(), summarizer.name());
    let summary = match summarizer.summarize(text).await {
        Ok(s) if !s.trim().is_empty() => s,
        Ok(_) => {
            debug!("Summarizer returned nothing");
            return SummaryResult::default();
        }
        Err(e) => {
            warn!("Error during summarization: {}", e);
            return SummaryResult::default();
        }
    };

    let translated = translate_text(translator, &summary, target).await.value().cloned();
    SummaryResult {
        summary: Some(summary),
        translated,
    }
}
