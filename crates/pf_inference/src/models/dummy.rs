use pf_core::Result;
use std::collections::HashSet;
use std::fmt;

use super::InferenceModel;
use crate::prompts::{ARTICLE_MARKER, PROFILE_MARKER};

/// Deterministic offline model. Profile-comparison prompts get "Yes" when the
/// article shares a word with the profile; anything else gets its opening words
/// echoed back as short paragraphs.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

fn significant_words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 4)
        .map(|w| w.to_lowercase())
        .collect()
}

fn judge(prompt: &str) -> Option<&'static str> {
    let profile_at = prompt.find(PROFILE_MARKER)?;
    let article_at = prompt.find(ARTICLE_MARKER)?;
    if article_at < profile_at {
        return None;
    }
    let profile = &prompt[profile_at + PROFILE_MARKER.len()..article_at];
    let article = &prompt[article_at + ARTICLE_MARKER.len()..];

    let profile_words = significant_words(profile);
    let overlaps = significant_words(article)
        .iter()
        .any(|w| profile_words.contains(w));
    Some(if overlaps { "Yes" } else { "No" })
}

#[async_trait::async_trait]
impl InferenceModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        if let Some(verdict) = judge(prompt) {
            return Ok(verdict.to_string());
        }

        let words: Vec<&str> = prompt.split_whitespace().take(60).collect();
        Ok(words
            .chunks(20)
            .map(|chunk| chunk.join(" "))
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}
