//! Simple keyword-based "ML" heuristics.
//!
//! Sentiment, toxicity and emotion scores are substring lookups against small
//! fixed word lists. Nothing here is trained; the confidence on neutral text is
//! a random draw, which is why the analyzer takes an injected `Rng`.

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use utoipa::ToSchema;

pub const MODEL_NAME: &str = "Advanced Sentiment Analyzer v2.0";

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "awesome", "amazing", "love", "excellent", "fantastic", "perfect", "best",
    "wonderful",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "hate", "worst", "horrible", "dislike", "boring", "stupid", "waste",
];

const TOXIC_WORDS: &[&str] = &[
    "hate", "stupid", "idiot", "moron", "kill", "die", "terrible", "awful", "disgusting",
];

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    ]
    .into_iter()
    .collect()
});

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());

/// Emotion labels in the order they are reported, with their trigger words.
const EMOTION_KEYWORDS: &[(&str, &[&str])] = &[
    ("Joy", &["happy", "love", "great", "awesome", "amazing", "good", "excited"]),
    ("Surprise", &["wow", "surprised", "unexpected", "shocked"]),
    ("Anger", &["angry", "mad", "hate", "terrible", "awful", "bad"]),
    ("Sadness", &["sad", "upset", "disappointed", "sorry"]),
    ("Fear", &["scared", "afraid", "worried", "nervous"]),
    ("Disgust", &["disgusting", "gross", "nasty"]),
];

const MAX_KEYWORDS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// A frequent word from the analysed comments. Frequency is clamped to 1..=5
/// for the word cloud.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Keyword {
    pub text: String,
    pub frequency: usize,
}

/// Emotion names alongside their share (percent) of all emotion hits.
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionBreakdown {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn count_matches(text: &str, words: &[&str]) -> usize {
    words.iter().filter(|w| text.contains(*w)).count()
}

#[derive(Debug, Clone)]
pub struct SentimentAnalyzer {
    pub model_name: &'static str,
}

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self {
            model_name: MODEL_NAME,
        }
    }
}

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `text` and return the label with a confidence in [0, 1].
    pub fn analyze_sentiment<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> (Sentiment, f64) {
        let lowercase_text = text.to_lowercase();
        let positive_count = count_matches(&lowercase_text, POSITIVE_WORDS);
        let negative_count = count_matches(&lowercase_text, NEGATIVE_WORDS);

        let (sentiment, confidence) = if positive_count + negative_count == 0 {
            (Sentiment::Neutral, rng.gen_range(0.6..=0.8))
        } else if positive_count > negative_count {
            (
                Sentiment::Positive,
                (0.7 + positive_count as f64 / 10.0).min(0.95),
            )
        } else {
            (
                Sentiment::Negative,
                (0.7 + negative_count as f64 / 10.0).min(0.95),
            )
        };

        (sentiment, round_to(confidence, 2))
    }

    /// 0.2 per toxic word found, capped at 1.0.
    pub fn detect_toxicity(&self, text: &str) -> f64 {
        let toxic_count = count_matches(&text.to_lowercase(), TOXIC_WORDS);
        round_to((toxic_count as f64 * 0.2).min(1.0), 2)
    }

    /// Most common non-stop-words (longer than two characters) in `text`.
    /// Ties keep the order in which words were first seen.
    pub fn extract_keywords(&self, text: &str) -> Vec<Keyword> {
        let lowercase_text = text.to_lowercase();

        let mut order: Vec<(&str, usize)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for word in WORD_RE.find_iter(&lowercase_text).map(|m| m.as_str()) {
            if STOP_WORDS.contains(word) || word.chars().count() <= 2 {
                continue;
            }
            match index.get(word) {
                Some(&i) => order[i].1 += 1,
                None => {
                    index.insert(word, order.len());
                    order.push((word, 1));
                }
            }
        }

        // sort_by is stable, so first-seen order survives among equal counts
        order.sort_by(|a, b| b.1.cmp(&a.1));

        order
            .into_iter()
            .take(MAX_KEYWORDS)
            .map(|(word, count)| Keyword {
                text: word.to_string(),
                frequency: count.clamp(1, 5),
            })
            .collect()
    }

    /// Count comments per emotion (a comment may hit several) and normalise
    /// to percentages when anything matched.
    pub fn detect_emotions<'a, I>(&self, texts: I) -> EmotionBreakdown
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts = vec![0usize; EMOTION_KEYWORDS.len()];

        for text in texts {
            let lowercase_text = text.to_lowercase();
            for (slot, (_, keywords)) in counts.iter_mut().zip(EMOTION_KEYWORDS) {
                if keywords.iter().any(|k| lowercase_text.contains(*k)) {
                    *slot += 1;
                }
            }
        }

        let total: usize = counts.iter().sum();
        let values = counts
            .iter()
            .map(|&c| {
                if total > 0 {
                    round_to(c as f64 / total as f64 * 100.0, 1)
                } else {
                    0.0
                }
            })
            .collect();

        EmotionBreakdown {
            labels: EMOTION_KEYWORDS.iter().map(|(l, _)| l.to_string()).collect(),
            values,
        }
    }
}
