//! Aggregation of scored mock comments into the dashboard payload.

use crate::comments::{generate_platform_comments, Platform};
use crate::ml::{round_to, Keyword, Sentiment, SentimentAnalyzer};
use chrono::{Duration, Local};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use utoipa::ToSchema;

/// Number of analysed comments echoed back in the response.
const RETURNED_COMMENTS: usize = 10;

/// Days covered by the sentiment time series.
const SERIES_DAYS: i64 = 7;

const AUDIENCES: &[&str] = &[
    "General Audience",
    "Teens",
    "Young Adults",
    "Professionals",
    "All Ages",
];

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No comments were generated for platform '{0}'")]
    EmptySample(String),
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnalyzedComment {
    pub user: String,
    pub text: String,
    pub sentiment: Sentiment,
    pub ml_score: f64,
    pub toxicity: f64,
    pub timestamp: String,
}

/// Share of each sentiment bucket in percent.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SentimentBreakdown {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MlMetrics {
    pub confidence: u32,
    /// Mean comment toxicity, in percent
    pub toxicity: f64,
    pub engagement_score: u32,
    pub virality_potential: u32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MlInsights {
    pub toxicity: String,
    pub engagement: String,
    pub audience: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContentMetadata {
    pub category: String,
    pub target_audience: String,
    pub engagement_level: String,
    pub recommended_actions: Vec<String>,
}

/// The `data` object of an analyze response, shaped for the dashboard charts.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnalysisData {
    pub platform: String,
    #[serde(rename = "totalComments")]
    pub total_comments: usize,
    pub sentiment: SentimentBreakdown,
    pub ml_metrics: MlMetrics,
    pub ml_insights: MlInsights,
    pub keywords: Vec<Keyword>,
    pub comments: Vec<AnalyzedComment>,
    #[serde(rename = "timeLabels")]
    pub time_labels: Vec<String>,
    #[serde(rename = "positiveData")]
    pub positive_data: Vec<f64>,
    #[serde(rename = "neutralData")]
    pub neutral_data: Vec<f64>,
    #[serde(rename = "negativeData")]
    pub negative_data: Vec<f64>,
    pub emotions: Vec<String>,
    #[serde(rename = "emotionData")]
    pub emotion_data: Vec<f64>,
    pub content_metadata: ContentMetadata,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentimentCounts {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentCounts {
    pub fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Negative => self.negative += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }

    /// Callers guarantee a non-empty sample.
    pub fn positive_ratio(&self) -> f64 {
        self.positive as f64 / self.total() as f64
    }

    fn percent(&self, count: usize) -> f64 {
        round_to(count as f64 / self.total() as f64 * 100.0, 1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub labels: Vec<String>,
    pub positive: Vec<f64>,
    pub neutral: Vec<f64>,
    pub negative: Vec<f64>,
}

/// Generate comments for `platform`, score them and aggregate everything the
/// dashboard renders.
pub fn generate_ml_analysis<R: Rng + ?Sized>(
    platform: &str,
    analysis_type: &str,
    analyzer: &SentimentAnalyzer,
    sample_size: usize,
    rng: &mut R,
) -> Result<AnalysisData, AnalysisError> {
    debug!(platform, analysis_type, sample_size, "Generating mock analysis");

    let comments = generate_platform_comments(platform, sample_size, rng);
    if comments.is_empty() {
        return Err(AnalysisError::EmptySample(platform.to_string()));
    }

    let mut counts = SentimentCounts::default();
    let mut analyzed = Vec::with_capacity(comments.len());
    let mut all_text = String::new();
    let mut total_toxicity = 0.0;

    for comment in comments {
        let (sentiment, confidence) = analyzer.analyze_sentiment(&comment.text, rng);
        let toxicity = analyzer.detect_toxicity(&comment.text);

        counts.record(sentiment);
        all_text.push(' ');
        all_text.push_str(&comment.text);
        total_toxicity += toxicity;

        analyzed.push(AnalyzedComment {
            user: comment.user,
            text: comment.text,
            sentiment,
            ml_score: confidence,
            toxicity,
            timestamp: comment.timestamp,
        });
    }

    let total_comments = analyzed.len();
    let avg_toxicity = total_toxicity / total_comments as f64;

    let ml_metrics = MlMetrics {
        confidence: rng.gen_range(85..=98),
        toxicity: round_to(avg_toxicity * 100.0, 1),
        engagement_score: rng.gen_range(65..=95),
        virality_potential: rng.gen_range(70..=95),
    };

    let ml_insights = generate_ml_insights(&counts, &ml_metrics, platform);
    let keywords = analyzer.extract_keywords(&all_text);
    let series = generate_time_series(&counts, rng);
    let emotions = analyzer.detect_emotions(analyzed.iter().map(|c| c.text.as_str()));

    let content_metadata = ContentMetadata {
        category: categorize_content(platform, rng),
        target_audience: estimate_audience(rng),
        engagement_level: engagement_level(&counts).to_string(),
        recommended_actions: generate_recommendations(&counts, &ml_metrics),
    };

    analyzed.truncate(RETURNED_COMMENTS);

    Ok(AnalysisData {
        platform: platform.to_string(),
        total_comments,
        sentiment: SentimentBreakdown {
            positive: counts.percent(counts.positive),
            neutral: counts.percent(counts.neutral),
            negative: counts.percent(counts.negative),
        },
        ml_metrics,
        ml_insights,
        keywords,
        comments: analyzed,
        time_labels: series.labels,
        positive_data: series.positive,
        neutral_data: series.neutral,
        negative_data: series.negative,
        emotions: emotions.labels,
        emotion_data: emotions.values,
        content_metadata,
    })
}

pub fn generate_ml_insights(
    counts: &SentimentCounts,
    metrics: &MlMetrics,
    platform: &str,
) -> MlInsights {
    let positive_ratio = counts.positive_ratio();

    let toxicity = if metrics.toxicity < 10.0 {
        "Low toxicity levels detected in comments"
    } else {
        "Moderate toxicity detected, consider moderation"
    };
    let engagement = if positive_ratio > 0.6 {
        "High engagement potential with current sentiment"
    } else {
        "Moderate engagement, consider content optimization"
    };
    let content = if positive_ratio > 0.7 {
        "Consider creating follow-up content on trending topics"
    } else {
        "Experiment with different content formats"
    };

    MlInsights {
        toxicity: toxicity.to_string(),
        engagement: engagement.to_string(),
        audience: format!("Primarily engages 18-34 demographic on {}", platform),
        content: content.to_string(),
    }
}

/// Seven daily points ending yesterday. Each day shares one random variation
/// in [-0.2, 0.2], damped for the neutral and negative series.
pub fn generate_time_series<R: Rng + ?Sized>(counts: &SentimentCounts, rng: &mut R) -> TimeSeries {
    let now = Local::now();
    let mut series = TimeSeries {
        labels: Vec::with_capacity(SERIES_DAYS as usize),
        positive: Vec::with_capacity(SERIES_DAYS as usize),
        neutral: Vec::with_capacity(SERIES_DAYS as usize),
        negative: Vec::with_capacity(SERIES_DAYS as usize),
    };

    for days_ago in (1..=SERIES_DAYS).rev() {
        series
            .labels
            .push((now - Duration::days(days_ago)).format("%b %d").to_string());

        let variation: f64 = rng.gen_range(-0.2..=0.2);
        series
            .positive
            .push((counts.positive as f64 * (1.0 + variation)).clamp(10.0, 90.0));
        series
            .neutral
            .push((counts.neutral as f64 * (1.0 + variation * 0.5)).clamp(5.0, 50.0));
        series
            .negative
            .push((counts.negative as f64 * (1.0 + variation * 0.3)).clamp(5.0, 40.0));
    }

    series
}

pub fn categorize_content<R: Rng + ?Sized>(platform: &str, rng: &mut R) -> String {
    let categories = Platform::from_name(platform)
        .map(|p| p.categories())
        .unwrap_or(&["Entertainment"]);
    categories
        .choose(rng)
        .copied()
        .unwrap_or("Entertainment")
        .to_string()
}

pub fn estimate_audience<R: Rng + ?Sized>(rng: &mut R) -> String {
    AUDIENCES
        .choose(rng)
        .copied()
        .unwrap_or("General Audience")
        .to_string()
}

pub fn engagement_level(counts: &SentimentCounts) -> &'static str {
    let positive_ratio = counts.positive_ratio();
    if positive_ratio > 0.7 {
        "Very High"
    } else if positive_ratio > 0.5 {
        "High"
    } else if positive_ratio > 0.3 {
        "Medium"
    } else {
        "Low"
    }
}

pub fn generate_recommendations(counts: &SentimentCounts, metrics: &MlMetrics) -> Vec<String> {
    let mut recommendations = Vec::new();

    if counts.positive > counts.negative * 2 {
        recommendations.push("Continue with similar content style".to_string());
    } else {
        recommendations.push("Experiment with different content formats".to_string());
    }

    if metrics.toxicity > 15.0 {
        recommendations.push("Implement comment moderation".to_string());
    }

    if metrics.engagement_score > 80 {
        recommendations.push("Consider expanding to similar topics".to_string());
    }

    recommendations
}
