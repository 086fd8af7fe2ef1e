//! Typed analysis document returned by the language model, and the semantic
//! checks the model is asked to honour but does not always honour.

use serde::{Deserialize, Serialize};

/// Number of key insights the analysis must contain.
pub const KEY_INSIGHT_COUNT: usize = 3;
/// Maximum number of topics in an analysis.
pub const MAX_TOPICS: usize = 5;
/// Maximum number of influential users in an analysis.
pub const MAX_INFLUENTIAL_USERS: usize = 3;
/// Allowed range for the number of emotions.
pub const EMOTION_COUNT_RANGE: std::ops::RangeInclusive<usize> = 3..=5;
/// Allowed range for the impact score.
pub const IMPACT_SCORE_RANGE: std::ops::RangeInclusive<i64> = 1..=100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    pub total_comments: i64,
    pub sentiment: SentimentBreakdown,
    pub emotions: Vec<Emotion>,
    pub topics: Vec<Topic>,
    pub influential_users: Vec<InfluentialUser>,
    pub timeline: Vec<TimelineEntry>,
    pub impact_score: i64,
    pub impact_label: ImpactLabel,
    pub key_insights: Vec<String>,
    pub recommendation: String,
}

/// Share of positive, negative and neutral replies, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    pub positive: i64,
    pub negative: i64,
    pub neutral: i64,
}

impl SentimentBreakdown {
    /// Sum of the three shares, widened so model output near `i64::MAX`
    /// cannot overflow.
    #[must_use]
    pub fn total(&self) -> i128 {
        i128::from(self.positive) + i128::from(self.negative) + i128::from(self.neutral)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emotion {
    pub name: String,
    pub percentage: i64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub topic: String,
    pub count: i64,
    pub sentiment: SentimentLabel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfluentialUser {
    pub username: String,
    pub followers: i64,
    pub comment: String,
    pub sentiment: SentimentLabel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub period: String,
    pub activity: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactLabel {
    Alto,
    Medio,
    Bajo,
}

/// One broken cross-field rule in an [`AnalysisResult`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("sentiment percentages sum to {0}, expected 100")]
    SentimentSum(i128),

    #[error("{0} emotions returned, expected 3 to 5")]
    EmotionCount(usize),

    #[error("emotion percentages sum to {0}, expected 100")]
    EmotionSum(i128),

    #[error("{0} topics returned, expected at most 5")]
    TopicCount(usize),

    #[error("{0} influential users returned, expected at most 3")]
    InfluentialUserCount(usize),

    #[error("{0} key insights returned, expected exactly 3")]
    KeyInsightCount(usize),

    #[error("impact score {0} is outside 1..=100")]
    ImpactScoreRange(i64),

    #[error("negative value in {0}")]
    NegativeValue(&'static str),
}

impl AnalysisResult {
    /// Checks every numeric and cardinality rule of the analysis schema.
    ///
    /// Returns all violations found, in schema order. An empty vector means
    /// the document is semantically valid.
    #[must_use]
    pub fn validate(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        let sentiment = self.sentiment;
        if sentiment.positive < 0 || sentiment.negative < 0 || sentiment.neutral < 0 {
            violations.push(InvariantViolation::NegativeValue("sentiment"));
        }
        if sentiment.total() != 100 {
            violations.push(InvariantViolation::SentimentSum(sentiment.total()));
        }

        if !EMOTION_COUNT_RANGE.contains(&self.emotions.len()) {
            violations.push(InvariantViolation::EmotionCount(self.emotions.len()));
        }
        if self.emotions.iter().any(|e| e.percentage < 0) {
            violations.push(InvariantViolation::NegativeValue("emotions"));
        }
        let emotion_sum: i128 = self
            .emotions
            .iter()
            .map(|e| i128::from(e.percentage))
            .sum();
        if emotion_sum != 100 {
            violations.push(InvariantViolation::EmotionSum(emotion_sum));
        }

        if self.topics.len() > MAX_TOPICS {
            violations.push(InvariantViolation::TopicCount(self.topics.len()));
        }
        if self.influential_users.len() > MAX_INFLUENTIAL_USERS {
            violations.push(InvariantViolation::InfluentialUserCount(
                self.influential_users.len(),
            ));
        }
        if self.key_insights.len() != KEY_INSIGHT_COUNT {
            violations.push(InvariantViolation::KeyInsightCount(self.key_insights.len()));
        }
        if !IMPACT_SCORE_RANGE.contains(&self.impact_score) {
            violations.push(InvariantViolation::ImpactScoreRange(self.impact_score));
        }

        violations
    }
}
