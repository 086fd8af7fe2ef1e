use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// strftime pattern of the classic Twitter API `created_at` field.
const TWITTER_TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// A normalized reply, independent of the scraping provider's field names.
///
/// Serialized with camelCase names. Deserialization also accepts the short
/// names older clients send back (`authorName`, `followers`, `likes`, `date`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalComment {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub text: String,
    #[serde(default = "unknown_author")]
    pub author: String,
    #[serde(default = "unknown_author", alias = "authorName")]
    pub author_display_name: String,
    #[serde(default, alias = "followers")]
    pub follower_count: u64,
    #[serde(default, alias = "likes")]
    pub like_count: u64,
    #[serde(default, alias = "date", deserialize_with = "lenient_timestamp")]
    pub posted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_reply: bool,
}

impl CanonicalComment {
    /// Reads a caller-supplied comment without rejecting it.
    ///
    /// Any JSON object is accepted: a missing id or text becomes empty, null
    /// or absent counts become 0 and missing authors become `"unknown"`.
    /// Returns `None` only for non-object values.
    #[must_use]
    pub fn from_loose(value: &Value) -> Option<Self> {
        let record = value.as_object()?;

        let id = match record.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };

        Some(Self {
            id,
            text: first_str(record, &["text"])
                .unwrap_or_default()
                .to_owned(),
            author: first_str(record, &["author"])
                .map_or_else(unknown_author, str::to_owned),
            author_display_name: first_str(record, &["authorDisplayName", "authorName"])
                .map_or_else(unknown_author, str::to_owned),
            follower_count: first_u64(record, &["followerCount", "followers"]),
            like_count: first_u64(record, &["likeCount", "likes"]),
            posted_at: first_str(record, &["postedAt", "date"]).and_then(parse_timestamp),
            is_reply: record
                .get("isReply")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
    }
}

/// Reads every object in `items` with [`CanonicalComment::from_loose`],
/// skipping anything that is not an object. Order is preserved.
#[must_use]
pub fn loose_comments(items: &[Value]) -> Vec<CanonicalComment> {
    items.iter().filter_map(CanonicalComment::from_loose).collect()
}

fn first_str<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| record.get(*key).and_then(Value::as_str))
}

fn first_u64(record: &Map<String, Value>, keys: &[&str]) -> u64 {
    keys.iter()
        .find_map(|key| record.get(*key).and_then(Value::as_u64))
        .unwrap_or(0)
}

fn unknown_author() -> String {
    "unknown".to_string()
}

/// Parses a provider timestamp: RFC 3339 first, then the Twitter format
/// (`Wed Oct 10 20:19:24 +0000 2018`). Returns `None` for anything else.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, TWITTER_TIMESTAMP_FORMAT))
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Response body of the scrape pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeEnvelope {
    pub tweet_url: String,
    pub total_comments: usize,
    pub comments: Vec<CanonicalComment>,
}

impl ScrapeEnvelope {
    #[must_use]
    pub fn new(tweet_url: impl Into<String>, comments: Vec<CanonicalComment>) -> Self {
        Self {
            tweet_url: tweet_url.into(),
            total_comments: comments.len(),
            comments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_names() {
        let comment = CanonicalComment {
            id: "1".to_string(),
            text: "hola".to_string(),
            author: "ana".to_string(),
            author_display_name: "Ana".to_string(),
            follower_count: 10,
            like_count: 2,
            posted_at: None,
            is_reply: true,
        };
        let json = serde_json::to_value(&comment).expect("serialize");
        assert_eq!(json["authorDisplayName"], "Ana");
        assert_eq!(json["followerCount"], 10);
        assert_eq!(json["likeCount"], 2);
        assert_eq!(json["isReply"], true);
        assert!(json["postedAt"].is_null());
    }

    #[test]
    fn deserializes_legacy_short_names() {
        let json = serde_json::json!({
            "id": "9",
            "text": "muy bueno",
            "author": "beto",
            "authorName": "Beto",
            "followers": 1200,
            "likes": 7,
            "date": "2025-03-01T12:00:00Z",
            "isReply": true
        });
        let comment: CanonicalComment = serde_json::from_value(json).expect("deserialize");
        assert_eq!(comment.author_display_name, "Beto");
        assert_eq!(comment.follower_count, 1200);
        assert_eq!(comment.like_count, 7);
        assert!(comment.posted_at.is_some());
    }

    #[test]
    fn parse_timestamp_accepts_rfc3339_and_twitter_format() {
        let rfc = parse_timestamp("2025-03-01T12:00:00Z").expect("rfc3339");
        let twitter = parse_timestamp("Sat Mar 01 12:00:00 +0000 2025").expect("twitter");
        assert_eq!(rfc, twitter);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn unparseable_legacy_date_becomes_none() {
        let json = serde_json::json!({ "id": "4", "text": "x", "date": "hace 2 horas" });
        let comment: CanonicalComment = serde_json::from_value(json).expect("deserialize");
        assert!(comment.posted_at.is_none());
    }

    #[test]
    fn numeric_id_is_read_as_string() {
        let json = serde_json::json!({ "id": 1_790_000_000_000_000_001_u64, "text": "x" });
        let comment: CanonicalComment = serde_json::from_value(json).expect("deserialize");
        assert_eq!(comment.id, "1790000000000000001");
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let json = serde_json::json!({ "id": "3", "text": "ok" });
        let comment: CanonicalComment = serde_json::from_value(json).expect("deserialize");
        assert_eq!(comment.author, "unknown");
        assert_eq!(comment.author_display_name, "unknown");
        assert_eq!(comment.follower_count, 0);
        assert!(!comment.is_reply);
    }

    #[test]
    fn loose_reading_tolerates_missing_id_and_null_counts() {
        let items = vec![
            serde_json::json!({ "text": "Caro", "author": "beto", "followers": null, "likes": 1 }),
            serde_json::json!("not a comment"),
            serde_json::json!({ "id": 12, "authorName": "Ana", "date": "2025-03-01T12:00:00Z" }),
        ];
        let comments = loose_comments(&items);

        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].id, "");
        assert_eq!(comments[0].text, "Caro");
        assert_eq!(comments[0].author, "beto");
        assert_eq!(comments[0].follower_count, 0);
        assert_eq!(comments[0].like_count, 1);

        assert_eq!(comments[1].id, "12");
        assert_eq!(comments[1].text, "");
        assert_eq!(comments[1].author, "unknown");
        assert_eq!(comments[1].author_display_name, "Ana");
        assert!(comments[1].posted_at.is_some());
    }

    #[test]
    fn envelope_counts_comments() {
        let envelope = ScrapeEnvelope::new("https://x.com/a/status/1", vec![]);
        assert_eq!(envelope.total_comments, 0);
        let json = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(json["tweetUrl"], "https://x.com/a/status/1");
        assert_eq!(json["totalComments"], 0);
    }
}
