//! Normalization from raw scraper dataset records to
//! [`replyscope_core::CanonicalComment`].
//!
//! The scraper has shipped more than one record layout (a flat `author`
//! object, and the older `user` object of the Twitter v1 API). Each output
//! field is resolved from an ordered list of JSON paths; the first present
//! value wins and a fixed default covers the rest.

use replyscope_core::{parse_timestamp, CanonicalComment};
use serde_json::Value;

/// A JSON path as a list of object keys.
type FieldPath = &'static [&'static str];

const AUTHOR_PATHS: &[FieldPath] = &[&["author", "userName"], &["user", "screen_name"]];
const DISPLAY_NAME_PATHS: &[FieldPath] = &[&["author", "name"], &["user", "name"]];
const FOLLOWER_PATHS: &[FieldPath] = &[&["author", "followers"], &["user", "followers_count"]];
const LIKE_PATHS: &[FieldPath] = &[&["likeCount"], &["favorite_count"]];
const POSTED_AT_PATHS: &[FieldPath] = &[&["createdAt"], &["created_at"]];
const IS_REPLY_PATHS: &[FieldPath] = &[&["isReply"]];

const UNKNOWN: &str = "unknown";

/// Normalizes one raw dataset record.
///
/// Returns `None` when the record has no non-empty `text` or no `id`
/// (string or number). Every other field falls back to a default.
#[must_use]
pub fn normalize_record(record: &Value) -> Option<CanonicalComment> {
    let id = record_id(record)?;
    let text = non_empty_str(record.get("text")?)?.to_owned();

    Some(CanonicalComment {
        id,
        text,
        author: first_present(record, AUTHOR_PATHS, as_string).unwrap_or_else(|| UNKNOWN.into()),
        author_display_name: first_present(record, DISPLAY_NAME_PATHS, as_string)
            .unwrap_or_else(|| UNKNOWN.into()),
        follower_count: first_present(record, FOLLOWER_PATHS, Value::as_u64).unwrap_or(0),
        like_count: first_present(record, LIKE_PATHS, Value::as_u64).unwrap_or(0),
        posted_at: first_present(record, POSTED_AT_PATHS, |v| {
            non_empty_str(v).and_then(parse_timestamp)
        }),
        is_reply: first_present(record, IS_REPLY_PATHS, Value::as_bool).unwrap_or(false),
    })
}

/// Normalizes a batch, dropping invalid records and keeping input order.
#[must_use]
pub fn normalize_records(records: &[Value]) -> Vec<CanonicalComment> {
    let comments: Vec<CanonicalComment> = records.iter().filter_map(normalize_record).collect();
    let dropped = records.len() - comments.len();
    if dropped > 0 {
        tracing::debug!(
            kept = comments.len(),
            dropped,
            "dropped dataset records without id or text"
        );
    }
    comments
}

/// Tries each path in order and returns the first value `extract` accepts.
fn first_present<T>(
    record: &Value,
    paths: &[FieldPath],
    extract: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    paths
        .iter()
        .filter_map(|path| lookup(record, path))
        .find_map(extract)
}

fn lookup<'a>(record: &'a Value, path: FieldPath) -> Option<&'a Value> {
    path.iter()
        .try_fold(record, |value, key| value.get(key))
        .filter(|value| !value.is_null())
}

fn record_id(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

fn as_string(value: &Value) -> Option<String> {
    non_empty_str(value).map(str::to_owned)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
