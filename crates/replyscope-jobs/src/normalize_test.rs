use serde_json::json;

use super::*;

fn author_layout_record() -> Value {
    json!({
        "id": "1790000000000000001",
        "text": "Totalmente de acuerdo",
        "author": {
            "userName": "ana_dev",
            "name": "Ana",
            "followers": 1520
        },
        "likeCount": 33,
        "createdAt": "Sat Mar 01 12:00:00 +0000 2025",
        "isReply": true
    })
}

fn user_layout_record() -> Value {
    json!({
        "id": 1_790_000_000_000_000_002_u64,
        "text": "No me convence",
        "user": {
            "screen_name": "beto",
            "name": "Beto",
            "followers_count": 87
        },
        "favorite_count": 4,
        "created_at": "2025-03-01T13:30:00Z"
    })
}

// -----------------------------------------------------------------------
// normalize_record
// -----------------------------------------------------------------------

#[test]
fn normalize_record_reads_author_layout() {
    let comment = normalize_record(&author_layout_record()).expect("valid record");
    assert_eq!(comment.id, "1790000000000000001");
    assert_eq!(comment.text, "Totalmente de acuerdo");
    assert_eq!(comment.author, "ana_dev");
    assert_eq!(comment.author_display_name, "Ana");
    assert_eq!(comment.follower_count, 1520);
    assert_eq!(comment.like_count, 33);
    assert!(comment.is_reply);
    assert_eq!(
        comment.posted_at.map(|t| t.to_rfc3339()),
        Some("2025-03-01T12:00:00+00:00".to_string())
    );
}

#[test]
fn normalize_record_reads_user_layout() {
    let comment = normalize_record(&user_layout_record()).expect("valid record");
    assert_eq!(comment.id, "1790000000000000002");
    assert_eq!(comment.author, "beto");
    assert_eq!(comment.author_display_name, "Beto");
    assert_eq!(comment.follower_count, 87);
    assert_eq!(comment.like_count, 4);
    assert!(!comment.is_reply);
    assert!(comment.posted_at.is_some());
}

#[test]
fn normalize_record_prefers_author_over_user() {
    let record = json!({
        "id": "5",
        "text": "ambos",
        "author": { "userName": "primero", "followers": 10 },
        "user": { "screen_name": "segundo", "followers_count": 99 },
        "likeCount": 1,
        "favorite_count": 2
    });
    let comment = normalize_record(&record).expect("valid record");
    assert_eq!(comment.author, "primero");
    assert_eq!(comment.follower_count, 10);
    assert_eq!(comment.like_count, 1);
}

#[test]
fn normalize_record_skips_empty_and_null_variants() {
    let record = json!({
        "id": "6",
        "text": "fallback",
        "author": { "userName": "", "name": null },
        "user": { "screen_name": "respaldo", "name": "Respaldo" }
    });
    let comment = normalize_record(&record).expect("valid record");
    assert_eq!(comment.author, "respaldo");
    assert_eq!(comment.author_display_name, "Respaldo");
}

#[test]
fn normalize_record_defaults_when_no_variant_present() {
    let record = json!({ "id": "7", "text": "solo texto" });
    let comment = normalize_record(&record).expect("valid record");
    assert_eq!(comment.author, "unknown");
    assert_eq!(comment.author_display_name, "unknown");
    assert_eq!(comment.follower_count, 0);
    assert_eq!(comment.like_count, 0);
    assert!(comment.posted_at.is_none());
    assert!(!comment.is_reply);
}

#[test]
fn normalize_record_ignores_unparseable_timestamp() {
    let record = json!({ "id": "8", "text": "x", "createdAt": "ayer" });
    let comment = normalize_record(&record).expect("valid record");
    assert!(comment.posted_at.is_none());
}

#[test]
fn normalize_record_rejects_missing_text() {
    let record = json!({ "id": "9", "author": { "userName": "a" } });
    assert!(normalize_record(&record).is_none());
}

#[test]
fn normalize_record_rejects_empty_text() {
    let record = json!({ "id": "10", "text": "" });
    assert!(normalize_record(&record).is_none());
}

#[test]
fn normalize_record_keeps_whitespace_only_text() {
    let record = json!({ "id": "11", "text": "   " });
    let comment = normalize_record(&record).expect("valid record");
    assert_eq!(comment.text, "   ");
}

#[test]
fn normalize_record_rejects_missing_id() {
    let record = json!({ "text": "sin id" });
    assert!(normalize_record(&record).is_none());
}

#[test]
fn normalize_record_is_deterministic() {
    let record = author_layout_record();
    assert_eq!(normalize_record(&record), normalize_record(&record));
}

// -----------------------------------------------------------------------
// normalize_records
// -----------------------------------------------------------------------

#[test]
fn normalize_records_filters_and_preserves_order() {
    let records = vec![
        json!({ "id": "a", "text": "uno" }),
        json!({ "id": "b" }),
        json!({ "text": "sin id" }),
        json!({ "id": "c", "text": "tres" }),
        json!({ "id": "a", "text": "uno" }),
    ];
    let comments = normalize_records(&records);
    let ids: Vec<&str> = comments.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c", "a"], "no sorting, no dedup");
    assert!(comments.len() <= records.len());
}

#[test]
fn normalize_records_handles_non_object_entries() {
    let records = vec![json!("noise"), json!(null), json!(42)];
    assert!(normalize_records(&records).is_empty());
}
