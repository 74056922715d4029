//! Edge case tests for brisk-net
//!
//! Request encoding and transfer progress aggregation.

use brisk_net::*;
use serde_json::json;

// ============================================================================
// REQUEST ENCODING
// ============================================================================

#[test]
fn test_json_body_default() {
    let req = Request::post("https://example.com/api")
        .with_payload(&json!({"id": "save", "data": {"n": 1}}), &Negotiation::default(), None)
        .unwrap();

    assert_eq!(req.header("Content-Type"), Some("application/json;charset=utf-8"));
    assert_eq!(req.header("Accept"), Some("application/json"));
    let body: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["data"]["n"], 1);
}

#[test]
fn test_null_payload_no_body() {
    let req = Request::post("https://example.com")
        .with_payload(&serde_json::Value::Null, &Negotiation::default(), None)
        .unwrap();
    assert!(req.body.is_none());
    assert!(req.header("Content-Type").is_some());
}

#[test]
fn test_text_body_passthrough() {
    let negotiation = Negotiation {
        send_format: SendFormat::Text,
        return_format: ReturnFormat::Text,
        encoding: "iso-8859-1".into(),
    };
    let req = Request::new(Method::Delete, "https://example.com")
        .with_payload(&json!("raw text"), &negotiation, None)
        .unwrap();

    assert_eq!(req.body.as_deref(), Some("raw text".as_bytes()));
    assert_eq!(req.header("Content-Type"), Some("text/plain;charset=iso-8859-1"));
    assert_eq!(req.header("Accept"), Some("text/plain"));
}

#[test]
fn test_nested_values_urlencoded_as_json() {
    let negotiation = Negotiation {
        send_format: SendFormat::Html,
        ..Default::default()
    };
    let req = Request::post("https://example.com")
        .with_payload(&json!({"fields": {"a": 1}}), &negotiation, None)
        .unwrap();
    assert_eq!(
        String::from_utf8(req.body.unwrap()).unwrap(),
        "fields=%7B%22a%22%3A1%7D"
    );
}

#[test]
fn test_format_names() {
    assert_eq!(SendFormat::from_name("FORM"), Ok(SendFormat::Form));
    assert_eq!(ReturnFormat::from_name("xml"), Ok(ReturnFormat::Xml));
    assert_eq!(
        ReturnFormat::from_name("yaml"),
        Err(NetError::UnsupportedFormat("yaml".into()))
    );
}

// ============================================================================
// PROGRESS
// ============================================================================

fn part(file_number: usize, part: usize) -> PartTag {
    PartTag {
        time_stamp: 1_700_000_000,
        file_name: format!("file{file_number}.bin"),
        file_number,
        file_count: 2,
        part,
        file_parts: 3,
        chunk_size: 579_344,
    }
}

#[test]
fn test_progress_two_files_three_parts_out_of_order() {
    let mut tracker = ProgressTracker::new();
    let updates = [
        (1, 2, 50),
        (0, 0, 30),
        (1, 0, 100),
        (0, 2, 100),
        (0, 0, 100),
        (1, 1, 60),
        (1, 2, 100),
        (0, 1, 45),
        (1, 1, 100),
        (0, 1, 100),
    ];

    let mut last = 0;
    for (file, idx, percent) in updates {
        let overall = tracker.update(&part(file, idx), percent);
        assert!(overall >= last, "{overall} < {last}");
        last = overall;
    }
    assert_eq!(last, 100);
    assert_eq!(tracker.active(), 0);
}

#[test]
fn test_smallest_file_count_wins() {
    let mut tracker = ProgressTracker::new();
    let late = PartTag { file_count: 4, ..part(0, 0) };
    tracker.update(&late, 100);
    tracker.update(&part(0, 1), 100);
    // Denominator dropped from 4 to 2
    assert_eq!(tracker.update(&part(0, 2), 100), 50);
}

#[test]
fn test_updates_after_completion_report_done() {
    let mut tracker = ProgressTracker::new();
    for file in 0..2 {
        for idx in 0..3 {
            tracker.update(&part(file, idx), 100);
        }
    }
    assert_eq!(tracker.update(&part(0, 0), 10), 100);
}

#[test]
fn test_part_tag_serde_shape() {
    let tag = part(1, 2);
    let json = serde_json::to_value(&tag).unwrap();
    assert_eq!(json["timeStamp"], 1_700_000_000u64);
    assert_eq!(json["fileParts"], 3);
    assert_eq!(json["chunkSize"], 579_344);
}
