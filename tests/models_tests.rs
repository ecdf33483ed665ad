use backscroll::{ChannelRef, Message, TimestampInput};
use chrono::{NaiveDate, TimeZone, Utc};

#[test]
fn test_message_json_shape() {
    let message = Message::new(
        Utc.with_ymd_and_hms(2025, 10, 19, 0, 0, 0).unwrap(),
        "c".to_string(),
    );

    let json = serde_json::to_string(&message).unwrap();
    assert_eq!(json, r#"{"date":"2025-10-19T00:00:00+00:00","text":"c"}"#);
}

#[test]
fn test_message_reads_back_from_archive_json() {
    // Archived results may have been written with a `Z` suffix or another offset
    let parsed: Vec<Message> = serde_json::from_str(
        r#"[
            {"date": "2025-10-18T01:00:00Z", "text": "b"},
            {"date": "2025-10-19T03:00:00+03:00", "text": ""}
        ]"#,
    )
    .unwrap();

    assert_eq!(parsed[0].date(), "2025-10-18T01:00:00+00:00");
    assert_eq!(parsed[1].date(), "2025-10-19T00:00:00+00:00");
    assert_eq!(parsed[1].text(), "");
}

#[test]
fn test_message_rejects_bad_date() {
    let parsed = serde_json::from_str::<Message>(r#"{"date": "yesterday", "text": "x"}"#);
    assert!(parsed.is_err());
}

#[test]
fn test_timestamp_input_conversions() {
    let naive = NaiveDate::from_ymd_opt(2025, 10, 18)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(TimestampInput::from(naive), TimestampInput::Naive(naive));

    let aware = Utc.with_ymd_and_hms(2025, 10, 18, 0, 0, 0).unwrap();
    assert_eq!(
        TimestampInput::from(aware),
        TimestampInput::Aware(aware.fixed_offset())
    );

    assert_eq!(
        TimestampInput::from("2025-10-18"),
        TimestampInput::Text("2025-10-18".to_string())
    );
}

#[test]
fn test_channel_ref_display() {
    assert_eq!(ChannelRef::from(42_i64).to_string(), "42");
    assert_eq!(ChannelRef::from("@muzika").to_string(), "@muzika");
}
