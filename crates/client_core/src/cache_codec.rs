use shared::domain::ConferenceEntry;

use crate::error::CacheError;

pub fn encode(entries: &[ConferenceEntry]) -> Result<String, CacheError> {
    serde_json::to_string(entries).map_err(CacheError::Encode)
}

pub fn decode(blob: &str) -> Result<Vec<ConferenceEntry>, CacheError> {
    serde_json::from_str(blob).map_err(CacheError::Decode)
}

/// Decodes a stored blob, keeping "never cached" (`Ok(None)`) apart from a
/// cached empty schedule (`Ok(Some(vec![]))`).
pub fn read_cache(blob: Option<&str>) -> Result<Option<Vec<ConferenceEntry>>, CacheError> {
    blob.map(decode).transpose()
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use shared::domain::Session;

    use super::*;

    fn sample_entries() -> Vec<ConferenceEntry> {
        let start = DateTime::parse_from_rfc3339("2016-04-21T09:30:00+02:00").expect("start");
        let end = DateTime::parse_from_rfc3339("2016-04-21T10:15:00+02:00").expect("end");
        let mut keynote = Session::new("Keynote")
            .with_window(start, Some(end))
            .with_speakers(["a", "b"]);
        keynote.room = Some("Hall A".to_string());
        keynote.description = "Opening".to_string();
        vec![
            ConferenceEntry::new(keynote, "https://img/b.png"),
            ConferenceEntry::new(Session::new("Lunch"), ""),
        ]
    }

    #[test]
    fn round_trips_entries() {
        let entries = sample_entries();
        let blob = encode(&entries).expect("encode");
        assert_eq!(decode(&blob).expect("decode"), entries);
    }

    #[test]
    fn round_trips_empty_list() {
        let blob = encode(&[]).expect("encode");
        assert_eq!(blob, "[]");
        assert!(decode(&blob).expect("decode").is_empty());
    }

    #[test]
    fn decodes_legacy_blob_shape() {
        let entries = decode(r#"[{"title":"Old","image":"u0"}]"#).expect("decode");
        assert_eq!(entries, vec![ConferenceEntry::new(Session::new("Old"), "u0")]);
    }

    #[test]
    fn malformed_blob_is_a_decode_error() {
        let err = decode("{not json").expect_err("malformed");
        assert!(matches!(err, CacheError::Decode(_)));
    }

    #[test]
    fn absent_blob_differs_from_empty_cache() {
        assert!(read_cache(None).expect("absent").is_none());
        assert_eq!(read_cache(Some("[]")).expect("empty"), Some(Vec::new()));
        assert!(read_cache(Some("nope")).is_err());
    }
}
