use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// Reads a missing or `null` field as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeakerUid(pub String);

impl SpeakerUid {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SpeakerUid {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SpeakerUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Speaker {
    #[serde(alias = "id")]
    pub uid: SpeakerUid,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl Speaker {
    pub fn new(uid: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            uid: SpeakerUid(uid.into()),
            image: image.into(),
            name: String::new(),
            title: None,
            company: None,
            bio: None,
        }
    }
}

/// A schedule slot as served by the timeline service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub title: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        rename = "speakerUIDs",
        alias = "speakerIds"
    )]
    pub speaker_uids: Vec<SpeakerUid>,
}

impl Session {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_speakers<I, S>(mut self, uids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.speaker_uids = uids.into_iter().map(|uid| SpeakerUid(uid.into())).collect();
        self
    }

    pub fn with_window(
        mut self,
        start: DateTime<FixedOffset>,
        end: Option<DateTime<FixedOffset>>,
    ) -> Self {
        self.start_date = Some(start);
        self.end_date = end;
        self
    }

    /// Calendar day of the session start in the offset the service reported.
    pub fn day(&self) -> Option<NaiveDate> {
        self.start_date.map(|start| start.date_naive())
    }
}

/// A session enriched with the single speaker image shown next to it.
///
/// Serialized with the session fields flattened alongside `image`; this is the
/// unit stored in the schedule cache blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConferenceEntry {
    #[serde(flatten)]
    pub session: Session,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
}

impl ConferenceEntry {
    pub fn new(session: Session, image: impl Into<String>) -> Self {
        Self {
            session,
            image: image.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.session.title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speaker_accepts_id_alias() {
        let speaker: Speaker =
            serde_json::from_str(r#"{"id":"a","image":"u1"}"#).expect("speaker json");
        assert_eq!(speaker.uid, SpeakerUid::from("a"));
        assert_eq!(speaker.image, "u1");
    }

    #[test]
    fn session_accepts_speaker_ids_alias_and_defaults() {
        let session: Session =
            serde_json::from_str(r#"{"title":"Talk","speakerIds":["a"]}"#).expect("session json");
        assert_eq!(session.title, "Talk");
        assert_eq!(session.speaker_uids, vec![SpeakerUid::from("a")]);
        assert!(session.start_date.is_none());
        assert!(session.day().is_none());
    }

    #[test]
    fn null_profile_fields_read_as_empty() {
        let speakers: Vec<Speaker> = serde_json::from_str(
            r#"[{"uid":"a","image":"u1"},{"uid":"b","image":null,"name":null,"bio":null}]"#,
        )
        .expect("speakers json");
        assert_eq!(speakers.len(), 2);
        assert_eq!(speakers[1].uid, SpeakerUid::from("b"));
        assert_eq!(speakers[1].image, "");
        assert_eq!(speakers[1].name, "");
        assert!(speakers[1].bio.is_none());
    }

    #[test]
    fn null_session_fields_read_as_empty() {
        let session: Session = serde_json::from_str(
            r#"{"title":"Talk","description":null,"room":null,"startDate":null,"speakerUIDs":null}"#,
        )
        .expect("session json");
        assert_eq!(session.title, "Talk");
        assert_eq!(session.description, "");
        assert!(session.room.is_none());
        assert!(session.speaker_uids.is_empty());

        let entry: ConferenceEntry =
            serde_json::from_str(r#"{"title":"Old","image":null}"#).expect("entry json");
        assert_eq!(entry.image, "");
    }

    #[test]
    fn conference_entry_flattens_session_fields() {
        let entry = ConferenceEntry::new(Session::new("Talk"), "u1");
        let value = serde_json::to_value(&entry).expect("entry json");
        assert_eq!(value["title"], "Talk");
        assert_eq!(value["image"], "u1");
        assert!(value.get("session").is_none());
    }

    #[test]
    fn session_day_uses_reported_offset() {
        let start = DateTime::parse_from_rfc3339("2016-04-21T23:30:00-02:00").expect("date");
        let session = Session::new("Late talk").with_window(start, None);
        assert_eq!(session.day(), NaiveDate::from_ymd_opt(2016, 4, 21));
    }
}
