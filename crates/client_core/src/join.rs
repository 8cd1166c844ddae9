use shared::domain::{ConferenceEntry, Session, Speaker, SpeakerUid};
use tracing::error;

use crate::error::JoinError;

fn find_speaker<'a>(speakers: &'a [Speaker], uid: &SpeakerUid) -> Option<&'a Speaker> {
    speakers.iter().find(|speaker| &speaker.uid == uid)
}

/// Pairs a session with the image of its speakers.
///
/// Every referenced uid is looked up in order and each match overwrites the
/// image, so with several speakers the last resolvable one wins. Sessions
/// without resolvable speakers get an empty image.
pub fn join(session: Session, speakers: &[Speaker]) -> ConferenceEntry {
    // TODO: carry every speaker image once the list view can render more than one avatar.
    let mut image = "";
    for uid in &session.speaker_uids {
        if let Some(speaker) = find_speaker(speakers, uid) {
            image = speaker.image.as_str();
        }
    }
    let image = image.to_string();
    ConferenceEntry::new(session, image)
}

pub fn join_all(
    sessions: Vec<Session>,
    speakers: Option<&[Speaker]>,
) -> Result<Vec<ConferenceEntry>, JoinError> {
    let Some(speakers) = speakers else {
        error!(
            sessions = sessions.len(),
            "sessions joined before speakers were fetched"
        );
        return Err(JoinError::SpeakersMissing {
            sessions: sessions.len(),
        });
    };

    Ok(sessions
        .into_iter()
        .map(|session| join(session, speakers))
        .collect())
}
