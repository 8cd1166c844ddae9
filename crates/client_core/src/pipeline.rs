//! Two-stage timeline fetch.
//!
//! Sessions can only be requested through [`FetchedSpeakers`], which exists
//! only after the speaker stage succeeded, so a failed speaker fetch never
//! issues a session request.

use shared::domain::{ConferenceEntry, Speaker};
use tracing::{debug, info};

use crate::{
    error::{FetchError, TimelineError},
    join::join_all,
    TimelineApi,
};

#[derive(Debug)]
pub struct FetchedSpeakers {
    speakers: Vec<Speaker>,
}

impl FetchedSpeakers {
    pub fn speakers(&self) -> &[Speaker] {
        &self.speakers
    }

    pub async fn fetch_sessions(
        self,
        api: &dyn TimelineApi,
    ) -> Result<Vec<ConferenceEntry>, FetchError> {
        let sessions = api.list_sessions().await?;
        debug!(sessions = sessions.len(), "fetched sessions");
        let entries = join_all(sessions, Some(self.speakers.as_slice()))?;
        Ok(entries)
    }
}

pub async fn fetch_speakers(api: &dyn TimelineApi) -> Result<FetchedSpeakers, TimelineError> {
    let speakers = api.list_speakers().await?;
    debug!(speakers = speakers.len(), "fetched speakers");
    Ok(FetchedSpeakers { speakers })
}

/// Fetches speakers, then sessions, and joins them into display entries.
pub async fn fetch_timeline(api: &dyn TimelineApi) -> Result<Vec<ConferenceEntry>, FetchError> {
    let speakers = fetch_speakers(api).await?;
    let entries = speakers.fetch_sessions(api).await?;
    info!(entries = entries.len(), "timeline refreshed");
    Ok(entries)
}
