use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::domain::{Session, Speaker};
use tracing::{debug, warn};
use url::Url;

pub mod cache_codec;
pub mod days;
pub mod error;
pub mod join;
pub mod pipeline;
pub mod refresh;

pub use days::{partition_by_day, DayTab};
pub use error::{CacheError, Endpoint, FetchError, JoinError, TimelineError};
pub use pipeline::{fetch_speakers, fetch_timeline, FetchedSpeakers};
pub use refresh::{is_refresh_due, DEFAULT_REFRESH_TIMEOUT};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Read side of the remote timeline service.
#[async_trait]
pub trait TimelineApi: Send + Sync {
    async fn list_speakers(&self) -> Result<Vec<Speaker>, TimelineError>;
    async fn list_sessions(&self) -> Result<Vec<Session>, TimelineError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineRoutes {
    pub speakers_path: String,
    pub sessions_path: String,
}

impl Default for TimelineRoutes {
    fn default() -> Self {
        Self {
            speakers_path: "speakers".into(),
            sessions_path: "sessions".into(),
        }
    }
}

pub struct HttpTimelineClient {
    http: Client,
    speakers_url: Url,
    sessions_url: Url,
}

impl HttpTimelineClient {
    pub fn new(
        base_url: &str,
        routes: &TimelineRoutes,
        request_timeout: Duration,
    ) -> Result<Self, TimelineError> {
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(TimelineError::Client)?;
        let base = parse_base_url(base_url)?;
        Ok(Self {
            http,
            speakers_url: join_route(&base, &routes.speakers_path)?,
            sessions_url: join_route(&base, &routes.sessions_path)?,
        })
    }

    pub fn speakers_url(&self) -> &Url {
        &self.speakers_url
    }

    pub fn sessions_url(&self) -> &Url {
        &self.sessions_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        url: &Url,
    ) -> Result<T, TimelineError> {
        debug!(%endpoint, %url, "requesting timeline data");
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| TimelineError::Transport { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%endpoint, status = status.as_u16(), "timeline service rejected request");
            return Err(TimelineError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| TimelineError::Transport { endpoint, source })?;
        serde_json::from_slice(&body).map_err(|source| TimelineError::Decode { endpoint, source })
    }
}

#[async_trait]
impl TimelineApi for HttpTimelineClient {
    async fn list_speakers(&self) -> Result<Vec<Speaker>, TimelineError> {
        self.get_json(Endpoint::Speakers, &self.speakers_url).await
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, TimelineError> {
        self.get_json(Endpoint::Sessions, &self.sessions_url).await
    }
}

fn parse_base_url(base_url: &str) -> Result<Url, TimelineError> {
    let mut base = Url::parse(base_url.trim()).map_err(|source| TimelineError::InvalidUrl {
        url: base_url.to_string(),
        source,
    })?;
    // `Url::join` replaces the last path segment unless the base ends in '/'.
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

fn join_route(base: &Url, route: &str) -> Result<Url, TimelineError> {
    base.join(route.trim_start_matches('/'))
        .map_err(|source| TimelineError::InvalidUrl {
            url: format!("{base}{route}"),
            source,
        })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
