use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Speakers,
    Sessions,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Speakers => f.write_str("list-speakers"),
            Self::Sessions => f.write_str("list-sessions"),
        }
    }
}

/// Failure talking to the remote timeline service.
#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("failed to build timeline http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("invalid timeline url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{endpoint} request failed: {source}")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: Endpoint, status: u16 },
    #[error("{endpoint} response could not be decoded: {source}")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },
}

impl TimelineError {
    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            Self::Client(_) | Self::InvalidUrl { .. } => None,
            Self::Transport { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Decode { endpoint, .. } => Some(*endpoint),
        }
    }

    /// True for connectivity problems, as opposed to a reachable but unhappy service.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JoinError {
    #[error("speakers must be fetched before joining {sessions} session(s)")]
    SpeakersMissing { sessions: usize },
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to encode schedule cache: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("schedule cache is malformed: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Timeline(#[from] TimelineError),
    #[error(transparent)]
    Join(#[from] JoinError),
}
