//! UI/backend events and error modeling for the schedule screen.

use client_core::{CacheError, FetchError, TimelineError};
use shared::domain::ConferenceEntry;

pub enum UiEvent {
    Info(String),
    TimelineFetched {
        generation: u64,
        entries: Vec<ConferenceEntry>,
    },
    TimelineUnavailable {
        generation: u64,
        error: UiError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    /// Timeline service unreachable.
    Network,
    /// Service reachable but answered with an error status or bad payload.
    Service,
    Cache,
    /// Caller broke an ordering contract (e.g. joining before speakers arrived).
    Contract,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    FetchTimeline,
    CacheLoad,
    Dispatch,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn new(
        category: UiErrorCategory,
        context: UiErrorContext,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            context,
            message: message.into(),
        }
    }

    pub fn from_fetch_error(err: &FetchError) -> Self {
        let category = match err {
            FetchError::Timeline(timeline) if timeline.is_connectivity() => {
                UiErrorCategory::Network
            }
            FetchError::Timeline(TimelineError::Status { .. } | TimelineError::Decode { .. }) => {
                UiErrorCategory::Service
            }
            FetchError::Timeline(_) => UiErrorCategory::Unknown,
            FetchError::Join(_) => UiErrorCategory::Contract,
        };
        Self::new(category, UiErrorContext::FetchTimeline, err.to_string())
    }

    pub fn from_cache_error(err: &CacheError) -> Self {
        Self::new(
            UiErrorCategory::Cache,
            UiErrorContext::CacheLoad,
            err.to_string(),
        )
    }

    /// Short transient text shown to the user.
    pub fn notice(&self) -> &'static str {
        match self.category {
            UiErrorCategory::Network => "No internet connection :(",
            UiErrorCategory::Service => "Schedule service unavailable",
            UiErrorCategory::Cache => "Saved schedule could not be read",
            UiErrorCategory::Contract | UiErrorCategory::Unknown => {
                "Something went wrong loading the schedule"
            }
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use client_core::{Endpoint, JoinError};

    use super::*;

    #[test]
    fn status_failures_are_service_errors() {
        let err = FetchError::Timeline(TimelineError::Status {
            endpoint: Endpoint::Speakers,
            status: 502,
        });
        let ui = UiError::from_fetch_error(&err);
        assert_eq!(ui.category(), UiErrorCategory::Service);
        assert_eq!(ui.context(), UiErrorContext::FetchTimeline);
        assert_eq!(ui.notice(), "Schedule service unavailable");
        assert!(ui.message().contains("list-speakers"));
    }

    #[test]
    fn join_failures_are_contract_errors() {
        let err = FetchError::Join(JoinError::SpeakersMissing { sessions: 2 });
        assert_eq!(
            UiError::from_fetch_error(&err).category(),
            UiErrorCategory::Contract
        );
    }

    #[test]
    fn cache_failures_carry_cache_context() {
        let decode = client_core::cache_codec::decode("nope").expect_err("malformed");
        let ui = UiError::from_cache_error(&decode);
        assert_eq!(ui.category(), UiErrorCategory::Cache);
        assert_eq!(ui.context(), UiErrorContext::CacheLoad);
    }
}
