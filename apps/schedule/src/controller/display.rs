//! Schedule screen state machine.
//!
//! Runs on the UI-bound thread. Fetches are handed to the backend worker and
//! their results come back as [`UiEvent`]s, which are applied only from
//! [`DisplayController::pump_events`] / [`DisplayController::wait_for_event`],
//! so every mutation of the in-memory list, the preference store and the view
//! happens on this thread.

use std::time::{Duration, Instant};

use client_core::{cache_codec, is_refresh_due, partition_by_day};
use crossbeam_channel::{Receiver, Sender};
use shared::{domain::ConferenceEntry, keys};
use storage::Preferences;
use tracing::{debug, error, info, warn};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{UiError, UiEvent},
    orchestration::dispatch_backend_command,
};
use crate::ui::ScheduleView;

/// State shared across activations: the device store and what is on screen.
pub struct DisplayContext {
    pub preferences: Preferences,
    pub entries: Vec<ConferenceEntry>,
}

impl DisplayContext {
    pub fn new(preferences: Preferences) -> Self {
        Self {
            preferences,
            entries: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Idle,
    RefreshCheck,
    Fetching,
    CacheLoad,
    Joined,
    Rendered,
    TornDown,
}

type Clock = Box<dyn Fn() -> i64 + Send>;

pub struct DisplayController<V> {
    context: DisplayContext,
    view: V,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    refresh_timeout: Duration,
    clock: Clock,
    state: DisplayState,
    generation: u64,
    in_flight: Option<u64>,
}

impl<V: ScheduleView> DisplayController<V> {
    pub fn new(
        context: DisplayContext,
        view: V,
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        refresh_timeout: Duration,
    ) -> Self {
        Self {
            context,
            view,
            cmd_tx,
            ui_rx,
            refresh_timeout,
            clock: Box::new(|| chrono::Utc::now().timestamp_millis()),
            state: DisplayState::Idle,
            generation: 0,
            in_flight: None,
        }
    }

    /// Replaces the wall clock (millis since the Unix epoch).
    #[cfg(test)]
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    pub fn entries(&self) -> &[ConferenceEntry] {
        &self.context.entries
    }

    pub fn preferences(&self) -> &Preferences {
        &self.context.preferences
    }

    #[cfg(test)]
    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Entry point for every time the schedule screen comes to the foreground.
    pub fn activate(&mut self) {
        if self.state == DisplayState::TornDown {
            warn!("ignoring activation of a torn-down schedule screen");
            return;
        }

        self.track_opening();
        self.state = DisplayState::RefreshCheck;

        let last_refresh = self
            .context
            .preferences
            .get_long(keys::LAST_REFRESH_TIMESTAMP)
            .unwrap_or(0);
        let refresh_due = is_refresh_due(last_refresh, (self.clock)(), self.refresh_timeout);
        debug!(
            refresh_due,
            entries = self.context.entries.len(),
            "schedule screen activated"
        );

        if refresh_due {
            // Show whatever was cached while the refresh runs.
            if self.load_cache() {
                self.render();
            }
            self.start_fetch();
        } else if !self.context.entries.is_empty() {
            self.render();
        } else if self.load_cache() {
            self.render();
        } else {
            info!("no usable cached schedule; refreshing");
            self.start_fetch();
        }
    }

    /// Applies every event already queued by the backend without blocking.
    pub fn pump_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.ui_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Blocks up to `timeout` for one backend event and applies it.
    pub fn wait_for_event(&mut self, timeout: Duration) -> bool {
        match self.ui_rx.recv_timeout(timeout) {
            Ok(event) => {
                self.handle_event(event);
                true
            }
            Err(_) => false,
        }
    }

    /// Waits until no fetch is in flight. Returns false on timeout.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.in_flight.is_some() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || !self.wait_for_event(remaining) {
                return false;
            }
        }
        self.pump_events();
        true
    }

    /// Detaches the screen. Results of fetches still in flight are dropped
    /// when they arrive.
    pub fn teardown(&mut self) {
        if self.state == DisplayState::TornDown {
            return;
        }
        if let Some(generation) = self.in_flight.take() {
            info!(generation, "schedule screen torn down with a fetch in flight");
        }
        self.state = DisplayState::TornDown;
    }

    pub fn into_context(self) -> DisplayContext {
        self.context
    }

    fn track_opening(&mut self) {
        let openings = self
            .context
            .preferences
            .get_long(keys::OPENING_APP_COUNT)
            .unwrap_or(0)
            .saturating_add(1);
        self.context
            .preferences
            .edit()
            .put_long(keys::OPENING_APP_COUNT, openings)
            .apply();
        debug!(openings, "tracked schedule opening");
    }

    fn start_fetch(&mut self) {
        if let Some(generation) = self.in_flight {
            debug!(generation, "timeline fetch already in flight");
            self.state = DisplayState::Fetching;
            return;
        }

        self.generation += 1;
        let generation = self.generation;
        match dispatch_backend_command(&self.cmd_tx, BackendCommand::FetchTimeline { generation })
        {
            Ok(()) => {
                self.in_flight = Some(generation);
                self.state = DisplayState::Fetching;
            }
            Err(error) => {
                warn!(generation, "could not start timeline fetch: {}", error.message());
                self.fall_back(&error);
            }
        }
    }

    fn handle_event(&mut self, event: UiEvent) {
        if self.state == DisplayState::TornDown {
            debug!("schedule screen torn down; ignoring backend event");
            return;
        }

        match event {
            UiEvent::Info(message) => debug!(%message, "backend info"),
            UiEvent::TimelineFetched {
                generation,
                entries,
            } => {
                if self.complete_fetch(generation) {
                    self.apply_fetched(entries);
                }
            }
            UiEvent::TimelineUnavailable { generation, error } => {
                if self.complete_fetch(generation) {
                    self.fall_back(&error);
                }
            }
        }
    }

    fn complete_fetch(&mut self, generation: u64) -> bool {
        if self.in_flight != Some(generation) {
            debug!(generation, "ignoring superseded timeline result");
            return false;
        }
        self.in_flight = None;
        true
    }

    fn apply_fetched(&mut self, entries: Vec<ConferenceEntry>) {
        self.state = DisplayState::Joined;
        self.context.entries = entries;

        match cache_codec::encode(&self.context.entries) {
            Ok(blob) => {
                let now = (self.clock)();
                self.context
                    .preferences
                    .edit()
                    .put_string(keys::SESSIONS_CACHE_BLOB, blob)
                    .put_long(keys::LAST_REFRESH_TIMESTAMP, now)
                    .apply();
            }
            Err(err) => error!("failed to cache refreshed schedule: {err}"),
        }

        self.render();
    }

    /// Failed or impossible refresh: tell the user, keep or restore what we can.
    fn fall_back(&mut self, error: &UiError) {
        info!(
            category = ?error.category(),
            context = ?error.context(),
            "falling back to cached schedule"
        );
        self.view.show_notice(error.notice());
        self.load_cache();
        self.render();
    }

    /// True when the stored blob replaced an empty in-memory list.
    fn load_cache(&mut self) -> bool {
        self.state = DisplayState::CacheLoad;
        if !self.context.entries.is_empty() {
            return false;
        }

        let blob = self.context.preferences.get_string(keys::SESSIONS_CACHE_BLOB);
        match cache_codec::read_cache(blob) {
            Ok(Some(entries)) => {
                info!(entries = entries.len(), "loaded cached schedule");
                self.context.entries = entries;
                true
            }
            Ok(None) => false,
            Err(err) => {
                let error = UiError::from_cache_error(&err);
                warn!(context = ?error.context(), "ignoring unusable schedule cache: {}", error.message());
                false
            }
        }
    }

    fn render(&mut self) {
        let tabs = partition_by_day(&self.context.entries);
        self.view.render(&tabs);
        self.state = DisplayState::Rendered;
    }
}

#[cfg(test)]
#[path = "tests/display_tests.rs"]
mod tests;
