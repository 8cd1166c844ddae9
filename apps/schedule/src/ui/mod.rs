//! Presentation boundary for the schedule screen.

use client_core::DayTab;

pub mod terminal;

/// Whatever owns the tab/list widgets. Called only from the UI-bound thread.
pub trait ScheduleView {
    fn render(&mut self, tabs: &[DayTab]);
    fn show_notice(&mut self, notice: &str);
}
