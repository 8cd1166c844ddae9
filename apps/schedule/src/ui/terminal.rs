use std::io::{self, Write};

use client_core::DayTab;
use shared::domain::ConferenceEntry;

use crate::ui::ScheduleView;

/// Prints the tab strip and the list for each day (or only the selected one).
pub struct TerminalView<W: Write> {
    out: W,
    selected_tab: Option<usize>,
}

impl TerminalView<io::Stdout> {
    pub fn stdout(selected_tab: Option<usize>) -> Self {
        Self::new(io::stdout(), selected_tab)
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, selected_tab: Option<usize>) -> Self {
        Self { out, selected_tab }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_tabs(&mut self, tabs: &[DayTab]) -> io::Result<()> {
        if tabs.is_empty() {
            writeln!(self.out, "(no sessions)")?;
            return self.out.flush();
        }

        let labels: Vec<&str> = tabs.iter().map(|tab| tab.label.as_str()).collect();
        writeln!(self.out, "[ {} ]", labels.join(" | "))?;

        if let Some(selected) = self.selected_tab {
            if selected >= tabs.len() {
                writeln!(self.out, "(no tab {})", selected + 1)?;
                return self.out.flush();
            }
        }

        for (index, tab) in tabs.iter().enumerate() {
            if self.selected_tab.is_some_and(|selected| selected != index) {
                continue;
            }
            match tab.date {
                Some(date) => writeln!(self.out, "== {} ({date}) ==", tab.label)?,
                None => writeln!(self.out, "== {} ==", tab.label)?,
            }
            for entry in &tab.entries {
                writeln!(self.out, "  {}", format_entry(entry))?;
            }
        }
        self.out.flush()
    }
}

impl<W: Write> ScheduleView for TerminalView<W> {
    fn render(&mut self, tabs: &[DayTab]) {
        if let Err(err) = self.write_tabs(tabs) {
            tracing::warn!("failed to render schedule: {err}");
        }
    }

    fn show_notice(&mut self, notice: &str) {
        if let Err(err) = writeln!(self.out, "! {notice}") {
            tracing::warn!("failed to show notice: {err}");
        }
    }
}

fn format_entry(entry: &ConferenceEntry) -> String {
    let session = &entry.session;
    let time = match (session.start_date, session.end_date) {
        (Some(start), Some(end)) => format!("{}-{}", start.format("%H:%M"), end.format("%H:%M")),
        (Some(start), None) => format!("{}", start.format("%H:%M")),
        _ => "--:--".to_string(),
    };

    let mut line = format!("{time}  {}", session.title);
    if let Some(room) = &session.room {
        line.push_str(&format!("  @ {room}"));
    }
    if !entry.image.is_empty() {
        line.push_str(&format!("  [{}]", entry.image));
    }
    line
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use client_core::partition_by_day;
    use shared::domain::Session;

    use super::*;

    fn render_to_string(tabs: &[DayTab], selected_tab: Option<usize>) -> String {
        let mut view = TerminalView::new(Vec::new(), selected_tab);
        view.render(tabs);
        String::from_utf8(view.into_inner()).expect("utf8")
    }

    fn sample_tabs() -> Vec<DayTab> {
        let day_one = DateTime::parse_from_rfc3339("2016-04-21T09:30:00+02:00").expect("date");
        let day_one_end = DateTime::parse_from_rfc3339("2016-04-21T10:15:00+02:00").expect("date");
        let day_two = DateTime::parse_from_rfc3339("2016-04-22T11:00:00+02:00").expect("date");
        let mut keynote = Session::new("Keynote").with_window(day_one, Some(day_one_end));
        keynote.room = Some("Hall A".into());
        partition_by_day(&[
            ConferenceEntry::new(keynote, "https://img/a.png"),
            ConferenceEntry::new(Session::new("Workshop").with_window(day_two, None), ""),
        ])
    }

    #[test]
    fn renders_every_tab_by_default() {
        let output = render_to_string(&sample_tabs(), None);
        assert!(output.starts_with("[ DAY 1 | DAY 2 ]\n"));
        assert!(output.contains("== DAY 1 (2016-04-21) =="));
        assert!(output.contains("  09:30-10:15  Keynote  @ Hall A  [https://img/a.png]"));
        assert!(output.contains("  11:00  Workshop"));
    }

    #[test]
    fn renders_only_selected_tab() {
        let output = render_to_string(&sample_tabs(), Some(1));
        assert!(!output.contains("Keynote"));
        assert!(output.contains("== DAY 2 (2016-04-22) =="));
    }

    #[test]
    fn out_of_range_tab_is_reported() {
        let output = render_to_string(&sample_tabs(), Some(5));
        assert!(output.contains("(no tab 6)"));
    }

    #[test]
    fn empty_schedule_and_notices() {
        let mut view = TerminalView::new(Vec::new(), None);
        view.render(&[]);
        view.show_notice("No internet connection :(");
        let output = String::from_utf8(view.into_inner()).expect("utf8");
        assert_eq!(output, "(no sessions)\n! No internet connection :(\n");
    }
}
