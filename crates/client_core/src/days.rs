//! Day-tab partitioning for the schedule list.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use shared::domain::ConferenceEntry;

pub const UNSCHEDULED_LABEL: &str = "UNSCHEDULED";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayTab {
    pub label: String,
    pub date: Option<NaiveDate>,
    pub entries: Vec<ConferenceEntry>,
}

/// Groups entries into `DAY n` tabs by start date, ascending, with undated
/// entries in a trailing tab. Entries within a tab are stably ordered by start.
pub fn partition_by_day(entries: &[ConferenceEntry]) -> Vec<DayTab> {
    let mut dated: BTreeMap<NaiveDate, Vec<ConferenceEntry>> = BTreeMap::new();
    let mut undated = Vec::new();

    for entry in entries {
        match entry.session.day() {
            Some(day) => dated.entry(day).or_default().push(entry.clone()),
            None => undated.push(entry.clone()),
        }
    }

    let mut tabs: Vec<DayTab> = dated
        .into_iter()
        .enumerate()
        .map(|(index, (date, mut entries))| {
            entries.sort_by_key(|entry| entry.session.start_date);
            DayTab {
                label: format!("DAY {}", index + 1),
                date: Some(date),
                entries,
            }
        })
        .collect();

    if !undated.is_empty() {
        tabs.push(DayTab {
            label: UNSCHEDULED_LABEL.to_string(),
            date: None,
            entries: undated,
        });
    }

    tabs
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use shared::domain::Session;

    use super::*;

    fn at(title: &str, start: &str) -> ConferenceEntry {
        let start = DateTime::parse_from_rfc3339(start).expect("start");
        ConferenceEntry::new(Session::new(title).with_window(start, None), "")
    }

    fn titles(tab: &DayTab) -> Vec<&str> {
        tab.entries.iter().map(ConferenceEntry::title).collect()
    }

    #[test]
    fn empty_schedule_has_no_tabs() {
        assert!(partition_by_day(&[]).is_empty());
    }

    #[test]
    fn groups_by_day_in_date_order() {
        let entries = vec![
            at("Day two closing", "2016-04-22T17:00:00+02:00"),
            at("Day one late", "2016-04-21T16:00:00+02:00"),
            at("Day one early", "2016-04-21T09:00:00+02:00"),
            at("Day two opening", "2016-04-22T09:00:00+02:00"),
        ];

        let tabs = partition_by_day(&entries);
        assert_eq!(tabs.len(), 2);
        assert_eq!(tabs[0].label, "DAY 1");
        assert_eq!(tabs[0].date, NaiveDate::from_ymd_opt(2016, 4, 21));
        assert_eq!(titles(&tabs[0]), ["Day one early", "Day one late"]);
        assert_eq!(tabs[1].label, "DAY 2");
        assert_eq!(titles(&tabs[1]), ["Day two opening", "Day two closing"]);
    }

    #[test]
    fn undated_entries_trail_in_their_own_tab() {
        let entries = vec![
            ConferenceEntry::new(Session::new("Talk"), "u1"),
            at("Keynote", "2016-04-21T09:00:00+02:00"),
        ];

        let tabs = partition_by_day(&entries);
        assert_eq!(tabs.len(), 2);
        assert_eq!(tabs[1].label, UNSCHEDULED_LABEL);
        assert_eq!(tabs[1].date, None);
        assert_eq!(titles(&tabs[1]), ["Talk"]);
    }
}
