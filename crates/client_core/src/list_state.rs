//! Client-side cache of teacher records plus the search and filter inputs
//! that shape what the list shows.

use std::str::FromStr;

use shared::{
    domain::{Subject, TeacherId, TeacherRecord, TeacherStatus},
    error::FetchError,
};
use tracing::{debug, info, warn};

use crate::{
    gateway::TeacherGateway,
    notify::{Notification, NotificationSink},
};

pub const ALL_FILTER_LABEL: &str = "All";

/// A select box with an "All" sentinel in front of the real options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterChoice<T> {
    All,
    Only(T),
}

impl<T> Default for FilterChoice<T> {
    fn default() -> Self {
        FilterChoice::All
    }
}

impl<T: PartialEq> FilterChoice<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            FilterChoice::All => true,
            FilterChoice::Only(wanted) => wanted == value,
        }
    }
}

impl<T: FromStr> FilterChoice<T> {
    /// Blank input and "All" (any case) both mean no filtering.
    pub fn parse(raw: &str) -> Result<Self, T::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_FILTER_LABEL) {
            return Ok(FilterChoice::All);
        }
        trimmed.parse().map(FilterChoice::Only)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeacherStats {
    pub total: usize,
    pub active: usize,
    pub total_classes: i64,
    /// Mean years of experience, rounded to one decimal. `0.0` when empty.
    pub average_experience: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReloadTicket(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum ReloadOutcome {
    Applied { count: usize },
    Failed(FetchError),
    /// A newer reload was issued before this one settled; its result was dropped.
    Stale,
}

#[derive(Debug, Default)]
pub struct TeacherListState {
    records: Vec<TeacherRecord>,
    loading: bool,
    search_term: String,
    subject_filter: FilterChoice<Subject>,
    status_filter: FilterChoice<TeacherStatus>,
    latest_ticket: u64,
}

impl TeacherListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[TeacherRecord] {
        &self.records
    }

    pub fn find(&self, id: &TeacherId) -> Option<&TeacherRecord> {
        self.records.iter().find(|record| &record.id == id)
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn subject_filter(&self) -> FilterChoice<Subject> {
        self.subject_filter
    }

    pub fn status_filter(&self) -> FilterChoice<TeacherStatus> {
        self.status_filter
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn set_subject_filter(&mut self, filter: FilterChoice<Subject>) {
        self.subject_filter = filter;
    }

    pub fn set_status_filter(&mut self, filter: FilterChoice<TeacherStatus>) {
        self.status_filter = filter;
    }

    /// Clears search and filters. Cached records are left alone.
    pub fn reset_filters(&mut self) {
        self.search_term.clear();
        self.subject_filter = FilterChoice::All;
        self.status_filter = FilterChoice::All;
    }

    /// Fetches the full list and replaces the cache with it.
    ///
    /// Failures go to `sink`. `loading` is cleared on every exit path,
    /// including when this future is dropped before the gateway answers.
    pub async fn reload(
        &mut self,
        gateway: &dyn TeacherGateway,
        sink: &dyn NotificationSink,
    ) -> ReloadOutcome {
        let ticket = self.begin_reload();
        let pending = PendingReload {
            state: self,
            ticket: Some(ticket),
        };
        let result = gateway.list().await;
        pending.finish(result, sink)
    }

    /// Starts a reload whose response will be applied with
    /// [`TeacherListState::finish_reload`]. Issuing a new ticket makes every
    /// earlier one stale.
    pub fn begin_reload(&mut self) -> ReloadTicket {
        self.latest_ticket += 1;
        self.loading = true;
        ReloadTicket(self.latest_ticket)
    }

    pub fn finish_reload(
        &mut self,
        ticket: ReloadTicket,
        result: Result<Vec<TeacherRecord>, FetchError>,
        sink: &dyn NotificationSink,
    ) -> ReloadOutcome {
        let current = ticket.0 == self.latest_ticket;
        if current {
            self.loading = false;
        }

        match result {
            Ok(records) if current => {
                info!(count = records.len(), "teacher list reloaded");
                let count = records.len();
                self.records = records;
                ReloadOutcome::Applied { count }
            }
            Ok(_) => {
                debug!(
                    ticket = ticket.0,
                    latest = self.latest_ticket,
                    "discarding stale teacher list"
                );
                ReloadOutcome::Stale
            }
            Err(err) => {
                warn!(error = %err, stale = !current, "failed to load teachers");
                sink.notify(Notification::error(err.message.clone()));
                ReloadOutcome::Failed(err)
            }
        }
    }

    /// Settles a ticket that will never get a response.
    pub fn abandon_reload(&mut self, ticket: ReloadTicket) {
        if ticket.0 == self.latest_ticket {
            self.loading = false;
        }
    }

    pub fn matches(&self, record: &TeacherRecord) -> bool {
        self.matches_needle(record, &self.search_needle())
    }

    /// Records passing search and both filters, in server order.
    pub fn filtered_view(&self) -> impl Iterator<Item = &TeacherRecord> + '_ {
        let needle = self.search_needle();
        self.records
            .iter()
            .filter(move |record| self.matches_needle(record, &needle))
    }

    fn search_needle(&self) -> String {
        self.search_term.trim().to_lowercase()
    }

    fn matches_needle(&self, record: &TeacherRecord, needle: &str) -> bool {
        let search_hit = needle.is_empty()
            || record.name.to_lowercase().contains(needle)
            || record.email.to_lowercase().contains(needle)
            || record.subject.label().to_lowercase().contains(needle);

        search_hit
            && self.subject_filter.admits(&record.subject)
            && self.status_filter.admits(&record.status)
    }

    pub fn derived_stats(&self) -> TeacherStats {
        let total = self.records.len();
        let active = self
            .records
            .iter()
            .filter(|record| record.status == TeacherStatus::Active)
            .count();
        let total_classes = self.records.iter().map(|record| record.classes).sum();
        let average_experience = if total == 0 {
            0.0
        } else {
            let sum: i64 = self.records.iter().map(|record| record.experience).sum();
            (sum as f64 / total as f64 * 10.0).round() / 10.0
        };

        TeacherStats {
            total,
            active,
            total_classes,
            average_experience,
        }
    }
}

struct PendingReload<'a> {
    state: &'a mut TeacherListState,
    ticket: Option<ReloadTicket>,
}

impl PendingReload<'_> {
    fn finish(
        mut self,
        result: Result<Vec<TeacherRecord>, FetchError>,
        sink: &dyn NotificationSink,
    ) -> ReloadOutcome {
        match self.ticket.take() {
            Some(ticket) => self.state.finish_reload(ticket, result, sink),
            None => ReloadOutcome::Stale,
        }
    }
}

impl Drop for PendingReload<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.state.abandon_reload(ticket);
        }
    }
}

#[cfg(test)]
#[path = "tests/list_state_tests.rs"]
mod tests;
