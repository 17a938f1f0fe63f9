//! Event query filter

use super::EventEntry;

/// Event query filter
///
/// Time bounds are inclusive milliseconds. An `end_time` of zero means "now"
/// and is resolved once per query. Empty string criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub start_time: i64,
    pub end_time: i64,
    pub min_severity: i32,
    pub event_type: Option<String>,
    pub source: Option<String>,
    pub job_id: Option<String>,
    /// Only events not yet marked delivered
    pub unprocessed: bool,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time_range(mut self, start_time: i64, end_time: i64) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    pub fn min_severity(mut self, severity: i32) -> Self {
        self.min_severity = severity;
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    pub fn unprocessed(mut self, unprocessed: bool) -> Self {
        self.unprocessed = unprocessed;
        self
    }

    /// Copy with a zero `end_time` replaced by `now`
    pub fn resolved(&self, now: i64) -> Self {
        let mut filter = self.clone();
        if filter.end_time == 0 {
            filter.end_time = now;
        }
        filter
    }

    /// Requested type, treating an empty string as "any"
    pub fn type_criterion(&self) -> Option<&str> {
        non_empty(&self.event_type)
    }

    /// Exact per-event predicate
    pub fn matches(&self, event: &EventEntry) -> bool {
        if event.timestamp < self.start_time || event.timestamp > self.end_time {
            return false;
        }
        if event.severity < self.min_severity {
            return false;
        }
        if let Some(t) = self.type_criterion() {
            if event.event_type != t {
                return false;
            }
        }
        if let Some(source) = non_empty(&self.source) {
            if event.source != source {
                return false;
            }
        }
        if let Some(job_id) = non_empty(&self.job_id) {
            if event.job_id != job_id {
                return false;
            }
        }
        !(self.unprocessed && event.processed)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
