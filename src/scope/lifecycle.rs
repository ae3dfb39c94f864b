// Shared view of issues and pull requests as open/close timelines.

use chrono::{DateTime, TimeDelta, Utc};

use crate::github::{Issue, PullRequest};

/// Something that is opened and later (maybe) closed.
pub trait Lifecycle {
    fn title(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
    fn closed_at(&self) -> Option<DateTime<Utc>>;

    /// How long it took to close; `None` while still open.
    fn time_taken(&self) -> Option<TimeDelta> {
        self.closed_at().map(|closed| closed - self.created_at())
    }

    /// Opened at or after `before` and closed at or before `after`.
    fn within(&self, before: DateTime<Utc>, after: DateTime<Utc>) -> bool {
        self.created_at() >= before && self.closed_at().is_some_and(|closed| closed <= after)
    }
}

impl Lifecycle for Issue {
    fn title(&self) -> &str {
        &self.title
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }
}

impl Lifecycle for PullRequest {
    fn title(&self) -> &str {
        &self.title
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }
}
