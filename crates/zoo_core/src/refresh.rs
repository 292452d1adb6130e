//! Periodic refresh of the active listing.
//!
//! # Responsibility
//! - Re-run the active search on a fixed interval, driven by the caller.
//!
//! # Invariants
//! - Single-threaded: the refresher owns no connection and spawns nothing;
//!   callers pass the same connection they use for writes, so a refresh
//!   cannot interleave with an in-flight write.
//! - A failed refresh yields an empty listing plus the error message, never
//!   a partially updated one.

use crate::model::Kind;
use crate::search::{search_or_empty, SearchOutcome};
use rusqlite::Connection;
use std::time::{Duration, Instant};

/// Polling tick for the currently displayed listing.
#[derive(Debug, Clone)]
pub struct ListingRefresher {
    kind: Kind,
    text: String,
    interval: Duration,
    last_run: Option<Instant>,
}

impl ListingRefresher {
    pub fn new(kind: Kind, interval: Duration) -> Self {
        Self {
            kind,
            text: String::new(),
            interval,
            last_run: None,
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Switches the active query; the next tick runs immediately.
    pub fn set_query(&mut self, kind: Kind, text: impl Into<String>) {
        self.kind = kind;
        self.text = text.into();
        self.last_run = None;
    }

    /// Whether a tick at `now` would re-run the query.
    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_run {
            None => true,
            Some(last_run) => now.saturating_duration_since(last_run) >= self.interval,
        }
    }

    /// Re-runs the active query when the interval has elapsed.
    pub fn tick(&mut self, conn: &Connection, now: Instant) -> Option<SearchOutcome> {
        if !self.is_due(now) {
            return None;
        }
        Some(self.force(conn, now))
    }

    /// Re-runs the active query now, e.g. right after a committed write.
    pub fn force(&mut self, conn: &Connection, now: Instant) -> SearchOutcome {
        self.last_run = Some(now);
        search_or_empty(conn, self.kind, &self.text)
    }
}
