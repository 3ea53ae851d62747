//! Transient user notices.
//!
//! Notices are short messages ("opponent joined", "room not found") that the
//! caller shows for a while and then drops. A notice posted with an id is not
//! posted again while an earlier one with the same id is still live.

use std::time::{Duration, Instant};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    /// Something happened.
    Info,
    /// Something failed.
    Error,
}

/// One notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Stable identifier for deduplication.
    pub id: Option<String>,
    /// Severity.
    pub kind: NoticeKind,
    /// Text shown to the user.
    pub message: String,
    /// When it was posted.
    pub posted_at: Instant,
}

/// Live notices and their expiry.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    ttl: Duration,
    live: Vec<Notice>,
}

impl NoticeBoard {
    /// Empty board whose notices live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, live: Vec::new() }
    }

    /// Post a notice. Returns `None` if a live notice already has this id.
    pub fn post(
        &mut self,
        id: Option<&str>,
        kind: NoticeKind,
        message: impl Into<String>,
        now: Instant,
    ) -> Option<Notice> {
        if let Some(id) = id
            && self.live.iter().any(|n| n.id.as_deref() == Some(id))
        {
            tracing::debug!(id, "duplicate notice suppressed");
            return None;
        }

        let notice = Notice { id: id.map(str::to_owned), kind, message: message.into(), posted_at: now };
        self.live.push(notice.clone());
        Some(notice)
    }

    /// Drop and return notices older than the ttl.
    pub fn expire(&mut self, now: Instant) -> Vec<Notice> {
        let ttl = self.ttl;
        let (expired, live) = std::mem::take(&mut self.live)
            .into_iter()
            .partition(|n| now.saturating_duration_since(n.posted_at) >= ttl);
        self.live = live;
        expired
    }

    /// Notices currently shown.
    pub fn live(&self) -> &[Notice] {
        &self.live
    }
}
