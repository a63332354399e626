//! Voter notification dispatch.
//!
//! Core services hand the "notify every voter" work to a dispatcher so they
//! never depend on the queue implementation. The Redis-backed dispatcher
//! lives in the queue crate.

use async_trait::async_trait;
use ideaboard_common::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// A request to notify every voter of an idea about a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterNotification {
    pub idea_id: String,
    pub status_id: i32,
    /// The admin who changed the status; never notified.
    pub actor_id: String,
}

/// Trait for queueing voter notifications.
#[async_trait]
pub trait VoterNotificationDispatch: Send + Sync {
    /// Enqueue the job. Returns once the job is stored, not when it has run.
    async fn notify_all_voters(&self, notification: VoterNotification) -> AppResult<()>;
}

/// Shared handle to a dispatcher.
pub type DispatchService = Arc<dyn VoterNotificationDispatch>;

/// A dispatcher that drops every request (used when no queue is configured).
#[derive(Debug, Clone, Default)]
pub struct NoOpDispatch;

#[async_trait]
impl VoterNotificationDispatch for NoOpDispatch {
    async fn notify_all_voters(&self, notification: VoterNotification) -> AppResult<()> {
        tracing::debug!(
            idea_id = %notification.idea_id,
            status_id = notification.status_id,
            "Voter notification dropped (no queue configured)"
        );
        Ok(())
    }
}

/// An in-memory dispatcher that records every request.
#[derive(Debug, Clone, Default)]
pub struct RecordingDispatch {
    sent: Arc<Mutex<Vec<VoterNotification>>>,
    fail: bool,
}

impl RecordingDispatch {
    /// Create a dispatcher that accepts every request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dispatcher whose every enqueue fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            fail: true,
        }
    }

    /// Requests accepted so far.
    #[must_use]
    pub fn sent(&self) -> Vec<VoterNotification> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl VoterNotificationDispatch for RecordingDispatch {
    async fn notify_all_voters(&self, notification: VoterNotification) -> AppResult<()> {
        if self.fail {
            return Err(AppError::Queue("queue unavailable".to_string()));
        }

        self.sent
            .lock()
            .map_err(|e| AppError::Internal(e.to_string()))?
            .push(notification);
        Ok(())
    }
}
