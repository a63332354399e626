//! Redis-backed voter notification dispatch.
//!
//! Queues jobs in apalis Redis storage for the voter notification worker.

use apalis::prelude::*;
use async_trait::async_trait;
use ideaboard_common::{AppError, AppResult};
use ideaboard_core::{VoterNotification, VoterNotificationDispatch};

use crate::jobs::NotifyAllVotersJob;

/// Redis-backed voter notification dispatcher.
#[derive(Clone)]
pub struct RedisVoterNotificationDispatch {
    storage: apalis_redis::RedisStorage<NotifyAllVotersJob>,
}

impl RedisVoterNotificationDispatch {
    /// Create a new dispatcher over the given storage.
    #[must_use]
    pub const fn new(storage: apalis_redis::RedisStorage<NotifyAllVotersJob>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl VoterNotificationDispatch for RedisVoterNotificationDispatch {
    async fn notify_all_voters(&self, notification: VoterNotification) -> AppResult<()> {
        let job = NotifyAllVotersJob::from(notification);
        let idea_id = job.idea_id.clone();

        self.storage
            .clone()
            .push(job)
            .await
            .map_err(|e| AppError::Queue(format!("Failed to queue job: {e}")))?;

        tracing::debug!(idea_id = %idea_id, "Queued voter notification job");
        Ok(())
    }
}
