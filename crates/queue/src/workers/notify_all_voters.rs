//! Voter notification worker.

use apalis::prelude::*;
use ideaboard_common::AppResult;
use ideaboard_core::NotificationService;
use tracing::{info, warn};

use crate::jobs::NotifyAllVotersJob;
use crate::retry::{DeadLetterEntry, RetryConfig};

/// Queue name the worker is registered under.
pub const QUEUE_NAME: &str = "notify-all-voters";

/// Context for the voter notification worker.
#[derive(Clone)]
pub struct NotifyVotersContext {
    pub notification_service: NotificationService,
    pub retry: RetryConfig,
}

impl NotifyVotersContext {
    /// Create a new worker context.
    #[must_use]
    pub const fn new(notification_service: NotificationService, retry: RetryConfig) -> Self {
        Self {
            notification_service,
            retry,
        }
    }
}

/// Worker function for voter notifications.
///
/// # Errors
/// Returns an error when notifications could not be written, so that the
/// queue retries the job.
pub async fn notify_all_voters_worker(
    job: NotifyAllVotersJob,
    ctx: Data<NotifyVotersContext>,
    attempt: Attempt,
) -> Result<(), Error> {
    let attempt = attempt.current().max(1);
    info!(
        idea_id = %job.idea_id,
        status_id = job.status_id,
        attempt,
        "Notifying voters"
    );

    match process_notify_all_voters(&job, &ctx).await {
        Ok(created) => {
            info!(idea_id = %job.idea_id, created, "Voters notified");
            Ok(())
        }
        Err(e) => {
            if ctx.retry.is_final_attempt(attempt) {
                DeadLetterEntry::new(job, attempt, e.to_string()).record(QUEUE_NAME);
            } else {
                let delay = ctx.retry.delay_after_attempt(attempt);
                warn!(
                    idea_id = %job.idea_id,
                    error = %e,
                    attempt,
                    retry_in = ?delay,
                    "Voter notification failed, will retry"
                );
                tokio::time::sleep(delay).await;
            }
            let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(e);
            Err(Error::Failed(boxed.into()))
        }
    }
}

/// Create the notifications for one job. Never touches the idea itself.
pub async fn process_notify_all_voters(
    job: &NotifyAllVotersJob,
    ctx: &NotifyVotersContext,
) -> AppResult<u64> {
    ctx.notification_service
        .notify_voters_of_status_change(&job.idea_id, job.status_id, &job.actor_id)
        .await
}
