//! Voter notification job.

use ideaboard_core::VoterNotification;
use serde::{Deserialize, Serialize};

/// Job to notify every voter of an idea that its status changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyAllVotersJob {
    /// The idea whose status changed.
    pub idea_id: String,

    /// The status announced.
    pub status_id: i32,

    /// The admin who made the change; excluded from the recipients.
    pub actor_id: String,
}

impl NotifyAllVotersJob {
    /// Create a new voter notification job.
    #[must_use]
    pub const fn new(idea_id: String, status_id: i32, actor_id: String) -> Self {
        Self {
            idea_id,
            status_id,
            actor_id,
        }
    }
}

impl From<VoterNotification> for NotifyAllVotersJob {
    fn from(n: VoterNotification) -> Self {
        Self::new(n.idea_id, n.status_id, n.actor_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_job_wire_format() {
        let job = NotifyAllVotersJob::new("idea1".to_string(), 3, "admin".to_string());
        let json = serde_json::to_value(&job).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "idea_id": "idea1", "status_id": 3, "actor_id": "admin" })
        );
    }

    #[test]
    fn test_from_voter_notification() {
        let job = NotifyAllVotersJob::from(VoterNotification {
            idea_id: "idea1".to_string(),
            status_id: 4,
            actor_id: "admin".to_string(),
        });

        assert_eq!(job.status_id, 4);
        assert_eq!(job.actor_id, "admin");
    }
}
