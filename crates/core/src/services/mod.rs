//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod dispatch;
pub mod idea;
pub mod notification;
pub mod policy;
pub mod status;
pub mod user;
pub mod vote;

pub use comment::{
    CommentCommand, CommentCommandOutcome, CommentEvent, CommentInput, CommentService, CommentView,
};
pub use dispatch::{
    DispatchService, NoOpDispatch, RecordingDispatch, VoterNotification, VoterNotificationDispatch,
};
pub use idea::{CreateIdeaInput, IdeaService};
pub use notification::{NotificationService, NotificationTarget};
pub use policy::CommentAbilities;
pub use status::{
    FormPhase, SetStatusForm, SetStatusRequest, StatusChangeOutcome, StatusService,
    StatusWasUpdated,
};
pub use user::{CreateUserInput, UserService};
pub use vote::VoteService;
