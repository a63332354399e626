//! Repositories wrapping sea-orm queries.

mod category;
mod comment;
mod idea;
mod notification;
mod status;
mod user;
mod vote;

pub use category::CategoryRepository;
pub use comment::CommentRepository;
pub use idea::{IdeaRepository, StatusUpdate};
pub use notification::NotificationRepository;
pub use status::StatusRepository;
pub use user::UserRepository;
pub use vote::VoteRepository;
