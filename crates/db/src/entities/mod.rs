//! sea-orm entities.

pub mod category;
pub mod comment;
pub mod idea;
pub mod notification;
pub mod status;
pub mod user;
pub mod vote;

pub use category::Entity as Category;
pub use comment::Entity as Comment;
pub use idea::Entity as Idea;
pub use notification::Entity as Notification;
pub use status::Entity as Status;
pub use user::Entity as User;
pub use vote::Entity as Vote;
