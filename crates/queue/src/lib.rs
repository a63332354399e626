//! Background job queue for ideaboard.
//!
//! - **Jobs**: voter notification after an idea's status changes
//! - **Workers**: job execution with Apalis
//! - **Retry**: exponential backoff with a dead letter log
//! - **Dispatch**: Redis-backed implementation of the core dispatch trait

pub mod dispatch_impl;
pub mod jobs;
pub mod retry;
pub mod workers;

pub use dispatch_impl::RedisVoterNotificationDispatch;
pub use jobs::*;
pub use retry::{DeadLetterEntry, RetryConfig};
pub use workers::*;
