//! Job workers.

mod notify_all_voters;

pub use notify_all_voters::{
    notify_all_voters_worker, process_notify_all_voters, NotifyVotersContext, QUEUE_NAME,
};
