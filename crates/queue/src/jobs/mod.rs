//! Job definitions.

#![allow(missing_docs)]

mod notify_all_voters;

pub use notify_all_voters::NotifyAllVotersJob;
