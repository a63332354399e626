//! Core business logic for ideaboard.

pub mod services;

pub use services::*;
