//! Feature implementations for studysync.
//!
//! - Offline mutation queue
//! - Learner progress and session timing

pub mod offline;
pub mod progress;
