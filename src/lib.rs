//! studysync - offline mutation queue and course progress tracking
//!
//! This crate provides the client-side core of a learning app that keeps
//! working offline: writes are queued locally and replayed in order when the
//! connection returns, and learner progress (lesson completion, watch time,
//! streaks and achievements) is kept per course.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod features;
pub mod notify;
pub mod output;
pub mod storage;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use error::StudySyncError;
pub use features::offline::{NewMutation, OfflineManager, QueuedMutation, SyncDelegate};
pub use features::progress::{CourseProgress, ProgressTracker, SessionTimer};
