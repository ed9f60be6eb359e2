//! Output formatting for studysync.
//!
//! This module provides formatters for displaying queue and progress data
//! in various formats.

mod json;
mod pretty;

use crate::cli::args::OutputFormat;
use crate::error::StudySyncError;
use crate::features::offline::{QueueStatus, QueuedMutation};
use crate::features::progress::{CourseProgress, ProgressSummary};

pub use json::*;
pub use pretty::*;

/// Format pending mutations based on output format
///
/// # Errors
///
/// Returns `StudySyncError::Parse` if JSON serialization fails.
pub fn format_queue(
    mutations: &[QueuedMutation],
    format: OutputFormat,
) -> Result<String, StudySyncError> {
    match format {
        OutputFormat::Pretty => Ok(format_queue_pretty(mutations)),
        OutputFormat::Json => format_queue_json(mutations),
    }
}

/// Format a queue status snapshot based on output format
///
/// # Errors
///
/// Returns `StudySyncError::Parse` if JSON serialization fails.
pub fn format_status(status: &QueueStatus, format: OutputFormat) -> Result<String, StudySyncError> {
    match format {
        OutputFormat::Pretty => Ok(format_status_pretty(status)),
        OutputFormat::Json => to_json(status),
    }
}

/// Format course records based on output format
///
/// # Errors
///
/// Returns `StudySyncError::Parse` if JSON serialization fails.
pub fn format_courses(
    records: &[CourseProgress],
    user: &str,
    format: OutputFormat,
) -> Result<String, StudySyncError> {
    match format {
        OutputFormat::Pretty => Ok(format_courses_pretty(records, user)),
        OutputFormat::Json => format_courses_json(records),
    }
}

/// Format a single course record based on output format
///
/// # Errors
///
/// Returns `StudySyncError::Parse` if JSON serialization fails.
pub fn format_course(record: &CourseProgress, format: OutputFormat) -> Result<String, StudySyncError> {
    match format {
        OutputFormat::Pretty => Ok(format_course_pretty(record)),
        OutputFormat::Json => to_json(record),
    }
}

/// Format a progress summary based on output format
///
/// # Errors
///
/// Returns `StudySyncError::Parse` if JSON serialization fails.
pub fn format_summary(
    summary: &ProgressSummary,
    user: &str,
    format: OutputFormat,
) -> Result<String, StudySyncError> {
    match format {
        OutputFormat::Pretty => Ok(format_summary_pretty(summary, user)),
        OutputFormat::Json => to_json(summary),
    }
}

/// Format achievements based on output format
///
/// # Errors
///
/// Returns `StudySyncError::Parse` if JSON serialization fails.
pub fn format_achievements(ids: &[String], format: OutputFormat) -> Result<String, StudySyncError> {
    match format {
        OutputFormat::Pretty => Ok(format_achievements_pretty(ids)),
        OutputFormat::Json => format_achievements_json(ids),
    }
}
