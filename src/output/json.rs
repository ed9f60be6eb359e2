//! JSON output formatting for studysync.

use serde::Serialize;
use serde_json::json;

use crate::error::StudySyncError;
use crate::features::offline::QueuedMutation;
use crate::features::progress::{achievement_details, CourseProgress};

/// Format pending mutations as JSON
///
/// # Errors
///
/// Returns `StudySyncError::Parse` if JSON serialization fails.
pub fn format_queue_json(mutations: &[QueuedMutation]) -> Result<String, StudySyncError> {
    let output = json!({
        "count": mutations.len(),
        "items": mutations
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format course records as JSON
///
/// # Errors
///
/// Returns `StudySyncError::Parse` if JSON serialization fails.
pub fn format_courses_json(records: &[CourseProgress]) -> Result<String, StudySyncError> {
    let output = json!({
        "count": records.len(),
        "items": records
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format achievement ids with their details as JSON
///
/// # Errors
///
/// Returns `StudySyncError::Parse` if JSON serialization fails.
pub fn format_achievements_json(ids: &[String]) -> Result<String, StudySyncError> {
    let items: Vec<_> = ids
        .iter()
        .map(|id| {
            let details = achievement_details(id);
            json!({
                "id": id,
                "icon": details.icon,
                "title": details.title,
                "description": details.description,
            })
        })
        .collect();

    let output = json!({
        "count": items.len(),
        "items": items
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Generic JSON formatter for any serializable type
///
/// # Errors
///
/// Returns `StudySyncError::Parse` if JSON serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, StudySyncError> {
    Ok(serde_json::to_string_pretty(value)?)
}
