//! Progress summaries.
//!
//! Aggregates a learner's course records into the figures shown on the
//! progress dashboard.

use serde::Serialize;

use super::record::{CourseProgress, CourseStatus};

/// Aggregate view over one learner's courses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    /// Number of enrolled courses
    pub courses: usize,
    /// Seconds spent across all courses
    pub total_time_spent: u64,
    /// Seconds of video watched across all courses
    pub total_video_time: u64,
    pub lessons_completed: usize,
    pub lessons_total: usize,
    /// Mean completion percentage, rounded
    pub average_completion: u8,
    pub not_started: usize,
    pub in_progress: usize,
    pub completed: usize,
    /// Longest current streak of any course
    pub current_streak: u32,
    /// Distinct achievements, in first-seen order
    pub achievements: Vec<String>,
}

impl ProgressSummary {
    /// Summarize `records`.
    #[must_use]
    pub fn from_records(records: &[CourseProgress]) -> Self {
        let mut summary = Self {
            courses: records.len(),
            total_time_spent: 0,
            total_video_time: 0,
            lessons_completed: 0,
            lessons_total: 0,
            average_completion: 0,
            not_started: 0,
            in_progress: 0,
            completed: 0,
            current_streak: 0,
            achievements: Vec::new(),
        };

        let mut completion_sum: usize = 0;
        for record in records {
            summary.total_time_spent = summary
                .total_time_spent
                .saturating_add(record.total_time_spent);
            summary.total_video_time = summary
                .total_video_time
                .saturating_add(record.video_watch_time());
            summary.lessons_completed += record.completed_lessons();
            summary.lessons_total += record.lessons.len();
            completion_sum += usize::from(record.completion_percentage);
            summary.current_streak = summary.current_streak.max(record.current_streak);

            match record.status() {
                CourseStatus::NotStarted => summary.not_started += 1,
                CourseStatus::InProgress => summary.in_progress += 1,
                CourseStatus::Completed => summary.completed += 1,
            }

            for id in &record.achievements {
                if !summary.achievements.contains(id) {
                    summary.achievements.push(id.clone());
                }
            }
        }

        if !records.is_empty() {
            let average = (2 * completion_sum + records.len()) / (2 * records.len());
            summary.average_completion = u8::try_from(average).unwrap_or(100);
        }

        summary
    }
}

/// Format seconds as `"45m"` or `"1h 30m"`.
#[must_use]
pub fn format_time_spent(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
