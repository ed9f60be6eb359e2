//! Per-course progress records.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Progress on a single lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgress {
    pub lesson_id: String,
    pub completed: bool,
    /// Seconds of video watched
    pub video_watch_time: u64,
    /// Last reported playback position in seconds
    #[serde(default)]
    pub last_position: u64,
}

impl LessonProgress {
    /// A lesson with nothing done yet.
    #[must_use]
    pub fn new(lesson_id: impl Into<String>) -> Self {
        Self {
            lesson_id: lesson_id.into(),
            completed: false,
            video_watch_time: 0,
            last_position: 0,
        }
    }
}

/// Coarse state of a course for dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl CourseStatus {
    /// Get display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::NotStarted => "Not started",
            Self::InProgress => "In progress",
            Self::Completed => "Completed",
        }
    }
}

/// A learner's progress through one course.
///
/// `completion_percentage` is always `round(100 * completed / total)` over
/// `lessons`, and 0 for a course without lessons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    pub user_id: String,
    pub course_id: String,
    pub lessons: Vec<LessonProgress>,
    /// Seconds spent in the course
    pub total_time_spent: u64,
    pub completion_percentage: u8,
    /// Consecutive days with recorded activity
    pub current_streak: u32,
    pub achievements: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<NaiveDate>,
}

impl CourseProgress {
    /// A zeroed record with one entry per distinct lesson id, in order.
    #[must_use]
    pub fn new<S: AsRef<str>>(
        user_id: impl Into<String>,
        course_id: impl Into<String>,
        lesson_ids: &[S],
    ) -> Self {
        let mut lessons: Vec<LessonProgress> = Vec::with_capacity(lesson_ids.len());
        for id in lesson_ids {
            let id = id.as_ref();
            if !lessons.iter().any(|l| l.lesson_id == id) {
                lessons.push(LessonProgress::new(id));
            }
        }

        Self {
            user_id: user_id.into(),
            course_id: course_id.into(),
            lessons,
            total_time_spent: 0,
            completion_percentage: 0,
            current_streak: 0,
            achievements: BTreeSet::new(),
            last_activity: None,
        }
    }

    /// Find a lesson by id.
    #[must_use]
    pub fn lesson(&self, lesson_id: &str) -> Option<&LessonProgress> {
        self.lessons.iter().find(|l| l.lesson_id == lesson_id)
    }

    pub(crate) fn lesson_mut(&mut self, lesson_id: &str) -> Option<&mut LessonProgress> {
        self.lessons.iter_mut().find(|l| l.lesson_id == lesson_id)
    }

    /// Number of completed lessons.
    #[must_use]
    pub fn completed_lessons(&self) -> usize {
        self.lessons.iter().filter(|l| l.completed).count()
    }

    /// Seconds of video watched across all lessons.
    #[must_use]
    pub fn video_watch_time(&self) -> u64 {
        self.lessons.iter().map(|l| l.video_watch_time).sum()
    }

    /// Recompute `completion_percentage` from the lesson flags.
    pub fn recompute_completion(&mut self) {
        self.completion_percentage =
            completion_percentage(self.completed_lessons(), self.lessons.len());
    }

    /// Update the streak for activity on `today`.
    ///
    /// Same day (or earlier) leaves it alone, the following day extends it,
    /// anything else starts a new streak of one.
    pub fn record_activity(&mut self, today: NaiveDate) {
        match self.last_activity {
            Some(last) if today <= last => return,
            Some(last) if last.succ_opt() == Some(today) => {
                self.current_streak = self.current_streak.saturating_add(1);
            },
            _ => self.current_streak = 1,
        }
        self.last_activity = Some(today);
    }

    /// Dashboard bucket for this course.
    #[must_use]
    pub fn status(&self) -> CourseStatus {
        if self.completion_percentage >= 100 {
            CourseStatus::Completed
        } else if self.completion_percentage == 0 && self.total_time_spent == 0 {
            CourseStatus::NotStarted
        } else {
            CourseStatus::InProgress
        }
    }
}

/// `round(100 * completed / total)`, rounding halves up; 0 when `total` is 0.
#[must_use]
pub fn completion_percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total);
    let pct = (200 * completed + total) / (2 * total);
    u8::try_from(pct).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_completion_rounding() {
        assert_eq!(completion_percentage(0, 0), 0);
        assert_eq!(completion_percentage(1, 2), 50);
        assert_eq!(completion_percentage(1, 3), 33);
        assert_eq!(completion_percentage(2, 3), 67);
        assert_eq!(completion_percentage(1, 8), 13);
        assert_eq!(completion_percentage(3, 3), 100);
    }

    #[test]
    fn test_new_skips_duplicate_lessons() {
        let record = CourseProgress::new("u1", "c1", &["l1", "l2", "l1"]);
        let ids: Vec<_> = record.lessons.iter().map(|l| l.lesson_id.as_str()).collect();
        assert_eq!(ids, vec!["l1", "l2"]);
        assert_eq!(record.status(), CourseStatus::NotStarted);
    }

    #[test]
    fn test_streak_progression() {
        let mut record = CourseProgress::new("u1", "c1", &["l1"]);

        record.record_activity(day(1));
        assert_eq!(record.current_streak, 1);

        record.record_activity(day(1));
        assert_eq!(record.current_streak, 1);

        record.record_activity(day(2));
        record.record_activity(day(3));
        assert_eq!(record.current_streak, 3);

        record.record_activity(day(6));
        assert_eq!(record.current_streak, 1);
        assert_eq!(record.last_activity, Some(day(6)));
    }

    #[test]
    fn test_streak_ignores_earlier_dates() {
        let mut record = CourseProgress::new("u1", "c1", &["l1"]);
        record.record_activity(day(5));
        record.record_activity(day(6));

        record.record_activity(day(2));

        assert_eq!(record.current_streak, 2);
        assert_eq!(record.last_activity, Some(day(6)));
    }

    #[test]
    fn test_serializes_camel_case() {
        let record = CourseProgress::new("u1", "c1", &["l1"]);
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(
            value,
            json!({
                "userId": "u1",
                "courseId": "c1",
                "lessons": [
                    {"lessonId": "l1", "completed": false, "videoWatchTime": 0, "lastPosition": 0}
                ],
                "totalTimeSpent": 0,
                "completionPercentage": 0,
                "currentStreak": 0,
                "achievements": []
            })
        );
    }

    #[test]
    fn test_reads_records_without_newer_fields() {
        let value = json!({
            "userId": "u1",
            "courseId": "c1",
            "lessons": [{"lessonId": "l1", "completed": true, "videoWatchTime": 120}],
            "totalTimeSpent": 120,
            "completionPercentage": 100,
            "currentStreak": 2,
            "achievements": ["first-lesson"]
        });

        let record: CourseProgress = serde_json::from_value(value).unwrap();

        assert_eq!(record.last_activity, None);
        assert_eq!(record.lessons[0].last_position, 0);
        assert_eq!(record.status(), CourseStatus::Completed);
    }
}
