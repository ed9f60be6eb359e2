//! Progress tracker.
//!
//! Owns the persisted [`CourseProgress`] records. Every change rewrites the
//! whole record under `progress:{user}:{course}`; the ordered list of a
//! user's courses lives under `progress-index:{user}`.

use std::rc::Rc;

use tracing::{debug, error};

use super::achievements;
use super::record::CourseProgress;
use super::timer::{LessonKey, WatchTimeSink};
use crate::core::Clock;
use crate::error::StudySyncError;
use crate::storage::KeyValueStore;

fn record_key(user_id: &str, course_id: &str) -> String {
    format!("progress:{user_id}:{course_id}")
}

fn index_key(user_id: &str) -> String {
    format!("progress-index:{user_id}")
}

/// Reads and updates learners' course progress.
pub struct ProgressTracker {
    store: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
}

impl ProgressTracker {
    /// Create a tracker over `store`.
    #[must_use]
    pub fn new(store: Rc<dyn KeyValueStore>, clock: Rc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Enroll `user_id` in `course_id` with the given lessons.
    ///
    /// An existing record is returned untouched.
    pub fn initialize<S: AsRef<str>>(
        &self,
        user_id: &str,
        course_id: &str,
        lesson_ids: &[S],
    ) -> CourseProgress {
        if let Some(existing) = self.get_course_progress(user_id, course_id) {
            debug!(user_id, course_id, "Progress already initialized");
            self.add_to_index(user_id, course_id);
            return existing;
        }

        let record = CourseProgress::new(user_id, course_id, lesson_ids);
        debug!(user_id, course_id, lessons = record.lessons.len(), "Initialized progress");
        self.save(&record);
        self.add_to_index(user_id, course_id);
        record
    }

    /// Set a lesson's completion flag and add `extra_time` seconds to it.
    ///
    /// Returns the updated record, or `None` when there is no record for the
    /// pair or the lesson is not part of the course.
    pub fn update_lesson_progress(
        &self,
        user_id: &str,
        course_id: &str,
        lesson_id: &str,
        completed: bool,
        extra_time: u64,
    ) -> Option<CourseProgress> {
        let Some(mut record) = self.get_course_progress(user_id, course_id) else {
            debug!(user_id, course_id, "No progress record; ignoring lesson update");
            return None;
        };

        let Some(lesson) = record.lesson_mut(lesson_id) else {
            debug!(user_id, course_id, lesson_id, "Unknown lesson; ignoring lesson update");
            return None;
        };
        lesson.completed = completed;
        lesson.video_watch_time = lesson.video_watch_time.saturating_add(extra_time);
        record.total_time_spent = record.total_time_spent.saturating_add(extra_time);

        record.recompute_completion();
        record.record_activity(self.clock.today());

        let awarded = achievements::award(&mut record);
        if !awarded.is_empty() {
            debug!(user_id, course_id, ?awarded, "Achievements unlocked");
        }

        self.save(&record);
        Some(record)
    }

    /// Add `delta_seconds` of viewing to a lesson and remember the playback
    /// position. Completion flags are never changed.
    ///
    /// Returns the updated record, or `None` for a zero delta, a missing
    /// record or an unknown lesson.
    pub fn update_video_progress(
        &self,
        user_id: &str,
        course_id: &str,
        lesson_id: &str,
        delta_seconds: u64,
        position_seconds: u64,
    ) -> Option<CourseProgress> {
        if delta_seconds == 0 {
            return None;
        }

        let Some(mut record) = self.get_course_progress(user_id, course_id) else {
            debug!(user_id, course_id, "No progress record; ignoring watch time");
            return None;
        };

        let Some(lesson) = record.lesson_mut(lesson_id) else {
            debug!(user_id, course_id, lesson_id, "Unknown lesson; ignoring watch time");
            return None;
        };
        lesson.video_watch_time = lesson.video_watch_time.saturating_add(delta_seconds);
        if position_seconds > 0 {
            lesson.last_position = position_seconds;
        }
        record.total_time_spent = record.total_time_spent.saturating_add(delta_seconds);
        record.record_activity(self.clock.today());

        self.save(&record);
        Some(record)
    }

    /// The record for one course, if the user is enrolled.
    #[must_use]
    pub fn get_course_progress(&self, user_id: &str, course_id: &str) -> Option<CourseProgress> {
        let key = record_key(user_id, course_id);
        match read_json(self.store.as_ref(), &key) {
            Ok(record) => record,
            Err(e) => {
                error!(key = %key, error = %e, "Failed to load progress record");
                None
            },
        }
    }

    /// Every record for `user_id`, in enrollment order.
    #[must_use]
    pub fn get_user_progress(&self, user_id: &str) -> Vec<CourseProgress> {
        self.enrolled_courses(user_id)
            .iter()
            .filter_map(|course_id| self.get_course_progress(user_id, course_id))
            .collect()
    }

    /// Course ids `user_id` is enrolled in, in enrollment order.
    #[must_use]
    pub fn enrolled_courses(&self, user_id: &str) -> Vec<String> {
        let key = index_key(user_id);
        match read_json(self.store.as_ref(), &key) {
            Ok(index) => index.unwrap_or_default(),
            Err(e) => {
                error!(key = %key, error = %e, "Failed to load progress index");
                Vec::new()
            },
        }
    }

    fn add_to_index(&self, user_id: &str, course_id: &str) {
        let mut courses = self.enrolled_courses(user_id);
        if courses.iter().any(|c| c == course_id) {
            return;
        }
        courses.push(course_id.to_string());
        self.write(&index_key(user_id), &courses);
    }

    fn save(&self, record: &CourseProgress) {
        self.write(&record_key(&record.user_id, &record.course_id), record);
    }

    /// Write failures are logged and dropped.
    fn write<T: serde::Serialize>(&self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(StudySyncError::from)
            .and_then(|json| self.store.set(key, &json));

        if let Err(e) = result {
            error!(key = %key, error = %e, "Failed to save progress");
        }
    }
}

impl WatchTimeSink for ProgressTracker {
    fn add_watch_time(&self, lesson: &LessonKey, seconds: u64) {
        self.update_video_progress(
            &lesson.user_id,
            &lesson.course_id,
            &lesson.lesson_id,
            seconds,
            0,
        );
    }
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker").finish_non_exhaustive()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StudySyncError> {
    match store.get(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ManualClock;
    use crate::features::progress::timer::SessionTimer;
    use crate::storage::MemoryStore;
    use chrono::{TimeZone, Utc};

    struct Fixture {
        store: Rc<MemoryStore>,
        clock: Rc<ManualClock>,
        tracker: ProgressTracker,
    }

    fn fixture() -> Fixture {
        let store = Rc::new(MemoryStore::new());
        let clock = Rc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        ));
        let tracker = ProgressTracker::new(store.clone(), clock.clone());
        Fixture {
            store,
            clock,
            tracker,
        }
    }

    #[test]
    fn test_initialize_creates_zeroed_record() {
        let fx = fixture();

        let record = fx.tracker.initialize("u1", "c1", &["l1", "l2"]);

        assert_eq!(record.lessons.len(), 2);
        assert_eq!(record.completion_percentage, 0);
        assert_eq!(fx.tracker.get_course_progress("u1", "c1"), Some(record));
        assert!(fx.store.get("progress:u1:c1").unwrap().is_some());
    }

    #[test]
    fn test_initialize_twice_keeps_progress() {
        let fx = fixture();
        fx.tracker.initialize("u1", "c1", &["l1", "l2"]);
        fx.tracker.update_lesson_progress("u1", "c1", "l1", true, 0);

        let again = fx.tracker.initialize("u1", "c1", &["l1", "l2"]);

        assert_eq!(again.completion_percentage, 50);
        assert_eq!(fx.tracker.enrolled_courses("u1"), vec!["c1"]);
    }

    #[test]
    fn test_completion_fifty_then_hundred() {
        let fx = fixture();
        fx.tracker.initialize("u1", "c1", &["l1", "l2"]);

        let half = fx.tracker.update_lesson_progress("u1", "c1", "l1", true, 0).unwrap();
        assert_eq!(half.completion_percentage, 50);

        let full = fx.tracker.update_lesson_progress("u1", "c1", "l2", true, 0).unwrap();
        assert_eq!(full.completion_percentage, 100);
        assert!(full.achievements.contains("course-complete"));
    }

    #[test]
    fn test_uncompleting_lowers_percentage() {
        let fx = fixture();
        fx.tracker.initialize("u1", "c1", &["l1", "l2"]);
        fx.tracker.update_lesson_progress("u1", "c1", "l1", true, 0);

        let record = fx.tracker.update_lesson_progress("u1", "c1", "l1", false, 0).unwrap();

        assert_eq!(record.completion_percentage, 0);
        assert!(record.achievements.contains("first-lesson"));
    }

    #[test]
    fn test_missing_record_is_noop() {
        let fx = fixture();

        assert!(fx.tracker.update_lesson_progress("u1", "c1", "l1", true, 60).is_none());
        assert!(fx.tracker.update_video_progress("u1", "c1", "l1", 60, 10).is_none());
        assert!(fx.tracker.get_course_progress("u1", "c1").is_none());
        assert!(fx.store.is_empty());
    }

    #[test]
    fn test_unknown_lesson_is_noop() {
        let fx = fixture();
        fx.tracker.initialize("u1", "c1", &["l1"]);

        assert!(fx.tracker.update_lesson_progress("u1", "c1", "l9", true, 60).is_none());
        assert_eq!(
            fx.tracker.get_course_progress("u1", "c1").unwrap().total_time_spent,
            0
        );
    }

    #[test]
    fn test_video_progress_adds_time_only() {
        let fx = fixture();
        fx.tracker.initialize("u1", "c1", &["l1", "l2"]);

        fx.tracker.update_video_progress("u1", "c1", "l1", 30, 95);
        let record = fx.tracker.update_video_progress("u1", "c1", "l1", 15, 0).unwrap();

        let lesson = record.lesson("l1").unwrap();
        assert_eq!(lesson.video_watch_time, 45);
        assert_eq!(lesson.last_position, 95);
        assert!(!lesson.completed);
        assert_eq!(record.total_time_spent, 45);
        assert_eq!(record.completion_percentage, 0);
    }

    #[test]
    fn test_zero_delta_is_noop() {
        let fx = fixture();
        fx.tracker.initialize("u1", "c1", &["l1"]);

        assert!(fx.tracker.update_video_progress("u1", "c1", "l1", 0, 40).is_none());
        assert_eq!(fx.tracker.get_course_progress("u1", "c1").unwrap().current_streak, 0);
    }

    #[test]
    fn test_streak_across_days() {
        let fx = fixture();
        fx.tracker.initialize("u1", "c1", &["l1", "l2", "l3"]);

        fx.tracker.update_video_progress("u1", "c1", "l1", 10, 0);
        fx.clock.advance(chrono::Duration::days(1));
        fx.tracker.update_video_progress("u1", "c1", "l1", 10, 0);
        fx.clock.advance(chrono::Duration::days(1));
        let record = fx.tracker.update_lesson_progress("u1", "c1", "l1", true, 0).unwrap();

        assert_eq!(record.current_streak, 3);
        assert!(record.achievements.contains("streak-3"));

        fx.clock.advance(chrono::Duration::days(3));
        let record = fx.tracker.update_lesson_progress("u1", "c1", "l2", true, 0).unwrap();
        assert_eq!(record.current_streak, 1);
        assert!(record.achievements.contains("streak-3"));
    }

    #[test]
    fn test_user_progress_in_enrollment_order() {
        let fx = fixture();
        fx.tracker.initialize("u1", "rust-201", &["a"]);
        fx.tracker.initialize("u1", "rust-101", &["b"]);
        fx.tracker.initialize("u2", "go-101", &["c"]);

        let courses: Vec<_> = fx
            .tracker
            .get_user_progress("u1")
            .into_iter()
            .map(|p| p.course_id)
            .collect();

        assert_eq!(courses, vec!["rust-201", "rust-101"]);
        assert_eq!(fx.tracker.get_user_progress("u3"), Vec::new());
    }

    #[test]
    fn test_corrupt_record_reads_as_missing() {
        let fx = fixture();
        fx.store.set("progress:u1:c1", "not json").unwrap();

        assert!(fx.tracker.get_course_progress("u1", "c1").is_none());
    }

    #[test]
    fn test_write_failure_is_absorbed() {
        let fx = fixture();
        fx.tracker.initialize("u1", "c1", &["l1"]);
        fx.store.set_read_only(true);

        let record = fx.tracker.update_lesson_progress("u1", "c1", "l1", true, 0).unwrap();

        assert_eq!(record.completion_percentage, 100);
        assert_eq!(
            fx.tracker.get_course_progress("u1", "c1").unwrap().completion_percentage,
            0
        );
    }

    #[test]
    fn test_session_timer_feeds_tracker() {
        let fx = fixture();
        fx.tracker.initialize("u1", "c1", &["l1", "l2"]);
        let mut timer = SessionTimer::with_default_interval(fx.clock.clone());

        timer.start(LessonKey::new("u1", "c1", "l1"), &fx.tracker);
        fx.clock.advance_secs(45);
        timer.start(LessonKey::new("u1", "c1", "l2"), &fx.tracker);
        fx.clock.advance_secs(30);
        timer.tick(&fx.tracker);
        timer.stop(&fx.tracker);

        let record = fx.tracker.get_course_progress("u1", "c1").unwrap();
        assert_eq!(record.lesson("l1").unwrap().video_watch_time, 45);
        assert_eq!(record.lesson("l2").unwrap().video_watch_time, 30);
        assert_eq!(record.total_time_spent, 75);
    }
}
