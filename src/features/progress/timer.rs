//! Session timer.
//!
//! Measures how long a lesson stays on screen and hands the time to a
//! [`WatchTimeSink`] in chunks: on each interval tick once at least one
//! interval has passed, and for whatever is left when the learner moves to
//! another lesson or leaves.

use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::Clock;

/// Sampling interval used unless configured otherwise.
pub const DEFAULT_INTERVAL_SECS: u64 = 30;

/// Identifies the lesson a learner is viewing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LessonKey {
    pub user_id: String,
    pub course_id: String,
    pub lesson_id: String,
}

impl LessonKey {
    /// Build a key.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        course_id: impl Into<String>,
        lesson_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            course_id: course_id.into(),
            lesson_id: lesson_id.into(),
        }
    }
}

impl std::fmt::Display for LessonKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.user_id, self.course_id, self.lesson_id)
    }
}

/// Receives flushed watch time.
#[cfg_attr(test, mockall::automock)]
pub trait WatchTimeSink {
    /// Credit `seconds` (always positive) to `lesson`.
    fn add_watch_time(&self, lesson: &LessonKey, seconds: u64);
}

#[derive(Debug, Clone)]
struct ActiveLesson {
    key: LessonKey,
    mark: DateTime<Utc>,
}

/// Tracks time on the active lesson.
pub struct SessionTimer {
    clock: Rc<dyn Clock>,
    interval: Duration,
    active: Option<ActiveLesson>,
}

impl SessionTimer {
    /// Create an idle timer sampling every `interval_secs` seconds.
    #[must_use]
    pub fn new(clock: Rc<dyn Clock>, interval_secs: u64) -> Self {
        let secs = i64::try_from(interval_secs.max(1)).unwrap_or(i64::MAX);
        Self {
            clock,
            interval: Duration::try_seconds(secs).unwrap_or(Duration::MAX),
            active: None,
        }
    }

    /// Create an idle timer with the default 30 second interval.
    #[must_use]
    pub fn with_default_interval(clock: Rc<dyn Clock>) -> Self {
        Self::new(clock, DEFAULT_INTERVAL_SECS)
    }

    /// The sampling interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Lesson being timed, if any.
    #[must_use]
    pub fn active(&self) -> Option<&LessonKey> {
        self.active.as_ref().map(|a| &a.key)
    }

    /// Time since the last flush on the active lesson.
    #[must_use]
    pub fn unflushed(&self) -> Duration {
        self.active
            .as_ref()
            .map_or_else(Duration::zero, |a| self.clock.now() - a.mark)
    }

    /// Begin timing `lesson`.
    ///
    /// Restarting the lesson already being timed changes nothing. Switching
    /// from another lesson flushes its remaining time first.
    pub fn start(&mut self, lesson: LessonKey, sink: &dyn WatchTimeSink) {
        if self.active().is_some_and(|current| *current == lesson) {
            return;
        }

        self.stop(sink);
        debug!(lesson = %lesson, "Session started");
        self.active = Some(ActiveLesson {
            key: lesson,
            mark: self.clock.now(),
        });
    }

    /// Interval callback. Flushes once a full interval has elapsed.
    ///
    /// A clock that stepped back behind the mark moves the mark to now.
    /// Returns the seconds flushed.
    pub fn tick(&mut self, sink: &dyn WatchTimeSink) -> u64 {
        let unflushed = self.unflushed();
        if unflushed >= Duration::zero() && unflushed < self.interval {
            return 0;
        }
        self.flush(sink)
    }

    /// End the session, flushing any remaining time.
    ///
    /// Returns the seconds flushed.
    pub fn stop(&mut self, sink: &dyn WatchTimeSink) -> u64 {
        let flushed = self.flush(sink);
        if let Some(ended) = self.active.take() {
            debug!(lesson = %ended.key, "Session ended");
        }
        flushed
    }

    fn flush(&mut self, sink: &dyn WatchTimeSink) -> u64 {
        let now = self.clock.now();
        let Some(active) = self.active.as_mut() else {
            return 0;
        };

        if now < active.mark {
            debug!(lesson = %active.key, "Clock moved back, resetting mark");
            active.mark = now;
            return 0;
        }

        let elapsed = (now - active.mark).num_seconds();
        let Ok(seconds) = u64::try_from(elapsed) else {
            return 0;
        };
        if seconds == 0 {
            return 0;
        }

        // Carry the sub-second remainder into the next flush.
        active.mark += Duration::seconds(elapsed);
        debug!(lesson = %active.key, seconds, "Flushing watch time");
        sink.add_watch_time(&active.key, seconds);
        seconds
    }
}

impl std::fmt::Debug for SessionTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTimer")
            .field("interval", &self.interval)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}
