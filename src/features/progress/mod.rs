//! Learner progress.
//!
//! [`ProgressTracker`] keeps per-course records up to date from lesson
//! completions and from watch time reported by the [`SessionTimer`].

mod achievements;
mod record;
mod report;
mod timer;
mod tracker;

pub use achievements::{
    achievement_details, award, earned_achievements, known_achievements, AchievementDetails,
    DEDICATED_LEARNER_SECS,
};
pub use record::{completion_percentage, CourseProgress, CourseStatus, LessonProgress};
pub use report::{format_time_spent, ProgressSummary};
pub use timer::{LessonKey, SessionTimer, WatchTimeSink, DEFAULT_INTERVAL_SECS};
pub use tracker::ProgressTracker;
