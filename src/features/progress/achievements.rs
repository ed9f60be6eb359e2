//! Achievement table and award rules.

use serde::Serialize;

use super::record::CourseProgress;

/// How an achievement is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AchievementDetails {
    pub icon: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

struct Rule {
    id: &'static str,
    details: AchievementDetails,
    earned: fn(&CourseProgress) -> bool,
}

/// Seconds of study that earn `dedicated-learner`.
pub const DEDICATED_LEARNER_SECS: u64 = 60 * 60;

const RULES: &[Rule] = &[
    Rule {
        id: "first-lesson",
        details: AchievementDetails {
            icon: "🎯",
            title: "First Steps",
            description: "Completed your first lesson",
        },
        earned: |p| p.completed_lessons() > 0,
    },
    Rule {
        id: "halfway",
        details: AchievementDetails {
            icon: "⭐",
            title: "Halfway There",
            description: "Reached 50% of a course",
        },
        earned: |p| p.completion_percentage >= 50,
    },
    Rule {
        id: "course-complete",
        details: AchievementDetails {
            icon: "🏆",
            title: "Course Complete",
            description: "Finished every lesson in a course",
        },
        earned: |p| !p.lessons.is_empty() && p.completion_percentage >= 100,
    },
    Rule {
        id: "streak-3",
        details: AchievementDetails {
            icon: "🔥",
            title: "On Fire",
            description: "Learned 3 days in a row",
        },
        earned: |p| p.current_streak >= 3,
    },
    Rule {
        id: "streak-7",
        details: AchievementDetails {
            icon: "⚡",
            title: "Week Warrior",
            description: "Learned 7 days in a row",
        },
        earned: |p| p.current_streak >= 7,
    },
    Rule {
        id: "dedicated-learner",
        details: AchievementDetails {
            icon: "📚",
            title: "Dedicated Learner",
            description: "Spent over an hour learning",
        },
        earned: |p| p.total_time_spent >= DEDICATED_LEARNER_SECS,
    },
];

const FALLBACK: AchievementDetails = AchievementDetails {
    icon: "🏅",
    title: "Achievement",
    description: "Keep up the great work!",
};

/// Presentation for `id`, or a generic entry for unknown ids.
#[must_use]
pub fn achievement_details(id: &str) -> AchievementDetails {
    RULES
        .iter()
        .find(|rule| rule.id == id)
        .map_or(FALLBACK, |rule| rule.details)
}

/// Every known achievement id, in table order.
#[must_use]
pub fn known_achievements() -> Vec<&'static str> {
    RULES.iter().map(|rule| rule.id).collect()
}

/// Ids of every achievement `progress` currently qualifies for.
#[must_use]
pub fn earned_achievements(progress: &CourseProgress) -> Vec<&'static str> {
    RULES
        .iter()
        .filter(|rule| (rule.earned)(progress))
        .map(|rule| rule.id)
        .collect()
}

/// Add newly earned achievements to `progress`. Returns the ids just added.
pub fn award(progress: &mut CourseProgress) -> Vec<&'static str> {
    earned_achievements(progress)
        .into_iter()
        .filter(|id| progress.achievements.insert((*id).to_string()))
        .collect()
}
