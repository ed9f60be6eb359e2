//! Progress command implementation.

use colored::Colorize;

use super::Context;
use crate::cli::args::{OutputFormat, ProgressCommands};
use crate::error::StudySyncError;
use crate::features::progress::{CourseProgress, ProgressSummary, ProgressTracker};
use crate::output::{format_achievements, format_course, format_courses, format_summary};

/// Execute progress subcommands.
///
/// # Errors
///
/// Returns `NotFound` when the user is not enrolled in the course or the
/// lesson is not part of it, or an error if output formatting fails.
pub fn progress(
    ctx: &Context,
    cmd: ProgressCommands,
    format: OutputFormat,
) -> Result<String, StudySyncError> {
    let tracker = ctx.tracker();

    match cmd {
        ProgressCommands::Init {
            user,
            course,
            lessons,
        } => {
            let record = tracker.initialize(&user, &course, lessons.as_slice());
            format_course(&record, format)
        },

        ProgressCommands::Complete {
            user,
            course,
            lesson,
            undo,
            time,
        } => {
            let before = require_lesson(&tracker, &user, &course, &lesson)?;
            let record = tracker
                .update_lesson_progress(&user, &course, &lesson, !undo, time)
                .ok_or_else(|| not_enrolled(&user, &course))?;
            with_unlocked(&before, &record, format)
        },

        ProgressCommands::Watch {
            user,
            course,
            lesson,
            seconds,
            position,
        } => {
            require_lesson(&tracker, &user, &course, &lesson)?;
            let record = tracker
                .update_video_progress(&user, &course, &lesson, seconds, position)
                .or_else(|| tracker.get_course_progress(&user, &course))
                .ok_or_else(|| not_enrolled(&user, &course))?;
            format_course(&record, format)
        },

        ProgressCommands::Show {
            user,
            course: Some(course),
        } => {
            let record = tracker
                .get_course_progress(&user, &course)
                .ok_or_else(|| not_enrolled(&user, &course))?;
            format_course(&record, format)
        },

        ProgressCommands::Show { user, course: None } => {
            format_courses(&tracker.get_user_progress(&user), &user, format)
        },

        ProgressCommands::Summary { user } => {
            let summary = ProgressSummary::from_records(&tracker.get_user_progress(&user));
            format_summary(&summary, &user, format)
        },

        ProgressCommands::Achievements { user } => {
            let summary = ProgressSummary::from_records(&tracker.get_user_progress(&user));
            format_achievements(&summary.achievements, format)
        },
    }
}

fn not_enrolled(user: &str, course: &str) -> StudySyncError {
    StudySyncError::NotFound(format!("{user} is not enrolled in {course}"))
}

fn require_lesson(
    tracker: &ProgressTracker,
    user: &str,
    course: &str,
    lesson: &str,
) -> Result<CourseProgress, StudySyncError> {
    let record = tracker
        .get_course_progress(user, course)
        .ok_or_else(|| not_enrolled(user, course))?;

    if record.lesson(lesson).is_none() {
        return Err(StudySyncError::NotFound(format!(
            "Lesson {lesson} is not part of {course}"
        )));
    }
    Ok(record)
}

fn with_unlocked(
    before: &CourseProgress,
    after: &CourseProgress,
    format: OutputFormat,
) -> Result<String, StudySyncError> {
    let mut output = format_course(after, format)?;

    if format == OutputFormat::Pretty {
        for id in after.achievements.difference(&before.achievements) {
            let details = crate::features::progress::achievement_details(id);
            output.push_str(&format!(
                "{} Achievement unlocked: {} {}\n",
                "★".yellow(),
                details.icon,
                details.title.bold()
            ));
        }
    }

    Ok(output)
}
