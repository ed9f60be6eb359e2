//! Live session timer command implementation.

use colored::Colorize;
use tracing::debug;

use super::Context;
use crate::cli::args::{OutputFormat, SessionArgs};
use crate::core::{format_duration_mmss, parse_duration, Clock};
use crate::error::StudySyncError;
use crate::features::progress::{format_time_spent, LessonKey, SessionTimer, WatchTimeSink};
use crate::output::to_json;

/// Run a lesson session for the requested duration.
///
/// Blocks the calling thread, crediting watch time on every interval and
/// once more when the session ends.
///
/// # Errors
///
/// Returns an error for an invalid duration or interval, or `NotFound` when
/// the user is not enrolled in the course or the lesson is unknown.
pub fn session(
    ctx: &Context,
    args: SessionArgs,
    format: OutputFormat,
) -> Result<String, StudySyncError> {
    let duration = parse_duration(&args.duration).ok_or_else(|| {
        StudySyncError::InvalidInput(format!(
            "Invalid duration '{}' (try 90s, 5m or 1h30m)",
            args.duration
        ))
    })?;
    let interval = args
        .interval
        .unwrap_or(ctx.config.progress.session_interval_secs);
    if interval == 0 {
        return Err(StudySyncError::InvalidInput(
            "Interval must be at least one second".to_string(),
        ));
    }

    let tracker = ctx.tracker();
    let record = tracker
        .get_course_progress(&args.user, &args.course)
        .ok_or_else(|| {
            StudySyncError::NotFound(format!("{} is not enrolled in {}", args.user, args.course))
        })?;
    if record.lesson(&args.lesson).is_none() {
        return Err(StudySyncError::NotFound(format!(
            "Lesson {} is not part of {}",
            args.lesson, args.course
        )));
    }

    if format == OutputFormat::Pretty {
        eprintln!(
            "{} Watching {} for {} (flushing every {interval}s)",
            "▶".green(),
            args.lesson.bold(),
            format_duration_mmss(duration)
        );
    }

    let clock = ctx.clock();
    let mut timer = SessionTimer::new(clock.clone(), interval);
    let lesson = LessonKey::new(&args.user, &args.course, &args.lesson);
    let credited = run_session(&mut timer, &tracker, lesson, duration, clock.as_ref(), |d| {
        std::thread::sleep(d);
    })?;

    let total = tracker
        .get_course_progress(&args.user, &args.course)
        .map_or(0, |r| r.total_time_spent);

    match format {
        OutputFormat::Json => to_json(&serde_json::json!({
            "user": args.user,
            "course": args.course,
            "lesson": args.lesson,
            "credited_seconds": credited,
            "total_time_spent": total,
        })),
        OutputFormat::Pretty => Ok(format!(
            "{} Credited {} to {} ({} total in {})",
            "✓".green(),
            format_duration_mmss(
                i64::try_from(credited)
                    .ok()
                    .and_then(chrono::Duration::try_seconds)
                    .unwrap_or(chrono::Duration::MAX)
            ),
            args.lesson.bold(),
            format_time_spent(total),
            args.course
        )),
    }
}

/// Drive `timer` on `lesson` until `duration` has passed on `clock`.
///
/// `sleep` blocks until the next tick is due. Returns the seconds credited,
/// or `InvalidInput` when the session would end past the representable range.
fn run_session(
    timer: &mut SessionTimer,
    sink: &dyn WatchTimeSink,
    lesson: LessonKey,
    duration: chrono::Duration,
    clock: &dyn Clock,
    mut sleep: impl FnMut(std::time::Duration),
) -> Result<u64, StudySyncError> {
    let end = clock.now().checked_add_signed(duration).ok_or_else(|| {
        StudySyncError::InvalidInput(format!(
            "Session of {}s is too long",
            duration.num_seconds()
        ))
    })?;
    timer.start(lesson, sink);

    let mut credited = 0;
    loop {
        let now = clock.now();
        if now >= end {
            break;
        }

        let wait = (end - now).min(timer.interval());
        sleep(wait.to_std().unwrap_or_default());

        let flushed = timer.tick(sink);
        if flushed > 0 {
            debug!(seconds = flushed, "Credited watch time");
            credited += flushed;
        }
    }

    Ok(credited + timer.stop(sink))
}
