use colored::Colorize;

use crate::features::offline::{DrainOutcome, MutationType, QueueStatus, QueuedMutation};
use crate::features::progress::{
    achievement_details, format_time_spent, CourseProgress, CourseStatus, ProgressSummary,
};

/// Format pending mutations as a pretty list
pub fn format_queue_pretty(mutations: &[QueuedMutation]) -> String {
    if mutations.is_empty() {
        return "Offline queue (0 pending)\n  No pending changes".to_string();
    }

    let mut output = format!("Offline queue ({} pending)\n", mutations.len());
    output.push_str(&"─".repeat(60));
    output.push('\n');

    for mutation in mutations {
        let name = mutation.mutation_type.display_name();
        let kind = match mutation.mutation_type {
            MutationType::Create => name.green(),
            MutationType::Update => name.yellow(),
            MutationType::Delete => name.red(),
        };

        output.push_str(&format!(
            "{:<6} {}  {}  {}\n",
            kind,
            mutation.entity.bold(),
            mutation.timestamp.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
            short_id(&mutation.id).dimmed()
        ));
    }

    output
}

/// Format the queue status snapshot
pub fn format_status_pretty(status: &QueueStatus) -> String {
    let mut lines = Vec::new();

    lines.push("Sync Status".bold().to_string());
    lines.push("─".repeat(40));

    let network = if status.online {
        "online".green()
    } else {
        "offline".red()
    };
    lines.push(format!(
        "  Network:  {} {}",
        network,
        format!("({})", status.connection).dimmed()
    ));
    lines.push(format!(
        "  Pending:  {} {}",
        status.pending,
        if status.pending > 0 {
            "changes waiting".dimmed()
        } else {
            "".dimmed()
        }
    ));

    if let Some(badge) = status.badge {
        lines.push(format!("  Badge:    {}", badge.to_string().yellow()));
    }

    if let Some(oldest) = status.oldest {
        lines.push(format!(
            "  Oldest:   {}",
            oldest.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
        ));
    }

    lines.join("\n")
}

/// Format the result of a drain pass
pub fn format_drain_pretty(outcome: &DrainOutcome) -> String {
    match outcome {
        DrainOutcome::Skipped { reason } => format!("{} Nothing synced: {}", "ℹ".blue(), reason),
        DrainOutcome::Completed(report) => {
            let mut output = format!(
                "{} Synced {} change(s), {} remaining",
                "✓".green(),
                report.synced,
                report.remaining
            );
            if let Some(failure) = &report.failure {
                output.push_str(&format!(
                    "\n{} Stopped at {} {}: {}",
                    "✗".red(),
                    failure.entity.bold(),
                    short_id(&failure.mutation_id).dimmed(),
                    failure.error
                ));
            }
            output
        },
    }
}

/// Format one course record
pub fn format_course_pretty(record: &CourseProgress) -> String {
    let status = match record.status() {
        CourseStatus::Completed => record.status().display_name().green(),
        CourseStatus::InProgress => record.status().display_name().yellow(),
        CourseStatus::NotStarted => record.status().display_name().dimmed(),
    };

    let mut output = format!(
        "{} {}  {}\n",
        record.course_id.bold(),
        progress_bar(record.completion_percentage),
        status
    );
    output.push_str(&format!(
        "  {}: {}/{} lessons\n",
        "Completed".dimmed(),
        record.completed_lessons(),
        record.lessons.len()
    ));
    output.push_str(&format!(
        "  {}: {}\n",
        "Time spent".dimmed(),
        format_time_spent(record.total_time_spent)
    ));
    output.push_str(&format!(
        "  {}: {}\n",
        "Video time".dimmed(),
        format_time_spent(record.video_watch_time())
    ));
    output.push_str(&format!(
        "  {}: {} day(s)\n",
        "Streak".dimmed(),
        record.current_streak
    ));

    for lesson in &record.lessons {
        let icon = if lesson.completed {
            "[x]".green()
        } else {
            "[ ]".white()
        };
        output.push_str(&format!(
            "    {} {}  {}\n",
            icon,
            lesson.lesson_id,
            format_time_spent(lesson.video_watch_time).dimmed()
        ));
    }

    if !record.achievements.is_empty() {
        let icons: Vec<_> = record
            .achievements
            .iter()
            .map(|id| achievement_details(id).icon)
            .collect();
        output.push_str(&format!("  {}: {}\n", "Achievements".dimmed(), icons.join(" ")));
    }

    output
}

/// Format several course records
pub fn format_courses_pretty(records: &[CourseProgress], user: &str) -> String {
    if records.is_empty() {
        return format!("Courses for {user} (0)\n  Not enrolled in any course");
    }

    let mut output = format!("Courses for {user} ({})\n", records.len());
    output.push_str(&"─".repeat(60));
    output.push('\n');
    for record in records {
        output.push_str(&format_course_pretty(record));
    }
    output
}

/// Format a learner's summary
pub fn format_summary_pretty(summary: &ProgressSummary, user: &str) -> String {
    let mut lines = Vec::new();

    lines.push(format!("Progress for {}", user.bold()));
    lines.push("─".repeat(40));
    lines.push(format!(
        "  Courses:     {} ({} completed, {} in progress, {} not started)",
        summary.courses, summary.completed, summary.in_progress, summary.not_started
    ));
    lines.push(format!(
        "  Lessons:     {}/{}",
        summary.lessons_completed, summary.lessons_total
    ));
    lines.push(format!(
        "  Average:     {}",
        progress_bar(summary.average_completion)
    ));
    lines.push(format!(
        "  Time spent:  {} {}",
        format_time_spent(summary.total_time_spent),
        "learning".dimmed()
    ));
    lines.push(format!(
        "  Video time:  {}",
        format_time_spent(summary.total_video_time)
    ));
    lines.push(format!(
        "  Streak:      {} {}",
        summary.current_streak.to_string().yellow(),
        "days".dimmed()
    ));
    lines.push(format!("  Achievements: {}", summary.achievements.len()));

    lines.join("\n")
}

/// Format achievement ids with their details
pub fn format_achievements_pretty(ids: &[String]) -> String {
    if ids.is_empty() {
        return "Achievements (0)\n  None yet. Complete a lesson to earn your first!".to_string();
    }

    let mut output = format!("Achievements ({})\n", ids.len());
    output.push_str(&"─".repeat(40));
    output.push('\n');

    for id in ids {
        let details = achievement_details(id);
        output.push_str(&format!(
            "  {} {}  {}\n",
            details.icon,
            details.title.bold(),
            details.description.dimmed()
        ));
    }

    output
}

fn progress_bar(percentage: u8) -> String {
    const WIDTH: usize = 20;
    let filled = usize::from(percentage.min(100)) * WIDTH / 100;
    format!(
        "{}{} {:>3}%",
        "█".repeat(filled).green(),
        "░".repeat(WIDTH - filled).dimmed(),
        percentage
    )
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::offline::{DrainFailure, DrainReport, NewMutation, SkipReason};
    use chrono::Utc;
    use serde_json::json;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_empty_queue() {
        plain();
        assert!(format_queue_pretty(&[]).contains("No pending changes"));
    }

    #[test]
    fn test_queue_lists_entities() {
        plain();
        let m = QueuedMutation::stamp(NewMutation::update("profile", json!({})), Utc::now());
        let output = format_queue_pretty(&[m]);
        assert!(output.contains("1 pending"));
        assert!(output.contains("update"));
        assert!(output.contains("profile"));
    }

    #[test]
    fn test_drain_failure_is_reported() {
        plain();
        let outcome = DrainOutcome::Completed(DrainReport {
            synced: 1,
            remaining: 2,
            failure: Some(DrainFailure {
                mutation_id: "0123456789".to_string(),
                entity: "comment".to_string(),
                error: "timeout".to_string(),
            }),
        });

        let output = format_drain_pretty(&outcome);

        assert!(output.contains("Synced 1 change(s), 2 remaining"));
        assert!(output.contains("Stopped at comment 01234567: timeout"));
    }

    #[test]
    fn test_drain_skipped() {
        plain();
        let output = format_drain_pretty(&DrainOutcome::Skipped {
            reason: SkipReason::Offline,
        });
        assert!(output.contains("Nothing synced: offline"));
    }

    #[test]
    fn test_progress_bar_bounds() {
        plain();
        assert!(progress_bar(0).ends_with("  0%"));
        assert!(progress_bar(100).starts_with(&"█".repeat(20)));
    }

    #[test]
    fn test_achievements_pretty() {
        plain();
        let output = format_achievements_pretty(&["streak-3".to_string()]);
        assert!(output.contains("On Fire"));
        assert!(format_achievements_pretty(&[]).contains("None yet"));
    }

    #[test]
    fn test_course_pretty() {
        plain();
        let mut record = CourseProgress::new("u1", "rust-101", &["intro", "ownership"]);
        record.lessons[0].completed = true;
        record.total_time_spent = 5400;
        record.recompute_completion();

        let output = format_course_pretty(&record);

        assert!(output.contains("rust-101"));
        assert!(output.contains(" 50%"));
        assert!(output.contains("1/2 lessons"));
        assert!(output.contains("1h 30m"));
    }
}
