//! Duration parsing and formatting.

use chrono::Duration;

/// Format a duration as MM:SS.
#[must_use]
pub fn format_duration_mmss(d: Duration) -> String {
    let total_seconds = d.num_seconds().abs();
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{minutes:02}:{seconds:02}")
}

/// Parse a duration string like "25m", "1h30m", "90s".
///
/// A bare number is taken as seconds, since session lengths are sampled in
/// seconds. Returns `None` for malformed, non-positive or out-of-range input.
#[must_use]
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim().to_lowercase();

    if let Ok(seconds) = s.parse::<i64>() {
        return positive_seconds(seconds);
    }

    let mut total_seconds: i64 = 0;
    let mut current_num = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() {
            current_num.push(c);
        } else if !current_num.is_empty() {
            let num: i64 = current_num.parse().ok()?;
            current_num.clear();

            let seconds = match c {
                'h' => num.checked_mul(3600)?,
                'm' => num.checked_mul(60)?,
                's' => num,
                _ => return None,
            };
            total_seconds = total_seconds.checked_add(seconds)?;
        } else {
            return None;
        }
    }

    // Trailing number without unit
    if !current_num.is_empty() {
        let num: i64 = current_num.parse().ok()?;
        total_seconds = total_seconds.checked_add(num)?;
    }

    positive_seconds(total_seconds)
}

fn positive_seconds(seconds: i64) -> Option<Duration> {
    if seconds > 0 {
        Duration::try_seconds(seconds)
    } else {
        None
    }
}
