// src/utils/format.rs

/// Formats a countdown readout as `MM:SS`, growing to `H:MM:SS` once an
/// hour or more remains.
pub fn format_time_remaining(total_secs: u32) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Formats how long an attempt took, in words.
pub fn format_completion_time(total_secs: u64) -> String {
    if total_secs < 60 {
        return format!("{} {}", total_secs, plural(total_secs, "second"));
    }
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!(
        "{} {} {} {}",
        minutes,
        plural(minutes, "minute"),
        seconds,
        plural(seconds, "second")
    )
}

/// Formats a test's time limit for catalog cards.
pub fn format_time_limit(minutes: u32) -> String {
    if minutes < 60 {
        format!("{} min", minutes)
    } else if minutes % 60 == 0 {
        format!("{}h", minutes / 60)
    } else {
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        unit.to_string()
    } else {
        format!("{}s", unit)
    }
}
