use std::time::Duration;

/// Label shown when no position or duration can be queried.
pub const NO_MEDIA_LABEL: &str = "0:00 / 0:00";

/// Formats `"<position> / <duration>"`.
///
/// Both fields use `H:MM:SS` when the duration has an hour component and
/// `M:SS` otherwise; the position's own hours never decide the layout.
pub fn format_progress(position: Duration, duration: Duration) -> String {
    let show_hours = hours(duration) > 0;
    format!(
        "{} / {}",
        format_clock(position, show_hours),
        format_clock(duration, show_hours)
    )
}

/// Normalized seek position in [0.0, 1.0]. A zero duration maps to 0.0.
pub fn progress_fraction(position: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 0.0;
    }
    (position.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

fn format_clock(time: Duration, show_hours: bool) -> String {
    if show_hours {
        format!("{}:{:02}:{:02}", hours(time), minutes(time), seconds(time))
    } else {
        format!("{}:{:02}", minutes(time), seconds(time))
    }
}

fn hours(time: Duration) -> u64 {
    time.as_secs() / 3600
}

fn minutes(time: Duration) -> u64 {
    (time.as_secs() / 60) % 60
}

fn seconds(time: Duration) -> u64 {
    time.as_secs() % 60
}
