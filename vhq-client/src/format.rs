//! Human readable rendering of durations, sizes and timestamps.

/// Formats a video length as `h:mm:ss`, or `m:ss` below one hour. Unknown and zero lengths are
/// shown as `Unknown`.
pub fn format_duration(seconds: Option<f64>) -> String {
    let Some(total) = seconds
        .filter(|s| s.is_finite() && *s >= 1.0)
        .map(|s| s.floor() as u64)
    else {
        return "Unknown".to_string();
    };

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Formats an offset into a video as `m:ss`, minutes not wrapping at the hour.
pub fn format_timestamp(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Formats a byte count with a binary unit and at most two decimals, e.g. `1.5 MB`.
pub fn format_file_size(bytes: Option<f64>) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let Some(bytes) = bytes.filter(|b| b.is_finite() && *b > 0.0) else {
        return "Unknown".to_string();
    };

    let exponent = (bytes.ln() / 1024f64.ln()).floor().clamp(0.0, 3.0) as i32;
    let value = (bytes / 1024f64.powi(exponent) * 100.0).round() / 100.0;
    format!("{} {}", trim_number(value), UNITS[exponent as usize])
}

/// Formats a number with at most two decimals, without trailing zeros
pub fn trim_number(value: f64) -> String {
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
