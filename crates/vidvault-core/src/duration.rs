//! Playback duration formatting.

/// Duration stored for records whose length could not be determined.
pub const UNKNOWN_DURATION: &str = "00:00";

/// Format a playback length in seconds as zero-padded `mm:ss`.
///
/// Fractional seconds are truncated. Negative, NaN and infinite inputs format as
/// [`UNKNOWN_DURATION`]. Lengths of an hour or more keep counting minutes (`75:00`).
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return UNKNOWN_DURATION.to_string();
    }

    let total = seconds.floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
