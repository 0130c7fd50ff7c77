/// Format a duration in seconds as `M:SS`.
///
/// Fractional seconds are truncated and minutes are never folded into hours,
/// so 3725 seconds renders as `62:05`. Negative or non-finite input renders as
/// `0:00`.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}
