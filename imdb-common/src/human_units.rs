//! Human-readable size and duration formatting
//!
//! Used for operator-facing progress lines (downloads, decompression).

use std::time::Duration;

const KIB: f64 = 1024.0;
const MIB: f64 = KIB * 1024.0;
const GIB: f64 = MIB * 1024.0;

/// Format a byte count with a binary unit suffix
///
/// # Examples
///
/// ```
/// use imdb_common::human_units::format_bytes;
///
/// assert_eq!(format_bytes(512), "512 B");
/// assert_eq!(format_bytes(1536), "1.5 KiB");
/// assert_eq!(format_bytes(200 * 1024 * 1024), "200.0 MiB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    let value = bytes as f64;
    if value < KIB {
        format!("{} B", bytes)
    } else if value < MIB {
        format!("{:.1} KiB", value / KIB)
    } else if value < GIB {
        format!("{:.1} MiB", value / MIB)
    } else {
        format!("{:.2} GiB", value / GIB)
    }
}

/// Format an elapsed duration
///
/// Under 100 seconds: `X.XXs`; otherwise `M:SS` (minutes are not wrapped).
///
/// ```
/// use imdb_common::human_units::format_elapsed;
/// use std::time::Duration;
///
/// assert_eq!(format_elapsed(Duration::from_millis(4_250)), "4.25s");
/// assert_eq!(format_elapsed(Duration::from_secs(330)), "5:30");
/// ```
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs < 100.0 {
        format!("{:.2}s", secs)
    } else {
        let total = elapsed.as_secs();
        format!("{}:{:02}", total / 60, total % 60)
    }
}
