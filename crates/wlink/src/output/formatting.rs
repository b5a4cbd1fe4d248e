//! Human-readable formatting of wireless counters and identifiers.
//!
//! # Example
//!
//! ```
//! use wlink::output::formatting::{format_bitrate, format_bytes, format_duration_compact};
//! use std::time::Duration;
//!
//! assert_eq!(format_bytes(1_048_576), "1.00 MiB");
//! assert_eq!(format_bitrate(866_700_000), "866.7 MBit/s");
//! assert_eq!(format_duration_compact(Duration::from_secs(3661)), "1h 1m 1s");
//! ```

use std::fmt::Write;
use std::time::Duration;

/// Format a byte count with binary units (1 KiB = 1024 bytes).
///
/// ```
/// use wlink::output::formatting::format_bytes;
///
/// assert_eq!(format_bytes(512), "512 B");
/// assert_eq!(format_bytes(1024), "1.00 KiB");
/// assert_eq!(format_bytes(6_000_000_000), "5.59 GiB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

/// Format a bitrate the way `iw` does, in MBit/s with one decimal.
///
/// ```
/// use wlink::output::formatting::format_bitrate;
///
/// assert_eq!(format_bitrate(0), "0.0 MBit/s");
/// assert_eq!(format_bitrate(54_000_000), "54.0 MBit/s");
/// ```
pub fn format_bitrate(bits_per_sec: u64) -> String {
    let tenths = bits_per_sec / 100_000;
    format!("{}.{} MBit/s", tenths / 10, tenths % 10)
}

/// Format a duration compactly (e.g., "1d 2h 3m 4s").
///
/// ```
/// use wlink::output::formatting::format_duration_compact;
/// use std::time::Duration;
///
/// assert_eq!(format_duration_compact(Duration::ZERO), "0s");
/// assert_eq!(format_duration_compact(Duration::from_secs(90)), "1m 30s");
/// assert_eq!(format_duration_compact(Duration::from_secs(90061)), "1d 1h 1m 1s");
/// ```
pub fn format_duration_compact(duration: Duration) -> String {
    let total = duration.as_secs();
    let parts = [
        (total / 86400, "d"),
        ((total % 86400) / 3600, "h"),
        ((total % 3600) / 60, "m"),
        (total % 60, "s"),
    ];

    let mut out = String::new();
    for (value, unit) in parts {
        if value > 0 {
            if !out.is_empty() {
                out.push(' ');
            }
            let _ = write!(out, "{value}{unit}");
        }
    }
    if out.is_empty() {
        out.push_str("0s");
    }
    out
}

/// Format an SSID for display, escaping bytes that are not printable ASCII.
///
/// ```
/// use wlink::output::formatting::format_ssid;
///
/// assert_eq!(format_ssid(b"home"), "home");
/// assert_eq!(format_ssid(b"caf\xc3\xa9"), "caf\\xc3\\xa9");
/// assert_eq!(format_ssid(b"a b"), "a\\x20b");
/// ```
pub fn format_ssid(ssid: &[u8]) -> String {
    let mut out = String::with_capacity(ssid.len());
    for &b in ssid {
        // Spaces are escaped too, so the SSID stays one token
        if b.is_ascii_graphic() && b != b'\\' {
            out.push(b as char);
        } else {
            let _ = write!(out, "\\x{b:02x}");
        }
    }
    out
}

/// Channel number for a frequency in MHz, if it falls in a known band.
///
/// ```
/// use wlink::output::formatting::channel;
///
/// assert_eq!(channel(2412), Some(1));
/// assert_eq!(channel(2484), Some(14));
/// assert_eq!(channel(5180), Some(36));
/// assert_eq!(channel(5955), Some(1));
/// assert_eq!(channel(900), None);
/// ```
pub fn channel(freq: u32) -> Option<u32> {
    match freq {
        2484 => Some(14),
        2412..=2472 => Some((freq - 2407) / 5),
        // 6 GHz band
        5950..=7115 => Some((freq - 5950) / 5),
        4910..=5895 => Some((freq - 5000) / 5),
        _ => None,
    }
}
