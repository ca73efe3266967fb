//! Human-readable byte counts in IEC (binary) units.

const UNIT: u64 = 1024;
const PREFIXES: [&str; 6] = ["Ki", "Mi", "Gi", "Ti", "Pi", "Ei"];

/// Split a byte count into a scaled value and its IEC prefix.
///
/// Counts below 1024 have an empty prefix: `(512.0, "")`, `(1.5, "Ki")`.
pub fn byte_count_iec(bytes: u64) -> (f64, &'static str) {
    if bytes < UNIT {
        return (bytes as f64, "");
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    (bytes as f64 / div as f64, PREFIXES[exp])
}

/// Format as `12.34MiB`.
pub fn format_bytes(bytes: u64) -> String {
    let (count, prefix) = byte_count_iec(bytes);
    format!("{:.2}{}B", count, prefix)
}

/// Format a non-negative size, flooring fractional bytes.
pub fn format_size(size: f64) -> String {
    format_bytes(size_to_bytes(size))
}

/// Floor a size to whole bytes; negative and non-finite sizes become 0.
pub fn size_to_bytes(size: f64) -> u64 {
    if size.is_finite() && size > 0.0 {
        size.floor() as u64
    } else {
        0
    }
}
