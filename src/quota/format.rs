//! Byte formatting for quota messages and UI display

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Format a byte count with up to two decimal places
pub fn format_bytes(bytes: u64) -> String {
    format_bytes_precision(bytes, 2)
}

/// Format a byte count with a chosen number of decimal places
///
/// Units go up in powers of 1024 and stop at GB; anything at or above a
/// tebibyte still renders in GB. Trailing zeros are trimmed, so 1536 bytes
/// formats as "1.5 KB", not "1.50 KB".
pub fn format_bytes_precision(bytes: u64, decimals: u32) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let unit = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(unit as i32);

    let mut rendered = format!("{value:.prec$}", prec = decimals as usize);
    if rendered.contains('.') {
        rendered = rendered
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string();
    }

    format!("{} {}", rendered, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_bytes() {
        assert_eq!(format_bytes(0), "0 Bytes");
    }

    #[test]
    fn test_trims_trailing_zeros() {
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5 GB");
    }

    #[test]
    fn test_sub_kilobyte_counts() {
        assert_eq!(format_bytes(1), "1 Bytes");
        assert_eq!(format_bytes(1023), "1023 Bytes");
    }

    #[test]
    fn test_limit_strings() {
        assert_eq!(format_bytes(100 * 1024 * 1024), "100 MB");
        assert_eq!(format_bytes(10 * 1024 * 1024), "10 MB");
    }

    #[test]
    fn test_zero_decimals_renders_integers() {
        assert_eq!(format_bytes_precision(1536, 0), "2 KB");
        assert_eq!(format_bytes_precision(1024, 0), "1 KB");
    }

    #[test]
    fn test_terabyte_range_stays_in_gb() {
        let two_tib = 2u64 * 1024 * 1024 * 1024 * 1024;
        assert_eq!(format_bytes(two_tib), "2048 GB");
    }

    #[test]
    fn test_fractional_values_keep_two_decimals() {
        // 1.333... MB rounds to 1.33
        assert_eq!(format_bytes(1_398_101), "1.33 MB");
    }
}
