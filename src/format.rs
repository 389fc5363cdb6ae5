//! Duration formatting shared by the live display and both export formats.

/// Format milliseconds as `MM:SS.cc`, with an `HH:` segment only when the
/// value reaches a full hour. Negative inputs keep their sign. Centiseconds
/// are truncated, not rounded.
pub fn format_duration(ms: i64) -> String {
    let sign = if ms < 0 { "-" } else { "" };
    let ms = ms.unsigned_abs();
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let centis = (ms % 1_000) / 10;
    if hours > 0 {
        format!("{sign}{hours:02}:{minutes:02}:{seconds:02}.{centis:02}")
    } else {
        format!("{sign}{minutes:02}:{seconds:02}.{centis:02}")
    }
}

/// Milliseconds to fractional minutes, for the CSV minutes column and the
/// average-stat sublabel.
pub fn ms_to_minutes(ms: i64) -> f64 {
    ms as f64 / 60_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_minutes_seconds_only() {
        assert_eq!(format_duration(0), "00:00.00");
    }

    #[test]
    fn hours_segment_appears_at_one_hour() {
        assert_eq!(format_duration(3_661_000), "01:01:01.00");
        assert_eq!(format_duration(3_599_990), "59:59.99");
        assert_eq!(format_duration(3_600_000), "01:00:00.00");
    }

    #[test]
    fn centiseconds_truncate() {
        assert_eq!(format_duration(999), "00:00.99");
        assert_eq!(format_duration(12_345), "00:12.34");
        assert_eq!(format_duration(45_000), "00:45.00");
    }

    #[test]
    fn negative_keeps_sign() {
        assert!(format_duration(-500).starts_with('-'));
        assert_eq!(format_duration(-500), "-00:00.50");
    }

    #[test]
    fn minutes_conversion() {
        assert_eq!(ms_to_minutes(60_000), 1.0);
        assert_eq!(ms_to_minutes(90_000), 1.5);
    }
}
