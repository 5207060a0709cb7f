use std::time::Duration;

const SECOND_MS: u64 = 1_000;
const MINUTE_MS: u64 = 60 * SECOND_MS;
const HOUR_MS: u64 = 60 * MINUTE_MS;
const DAY_MS: u64 = 24 * HOUR_MS;

/// Parse a compact duration such as `1h30m` or `2d`.
///
/// Every `<digits><unit>` token (units `s`, `m`, `h`, `d`, any case) is
/// summed; everything else in the string is skipped. Returns `None` when
/// nothing matched or the total is zero.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let mut total_ms: u64 = 0;
    let mut digits = String::new();

    for ch in input.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }

        if !digits.is_empty() {
            if let Some(unit_ms) = unit_millis(ch) {
                let value = digits.parse::<u64>().unwrap_or(u64::MAX);
                total_ms = total_ms.saturating_add(value.saturating_mul(unit_ms));
            }
            digits.clear();
        }
    }

    (total_ms > 0).then(|| Duration::from_millis(total_ms))
}

fn unit_millis(unit: char) -> Option<u64> {
    match unit.to_ascii_lowercase() {
        's' => Some(SECOND_MS),
        'm' => Some(MINUTE_MS),
        'h' => Some(HOUR_MS),
        'd' => Some(DAY_MS),
        _ => None,
    }
}

/// Render a duration using its two largest units, e.g. `1d 4h` or `45m`.
pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.as_secs();
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{days}d {}h", hours % 24)
    } else if hours > 0 {
        format!("{hours}h {}m", minutes % 60)
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Option<Duration> {
        Some(Duration::from_millis(value))
    }

    #[test]
    fn sums_tokens_in_any_order() {
        assert_eq!(parse_duration("1h30m"), ms(5_400_000));
        assert_eq!(parse_duration("30m1h"), ms(5_400_000));
        assert_eq!(parse_duration("2d"), ms(172_800_000));
        assert_eq!(parse_duration("45s"), ms(45_000));
    }

    #[test]
    fn units_are_case_insensitive() {
        assert_eq!(parse_duration("1H30M"), ms(5_400_000));
    }

    #[test]
    fn ignores_non_matching_text() {
        assert_eq!(parse_duration("in 1h and 30m please"), ms(5_400_000));
        assert_eq!(parse_duration("12x3m"), ms(180_000));
        assert_eq!(parse_duration("1.5h"), ms(5 * HOUR_MS));
    }

    #[test]
    fn no_match_or_zero_is_no_duration() {
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("abc"), None);
        assert_eq!(parse_duration("90"), None);
        assert_eq!(parse_duration("0s"), None);
        assert_eq!(parse_duration("0h0m"), None);
    }

    #[test]
    fn huge_values_saturate() {
        let parsed = parse_duration("99999999999999999999999d").unwrap();
        assert_eq!(parsed, Duration::from_millis(u64::MAX));
    }

    #[test]
    fn formats_two_largest_units() {
        assert_eq!(format_duration(Duration::from_millis(5_400_000)), "1h 30m");
        assert_eq!(format_duration(Duration::from_secs(26 * 3600)), "1d 2h");
        assert_eq!(format_duration(Duration::from_secs(600)), "10m");
        assert_eq!(format_duration(Duration::from_secs(42)), "42s");
    }
}
