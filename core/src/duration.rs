use std::time::Duration;

use lazy_regex::regex;

pub type Result = std::result::Result<Duration, DurationParseError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationParseError {
    #[error("Empty duration")]
    Empty,

    #[error("Invalid duration '{0}' (expected e.g. 500ms, 5s, 1m30s)")]
    Invalid(String),

    #[error("Duration '{0}' is too large")]
    Overflow(String),
}

/// Parse a duration written as a sequence of `<number><unit>` pairs,
/// where unit is one of `ns`, `us` (`µs`), `ms`, `s`, `m`, `h`.
/// A bare `0` is accepted.
/// ```
/// use harn_core::duration::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
/// assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
/// assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
/// assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
/// assert!(parse_duration("5").is_err());
/// ```
pub fn parse_duration(s: &str) -> Result {
    let s = s.trim();
    if s.is_empty() {
        return Err(DurationParseError::Empty);
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let re = regex!(r"(\d+(?:\.\d*)?|\.\d+)(ns|us|µs|μs|ms|s|m|h)");
    let mut pos = 0;
    let mut total_nanos = 0f64;

    for cap in re.captures_iter(s) {
        let whole = cap.get(0).unwrap();
        if whole.start() != pos {
            return Err(DurationParseError::Invalid(s.to_owned()));
        }
        pos = whole.end();

        let value: f64 = cap[1]
            .parse()
            .map_err(|_| DurationParseError::Invalid(s.to_owned()))?;
        let unit_nanos = match &cap[2] {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => unreachable!(),
        };
        total_nanos += value * unit_nanos;
    }

    if pos != s.len() {
        return Err(DurationParseError::Invalid(s.to_owned()));
    }
    if total_nanos > u64::MAX as f64 {
        return Err(DurationParseError::Overflow(s.to_owned()));
    }
    Ok(Duration::from_nanos(total_nanos.round() as u64))
}

/// Format a duration the same way it is written on the command line.
/// ```
/// use harn_core::duration::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::ZERO), "0s");
/// assert_eq!(format_duration(Duration::from_millis(12)), "12ms");
/// assert_eq!(format_duration(Duration::from_micros(1500)), "1.5ms");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
/// assert_eq!(format_duration(Duration::from_secs(3600)), "1h0m0s");
/// ```
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_owned();
    }
    if nanos < 1_000 {
        return format!("{}ns", nanos);
    }
    if nanos < 1_000_000 {
        return format!("{}µs", decimal(nanos, 1_000));
    }
    if nanos < 1_000_000_000 {
        return format!("{}ms", decimal(nanos, 1_000_000));
    }

    let secs = d.as_secs();
    let (h, m) = (secs / 3600, secs / 60 % 60);
    let mut res = String::new();
    if h > 0 {
        res += &format!("{}h", h);
    }
    if h > 0 || m > 0 {
        res += &format!("{}m", m);
    }
    res += &decimal(nanos % 60_000_000_000, 1_000_000_000);
    res.push('s');
    res
}

/// Round to the nearest millisecond (half away from zero).
pub fn round_to_millis(d: Duration) -> Duration {
    let millis = (d.as_nanos() + 500_000) / 1_000_000;
    Duration::from_millis(millis as u64)
}

fn decimal(value: u128, unit: u128) -> String {
    let (int, frac) = (value / unit, value % unit);
    if frac == 0 {
        return int.to_string();
    }
    let width = unit.to_string().len() - 1;
    let frac = format!("{:0width$}", frac, width = width);
    format!("{}.{}", int, frac.trim_end_matches('0'))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_parse_each_unit() {
        assert_eq!(parse_duration("100ns"), Ok(Duration::from_nanos(100)));
        assert_eq!(parse_duration("7us"), Ok(Duration::from_micros(7)));
        assert_eq!(parse_duration("7µs"), Ok(Duration::from_micros(7)));
        assert_eq!(parse_duration("100ms"), Ok(Duration::from_millis(100)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
        assert_eq!(parse_duration(".5s"), Ok(Duration::from_millis(500)));
    }

    #[test]
    fn should_reject_garbage() {
        assert_eq!(parse_duration(""), Err(DurationParseError::Empty));
        assert_eq!(
            parse_duration("5x"),
            Err(DurationParseError::Invalid("5x".to_owned()))
        );
        assert_eq!(
            parse_duration("s5"),
            Err(DurationParseError::Invalid("s5".to_owned()))
        );
        assert_eq!(
            parse_duration("1s 2s"),
            Err(DurationParseError::Invalid("1s 2s".to_owned()))
        );
    }

    #[test]
    fn format_should_trim_fraction_zeros() {
        assert_eq!(format_duration(Duration::from_nanos(999)), "999ns");
        assert_eq!(format_duration(Duration::from_nanos(1_230)), "1.23µs");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(60)), "1m0s");
        assert_eq!(format_duration(Duration::from_millis(61_250)), "1m1.25s");
    }

    #[test]
    fn round_to_millis_should_round_half_up() {
        assert_eq!(
            round_to_millis(Duration::from_micros(1_499)),
            Duration::from_millis(1)
        );
        assert_eq!(
            round_to_millis(Duration::from_micros(1_500)),
            Duration::from_millis(2)
        );
    }
}
