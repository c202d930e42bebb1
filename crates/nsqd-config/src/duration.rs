//! Duration values written the way operators already write them for the
//! broker: a sequence of `<number><unit>` pairs such as `1m30s` or `250ms`.

use std::fmt;
use std::time::Duration;

use serde::Deserializer;
use serde::de::{self, Visitor};
use thiserror::Error;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SECOND: u128 = 1_000_000_000;
const NANOS_PER_MINUTE: u128 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MINUTE;

/// Errors raised when a duration string cannot be interpreted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DurationParseError {
    /// The input was empty.
    #[error("duration must not be empty")]
    Empty,
    /// A component lacked its numeric part.
    #[error("invalid duration '{0}': expected a number")]
    MissingNumber(String),
    /// A number was not followed by a unit.
    #[error("missing unit in duration '{0}'")]
    MissingUnit(String),
    /// The unit suffix was not recognised.
    #[error("unknown unit '{unit}' in duration '{input}'")]
    UnknownUnit {
        /// Complete input string.
        input: String,
        /// Offending unit.
        unit: String,
    },
    /// The value does not fit in a [`Duration`].
    #[error("duration '{0}' is out of range")]
    Overflow(String),
}

/// Parses a duration such as `2s`, `1m30s`, `1.5h`, or `250ms`.
///
/// A bare `0` is accepted as the zero duration; every other value needs a
/// unit (`ns`, `us`, `µs`, `ms`, `s`, `m`, `h`). Negative durations are
/// rejected.
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(DurationParseError::Empty);
    }
    if text == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total: u128 = 0;
    let mut rest = text.strip_prefix('+').unwrap_or(text);
    while !rest.is_empty() {
        let number_len = rest
            .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        if number.is_empty() || number == "." {
            return Err(DurationParseError::MissingNumber(text.to_owned()));
        }
        let unit_len = tail
            .find(|ch: char| ch.is_ascii_digit() || ch == '.')
            .unwrap_or(tail.len());
        let (unit, remaining) = tail.split_at(unit_len);
        if unit.is_empty() {
            return Err(DurationParseError::MissingUnit(text.to_owned()));
        }
        let scale = unit_scale(unit).ok_or_else(|| DurationParseError::UnknownUnit {
            input: text.to_owned(),
            unit: unit.to_owned(),
        })?;
        let component = scaled_component(number, scale)
            .ok_or_else(|| DurationParseError::Overflow(text.to_owned()))?;
        total = total
            .checked_add(component)
            .ok_or_else(|| DurationParseError::Overflow(text.to_owned()))?;
        rest = remaining;
    }

    nanos_to_duration(total).ok_or_else(|| DurationParseError::Overflow(text.to_owned()))
}

/// Renders a duration in the same grammar accepted by [`parse_duration`].
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_owned();
    }
    if nanos < NANOS_PER_SECOND {
        return if nanos % NANOS_PER_MILLI == 0 {
            format!("{}ms", nanos / NANOS_PER_MILLI)
        } else if nanos % NANOS_PER_MICRO == 0 {
            format!("{}us", nanos / NANOS_PER_MICRO)
        } else {
            format!("{nanos}ns")
        };
    }

    let hours = nanos / NANOS_PER_HOUR;
    let minutes = (nanos % NANOS_PER_HOUR) / NANOS_PER_MINUTE;
    let seconds = (nanos % NANOS_PER_MINUTE) / NANOS_PER_SECOND;
    let fraction = nanos % NANOS_PER_SECOND;

    let mut rendered = String::new();
    if hours > 0 {
        rendered.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        rendered.push_str(&format!("{minutes}m"));
    }
    if fraction == 0 {
        rendered.push_str(&format!("{seconds}s"));
    } else {
        let digits = format!("{fraction:09}");
        rendered.push_str(&format!("{seconds}.{}s", digits.trim_end_matches('0')));
    }
    rendered
}

fn unit_scale(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SECOND),
        "m" => Some(NANOS_PER_MINUTE),
        "h" => Some(NANOS_PER_HOUR),
        _ => None,
    }
}

fn scaled_component(number: &str, scale: u128) -> Option<u128> {
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if fraction.contains('.') {
        return None;
    }
    let whole_value: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().ok()?
    };
    let mut value = whole_value.checked_mul(scale)?;
    let mut divisor: u128 = 1;
    let mut fraction_value: u128 = 0;
    for digit in fraction.chars().take(18) {
        fraction_value = fraction_value * 10 + u128::from(digit.to_digit(10)?);
        divisor *= 10;
    }
    value = value.checked_add(fraction_value.checked_mul(scale)? / divisor)?;
    Some(value)
}

fn nanos_to_duration(nanos: u128) -> Option<Duration> {
    let seconds = u64::try_from(nanos / NANOS_PER_SECOND).ok()?;
    let subsec = u32::try_from(nanos % NANOS_PER_SECOND).ok()?;
    Some(Duration::new(seconds, subsec))
}

/// Deserialises an optional duration from either a duration string or an
/// integer number of milliseconds.
pub(crate) fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(OptionalDurationVisitor)
}

struct OptionalDurationVisitor;

impl<'de> Visitor<'de> for OptionalDurationVisitor {
    type Value = Option<Duration>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a duration string such as \"60s\" or an integer of milliseconds")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        parse_duration(value).map(Some).map_err(E::custom)
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        let millis = u64::try_from(value)
            .map_err(|_| E::custom(format!("duration must not be negative, got {value}")))?;
        Ok(Some(Duration::from_millis(millis)))
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Some(Duration::from_millis(value)))
    }
}
