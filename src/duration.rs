use serde::{Deserialize, Serialize};

/// Durations and CPM times are whole hours.
pub type Hours = u64;

/// Conversion factors applied to "week" and "day" estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationUnits {
    pub hours_per_week: Hours,
    pub hours_per_day: Hours,
}

impl Default for DurationUnits {
    fn default() -> Self {
        Self {
            hours_per_week: 40,
            hours_per_day: 8,
        }
    }
}

/// Result of parsing a free-text effort estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationEstimate {
    pub hours: Hours,
    /// False when no unit matched or the numeric prefix was unusable.
    pub recognized: bool,
}

impl DurationEstimate {
    const UNRECOGNIZED: Self = Self {
        hours: 0,
        recognized: false,
    };

    pub fn parse(text: &str) -> Self {
        Self::parse_with_units(text, &DurationUnits::default())
    }

    pub fn parse_with_units(text: &str, units: &DurationUnits) -> Self {
        let lowered = text.to_lowercase();
        let factor = if lowered.contains("week") {
            units.hours_per_week
        } else if lowered.contains("day") {
            units.hours_per_day
        } else if lowered.contains("hour") {
            1
        } else {
            return Self::UNRECOGNIZED;
        };

        match leading_integer(&lowered) {
            Some(value) if value >= 0 => Self {
                hours: (value as Hours).saturating_mul(factor),
                recognized: true,
            },
            _ => Self::UNRECOGNIZED,
        }
    }
}

/// Parses "2 weeks", "3 days" or "40 hours" into hours. Anything else is 0.
pub fn parse_duration_hours(text: &str) -> Hours {
    DurationEstimate::parse(text).hours
}

/// Reads the integer at the start of `text`, ignoring leading whitespace and
/// whatever follows the digits ("1.5 days" reads as 1). Values beyond the
/// `i64` range clamp to its bounds.
fn leading_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let sign_len = usize::from(trimmed.starts_with(['-', '+']));
    let digits = trimmed[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    let value = trimmed[..sign_len + digits]
        .parse::<i64>()
        .unwrap_or(if trimmed.starts_with('-') { i64::MIN } else { i64::MAX });
    Some(value)
}
