use crate::data::{DecimalHour, TimeWindow};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_HOUR: u8 = 6;
pub const MAX_HOUR: u8 = 23;
pub const MINUTE_STEPS: [u8; 4] = [0, 15, 30, 45];

/// An hour/minute pair as picked in the two time selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct HourMinute {
    pub hour: u8,
    pub minute: u8,
}

impl HourMinute {
    pub fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }
}

impl fmt::Display for HourMinute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Converts a selector pair into a decimal hour rounded to two digits.
///
/// The hour is clamped into the operating range and the minute snapped down
/// to the nearest quarter, so any input maps onto a value the selectors
/// could have produced.
pub fn to_decimal(hour: u8, minute: u8) -> DecimalHour {
    let hour = hour.clamp(MIN_HOUR, MAX_HOUR);
    let minute = (minute.min(59) / 15) * 15;
    round_to_hundredths(f64::from(hour) + f64::from(minute) / 60.0)
}

/// Splits a decimal hour back into whole hours and rounded minutes.
pub fn from_decimal(value: DecimalHour) -> HourMinute {
    let hours = value.floor();
    let minutes = ((value - hours) * 60.0).round();
    // 9.999 rounds up to a full hour
    if minutes >= 60.0 {
        return HourMinute::new(hours as u8 + 1, 0);
    }
    HourMinute::new(hours as u8, minutes as u8)
}

/// Zero-padded `HH:MM` rendering of a decimal hour.
pub fn format_hhmm(value: DecimalHour) -> String {
    from_decimal(value).to_string()
}

pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The four time selectors of the form. No ordering is enforced here; the
/// assembler rejects `start >= end` at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct TimeWindowSelection {
    pub start: HourMinute,
    pub end: HourMinute,
}

impl Default for TimeWindowSelection {
    fn default() -> Self {
        Self {
            start: HourMinute::new(8, 0),
            end: HourMinute::new(17, 0),
        }
    }
}

impl TimeWindowSelection {
    pub fn to_window(&self) -> TimeWindow {
        TimeWindow {
            start_hour: to_decimal(self.start.hour, self.start.minute),
            end_hour: to_decimal(self.end.hour, self.end.minute),
        }
    }
}
