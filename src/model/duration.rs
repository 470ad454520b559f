use serde::{Deserialize, Serialize};

/// Time units used by durations, work values and rates.
///
/// The "elapsed" variants count calendar time rather than working time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    Minutes,
    ElapsedMinutes,
    Hours,
    ElapsedHours,
    Days,
    ElapsedDays,
    Weeks,
    ElapsedWeeks,
    Months,
    ElapsedMonths,
}

impl TimeUnit {
    /// Decode the on-disk unit code. Unknown codes decode as `Days`.
    pub fn from_code(code: u8) -> TimeUnit {
        match code {
            3 => TimeUnit::Minutes,
            4 => TimeUnit::ElapsedMinutes,
            5 => TimeUnit::Hours,
            6 => TimeUnit::ElapsedHours,
            7 => TimeUnit::Days,
            8 => TimeUnit::ElapsedDays,
            9 => TimeUnit::Weeks,
            10 => TimeUnit::ElapsedWeeks,
            11 => TimeUnit::Months,
            12 => TimeUnit::ElapsedMonths,
            _ => TimeUnit::Days,
        }
    }

    /// True for the elapsed (calendar-time) variants.
    pub fn is_elapsed(self) -> bool {
        matches!(
            self,
            TimeUnit::ElapsedMinutes
                | TimeUnit::ElapsedHours
                | TimeUnit::ElapsedDays
                | TimeUnit::ElapsedWeeks
                | TimeUnit::ElapsedMonths
        )
    }
}

/// An amount of time in a given unit, e.g. "3.5 days".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Duration {
    pub value: f64,
    pub unit: TimeUnit,
}

impl Duration {
    pub fn new(value: f64, unit: TimeUnit) -> Self {
        Self { value, unit }
    }
}

/// A cost rate, e.g. "75.0 per hour".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    pub amount: f64,
    pub unit: TimeUnit,
}

impl Rate {
    pub fn new(amount: f64, unit: TimeUnit) -> Self {
        Self { amount, unit }
    }
}
