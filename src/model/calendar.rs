use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::project::CalendarRef;

/// How a calendar treats one weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayType {
    Working,
    NonWorking,
    /// Inherit the parent calendar's definition (or the standard defaults
    /// for a base calendar).
    Default,
}

/// A working period within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }
}

/// One weekday's definition: its type plus explicit working periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub day_type: DayType,
    pub hours: Vec<TimeRange>,
}

impl CalendarDay {
    pub fn default_day() -> Self {
        Self {
            day_type: DayType::Default,
            hours: Vec::new(),
        }
    }

    /// The standard working day used when a base calendar leaves a weekday
    /// on `Default`: 08:00–12:00 and 13:00–17:00.
    pub fn standard_working() -> Self {
        let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap_or(NaiveTime::MIN);
        Self {
            day_type: DayType::Working,
            hours: vec![
                TimeRange::new(t(8), t(12)),
                TimeRange::new(t(13), t(17)),
            ],
        }
    }
}

/// How often a calendar exception repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecurrenceKind {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Optional repetition attached to an exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub kind: RecurrenceKind,
    /// Repeat every `interval` units of `kind` (1 = every occurrence).
    pub interval: u16,
}

/// A date range overriding the weekday rules, optionally recurring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarException {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Working periods for the exception days; empty means non-working.
    pub hours: Vec<TimeRange>,
    pub recurrence: Option<Recurrence>,
}

impl CalendarException {
    pub fn is_working(&self) -> bool {
        !self.hours.is_empty()
    }
}

/// A project or resource calendar.
///
/// Derived calendars point at a parent and inherit every weekday left on
/// `Default`. Day slots run Sunday through Saturday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectCalendar {
    pub unique_id: Option<u32>,
    pub name: Option<String>,
    /// Parent calendar UniqueID as decoded; resolved into `parent`.
    pub parent_unique_id: Option<u32>,
    /// Resolved parent link, populated by the resolution pass.
    pub parent: Option<CalendarRef>,
    pub days: [CalendarDay; 7],
    pub exceptions: Vec<CalendarException>,
}

impl ProjectCalendar {
    pub fn new() -> Self {
        Self {
            unique_id: None,
            name: None,
            parent_unique_id: None,
            parent: None,
            days: std::array::from_fn(|_| CalendarDay::default_day()),
            exceptions: Vec::new(),
        }
    }

    /// The slot for a weekday (Sunday = slot 0).
    pub fn day(&self, weekday: Weekday) -> &CalendarDay {
        &self.days[weekday.num_days_from_sunday() as usize]
    }

    pub fn day_mut(&mut self, weekday: Weekday) -> &mut CalendarDay {
        &mut self.days[weekday.num_days_from_sunday() as usize]
    }

    /// True when this is a base calendar rather than a derived one.
    pub fn is_base(&self) -> bool {
        self.parent_unique_id.is_none()
    }
}

impl Default for ProjectCalendar {
    fn default() -> Self {
        Self::new()
    }
}
