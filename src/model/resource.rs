use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::duration::{Duration, Rate};
use super::project::{CalendarRef, ResourceRef, TaskRef};

/// A resource (person, machine, material) as decoded from the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Resource {
    /// Stable identity; the only key other entities may reference.
    pub unique_id: Option<u32>,
    /// Positional identifier. Display order only, never used for linking.
    pub id: Option<u32>,
    pub name: Option<String>,
    pub initials: Option<String>,
    pub email: Option<String>,
    pub group: Option<String>,
    pub code: Option<String>,
    pub standard_rate: Option<Rate>,
    pub overtime_rate: Option<Rate>,
    /// Maximum availability as a fraction (1.0 = 100%).
    pub max_units: Option<f64>,
    pub cost: Option<f64>,
    pub work: Option<Duration>,
    pub actual_work: Option<Duration>,
    pub overtime_work: Option<Duration>,

    /// Calendar UniqueID as decoded; resolved into `calendar`.
    pub calendar_unique_id: Option<u32>,
    /// Resolved calendar link, populated by the resolution pass.
    pub calendar: Option<CalendarRef>,
}

/// An assignment of one resource to one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResourceAssignment {
    pub unique_id: Option<u32>,
    /// Task UniqueID as decoded; resolved into `task`.
    pub task_unique_id: Option<u32>,
    /// Resource UniqueID as decoded; resolved into `resource`.
    pub resource_unique_id: Option<u32>,
    pub start: Option<NaiveDateTime>,
    pub finish: Option<NaiveDateTime>,
    /// Assigned units as a fraction (1.0 = 100%).
    pub units: Option<f64>,
    pub work: Option<Duration>,
    pub actual_work: Option<Duration>,
    pub remaining_work: Option<Duration>,
    pub cost: Option<f64>,

    /// Resolved task link, populated by the resolution pass.
    pub task: Option<TaskRef>,
    /// Resolved resource link, populated by the resolution pass.
    pub resource: Option<ResourceRef>,
}
