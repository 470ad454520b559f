use std::fmt;

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::calendar::ProjectCalendar;
use super::duration::TimeUnit;
use super::resource::{Resource, ResourceAssignment};
use super::task::{Relation, Task};

/// The on-disk format generation a file was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileFormat {
    /// The oldest generation. Recognized but deliberately not decoded.
    Mpp8,
    Mpp9,
    Mpp12,
    Mpp14,
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileFormat::Mpp8 => "MPP8",
            FileFormat::Mpp9 => "MPP9",
            FileFormat::Mpp12 => "MPP12",
            FileFormat::Mpp14 => "MPP14",
        };
        f.write_str(name)
    }
}

/// Which end of the project the schedule is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleFrom {
    Start,
    Finish,
}

/// Index of a task within [`ProjectFile::tasks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskRef(pub usize);

/// Index of a resource within [`ProjectFile::resources`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef(pub usize);

/// Index of an assignment within [`ProjectFile::assignments`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssignmentRef(pub usize);

/// Index of a calendar within [`ProjectFile::calendars`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarRef(pub usize);

/// Index of a relation within [`ProjectFile::relations`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationRef(pub usize);

/// The entity category a diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCategory {
    Properties,
    Calendars,
    Resources,
    Tasks,
    Relations,
    Assignments,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticCategory::Properties => "properties",
            DiagnosticCategory::Calendars => "calendars",
            DiagnosticCategory::Resources => "resources",
            DiagnosticCategory::Tasks => "tasks",
            DiagnosticCategory::Relations => "relations",
            DiagnosticCategory::Assignments => "assignments",
        };
        f.write_str(name)
    }
}

/// A non-fatal problem met while decoding one entity category.
///
/// The category's partial results stay on the project; the diagnostic is the
/// only signal that something was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub message: String,
}

impl Diagnostic {
    pub fn new(category: DiagnosticCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)
    }
}

/// Project-level settings and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectProperties {
    /// Name of the application that wrote the file.
    pub application_name: Option<String>,
    /// Format generation the file identified as.
    pub file_format: Option<FileFormat>,
    pub start_date: Option<NaiveDateTime>,
    pub finish_date: Option<NaiveDateTime>,
    pub status_date: Option<NaiveDateTime>,
    pub schedule_from: ScheduleFrom,
    pub default_start_time: Option<NaiveTime>,
    pub default_duration_units: TimeUnit,
    /// Working minutes in a day; drives day-unit duration conversion.
    pub minutes_per_day: u32,
    /// Working minutes in a week; drives week-unit duration conversion.
    pub minutes_per_week: u32,
    /// Working days in a month; drives month-unit duration conversion.
    pub days_per_month: u32,
    pub currency_symbol: Option<String>,
    pub currency_digits: Option<u16>,
}

impl Default for ProjectProperties {
    fn default() -> Self {
        Self {
            application_name: None,
            file_format: None,
            start_date: None,
            finish_date: None,
            status_date: None,
            schedule_from: ScheduleFrom::Start,
            default_start_time: None,
            default_duration_units: TimeUnit::Days,
            minutes_per_day: 480,
            minutes_per_week: 2400,
            days_per_month: 20,
            currency_symbol: None,
            currency_digits: None,
        }
    }
}

/// A fully decoded project: the root aggregate owning every entity.
///
/// Built once per parse. Entities reference each other through the typed
/// index refs (`TaskRef` etc.) into these collections; the refs are filled
/// by the single resolution pass after extraction and never change again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProjectFile {
    pub properties: ProjectProperties,
    pub tasks: Vec<Task>,
    pub resources: Vec<Resource>,
    pub assignments: Vec<ResourceAssignment>,
    pub calendars: Vec<ProjectCalendar>,
    pub relations: Vec<Relation>,
    /// Non-fatal decode problems, one per degraded category.
    pub diagnostics: Vec<Diagnostic>,
}

impl ProjectFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task(&self, r: TaskRef) -> &Task {
        &self.tasks[r.0]
    }

    pub fn resource(&self, r: ResourceRef) -> &Resource {
        &self.resources[r.0]
    }

    pub fn assignment(&self, r: AssignmentRef) -> &ResourceAssignment {
        &self.assignments[r.0]
    }

    pub fn calendar(&self, r: CalendarRef) -> &ProjectCalendar {
        &self.calendars[r.0]
    }

    pub fn relation(&self, r: RelationRef) -> &Relation {
        &self.relations[r.0]
    }

    /// Find a task by UniqueID (first match, as established by resolution).
    pub fn task_by_unique_id(&self, unique_id: u32) -> Option<&Task> {
        self.tasks.iter().find(|t| t.unique_id == Some(unique_id))
    }

    /// Find a resource by UniqueID (last match, as established by resolution).
    pub fn resource_by_unique_id(&self, unique_id: u32) -> Option<&Resource> {
        self.resources
            .iter()
            .rev()
            .find(|r| r.unique_id == Some(unique_id))
    }

    /// Find a calendar by UniqueID (first match, as established by resolution).
    pub fn calendar_by_unique_id(&self, unique_id: u32) -> Option<&ProjectCalendar> {
        self.calendars
            .iter()
            .find(|c| c.unique_id == Some(unique_id))
    }

    /// Record a category-scoped decode failure.
    pub fn add_diagnostic(&mut self, category: DiagnosticCategory, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(category, message));
    }
}
