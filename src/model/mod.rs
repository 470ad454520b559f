pub mod calendar;
pub mod duration;
pub mod project;
pub mod resource;
pub mod task;

pub use calendar::{
    CalendarDay, CalendarException, DayType, ProjectCalendar, Recurrence, RecurrenceKind, TimeRange,
};
pub use duration::{Duration, Rate, TimeUnit};
pub use project::{
    AssignmentRef, CalendarRef, Diagnostic, DiagnosticCategory, FileFormat, ProjectFile,
    ProjectProperties, RelationRef, ResourceRef, ScheduleFrom, TaskRef,
};
pub use resource::{Resource, ResourceAssignment};
pub use task::{ConstraintType, Relation, RelationType, Task};
