use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::duration::Duration;
use super::project::{RelationRef, TaskRef};

/// The type of dependency between two tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationType {
    FinishToFinish,
    FinishToStart,
    StartToFinish,
    StartToStart,
}

impl RelationType {
    /// Decode the on-disk relation type code. Codes above 3 are invalid and
    /// decode to `None`; such records are dropped during extraction.
    pub fn from_code(code: u16) -> Option<RelationType> {
        match code {
            0 => Some(RelationType::FinishToFinish),
            1 => Some(RelationType::FinishToStart),
            2 => Some(RelationType::StartToFinish),
            3 => Some(RelationType::StartToStart),
            _ => None,
        }
    }
}

/// A dependency link between two tasks.
///
/// `source` is the predecessor and `target` the successor. During extraction
/// only the UniqueIDs are known; the resolution pass fills in the refs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub source_unique_id: u32,
    pub target_unique_id: u32,
    pub kind: RelationType,
    pub lag: Option<Duration>,
    /// Resolved predecessor task, populated by the resolution pass.
    pub source: Option<TaskRef>,
    /// Resolved successor task, populated by the resolution pass.
    pub target: Option<TaskRef>,
}

/// A scheduling constraint on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintType {
    AsSoonAsPossible,
    AsLateAsPossible,
    MustStartOn,
    MustFinishOn,
    StartNoEarlierThan,
    StartNoLaterThan,
    FinishNoEarlierThan,
    FinishNoLaterThan,
}

impl ConstraintType {
    /// Decode the on-disk constraint code. Unknown codes decode as
    /// `AsSoonAsPossible`.
    pub fn from_code(code: u16) -> ConstraintType {
        match code {
            1 => ConstraintType::AsLateAsPossible,
            2 => ConstraintType::MustStartOn,
            3 => ConstraintType::MustFinishOn,
            4 => ConstraintType::StartNoEarlierThan,
            5 => ConstraintType::StartNoLaterThan,
            6 => ConstraintType::FinishNoEarlierThan,
            7 => ConstraintType::FinishNoLaterThan,
            _ => ConstraintType::AsSoonAsPossible,
        }
    }
}

/// A single task as decoded from the file.
///
/// Every field except the two identifiers is optional: damaged or absent
/// fields decode to `None` rather than failing the record, and null-task
/// placeholder rows carry nothing but their identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Task {
    /// Stable identity; the only key other entities may reference.
    pub unique_id: Option<u32>,
    /// Positional identifier. Display order only, never used for linking.
    pub id: Option<u32>,
    pub name: Option<String>,
    pub start: Option<NaiveDateTime>,
    pub finish: Option<NaiveDateTime>,
    pub actual_start: Option<NaiveDateTime>,
    pub actual_finish: Option<NaiveDateTime>,
    pub duration: Option<Duration>,
    pub work: Option<Duration>,
    pub cost: Option<f64>,
    pub percent_complete: Option<f64>,
    pub priority: Option<u32>,
    pub constraint_type: Option<ConstraintType>,
    pub constraint_date: Option<NaiveDateTime>,
    pub outline_level: Option<u16>,
    pub milestone: bool,
    /// Explicit summary flag when the file carries one; otherwise back-filled
    /// from "has children" by the resolution pass.
    pub summary: Option<bool>,
    /// True when the task represents an inserted external project.
    pub external_project: bool,
    /// True for a 16-byte placeholder row: a deleted or reserved slot that
    /// keeps record alignment and carries only UniqueID and ID.
    pub null_task: bool,

    /// Parent task UniqueID as decoded; resolved into `parent`.
    pub parent_unique_id: Option<u32>,
    /// Resolved parent link, populated by the resolution pass.
    pub parent: Option<TaskRef>,
    /// Resolved child links in file order, populated by the resolution pass.
    pub children: Vec<TaskRef>,
    /// Relations in which this task is the successor.
    pub predecessors: Vec<RelationRef>,
    /// Relations in which this task is the predecessor.
    pub successors: Vec<RelationRef>,
}

impl Task {
    /// A placeholder task decoded from a 16-byte null-task record.
    pub fn null_task(unique_id: u32, id: u32) -> Self {
        Self {
            unique_id: Some(unique_id),
            id: Some(id),
            null_task: true,
            ..Self::default()
        }
    }

    /// Summary state; `false` until decoded or derived.
    pub fn is_summary(&self) -> bool {
        self.summary.unwrap_or(false)
    }
}
