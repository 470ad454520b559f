//! Cross-reference resolution.
//!
//! Extraction records only integer unique ids. This single post-parse pass
//! builds the id maps and turns them into direct arena references: the task
//! hierarchy, relation endpoints, assignment links, resource calendars and
//! calendar parent chains. After it runs, no entity points at another by
//! integer key.

use std::collections::HashMap;

use crate::model::{CalendarRef, ProjectFile, RelationRef, ResourceRef, TaskRef};

pub(crate) fn resolve(file: &mut ProjectFile) {
    // Identity maps. Tasks and calendars are first-wins; resources are
    // last-wins so a populated record supersedes a placeholder that shared
    // its id. Unique id 0 is the sentinel and never a link target.
    let mut tasks_by_uid: HashMap<u32, TaskRef> = HashMap::new();
    for (index, task) in file.tasks.iter().enumerate() {
        match task.unique_id {
            Some(uid) if uid != 0 => {
                tasks_by_uid.entry(uid).or_insert(TaskRef(index));
            }
            _ => {}
        }
    }
    let mut resources_by_uid: HashMap<u32, ResourceRef> = HashMap::new();
    for (index, resource) in file.resources.iter().enumerate() {
        match resource.unique_id {
            Some(uid) if uid != 0 => {
                resources_by_uid.insert(uid, ResourceRef(index));
            }
            _ => {}
        }
    }
    let mut calendars_by_uid: HashMap<u32, CalendarRef> = HashMap::new();
    for (index, calendar) in file.calendars.iter().enumerate() {
        match calendar.unique_id {
            Some(uid) if uid != 0 => {
                calendars_by_uid.entry(uid).or_insert(CalendarRef(index));
            }
            _ => {}
        }
    }

    // Task hierarchy.
    for index in 0..file.tasks.len() {
        let Some(parent_uid) = file.tasks[index].parent_unique_id else {
            continue;
        };
        let Some(&parent) = tasks_by_uid.get(&parent_uid) else {
            continue;
        };
        if parent.0 == index {
            continue;
        }
        file.tasks[index].parent = Some(parent);
        file.tasks[parent.0].children.push(TaskRef(index));
    }

    // Relation endpoints. A relation joins the per-task lists only when
    // both ends resolve; a dangling end leaves the relation unlinked but
    // still present in the arena.
    for index in 0..file.relations.len() {
        let source = tasks_by_uid
            .get(&file.relations[index].source_unique_id)
            .copied();
        let target = tasks_by_uid
            .get(&file.relations[index].target_unique_id)
            .copied();
        file.relations[index].source = source;
        file.relations[index].target = target;
        if let (Some(source), Some(target)) = (source, target) {
            file.tasks[target.0].predecessors.push(RelationRef(index));
            file.tasks[source.0].successors.push(RelationRef(index));
        }
    }

    // Assignments.
    for assignment in &mut file.assignments {
        assignment.task = assignment
            .task_unique_id
            .and_then(|uid| tasks_by_uid.get(&uid).copied());
        assignment.resource = assignment
            .resource_unique_id
            .and_then(|uid| resources_by_uid.get(&uid).copied());
    }

    // Resource calendars.
    for resource in &mut file.resources {
        resource.calendar = resource
            .calendar_unique_id
            .and_then(|uid| calendars_by_uid.get(&uid).copied());
    }

    // Calendar parent chain.
    for index in 0..file.calendars.len() {
        let parent = file.calendars[index]
            .parent_unique_id
            .and_then(|uid| calendars_by_uid.get(&uid).copied())
            .filter(|parent| parent.0 != index);
        file.calendars[index].parent = parent;
    }

    // Summary backfill: an explicit flag stands; otherwise a task is a
    // summary when it has children or represents an external project.
    // Null placeholders stay untouched.
    for task in &mut file.tasks {
        if task.summary.is_none() && !task.null_task {
            task.summary = Some(!task.children.is_empty() || task.external_project);
        }
    }
}
