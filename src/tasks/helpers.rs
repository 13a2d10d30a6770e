use super::types::{Task, TaskId};

pub fn find_task_mut<'a>(tasks: &'a mut [Task], id: &TaskId) -> Option<&'a mut Task> {
    tasks.iter_mut().find(|task| &task.id == id)
}

pub fn position_of(tasks: &[Task], id: &TaskId) -> Option<usize> {
    tasks.iter().position(|task| &task.id == id)
}

/// Task label derived from a dropped file: its final path component.
pub fn label_from_path(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
