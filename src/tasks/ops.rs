//! Document mutations and derived queries.
//!
//! Every mutation reports whether the document changed. A `false` return
//! means the document was left exactly as it was.

use chrono::{DateTime, Local, NaiveDate, Utc};

use super::helpers::{find_task_mut, position_of};
use super::types::{Document, Task, TaskId};

impl Document {
    /// Prepends a new active task and returns its id. Empty text is allowed.
    pub fn add_task(&mut self, text: impl Into<String>, now: DateTime<Utc>) -> TaskId {
        let task = Task::new(text, now);
        let id = task.id.clone();
        self.tasks.insert(0, task);
        id
    }

    /// Moves an active task to the end of `completed`, stamping it.
    pub fn complete_task(&mut self, id: &TaskId, now: DateTime<Utc>) -> bool {
        let Some(index) = position_of(&self.tasks, id) else {
            return false;
        };
        let mut task = self.tasks.remove(index);
        task.completed = Some(now);
        self.completed.push(task);
        true
    }

    /// Moves an active task to the end of `skipped`, stamping it.
    pub fn skip_task(&mut self, id: &TaskId, now: DateTime<Utc>) -> bool {
        let Some(index) = position_of(&self.tasks, id) else {
            return false;
        };
        let mut task = self.tasks.remove(index);
        task.skipped = Some(now);
        self.skipped.push(task);
        true
    }

    pub fn update_text(&mut self, id: &TaskId, text: impl Into<String>) -> bool {
        let text = text.into();
        match find_task_mut(&mut self.tasks, id) {
            Some(task) if task.text != text => {
                task.text = text;
                true
            }
            _ => false,
        }
    }

    /// Sets or clears (`None`) the due date of an active task.
    pub fn set_due_date(&mut self, id: &TaskId, due: Option<NaiveDate>) -> bool {
        match find_task_mut(&mut self.tasks, id) {
            Some(task) if task.due_date != due => {
                task.due_date = due;
                true
            }
            _ => false,
        }
    }

    /// Moves the active task at `from` so it ends up at index `to`.
    ///
    /// Out-of-range indices are rejected and leave the sequence untouched.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.tasks.len();
        if from >= len || to >= len || from == to {
            return false;
        }
        let task = self.tasks.remove(from);
        self.tasks.insert(to, task);
        true
    }

    /// Removes a task from `completed` for good.
    pub fn delete_permanently(&mut self, id: &TaskId) -> bool {
        match position_of(&self.completed, id) {
            Some(index) => {
                self.completed.remove(index);
                true
            }
            None => false,
        }
    }
}

/// A task is overdue when its due date falls strictly before `today`.
pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    task.due_date.is_some_and(|due| due < today)
}

/// The current calendar day in the system's local timezone.
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn doc_with(texts: &[&str]) -> Document {
        let mut doc = Document::default();
        for text in texts.iter().rev() {
            doc.add_task(*text, at(0));
        }
        doc
    }

    fn texts(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_add_task_prepends() {
        let mut doc = Document::default();
        doc.add_task("first", at(1));
        let id = doc.add_task("second", at(2));

        assert_eq!(texts(&doc.tasks), vec!["second", "first"]);
        assert_eq!(doc.tasks[0].id, id);
        assert_eq!(doc.tasks[0].created, at(2));
    }

    #[test]
    fn test_add_task_allows_empty_text() {
        let mut doc = Document::default();
        doc.add_task("", at(0));
        assert_eq!(doc.tasks.len(), 1);
        assert_eq!(doc.tasks[0].text, "");
    }

    #[test]
    fn test_complete_moves_and_stamps() {
        let mut doc = doc_with(&["a", "b"]);
        let id = doc.tasks[0].id.clone();

        assert!(doc.complete_task(&id, at(50)));
        assert_eq!(texts(&doc.tasks), vec!["b"]);
        assert_eq!(doc.completed.len(), 1);
        assert_eq!(doc.completed[0].completed, Some(at(50)));
        assert_eq!(doc.completed[0].skipped, None);
    }

    #[test]
    fn test_complete_appends_in_order() {
        let mut doc = doc_with(&["a", "b"]);
        let a = doc.tasks[0].id.clone();
        let b = doc.tasks[1].id.clone();
        doc.complete_task(&b, at(1));
        doc.complete_task(&a, at(2));
        assert_eq!(texts(&doc.completed), vec!["b", "a"]);
    }

    #[test]
    fn test_complete_twice_is_noop() {
        let mut doc = doc_with(&["a"]);
        let id = doc.tasks[0].id.clone();
        doc.complete_task(&id, at(1));
        let snapshot = doc.clone();

        assert!(!doc.complete_task(&id, at(2)));
        assert!(!doc.skip_task(&id, at(2)));
        assert_eq!(doc, snapshot);
    }

    #[test]
    fn test_skip_moves_and_stamps() {
        let mut doc = doc_with(&["a"]);
        let id = doc.tasks[0].id.clone();

        assert!(doc.skip_task(&id, at(9)));
        assert!(doc.tasks.is_empty());
        assert_eq!(doc.skipped[0].skipped, Some(at(9)));
        assert_eq!(doc.skipped[0].completed, None);
    }

    #[test]
    fn test_update_text_in_place() {
        let mut doc = doc_with(&["a", "b", "c"]);
        let id = doc.tasks[1].id.clone();
        let created = doc.tasks[1].created;

        assert!(doc.update_text(&id, "bee"));
        assert_eq!(texts(&doc.tasks), vec!["a", "bee", "c"]);
        assert_eq!(doc.tasks[1].created, created);
    }

    #[test]
    fn test_update_text_ignores_inactive_tasks() {
        let mut doc = doc_with(&["a"]);
        let id = doc.tasks[0].id.clone();
        doc.complete_task(&id, at(1));

        assert!(!doc.update_text(&id, "changed"));
        assert_eq!(doc.completed[0].text, "a");
    }

    #[test]
    fn test_set_and_clear_due_date() {
        let mut doc = doc_with(&["a"]);
        let id = doc.tasks[0].id.clone();
        let due = NaiveDate::from_ymd_opt(2024, 3, 1);

        assert!(doc.set_due_date(&id, due));
        assert_eq!(doc.tasks[0].due_date, due);
        assert!(!doc.set_due_date(&id, due));
        assert!(doc.set_due_date(&id, None));
        assert_eq!(doc.tasks[0].due_date, None);
        assert!(!doc.set_due_date(&TaskId::from("missing"), due));
    }

    #[test]
    fn test_reorder_forward_and_back() {
        let mut doc = doc_with(&["a", "b", "c", "d"]);

        assert!(doc.reorder(0, 2));
        assert_eq!(texts(&doc.tasks), vec!["b", "c", "a", "d"]);

        assert!(doc.reorder(3, 0));
        assert_eq!(texts(&doc.tasks), vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn test_reorder_rejects_out_of_range() {
        let mut doc = doc_with(&["a", "b"]);
        let snapshot = doc.clone();

        assert!(!doc.reorder(2, 0));
        assert!(!doc.reorder(0, 2));
        assert!(!doc.reorder(usize::MAX, 0));
        assert!(!doc.reorder(1, 1));
        assert_eq!(doc, snapshot);

        let mut empty = Document::default();
        assert!(!empty.reorder(0, 0));
    }

    #[test]
    fn test_delete_permanently_only_touches_completed() {
        let mut doc = doc_with(&["a", "b"]);
        let a = doc.tasks[0].id.clone();
        let b = doc.tasks[1].id.clone();
        doc.complete_task(&a, at(1));

        assert!(!doc.delete_permanently(&b));
        assert_eq!(doc.tasks.len(), 1);

        assert!(doc.delete_permanently(&a));
        assert!(doc.completed.is_empty());
        assert!(!doc.delete_permanently(&a));
    }

    #[test]
    fn test_overdue_is_strictly_before_today() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        let mut task = Task::new("x", at(0));
        assert!(!is_overdue(&task, today));

        task.due_date = Some(today - Duration::days(1));
        assert!(is_overdue(&task, today));

        task.due_date = Some(today);
        assert!(!is_overdue(&task, today));

        task.due_date = Some(today + Duration::days(1));
        assert!(!is_overdue(&task, today));
    }
}
