use chrono::{Local, NaiveDate};
use std::fmt::Write;

use crate::tasks::{is_overdue, Document, Task};

pub struct ViewOptions<'a> {
    pub title: &'a str,
    pub show_completed: bool,
    pub unsaved: bool,
}

/// Renders the whole document as plain text. Overdue markers are computed
/// against `today` on every call.
pub fn render(data: &Document, options: &ViewOptions<'_>, today: NaiveDate) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Neptune - {}", options.title);
    if options.unsaved {
        let _ = writeln!(out, "(unsaved changes - type `retry` to save again)");
    }
    out.push('\n');

    if data.tasks.is_empty() {
        out.push_str("No tasks yet\n");
        out.push_str("Type `add <text>` to add a task or `drop <file>...` to create tasks from file names\n");
    } else {
        for (index, task) in data.tasks.iter().enumerate() {
            let _ = writeln!(out, "{:>3}. [ ] {}", index + 1, active_line(task, today));
        }
    }

    if !data.completed.is_empty() {
        out.push('\n');
        if options.show_completed {
            let _ = writeln!(out, "Completed ({}) - type `completed` to hide", data.completed.len());
            for (index, task) in data.completed.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "{:>3}. [x] {}{}",
                    index + 1,
                    label(task),
                    completed_date(task)
                );
            }
        } else {
            let _ = writeln!(out, "Completed ({}) - type `completed` to show", data.completed.len());
        }
    }

    if !data.skipped.is_empty() {
        let _ = writeln!(out, "Skipped: {}", data.skipped.len());
    }

    out
}

fn label(task: &Task) -> &str {
    if task.text.is_empty() {
        "(empty)"
    } else {
        &task.text
    }
}

fn active_line(task: &Task, today: NaiveDate) -> String {
    match task.due_date {
        Some(due) if is_overdue(task, today) => {
            format!("{}  (due {}, OVERDUE)", label(task), due.format("%Y-%m-%d"))
        }
        Some(due) => format!("{}  (due {})", label(task), due.format("%Y-%m-%d")),
        None => label(task).to_string(),
    }
}

fn completed_date(task: &Task) -> String {
    task.completed
        .map(|at| format!("  {}", at.with_timezone(&Local).format("%Y-%m-%d")))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
    }

    fn options(show_completed: bool) -> ViewOptions<'static> {
        ViewOptions {
            title: "list.todo",
            show_completed,
            unsaved: false,
        }
    }

    #[test]
    fn test_empty_state() {
        let text = render(&Document::default(), &options(false), today());
        assert!(text.starts_with("Neptune - list.todo\n"));
        assert!(text.contains("No tasks yet"));
        assert!(!text.contains("Completed"));
        assert!(!text.contains("Skipped"));
    }

    #[test]
    fn test_active_tasks_numbered_in_order() {
        let mut data = Document::default();
        data.add_task("second", Utc::now());
        data.add_task("first", Utc::now());
        data.add_task("", Utc::now());

        let text = render(&data, &options(false), today());
        let lines: Vec<&str> = text.lines().filter(|l| l.contains("[ ]")).collect();
        assert_eq!(lines, vec!["  1. [ ] (empty)", "  2. [ ] first", "  3. [ ] second"]);
    }

    #[test]
    fn test_overdue_marker() {
        let mut data = Document::default();
        let late = data.add_task("late", Utc::now());
        let due_today = data.add_task("today", Utc::now());
        data.set_due_date(&late, Some(today() - Duration::days(1)));
        data.set_due_date(&due_today, Some(today()));

        let text = render(&data, &options(false), today());
        assert!(text.contains("late  (due 2024-05-14, OVERDUE)"));
        assert!(text.contains("today  (due 2024-05-15)\n"));
    }

    #[test]
    fn test_completed_section_toggle() {
        let mut data = Document::default();
        let id = data.add_task("shipped", Utc::now());
        data.complete_task(&id, Utc::now());

        let hidden = render(&data, &options(false), today());
        assert!(hidden.contains("Completed (1) - type `completed` to show"));
        assert!(!hidden.contains("shipped"));

        let shown = render(&data, &options(true), today());
        assert!(shown.contains("Completed (1) - type `completed` to hide"));
        assert!(shown.contains("  1. [x] shipped  "));
    }

    #[test]
    fn test_skipped_count_and_unsaved_banner() {
        let mut data = Document::default();
        let id = data.add_task("nah", Utc::now());
        data.skip_task(&id, Utc::now());

        let opts = ViewOptions {
            title: "list.todo",
            show_completed: false,
            unsaved: true,
        };
        let text = render(&data, &opts, today());
        assert!(text.contains("Skipped: 1"));
        assert!(text.contains("unsaved changes"));
    }
}
