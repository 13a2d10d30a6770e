use chrono::{Duration, NaiveDate};
use std::path::PathBuf;
use thiserror::Error;

/// One user action against the rendered list. Indices are zero-based
/// positions in the order the list was last shown.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add(String),
    DropFiles(Vec<PathBuf>),
    Complete(usize),
    Skip(usize),
    Edit(usize, String),
    Due(usize, Option<NaiveDate>),
    Move { from: usize, to: usize },
    Delete(usize),
    ToggleCompleted,
    Retry,
    Reload,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("Unknown command `{0}`. Type `help` for the list of commands.")]
    Unknown(String),
    #[error("Missing {0}")]
    MissingArgument(&'static str),
    #[error("`{0}` is not a task number")]
    InvalidIndex(String),
    #[error("`{0}` is not a date (use YYYY-MM-DD, today, tomorrow or none)")]
    InvalidDate(String),
}

pub const HELP: &str = "\
Commands (numbers refer to the list as shown):
  add [text]              add a task at the top (empty text allowed)
  drop <file>...          add one task per file, named after the file
                          (quote names with spaces: \"My Report.pdf\")
  done <n>                mark task n completed
  skip <n>                mark task n skipped
  edit <n> <text>         change the text of task n
  due <n> <date>          set due date: YYYY-MM-DD, today, tomorrow or none
  move <from> <to>        move a task to another position
  delete <n>              permanently delete completed task n
  completed               show or hide completed tasks
  retry                   retry a save that failed
  reload                  re-read the file from disk
  help                    show this help
  quit                    exit";

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str, today: NaiveDate) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_lowercase().as_str() {
        "add" | "a" => Command::Add(rest.to_string()),
        "drop" => {
            let files: Vec<PathBuf> = split_quoted(rest).into_iter().map(PathBuf::from).collect();
            if files.is_empty() {
                return Err(CommandError::MissingArgument("file to drop"));
            }
            Command::DropFiles(files)
        }
        "done" | "d" => Command::Complete(parse_index(rest)?),
        "skip" | "s" => Command::Skip(parse_index(rest)?),
        "edit" | "e" => {
            let (index, text) = split_first(rest);
            Command::Edit(parse_index(index)?, text.to_string())
        }
        "due" => {
            let (index, date) = split_first(rest);
            let index = parse_index(index)?;
            Command::Due(index, parse_due(date, today)?)
        }
        "move" | "mv" => {
            let (from, to) = split_first(rest);
            Command::Move {
                from: parse_index(from)?,
                to: parse_index(to)?,
            }
        }
        "delete" | "rm" => Command::Delete(parse_index(rest)?),
        "completed" | "c" => Command::ToggleCompleted,
        "retry" => Command::Retry,
        "reload" => Command::Reload,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        _ => return Err(CommandError::Unknown(verb.to_string())),
    };

    Ok(Some(command))
}

fn split_first(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim()),
        None => (input, ""),
    }
}

/// Splits on whitespace, keeping double-quoted runs together. An unclosed
/// quote runs to the end of the line.
fn split_quoted(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in input.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        args.push(current);
    }
    args
}

/// Converts a 1-based task number to a 0-based index.
fn parse_index(input: &str) -> Result<usize, CommandError> {
    if input.is_empty() {
        return Err(CommandError::MissingArgument("task number"));
    }
    match input.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(CommandError::InvalidIndex(input.to_string())),
    }
}

fn parse_due(input: &str, today: NaiveDate) -> Result<Option<NaiveDate>, CommandError> {
    match input.to_lowercase().as_str() {
        "" => Err(CommandError::MissingArgument("due date")),
        "none" | "clear" | "-" => Ok(None),
        "today" => Ok(Some(today)),
        "tomorrow" => Ok(Some(today + Duration::days(1))),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| CommandError::InvalidDate(input.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
    }

    fn parse_ok(line: &str) -> Command {
        parse(line, today()).unwrap().unwrap()
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(parse("   ", today()), Ok(None));
    }

    #[test]
    fn test_add_keeps_text_verbatim() {
        assert_eq!(parse_ok("add buy  milk"), Command::Add("buy  milk".to_string()));
        assert_eq!(parse_ok("add"), Command::Add(String::new()));
        assert_eq!(parse_ok("A call mom"), Command::Add("call mom".to_string()));
    }

    #[test]
    fn test_indices_are_one_based() {
        assert_eq!(parse_ok("done 1"), Command::Complete(0));
        assert_eq!(parse_ok("skip 3"), Command::Skip(2));
        assert_eq!(parse_ok("delete 2"), Command::Delete(1));
        assert_eq!(parse_ok("move 4 1"), Command::Move { from: 3, to: 0 });
    }

    #[test]
    fn test_bad_indices() {
        assert_eq!(
            parse("done 0", today()),
            Err(CommandError::InvalidIndex("0".to_string()))
        );
        assert_eq!(
            parse("done x", today()),
            Err(CommandError::InvalidIndex("x".to_string()))
        );
        assert_eq!(
            parse("done", today()),
            Err(CommandError::MissingArgument("task number"))
        );
        assert!(parse("move 1", today()).is_err());
    }

    #[test]
    fn test_edit() {
        assert_eq!(
            parse_ok("edit 2 new text here"),
            Command::Edit(1, "new text here".to_string())
        );
        assert_eq!(parse_ok("edit 1"), Command::Edit(0, String::new()));
    }

    #[test]
    fn test_due_dates() {
        assert_eq!(
            parse_ok("due 1 2024-06-01"),
            Command::Due(0, NaiveDate::from_ymd_opt(2024, 6, 1))
        );
        assert_eq!(parse_ok("due 1 today"), Command::Due(0, Some(today())));
        assert_eq!(
            parse_ok("due 1 Tomorrow"),
            Command::Due(0, NaiveDate::from_ymd_opt(2024, 5, 16))
        );
        assert_eq!(parse_ok("due 1 none"), Command::Due(0, None));
        assert_eq!(
            parse("due 1 soon", today()),
            Err(CommandError::InvalidDate("soon".to_string()))
        );
        assert_eq!(
            parse("due 1", today()),
            Err(CommandError::MissingArgument("due date"))
        );
    }

    #[test]
    fn test_drop_files() {
        assert_eq!(
            parse_ok("drop a.txt /tmp/b.pdf"),
            Command::DropFiles(vec![PathBuf::from("a.txt"), PathBuf::from("/tmp/b.pdf")])
        );
        assert!(parse("drop", today()).is_err());
    }

    #[test]
    fn test_drop_quoted_names_with_spaces() {
        assert_eq!(
            parse_ok(r#"drop "My Report.pdf" notes.txt "/tmp/a b/c d.png""#),
            Command::DropFiles(vec![
                PathBuf::from("My Report.pdf"),
                PathBuf::from("notes.txt"),
                PathBuf::from("/tmp/a b/c d.png"),
            ])
        );
        assert_eq!(
            parse_ok(r#"drop "Unclosed name.txt"#),
            Command::DropFiles(vec![PathBuf::from("Unclosed name.txt")])
        );
        assert!(parse(r#"drop """#, today()).is_err());
    }

    #[test]
    fn test_simple_verbs() {
        assert_eq!(parse_ok("completed"), Command::ToggleCompleted);
        assert_eq!(parse_ok("retry"), Command::Retry);
        assert_eq!(parse_ok("reload"), Command::Reload);
        assert_eq!(parse_ok("help"), Command::Help);
        assert_eq!(parse_ok("QUIT"), Command::Quit);
    }

    #[test]
    fn test_unknown_verb() {
        assert_eq!(
            parse("frobnicate 1", today()),
            Err(CommandError::Unknown("frobnicate".to_string()))
        );
    }
}
