use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task identifier as it appears on disk.
///
/// Files written by other tools may carry numeric ids, so both JSON numbers
/// and strings are accepted and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Number(serde_json::Number),
    Text(String),
}

impl TaskId {
    pub fn generate() -> Self {
        TaskId::Text(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Number(n) => write!(f, "{}", n),
            TaskId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        TaskId::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    #[serde(default)]
    pub text: String,
    pub created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(text: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::generate(),
            text: text.into(),
            created,
            due_date: None,
            completed: None,
            skipped: None,
        }
    }
}

/// The whole persisted state: three mutually exclusive task sequences.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub completed: Vec<Task>,
    #[serde(default)]
    pub skipped: Vec<Task>,
}

/// Which sequence of a [`Document`] a task lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Active,
    Completed,
    Skipped,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.completed.is_empty() && self.skipped.is_empty()
    }

    /// Every id in the document, in active, completed, skipped order.
    pub fn all_ids(&self) -> Vec<&TaskId> {
        self.tasks
            .iter()
            .chain(&self.completed)
            .chain(&self.skipped)
            .map(|task| &task.id)
            .collect()
    }

    pub fn locate(&self, id: &TaskId) -> Option<Section> {
        if self.tasks.iter().any(|t| &t.id == id) {
            Some(Section::Active)
        } else if self.completed.iter().any(|t| &t.id == id) {
            Some(Section::Completed)
        } else if self.skipped.iter().any(|t| &t.id == id) {
            Some(Section::Skipped)
        } else {
            None
        }
    }
}
