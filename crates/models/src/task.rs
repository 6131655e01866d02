use serde::{Deserialize, Serialize};

use crate::errors::{require, ModelError};
use crate::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Target of the completion checkbox: completed tasks go back to in-progress.
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Completed => TaskStatus::InProgress,
            TaskStatus::Pending | TaskStatus::InProgress => TaskStatus::Completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Id,
    #[serde(default, alias = "eventId", skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Id>,
    pub description: String,
    pub owner: String,
    #[serde(default)]
    pub status: TaskStatus,
}

impl Task {
    pub fn draft(&self) -> TaskDraft {
        TaskDraft { description: self.description.clone(), owner: self.owner.clone() }
    }
}

/// Raw form input for creating or editing a task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub description: String,
    pub owner: String,
}

impl TaskDraft {
    pub fn validate(&self) -> Result<TaskFields, ModelError> {
        Ok(TaskFields {
            description: require("description", &self.description)?,
            owner: require("owner", &self.owner)?,
        })
    }
}

/// Validated body of `POST /events/{id}/tasks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskFields {
    pub description: String,
    pub owner: String,
}

/// Partial body of `PUT /tasks/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self { status: Some(status), ..Self::default() }
    }

    pub fn apply(&self, task: &mut Task) {
        if let Some(d) = &self.description {
            task.description = d.clone();
        }
        if let Some(o) = &self.owner {
            task.owner = o.clone();
        }
        if let Some(s) = self.status {
            task.status = s;
        }
    }
}

impl From<TaskFields> for TaskPatch {
    fn from(f: TaskFields) -> Self {
        Self { description: Some(f.description), owner: Some(f.owner), status: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_spaced_wire_name() {
        assert_eq!(serde_json::to_string(&TaskStatus::InProgress).unwrap(), r#""In Progress""#);
        let s: TaskStatus = serde_json::from_str(r#""Completed""#).unwrap();
        assert_eq!(s, TaskStatus::Completed);
    }

    #[test]
    fn toggle_cycles_between_completed_and_in_progress() {
        assert_eq!(TaskStatus::Pending.toggled(), TaskStatus::Completed);
        assert_eq!(TaskStatus::Completed.toggled(), TaskStatus::InProgress);
        assert_eq!(TaskStatus::InProgress.toggled(), TaskStatus::Completed);
    }

    #[test]
    fn draft_requires_both_fields() {
        let draft = TaskDraft { description: "Book venue".into(), owner: " ".into() };
        assert_eq!(draft.validate().unwrap_err(), ModelError::required("owner"));
    }

    #[test]
    fn status_patch_serializes_only_status() {
        let body = serde_json::to_value(TaskPatch::status(TaskStatus::Completed)).unwrap();
        assert_eq!(body, serde_json::json!({"status": "Completed"}));
    }
}
