use chrono::NaiveDateTime;
use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::server::database::impl_document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
pub(crate) enum TaskStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    #[display("In Progress")]
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        self == next
            || matches!(
                (self, next),
                (Pending, InProgress | Completed) | (InProgress, Pending | Completed)
            )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
pub(crate) enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

pub(crate) const UNASSIGNED: &str = "Unassigned";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HousekeepingTask {
    #[serde(default)]
    pub id: String,
    pub room_id: String,
    pub room_number: String,
    #[serde(rename = "type")]
    pub task_type: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub assigned_to: String,
    #[serde(default)]
    pub assigned_to_id: Option<String>,
    pub due_date: NaiveDateTime,
    #[serde(default)]
    pub notes: String,
}

impl_document!(HousekeepingTask, "housekeeping_tasks", "task");

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TaskPayload {
    pub room_id: String,
    #[serde(rename = "type")]
    pub task_type: String,
    #[serde(default)]
    pub priority: Priority,
    pub assigned_to_id: Option<String>,
    pub due_date: NaiveDateTime,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct TaskFilter {
    pub status: Option<TaskStatus>,
    /// assignee name, exact
    pub assignee: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &HousekeepingTask) -> bool {
        self.status.map_or(true, |s| task.status == s)
            && self
                .assignee
                .as_deref()
                .filter(|a| !a.is_empty() && *a != "all")
                .map_or(true, |a| task.assigned_to == a)
    }
}
