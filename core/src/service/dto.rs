use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::task::{Priority, Status, Task};

/// Input for `TaskService::add`. `due` is free text run through the date
/// parser.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct NewTask {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_due(mut self, due: impl Into<String>) -> Self {
        self.due = Some(due.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Partial update for `TaskService::update`. `None` leaves a field alone.
///
/// A `due` that does not parse clears the due date.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.due.is_none()
            && self.priority.is_none()
            && self.tags.is_none()
            && self.notes.is_none()
    }
}

/// Conjunctive filters for `TaskService::list`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListFilter {
    /// `None` means every status.
    pub status: Option<Status>,
    /// Everything except archived; takes precedence over `status`.
    pub include_completed: bool,
    pub priority: Option<Priority>,
    pub tag: Option<String>,
    /// Due on or before this day.
    pub due_before: Option<NaiveDate>,
    pub due_today: bool,
    pub overdue: bool,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self {
            status: Some(Status::Pending),
            include_completed: false,
            priority: None,
            tag: None,
            due_before: None,
            due_today: false,
            overdue: false,
        }
    }
}

impl ListFilter {
    pub fn any_status() -> Self {
        Self {
            status: None,
            ..Self::default()
        }
    }

    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        if self.include_completed {
            if task.status == Status::Archived {
                return false;
            }
        } else if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }

        if let Some(priority) = self.priority {
            if task.priority != priority {
                return false;
            }
        }

        if let Some(tag) = &self.tag {
            if !task.has_tag(tag) {
                return false;
            }
        }

        if self.due_today && task.due != Some(today) {
            return false;
        }

        if self.overdue && !matches!(task.due, Some(d) if d < today) {
            return false;
        }

        if let Some(before) = self.due_before {
            if !matches!(task.due, Some(d) if d <= before) {
                return false;
            }
        }

        true
    }
}
