use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::task::Task;

pub const NOTHING_TO_DO: &str = "No tasks for today. Enjoy!";

/// Day digest produced by `TaskService::daily_summary`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub due_today: Vec<Task>,
    pub overdue: Vec<Task>,
    pub completed_today: Vec<Task>,
    pub high_priority: Vec<Task>,
    pub summary: String,
}

impl DailySummary {
    pub fn new(
        date: NaiveDate,
        due_today: Vec<Task>,
        overdue: Vec<Task>,
        completed_today: Vec<Task>,
        high_priority: Vec<Task>,
    ) -> Self {
        let summary = format_digest(&due_today, &overdue, &completed_today, &high_priority);
        Self {
            date,
            due_today,
            overdue,
            completed_today,
            high_priority,
            summary,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.due_today.is_empty()
            && self.overdue.is_empty()
            && self.completed_today.is_empty()
            && self.high_priority.is_empty()
    }
}

fn format_digest(
    due_today: &[Task],
    overdue: &[Task],
    completed_today: &[Task],
    high_priority: &[Task],
) -> String {
    let mut lines = Vec::new();

    if !overdue.is_empty() {
        lines.push(format!("{} overdue task(s)", overdue.len()));
    }
    if !due_today.is_empty() {
        lines.push(format!("{} task(s) due today", due_today.len()));
    }
    if !high_priority.is_empty() {
        lines.push(format!("{} high priority task(s)", high_priority.len()));
    }
    if !completed_today.is_empty() {
        lines.push(format!("{} completed today", completed_today.len()));
    }

    if lines.is_empty() {
        return NOTHING_TO_DO.to_string();
    }
    lines.join("\n")
}
