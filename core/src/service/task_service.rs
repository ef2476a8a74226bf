use chrono::NaiveDate;

use crate::error::{Result, TrackerError};
use crate::model::summary::DailySummary;
use crate::model::task::{generate_id, Priority, Status, Task};
use crate::priority::infer_priority_on;
use crate::repository::TaskRepository;
use crate::service::dto::{ListFilter, NewTask, TaskUpdate};
use crate::time::{self, parse_due_date_on};

/// CRUD, queries and the daily digest over a task collection.
///
/// Each call loads the whole collection from the repository and, if it
/// changes anything, writes the whole collection back. There is no locking
/// here; callers that share a service across threads serialize access
/// themselves.
pub struct TaskService<R: TaskRepository> {
    repo: R,
    today: Option<NaiveDate>,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo, today: None }
    }

    /// Pins "today" instead of reading the local clock.
    pub fn with_today(repo: R, today: NaiveDate) -> Self {
        Self {
            repo,
            today: Some(today),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(time::today)
    }

    pub fn add(&self, new_task: NewTask) -> Result<Task> {
        if new_task.title.trim().is_empty() {
            return Err(TrackerError::Validation("title is required".to_string()));
        }
        let today = self.today();

        let due = new_task.due.as_deref().and_then(|text| {
            let parsed = parse_due_date_on(text, today);
            if parsed.is_none() {
                tracing::warn!(due = text, "unrecognised due date, leaving it unset");
            }
            parsed
        });
        let priority = new_task
            .priority
            .unwrap_or_else(|| infer_priority_on(&new_task.title, due, &new_task.tags, today));

        let mut tasks = self.repo.load_all()?;

        let mut task = Task::new(new_task.title, priority, due);
        while tasks.iter().any(|t| t.id == task.id) {
            task.id = generate_id();
        }
        task.tags = new_task.tags;
        task.notes = new_task.notes;

        tasks.push(task.clone());
        self.repo.save_all(&tasks)?;

        tracing::info!(id = %task.id, priority = %task.priority, due = ?task.due, "task added");
        Ok(task)
    }

    pub fn get(&self, id: &str) -> Result<Option<Task>> {
        let tasks = self.repo.load_all()?;
        Ok(tasks.into_iter().find(|t| t.id == id))
    }

    /// Filtered tasks, sorted by priority then due date (undated last).
    pub fn list(&self, filter: &ListFilter) -> Result<Vec<Task>> {
        let today = self.today();
        let mut tasks: Vec<Task> = self
            .repo
            .load_all()?
            .into_iter()
            .filter(|t| filter.matches(t, today))
            .collect();
        sort_tasks(&mut tasks);
        tracing::debug!(count = tasks.len(), "listed tasks");
        Ok(tasks)
    }

    /// Completes the task with this id, or else the first task whose title
    /// contains `token`. Completing twice keeps the first `completed_at`.
    pub fn complete(&self, token: &str) -> Result<Option<Task>> {
        let mut tasks = self.repo.load_all()?;
        let Some(index) = find_task_index(&tasks, token) else {
            return Ok(None);
        };

        let task = &mut tasks[index];
        if task.status != Status::Pending {
            return Ok(Some(task.clone()));
        }
        task.complete();
        let completed = task.clone();

        self.repo.save_all(&tasks)?;
        tracing::info!(id = %completed.id, "task completed");
        Ok(Some(completed))
    }

    /// Archives (or with `archive == false` removes) the task matched the
    /// same way as [`TaskService::complete`].
    pub fn delete(&self, token: &str, archive: bool) -> Result<Option<Task>> {
        let mut tasks = self.repo.load_all()?;
        let Some(index) = find_task_index(&tasks, token) else {
            return Ok(None);
        };

        let task = if archive {
            tasks[index].archive();
            tasks[index].clone()
        } else {
            tasks.remove(index)
        };

        self.repo.save_all(&tasks)?;
        tracing::info!(id = %task.id, archive, "task deleted");
        Ok(Some(task))
    }

    /// Exact id only; there is no title fallback here.
    pub fn update(&self, id: &str, changes: TaskUpdate) -> Result<Option<Task>> {
        if matches!(&changes.title, Some(title) if title.trim().is_empty()) {
            return Err(TrackerError::Validation("title cannot be empty".to_string()));
        }
        let today = self.today();

        let mut tasks = self.repo.load_all()?;
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            task.title = title;
        }
        if let Some(due) = changes.due {
            task.due = parse_due_date_on(&due, today);
            if task.due.is_none() && !due.trim().is_empty() {
                tracing::warn!(id, due = %due, "unrecognised due date, clearing it");
            }
        }
        if let Some(priority) = changes.priority {
            task.priority = priority;
        }
        if let Some(tags) = changes.tags {
            task.tags = tags;
        }
        if let Some(notes) = changes.notes {
            task.notes = Some(notes);
        }
        let updated = task.clone();

        self.repo.save_all(&tasks)?;
        tracing::info!(id, "task updated");
        Ok(Some(updated))
    }

    /// Buckets for `target` (defaults to today). Only pending tasks count as
    /// due today, overdue or high priority; high priority skips tasks already
    /// due on the day. Completions are bucketed by their UTC calendar date.
    pub fn daily_summary(&self, target: Option<NaiveDate>) -> Result<DailySummary> {
        let date = target.unwrap_or_else(|| self.today());
        let tasks = self.repo.load_all()?;

        let mut due_today = Vec::new();
        let mut overdue = Vec::new();
        let mut completed_today = Vec::new();
        let mut high_priority = Vec::new();

        for task in tasks {
            if task.status == Status::Completed
                && task
                    .completed_at
                    .map(|at| at.date_naive())
                    == Some(date)
            {
                completed_today.push(task.clone());
            }

            if !task.is_pending() {
                continue;
            }

            match task.due {
                Some(due) if due == date => due_today.push(task.clone()),
                Some(due) if due < date => overdue.push(task.clone()),
                _ => {}
            }

            if task.priority == Priority::High && task.due != Some(date) {
                high_priority.push(task);
            }
        }

        for bucket in [&mut due_today, &mut overdue, &mut high_priority] {
            bucket.sort_by_key(|t| t.priority.rank());
        }

        Ok(DailySummary::new(
            date,
            due_today,
            overdue,
            completed_today,
            high_priority,
        ))
    }

    /// Case-insensitive match on title, notes or any tag. Archived tasks are
    /// skipped and storage order is kept.
    pub fn search(&self, query: &str) -> Result<Vec<Task>> {
        let query = query.to_lowercase();
        let tasks = self.repo.load_all()?;
        let results: Vec<Task> = tasks
            .into_iter()
            .filter(|t| t.status != Status::Archived)
            .filter(|t| {
                t.title.to_lowercase().contains(&query)
                    || t
                        .notes
                        .as_deref()
                        .is_some_and(|n| n.to_lowercase().contains(&query))
                    || t.tags.iter().any(|tag| tag.to_lowercase().contains(&query))
            })
            .collect();
        tracing::debug!(query = %query, count = results.len(), "searched tasks");
        Ok(results)
    }
}

/// Exact id first, then the first title containing `token`, ignoring case.
fn find_task_index(tasks: &[Task], token: &str) -> Option<usize> {
    if token.trim().is_empty() {
        return None;
    }
    if let Some(pos) = tasks.iter().position(|t| t.id == token) {
        return Some(pos);
    }
    let needle = token.to_lowercase();
    tasks
        .iter()
        .position(|t| t.title.to_lowercase().contains(&needle))
}

/// Stable sort by priority rank, then due date with undated tasks last.
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by_key(|t| (t.priority.rank(), t.due.unwrap_or(NaiveDate::MAX)));
}
