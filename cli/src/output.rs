use tabled::settings::Style;
use tabled::{Table, Tabled};
use tasky_core::{DailySummary, Task};

// Helper struct for Table Row
#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Tags")]
    tags: String,
    #[tabled(rename = "Title")]
    title: String,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            priority: task.priority.to_string(),
            due: format_due(task),
            status: task.status.to_string(),
            tags: task.tags.join(", "),
            title: task.title.clone(),
        }
    }
}

fn format_due(task: &Task) -> String {
    task.due
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    let rows: Vec<TaskRow> = tasks.iter().map(TaskRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
    println!("{} task(s)", tasks.len());
}

pub fn print_task(task: &Task) {
    println!("  ID:        {}", task.id);
    println!("  Title:     {}", task.title);
    println!("  Status:    {}", task.status);
    println!("  Priority:  {}", task.priority);
    println!("  Due:       {}", format_due(task));
    if !task.tags.is_empty() {
        println!("  Tags:      {}", task.tags.join(", "));
    }
    if let Some(notes) = &task.notes {
        println!("  Notes:     {}", notes);
    }
    println!("  Created:   {}", task.created_at.format("%Y-%m-%d %H:%M UTC"));
    if let Some(done) = task.completed_at {
        println!("  Completed: {}", done.format("%Y-%m-%d %H:%M UTC"));
    }
}

pub fn print_summary(summary: &DailySummary) {
    println!("\x1b[1;36m{}\x1b[0m", summary.date.format("%A, %Y-%m-%d"));
    println!("{}", summary.summary);
    if summary.is_empty() {
        return;
    }

    let sections = [
        ("Overdue", &summary.overdue),
        ("Due today", &summary.due_today),
        ("High priority", &summary.high_priority),
        ("Completed today", &summary.completed_today),
    ];
    for (heading, tasks) in sections {
        if tasks.is_empty() {
            continue;
        }
        println!("\n{}:", heading);
        for task in tasks {
            println!("  [{}] {} ({}, due {})", task.id, task.title, task.priority, format_due(task));
        }
    }
}
