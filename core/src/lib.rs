pub mod error;
pub mod input;
pub mod model;
pub mod priority;
pub mod repository;
pub mod service;
pub mod time;

pub use error::{Result, TrackerError};
pub use input::{expand_key, normalize_metadata, parse_args, split_tags, ParsedInput, TASK_KEYS};
pub use model::summary::DailySummary;
pub use model::task::{Priority, Status, Task};
pub use priority::{infer_priority, infer_priority_on};
pub use repository::{default_data_dir, FileTaskRepository, InMemoryTaskRepository, TaskRepository};
pub use service::dto::{ListFilter, NewTask, TaskUpdate};
pub use service::task_service::{sort_tasks, TaskService};
pub use time::{parse_due_date, parse_due_date_on};
