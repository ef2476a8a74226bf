use std::cell::RefCell;

use crate::error::Result;
use crate::model::task::Task;
use crate::repository::traits::TaskRepository;

/// Keeps the collection in memory. Nothing survives the process.
#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    tasks: RefCell<Vec<Task>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: RefCell::new(tasks),
        }
    }
}

impl TaskRepository for InMemoryTaskRepository {
    fn load_all(&self) -> Result<Vec<Task>> {
        Ok(self.tasks.borrow().clone())
    }

    fn save_all(&self, tasks: &[Task]) -> Result<()> {
        *self.tasks.borrow_mut() = tasks.to_vec();
        Ok(())
    }
}
