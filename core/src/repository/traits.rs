use crate::error::Result;
use crate::model::task::Task;

/// Whole-collection persistence: every operation reads everything, mutates
/// in memory, and writes everything back.
pub trait TaskRepository {
    /// Returns an empty collection when nothing has been saved yet.
    fn load_all(&self) -> Result<Vec<Task>>;
    /// Replaces the stored collection.
    fn save_all(&self, tasks: &[Task]) -> Result<()>;
}

impl<R: TaskRepository + ?Sized> TaskRepository for &R {
    fn load_all(&self) -> Result<Vec<Task>> {
        (**self).load_all()
    }

    fn save_all(&self, tasks: &[Task]) -> Result<()> {
        (**self).save_all(tasks)
    }
}
