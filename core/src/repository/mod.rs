pub mod file;
pub mod memory;
pub mod traits;

// Re-export
pub use file::{default_data_dir, FileTaskRepository};
pub use memory::InMemoryTaskRepository;
pub use traits::TaskRepository;
