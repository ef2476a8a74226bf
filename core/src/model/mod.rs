pub mod summary;
pub mod task;
