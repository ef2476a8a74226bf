use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, TrackerError};
use crate::model::task::Task;
use crate::repository::traits::TaskRepository;

const DEFAULT_FILE_NAME: &str = "tasks.json";
const DEFAULT_DIR_NAME: &str = ".tasky";

/// `~/.tasky`
pub fn default_data_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| TrackerError::Config("Could not determine home directory".to_string()))?;
    Ok(home_dir.join(DEFAULT_DIR_NAME))
}

/// Stores the collection as a pretty-printed JSON array in `tasks.json`.
#[derive(Clone, Debug)]
pub struct FileTaskRepository {
    file_path: PathBuf,
}

impl FileTaskRepository {
    /// Uses `base_dir`, or [`default_data_dir`] when `None`. The directory is
    /// created if missing; the file is not written until the first save.
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        let dir = match base_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        fs::create_dir_all(&dir)?;
        let file_path = dir.join(DEFAULT_FILE_NAME);
        tracing::debug!(path = %file_path.display(), "using task file");
        Ok(FileTaskRepository { file_path })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn temp_path(&self) -> PathBuf {
        self.file_path.with_extension("json.tmp")
    }
}

impl TaskRepository for FileTaskRepository {
    fn load_all(&self) -> Result<Vec<Task>> {
        let file = match File::open(&self.file_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let reader = BufReader::new(file);
        let tasks: Vec<Task> = serde_json::from_reader(reader)?;
        Ok(tasks)
    }

    fn save_all(&self, tasks: &[Task]) -> Result<()> {
        // Write beside the target, then swap it in.
        let tmp = self.temp_path();
        {
            let file = File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, tasks)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp, &self.file_path)?;
        tracing::debug!(count = tasks.len(), "saved tasks");
        Ok(())
    }
}
