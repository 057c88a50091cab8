use std::collections::HashMap;
use std::path::Path;

use tracing::warn;

use crate::error::TaskError;
use crate::store::Task;

/// File name of the task snapshot inside `data_dir`.
pub const SNAPSHOT_FILE: &str = "tasks.json";

/// Load the snapshot, returning an empty map when the file does not exist.
///
/// An unreadable or corrupt snapshot is not fatal: the server logs a warning
/// and starts empty rather than refusing to boot.
pub fn load(path: &Path) -> HashMap<String, Task> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
        Err(err) => {
            warn!(path = %path.display(), err = %err, "cannot read task snapshot — starting empty");
            return HashMap::new();
        }
    };
    match serde_json::from_str::<Vec<Task>>(&contents) {
        Ok(tasks) => tasks
            .into_iter()
            .map(|task| (task.name.clone(), task))
            .collect(),
        Err(err) => {
            warn!(path = %path.display(), err = %err, "task snapshot corrupt — starting empty");
            HashMap::new()
        }
    }
}

/// Write the full task set as pretty-printed JSON via temp file + rename, so
/// a crash mid-write never leaves a truncated snapshot behind.
pub async fn save(path: &Path, tasks: &HashMap<String, Task>) -> Result<(), TaskError> {
    let mut rows: Vec<&Task> = tasks.values().collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    let data = serde_json::to_string_pretty(&rows)?;

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, data.as_bytes()).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
