pub mod snapshot;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::error::TaskError;

// ─── Status ───────────────────────────────────────────────────────────────────

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Pending,
    InProgress,
    Completed,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in-progress",
            Status::Completed => "completed",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Status::Pending),
            "in-progress" => Ok(Status::InProgress),
            "completed" => Ok(Status::Completed),
            other => Err(TaskError::InvalidStatus(other.to_string())),
        }
    }
}

// ─── Task ─────────────────────────────────────────────────────────────────────

/// A tracked task, serialized with the camelCase field names the HTTP API and
/// the snapshot file share.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "taskName")]
    pub name: String,
    pub description: String,
    pub status: Status,
    pub priority: String,
    pub due_date: String,
    /// `None` serializes as JSON null while the task is unassigned.
    pub assignee: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub comments: Vec<String>,
}

impl Task {
    fn new(name: &str, description: &str, priority: &str, due_date: &str) -> Self {
        let now = Utc::now();
        Self {
            name: name.to_string(),
            description: description.to_string(),
            status: Status::Pending,
            priority: priority.to_string(),
            due_date: due_date.to_string(),
            assignee: None,
            created_at: now,
            updated_at: now,
            comments: Vec::new(),
        }
    }
}

// ─── Store ────────────────────────────────────────────────────────────────────

/// In-memory task table backed by a JSON snapshot on disk.
///
/// Every mutation takes the write lock, applies the change, then rewrites the
/// snapshot before releasing it. A failed write surfaces
/// [`TaskError::Internal`] but keeps the in-memory change; the next successful
/// mutation persists the full state again.
pub struct TaskStore {
    tasks: RwLock<HashMap<String, Task>>,
    path: PathBuf,
}

impl TaskStore {
    /// Open the store backed by `{data_dir}/tasks.json`, loading any existing
    /// snapshot.
    pub fn open(data_dir: &Path) -> Result<Self, TaskError> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(snapshot::SNAPSHOT_FILE);
        let tasks = snapshot::load(&path);
        if !tasks.is_empty() {
            info!(count = tasks.len(), path = %path.display(), "task snapshot loaded");
        }
        Ok(Self {
            tasks: RwLock::new(tasks),
            path,
        })
    }

    pub async fn count(&self) -> usize {
        self.tasks.read().await.len()
    }

    // ─── CRUD ────────────────────────────────────────────────────────────────

    pub async fn create(
        &self,
        name: &str,
        description: &str,
        priority: &str,
        due_date: &str,
    ) -> Result<Task, TaskError> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(name) {
            return Err(TaskError::Duplicate(name.to_string()));
        }
        let task = Task::new(name, description, priority, due_date);
        tasks.insert(task.name.clone(), task.clone());
        snapshot::save(&self.path, &tasks).await?;
        info!(name = %task.name, "task created");
        Ok(task)
    }

    pub async fn get(&self, name: &str) -> Result<Task, TaskError> {
        self.tasks
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| TaskError::NotFound(name.to_string()))
    }

    /// All tasks, in no particular order.
    pub async fn list(&self) -> Vec<Task> {
        self.tasks.read().await.values().cloned().collect()
    }

    pub async fn update_status(&self, name: &str, status: Status) -> Result<Task, TaskError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(name)
            .ok_or_else(|| TaskError::NotFound(name.to_string()))?;
        task.status = status;
        task.updated_at = Utc::now();
        let task = task.clone();
        snapshot::save(&self.path, &tasks).await?;
        info!(name = %name, status = %status, "task status updated");
        Ok(task)
    }

    pub async fn assign(&self, name: &str, assignee: &str) -> Result<Task, TaskError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(name)
            .ok_or_else(|| TaskError::NotFound(name.to_string()))?;
        task.assignee = Some(assignee.to_string());
        task.updated_at = Utc::now();
        let task = task.clone();
        snapshot::save(&self.path, &tasks).await?;
        info!(name = %name, assignee = %assignee, "task assigned");
        Ok(task)
    }

    pub async fn add_comment(&self, name: &str, comment: &str) -> Result<Task, TaskError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(name)
            .ok_or_else(|| TaskError::NotFound(name.to_string()))?;
        task.comments.push(comment.to_string());
        task.updated_at = Utc::now();
        let task = task.clone();
        snapshot::save(&self.path, &tasks).await?;
        info!(name = %name, "comment added");
        Ok(task)
    }

    pub async fn comments(&self, name: &str) -> Result<Vec<String>, TaskError> {
        self.tasks
            .read()
            .await
            .get(name)
            .map(|task| task.comments.clone())
            .ok_or_else(|| TaskError::NotFound(name.to_string()))
    }

    pub async fn delete(&self, name: &str) -> Result<Task, TaskError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .remove(name)
            .ok_or_else(|| TaskError::NotFound(name.to_string()))?;
        snapshot::save(&self.path, &tasks).await?;
        info!(name = %name, "task deleted");
        Ok(task)
    }

    /// Remove every task, returning the removed records sorted by name.
    pub async fn delete_all(&self) -> Result<Vec<Task>, TaskError> {
        let mut tasks = self.tasks.write().await;
        let mut removed: Vec<Task> = tasks.drain().map(|(_, task)| task).collect();
        removed.sort_by(|a, b| a.name.cmp(&b.name));
        snapshot::save(&self.path, &tasks).await?;
        info!(count = removed.len(), "all tasks deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, TaskStore) {
        let dir = tempfile::TempDir::new().unwrap();
        let store = TaskStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn status_parses_kebab_case() {
        assert_eq!("pending".parse::<Status>().unwrap(), Status::Pending);
        assert_eq!("in-progress".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!("completed".parse::<Status>().unwrap(), Status::Completed);
        assert!(matches!(
            "done".parse::<Status>(),
            Err(TaskError::InvalidStatus(_))
        ));
    }

    #[tokio::test]
    async fn create_and_get_round_trip() {
        let (_dir, store) = temp_store();
        let created = store
            .create("buy-milk", "2 litres, semi-skimmed", "high", "2026-09-01")
            .await
            .unwrap();
        assert_eq!(created.status, Status::Pending);
        assert!(created.assignee.is_none());

        let fetched = store.get("buy-milk").await.unwrap();
        assert_eq!(fetched.description, "2 litres, semi-skimmed");
        assert_eq!(fetched.priority, "high");
        assert_eq!(fetched.due_date, "2026-09-01");
        assert!(fetched.comments.is_empty());
    }

    #[tokio::test]
    async fn duplicate_create_is_rejected() {
        let (_dir, store) = temp_store();
        store.create("deploy", "", "", "").await.unwrap();
        let err = store.create("deploy", "again", "", "").await.unwrap_err();
        assert!(matches!(err, TaskError::Duplicate(name) if name == "deploy"));
        // the original record is untouched
        assert_eq!(store.get("deploy").await.unwrap().description, "");
    }

    #[tokio::test]
    async fn unknown_task_lookups_fail() {
        let (_dir, store) = temp_store();
        assert!(matches!(
            store.get("ghost").await,
            Err(TaskError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("ghost").await,
            Err(TaskError::NotFound(_))
        ));
        assert!(matches!(
            store.assign("ghost", "alice").await,
            Err(TaskError::NotFound(_))
        ));
        assert!(matches!(
            store.comments("ghost").await,
            Err(TaskError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn status_update_touches_updated_at() {
        let (_dir, store) = temp_store();
        let created = store.create("deploy", "", "", "").await.unwrap();
        let updated = store
            .update_status("deploy", Status::Completed)
            .await
            .unwrap();
        assert_eq!(updated.status, Status::Completed);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn comments_append_in_order() {
        let (_dir, store) = temp_store();
        store.create("deploy", "", "", "").await.unwrap();
        store.add_comment("deploy", "first").await.unwrap();
        store.add_comment("deploy", "second").await.unwrap();
        store.add_comment("deploy", "third").await.unwrap();
        assert_eq!(
            store.comments("deploy").await.unwrap(),
            vec!["first", "second", "third"]
        );
    }

    #[tokio::test]
    async fn assign_overwrites_previous_assignee() {
        let (_dir, store) = temp_store();
        store.create("deploy", "", "", "").await.unwrap();
        store.assign("deploy", "alice").await.unwrap();
        let task = store.assign("deploy", "bob").await.unwrap();
        assert_eq!(task.assignee.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn delete_all_returns_removed_tasks() {
        let (_dir, store) = temp_store();
        store.create("b-task", "", "", "").await.unwrap();
        store.create("a-task", "", "", "").await.unwrap();
        let removed = store.delete_all().await.unwrap();
        assert_eq!(removed.len(), 2);
        // sorted by name
        assert_eq!(removed[0].name, "a-task");
        assert_eq!(removed[1].name, "b-task");
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn snapshot_survives_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        {
            let store = TaskStore::open(dir.path()).unwrap();
            store
                .create("persist-me", "kept across restarts", "low", "")
                .await
                .unwrap();
            store.assign("persist-me", "carol").await.unwrap();
            store.add_comment("persist-me", "check after reboot").await.unwrap();
        }

        let reopened = TaskStore::open(dir.path()).unwrap();
        let task = reopened.get("persist-me").await.unwrap();
        assert_eq!(task.description, "kept across restarts");
        assert_eq!(task.assignee.as_deref(), Some("carol"));
        assert_eq!(task.comments, vec!["check after reboot"]);
    }

    #[tokio::test]
    async fn corrupt_snapshot_starts_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join(snapshot::SNAPSHOT_FILE), "{not json").unwrap();
        let store = TaskStore::open(dir.path()).unwrap();
        assert_eq!(store.count().await, 0);
    }
}
