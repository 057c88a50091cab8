use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::TaskError;
use crate::rest::extract::JsonBody;
use crate::store::{Status, Task};
use crate::AppContext;

// ─── Request bodies ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    task_name: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    priority: String,
    #[serde(default)]
    due_date: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatus {
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignTask {
    assignee: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddComment {
    comment: Option<String>,
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

pub async fn create_task(
    State(ctx): State<Arc<AppContext>>,
    JsonBody(body): JsonBody<CreateTask>,
) -> Result<(StatusCode, Json<Task>), TaskError> {
    let name = required(body.task_name, "Empty task name")?;
    let task = ctx
        .store
        .create(&name, &body.description, &body.priority, &body.due_date)
        .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn list_tasks(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    let tasks = ctx.store.list().await;
    Json(json!({ "tasks": tasks }))
}

pub async fn get_task(
    State(ctx): State<Arc<AppContext>>,
    Path(name): Path<String>,
) -> Result<Json<Task>, TaskError> {
    Ok(Json(ctx.store.get(&name).await?))
}

pub async fn update_task_status(
    State(ctx): State<Arc<AppContext>>,
    Path(name): Path<String>,
    JsonBody(body): JsonBody<UpdateStatus>,
) -> Result<Json<Task>, TaskError> {
    // Status is validated before the task lookup, matching the API contract:
    // a bad status on an unknown task still answers 400.
    let status = required(body.status, "Status not provided")?.parse::<Status>()?;
    Ok(Json(ctx.store.update_status(&name, status).await?))
}

pub async fn assign_task(
    State(ctx): State<Arc<AppContext>>,
    Path(name): Path<String>,
    JsonBody(body): JsonBody<AssignTask>,
) -> Result<Json<Task>, TaskError> {
    let assignee = required(body.assignee, "Assignee not provided")?;
    Ok(Json(ctx.store.assign(&name, &assignee).await?))
}

pub async fn add_task_comment(
    State(ctx): State<Arc<AppContext>>,
    Path(name): Path<String>,
    JsonBody(body): JsonBody<AddComment>,
) -> Result<(StatusCode, Json<Task>), TaskError> {
    let comment = required(body.comment, "Comment not provided")?;
    let task = ctx.store.add_comment(&name, &comment).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task_comments(
    State(ctx): State<Arc<AppContext>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, TaskError> {
    let comments = ctx.store.comments(&name).await?;
    Ok(Json(json!({ "comments": comments })))
}

pub async fn delete_task(
    State(ctx): State<Arc<AppContext>>,
    Path(name): Path<String>,
) -> Result<Json<Task>, TaskError> {
    Ok(Json(ctx.store.delete(&name).await?))
}

pub async fn delete_all_tasks(
    State(ctx): State<Arc<AppContext>>,
) -> Result<Json<Value>, TaskError> {
    let tasks = ctx.store.delete_all().await?;
    Ok(Json(json!({ "tasks": tasks })))
}

/// Reject absent and empty string fields with the endpoint's wire message.
fn required(value: Option<String>, message: &str) -> Result<String, TaskError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(TaskError::Malformed(message.to_string())),
    }
}
