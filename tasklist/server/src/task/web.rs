use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::task::{Task, TaskService, TaskServiceError};

#[derive(Debug, Deserialize)]
pub struct TaskForm {
    #[serde(default)]
    content: Option<String>,
}

impl TaskForm {
    /// Returns the submitted content, or `None` if the field was missing or empty.
    fn non_empty_content(self) -> Option<String> {
        self.content.filter(|content| !content.is_empty())
    }
}

/// The mutating operation that failed, used to pick the message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    Add,
    Delete,
    Update,
}

impl TaskAction {
    fn failure_message(self) -> &'static str {
        match self {
            TaskAction::Add => "There was an issue adding your task.",
            TaskAction::Delete => "There was an issue deleting the task.",
            TaskAction::Update => "There was an issue updating the task.",
        }
    }
}

/// Custom error type for task handler operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Represents an error during template rendering.
    #[error("Template rendering failed")]
    Template(#[from] askama::Error),
    /// The requested task does not exist.
    #[error("Task with ID {0} not found")]
    NotFound(i32),
    /// A create, delete or update could not be stored.
    #[error("Storage failed while trying to {action:?} a task")]
    Storage {
        action: TaskAction,
        #[source]
        source: TaskServiceError,
    },
    /// Represents any other task service error.
    #[error("Task service error")]
    Service(#[source] TaskServiceError),
}

impl From<TaskServiceError> for TaskError {
    fn from(err: TaskServiceError) -> Self {
        match err {
            TaskServiceError::NotFound(id) => TaskError::NotFound(id),
            other => TaskError::Service(other),
        }
    }
}

impl TaskError {
    /// Maps a service error raised by a mutating route.
    fn from_mutation(action: TaskAction, err: TaskServiceError) -> Self {
        match err {
            TaskServiceError::NotFound(id) => TaskError::NotFound(id),
            source => TaskError::Storage { action, source },
        }
    }
}

impl IntoResponse for TaskError {
    fn into_response(self) -> Response {
        match self {
            TaskError::NotFound(id) => {
                tracing::info!("Task {} not found", id);
                (StatusCode::NOT_FOUND, "Task not found").into_response()
            }
            TaskError::Storage { action, source } => {
                tracing::error!("Failed to {:?} task: {}", action, source);
                (StatusCode::OK, action.failure_message()).into_response()
            }
            other => {
                tracing::error!("Task request failed: {:?}", other);
                let user_facing_error_message = "An unexpected error occurred while processing your request. Please try again later.";
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(format!(
                        "<h1>Internal Server Error</h1><p>{}</p>",
                        user_facing_error_message
                    )),
                )
                    .into_response()
            }
        }
    }
}

/// Builds a `302 Found` redirect, matching what browsers expect after a form post.
fn redirect_to(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    tasks: Vec<Task>,
}

impl IndexTemplate {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }
}

#[derive(Template)]
#[template(path = "update.html")]
struct UpdateTemplate {
    task: Task,
}

impl UpdateTemplate {
    pub fn new(task: Task) -> Self {
        Self { task }
    }
}

#[derive(Clone, Debug)]
pub struct TaskState {
    pub db: Arc<sea_orm::DatabaseConnection>,
}

/// Handler for GET / that lists all tasks alongside the add form.
#[tracing::instrument(skip(state))]
async fn index_handler(State(state): State<Arc<TaskState>>) -> Result<Html<String>, TaskError> {
    let task_service = TaskService::new(&state.db);
    let tasks = task_service.get_all_tasks().await?;
    let template = IndexTemplate::new(tasks);
    template.render().map(Html).map_err(TaskError::from)
}

/// Handler for POST / that adds a task and sends the browser back to the list.
#[tracing::instrument(skip(state))]
async fn create_task_handler(
    State(state): State<Arc<TaskState>>,
    Form(form): Form<TaskForm>,
) -> Result<Response, TaskError> {
    let Some(content) = form.non_empty_content() else {
        return Ok(redirect_to("/"));
    };

    let task_service = TaskService::new(&state.db);
    match task_service.create_task(content).await {
        Ok(_) | Err(TaskServiceError::Validation) => Ok(redirect_to("/")),
        Err(err) => Err(TaskError::from_mutation(TaskAction::Add, err)),
    }
}

/// Handler for GET /delete/{id}.
#[tracing::instrument(skip(state))]
async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<i32>,
) -> Result<Response, TaskError> {
    let task_service = TaskService::new(&state.db);
    task_service
        .delete_task_by_id(id)
        .await
        .map_err(|err| TaskError::from_mutation(TaskAction::Delete, err))?;
    Ok(redirect_to("/"))
}

/// Handler for GET /update/{id} that serves the edit form pre-filled with the current content.
#[tracing::instrument(skip(state))]
async fn edit_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<i32>,
) -> Result<Html<String>, TaskError> {
    let task_service = TaskService::new(&state.db);
    let task = task_service.get_task_by_id(id).await?;
    let template = UpdateTemplate::new(task);
    template.render().map(Html).map_err(TaskError::from)
}

/// Handler for POST /update/{id}.
///
/// An unknown ID is reported before the content is looked at, so an empty
/// submission for a missing task still yields 404. A store failure during that
/// existence check answers 500, not the plain-text update message.
#[tracing::instrument(skip(state))]
async fn update_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<i32>,
    Form(form): Form<TaskForm>,
) -> Result<Response, TaskError> {
    let task_service = TaskService::new(&state.db);
    let edit_form_location = format!("/update/{}", id);

    let Some(content) = form.non_empty_content() else {
        task_service.get_task_by_id(id).await?;
        tracing::info!("Update of task {} skipped: content is empty", id);
        return Ok(redirect_to(&edit_form_location));
    };

    match task_service.edit_task_by_id(id, content).await {
        Ok(_) => Ok(redirect_to("/")),
        Err(TaskServiceError::Validation) => Ok(redirect_to(&edit_form_location)),
        Err(err) => Err(TaskError::from_mutation(TaskAction::Update, err)),
    }
}

/// Creates and returns the task router with all task-related routes.
pub fn create_task_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route("/", get(index_handler).post(create_task_handler))
        .route("/delete/{id}", get(delete_task_handler))
        .route(
            "/update/{id}",
            get(edit_task_handler).post(update_task_handler),
        )
        .with_state(state)
}
