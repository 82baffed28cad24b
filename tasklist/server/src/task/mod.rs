use crate::entities::*;
use chrono::{DateTime, Utc};
use sea_orm::*;

pub mod web;

#[derive(Debug, PartialEq, Clone, Eq, Hash)]
pub struct Task {
    id: i32,
    content: String,
    completed: i32,
    date_created: DateTime<Utc>,
}

impl Task {
    pub fn new(id: i32, content: String, completed: i32, date_created: DateTime<Utc>) -> Self {
        Self {
            id,
            content,
            completed,
            date_created,
        }
    }

    /// Returns the ID of the task.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Returns the text of the task.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the stored completion flag. Nothing interprets it yet.
    pub fn completed(&self) -> i32 {
        self.completed
    }

    /// Returns when the task was created.
    pub fn date_created(&self) -> DateTime<Utc> {
        self.date_created
    }

    /// Returns the creation date formatted for display.
    pub fn created_on(&self) -> String {
        self.date_created.format("%Y-%m-%d").to_string()
    }
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Task::new(model.id, model.content, model.completed, model.date_created)
    }
}

/// Error type for TaskService operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// The task content was empty.
    #[error("Task content must not be empty")]
    Validation,
    /// No task exists with the given ID.
    #[error("Task with ID {0} not found")]
    NotFound(i32),
    /// The underlying store failed.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

pub struct TaskService<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

impl TaskService<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> TaskService<'_> {
        TaskService { db }
    }

    /// Creates a new task stamped with the current time.
    ///
    /// # Arguments
    ///
    /// * `content` - The text of the task. Must not be empty.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(&self, content: String) -> Result<Task, TaskServiceError> {
        if content.is_empty() {
            return Err(TaskServiceError::Validation);
        }

        let active_model = task::ActiveModel {
            content: ActiveValue::Set(content),
            completed: ActiveValue::Set(0),
            date_created: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        tracing::info!("Created task {}", created_model.id);
        Ok(Task::from(created_model))
    }

    /// Retrieves all tasks, oldest first.
    ///
    /// # Returns
    ///
    /// A `Result` containing a vector of `Task` ordered by creation time, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_tasks(&self) -> Result<Vec<Task>, TaskServiceError> {
        let tasks = task::Entity::find()
            .order_by_asc(task::Column::DateCreated)
            .order_by_asc(task::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    /// Retrieves a task by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to retrieve.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Task` if it exists, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn get_task_by_id(&self, id: i32) -> Result<Task, TaskServiceError> {
        let task_model = task::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(TaskServiceError::NotFound(id))?;
        Ok(Task::from(task_model))
    }

    /// Replaces the content of a task, leaving its ID and creation time untouched.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to edit.
    /// * `new_content` - The new text for the task. Must not be empty.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn edit_task_by_id(
        &self,
        id: i32,
        new_content: String,
    ) -> Result<Task, TaskServiceError> {
        let txn = self.db.begin().await?;

        let task_to_update = task::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(TaskServiceError::NotFound(id))?;

        if new_content.is_empty() {
            return Err(TaskServiceError::Validation);
        }

        let mut active_model: task::ActiveModel = task_to_update.into();
        active_model.content = ActiveValue::Set(new_content);
        let updated_model = active_model.update(&txn).await?;
        txn.commit().await?;

        tracing::info!("Updated task {}", id);
        Ok(Task::from(updated_model))
    }

    /// Deletes a task by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to delete.
    ///
    /// # Returns
    ///
    /// An empty `Result` if the task was removed, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task_by_id(&self, id: i32) -> Result<(), TaskServiceError> {
        let result = task::Entity::delete_by_id(id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(TaskServiceError::NotFound(id));
        }
        tracing::info!("Deleted task {}", id);
        Ok(())
    }
}
