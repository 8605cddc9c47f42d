//! In-memory document store for tasks, keyed by an opaque string id.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::AppError;
use crate::models::{Task, TaskInput, TaskQuery, TaskUpdate};

#[derive(Default)]
pub struct TaskStore {
    tasks: RwLock<HashMap<String, Task>>,
}

fn not_found() -> AppError {
    AppError::NotFound("task not found".into())
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, input: TaskInput, created_by: i32) -> Task {
        let task = Task::new(input, created_by);
        self.tasks.write().insert(task.id.clone(), task.clone());
        log::debug!("created task {} for user {}", task.id, created_by);
        task
    }

    /// Tasks matching `query`, newest first.
    pub fn list(&self, query: &TaskQuery) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .read()
            .values()
            .filter(|t| t.matches(query))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        tasks
    }

    pub fn get(&self, id: &str) -> Result<Task, AppError> {
        self.tasks.read().get(id).cloned().ok_or_else(not_found)
    }

    pub fn update(&self, id: &str, update: TaskUpdate) -> Result<Task, AppError> {
        if update.is_empty() {
            return Err(AppError::ValidationError("no fields to update".into()));
        }

        let mut tasks = self.tasks.write();
        let task = tasks.get_mut(id).ok_or_else(not_found)?;
        task.apply(update);
        Ok(task.clone())
    }

    pub fn delete(&self, id: &str) -> Result<(), AppError> {
        self.tasks
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or_else(not_found)
    }

    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
