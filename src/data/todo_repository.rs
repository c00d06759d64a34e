use crate::domain::repository::TodoRepository;
use crate::domain::todo::{CreateTodo, Todo, UpdateTodo};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

struct TodoTable {
    // Only ever incremented, so ids of deleted todos are never handed out again.
    next_id: u64,
    rows: BTreeMap<u64, Todo>,
}

#[derive(Clone)]
pub struct InMemoryTodoRepository {
    storage: Arc<RwLock<TodoTable>>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(TodoTable {
                next_id: 1,
                rows: BTreeMap::new(),
            })),
        }
    }
}

impl Default for InMemoryTodoRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    #[instrument(skip(self, todo))]
    async fn insert(&self, todo: CreateTodo) -> Result<Todo> {
        let mut table = self.storage.write().await;
        let id = table.next_id;
        table.next_id += 1;

        let now = Utc::now();
        let row = Todo {
            id,
            title: todo.title,
            description: todo.description,
            due_date: todo.due_date,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, row.clone());
        debug!(todo_id = id, "Todo inserted");
        Ok(row)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: u64) -> Result<Option<Todo>> {
        let table = self.storage.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: u64, changes: UpdateTodo) -> Result<Option<Todo>> {
        let mut table = self.storage.write().await;
        let Some(row) = table.rows.get_mut(&id) else {
            trace!(todo_id = id, "Update target missing");
            return Ok(None);
        };
        row.apply(changes, Utc::now());
        debug!(todo_id = id, "Todo updated");
        Ok(Some(row.clone()))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: u64) -> Result<bool> {
        let mut table = self.storage.write().await;
        let removed = table.rows.remove(&id).is_some();
        debug!(todo_id = id, removed = removed, "Todo delete");
        Ok(removed)
    }

    #[instrument(skip(self))]
    async fn page(&self, offset: usize, limit: usize) -> Result<(Vec<Todo>, usize)> {
        let table = self.storage.read().await;
        let items = table
            .rows
            .values()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok((items, table.rows.len()))
    }
}
