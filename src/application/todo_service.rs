use crate::domain::error::DomainError;
use crate::domain::repository::TodoRepository;
use crate::domain::todo::{CreateTodo, Page, Todo, UpdateTodo};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, instrument};

pub struct TodoService<R: TodoRepository> {
    repository: Arc<R>,
    page_size: usize,
}

impl<R: TodoRepository> TodoService<R> {
    pub fn new(repository: Arc<R>, page_size: usize) -> Self {
        Self {
            repository,
            page_size: page_size.max(1),
        }
    }

    /// `page` is 1-based; 0 is treated as 1.
    #[instrument(skip(self))]
    pub async fn list(&self, page: usize) -> Result<Page<Todo>> {
        let current_page = page.max(1);
        let offset = (current_page - 1).saturating_mul(self.page_size);
        let (items, total) = self.repository.page(offset, self.page_size).await?;
        debug!(page = current_page, returned = items.len(), total = total, "Todos listed");
        Ok(Page {
            items,
            current_page,
            per_page: self.page_size,
            total,
        })
    }

    #[instrument(skip(self, req))]
    pub async fn create(&self, req: CreateTodo) -> Result<Todo> {
        self.repository.insert(req).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: u64) -> Result<Todo> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::TodoNotFound.into())
    }

    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: u64, changes: UpdateTodo) -> Result<Todo> {
        self.repository
            .update(id, changes)
            .await?
            .ok_or_else(|| DomainError::TodoNotFound.into())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: u64) -> Result<()> {
        if self.repository.delete(id).await? {
            Ok(())
        } else {
            Err(DomainError::TodoNotFound.into())
        }
    }
}
