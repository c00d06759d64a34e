use crate::domain::todo::{CreateTodo, Todo, UpdateTodo};
use crate::domain::token::AccessToken;
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn save_user(&self, user: User) -> Result<()>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>>;
}

#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn create(&self, user_id: &str, name: &str, token_hash: String) -> Result<AccessToken>;
    async fn find_by_id(&self, id: u64) -> Result<Option<AccessToken>>;
    async fn touch(&self, id: u64, at: DateTime<Utc>) -> Result<()>;
    /// Returns `false` when no record with that id was present.
    async fn delete(&self, id: u64) -> Result<bool>;
}

#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn insert(&self, todo: CreateTodo) -> Result<Todo>;
    async fn find_by_id(&self, id: u64) -> Result<Option<Todo>>;
    async fn update(&self, id: u64, changes: UpdateTodo) -> Result<Option<Todo>>;
    async fn delete(&self, id: u64) -> Result<bool>;
    /// Id-ordered slice plus the total number of records.
    async fn page(&self, offset: usize, limit: usize) -> Result<(Vec<Todo>, usize)>;
}
