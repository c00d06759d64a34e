use crate::domain::repository::TokenRepository;
use crate::domain::token::AccessToken;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

struct TokenTable {
    next_id: u64,
    tokens: HashMap<u64, AccessToken>,
}

#[derive(Clone)]
pub struct InMemoryTokenRepository {
    storage: Arc<RwLock<TokenTable>>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(TokenTable {
                next_id: 1,
                tokens: HashMap::new(),
            })),
        }
    }
}

impl Default for InMemoryTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    #[instrument(skip(self, token_hash))]
    async fn create(&self, user_id: &str, name: &str, token_hash: String) -> Result<AccessToken> {
        let mut table = self.storage.write().await;
        let id = table.next_id;
        table.next_id += 1;

        let token = AccessToken {
            id,
            user_id: user_id.to_string(),
            name: name.to_string(),
            token_hash,
            created_at: Utc::now(),
            last_used_at: None,
        };
        table.tokens.insert(id, token.clone());
        debug!(token_id = id, user_id = user_id, "Access token stored");
        Ok(token)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: u64) -> Result<Option<AccessToken>> {
        let table = self.storage.read().await;
        Ok(table.tokens.get(&id).cloned())
    }

    #[instrument(skip(self))]
    async fn touch(&self, id: u64, at: DateTime<Utc>) -> Result<()> {
        let mut table = self.storage.write().await;
        if let Some(token) = table.tokens.get_mut(&id) {
            token.last_used_at = Some(at);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: u64) -> Result<bool> {
        let mut table = self.storage.write().await;
        let removed = table.tokens.remove(&id).is_some();
        trace!(token_id = id, removed = removed, "Access token delete");
        Ok(removed)
    }
}
