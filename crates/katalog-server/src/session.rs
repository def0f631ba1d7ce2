use std::sync::Arc;

use tokio::sync::RwLock;

/// Process-wide slot for the upstream bearer token.
///
/// Holds at most one token. A successful login replaces it, product fetches
/// read it, and nothing clears it. Writers swap the whole value under the
/// write lock, so a reader sees either the previous token or the new one.
#[derive(Clone, Default)]
pub struct TokenStore {
    slot: Arc<RwLock<Option<String>>>,
}

impl TokenStore {
    pub async fn set(&self, token: String) {
        *self.slot.write().await = Some(token);
    }

    pub async fn get(&self) -> Option<String> {
        self.slot.read().await.clone()
    }

    pub async fn is_set(&self) -> bool {
        self.slot.read().await.is_some()
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("slot", &"[redacted]")
            .finish()
    }
}
