use dashmap::DashMap;
use std::sync::Arc;

use crate::models::token::Token;

/// A registered token together with the file name of its stored image.
#[derive(Debug, Clone)]
pub struct TokenEntry {
    pub token: Token,
    /// File name under `<storage-root>/images/`.
    pub image_file: String,
}

/// In-memory token registry keyed by token id.
///
/// Backed by a DashMap so concurrent handlers can read and overwrite
/// entries without a global lock. Nothing is persisted; the registry
/// lives as long as the process.
#[derive(Clone, Default)]
pub struct TokenStore {
    entries: Arc<DashMap<String, TokenEntry>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<Token> {
        self.entries.get(id).map(|entry| entry.token.clone())
    }

    /// Store `entry` under its token id, returning the entry it replaced.
    pub fn upsert(&self, entry: TokenEntry) -> Option<TokenEntry> {
        self.entries.insert(entry.token.id.clone(), entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
