//! Token Registry — library crate for the server binary and integration tests.
//!
//! Clients register NFT-style tokens (metadata plus an image upload) and
//! read them back by id. Records live in memory; images live under the
//! configured storage root and are served statically.

use std::sync::Arc;

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod store;

use store::image_store::ImageStore;
use store::token_store::TokenStore;

/// Shared application state passed to handlers.
pub struct AppState {
    pub tokens: TokenStore,
    pub images: ImageStore,
    pub config: config::Config,
}

impl AppState {
    pub fn new(config: config::Config) -> Self {
        Self {
            tokens: TokenStore::new(),
            images: ImageStore::new(config.storage_root.clone()),
            config,
        }
    }
}

/// Build the full HTTP application for `config`.
pub fn app(config: config::Config) -> axum::Router {
    api::router(Arc::new(AppState::new(config)))
}
