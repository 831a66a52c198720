pub mod image_store;
pub mod token_store;
