//! Search-index integration: a [`SearchClient`] bound to one node, pinged in
//! the background right after attach.

pub mod backend;
pub mod client;
pub mod config;

pub use backend::{SearchBackend, SearchManager, BACKEND_NAME};
pub use client::SearchClient;
pub use config::{ElasticConfig, CONFIG_FILE};
