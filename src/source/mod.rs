//! Remote data source seam
//!
//! Every report reads its documents through [`DataSource`]. Production code
//! uses [`HttpDataSource`]; tests swap in [`MockDataSource`].

pub mod endpoint;
pub mod http;
pub mod mock;

pub use endpoint::Endpoint;
pub use http::{build_client, HttpDataSource};
pub use mock::MockDataSource;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Performs exactly one remote call per invocation and returns the raw
/// JSON document, which may itself be an error document.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Value>;
}

pub type SharedSource = Arc<dyn DataSource>;
