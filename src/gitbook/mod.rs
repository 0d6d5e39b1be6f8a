//! Documentation host access.
//!
//! The sync pipeline only needs one operation from the host: replace a page's
//! content. [`DocumentHost`] captures that so the orchestrator can be driven by
//! fakes in tests; [`GitBookClient`] is the production implementation.

use async_trait::async_trait;

mod client;
mod error;

pub use client::{DEFAULT_API_URL, GitBookClient};
pub use error::GitBookApiError;

/// A documentation host that accepts whole-page updates.
#[async_trait]
pub trait DocumentHost: Send + Sync {
    /// Replaces the content of `page_id` with `document`.
    async fn update_page(&self, page_id: &str, document: &str) -> Result<(), GitBookApiError>;
}
