//! Explicit record lifecycle hooks.
//!
//! A [`Collection`](crate::Collection) calls every registered hook at fixed points of a
//! record's life instead of relying on callbacks injected into the record type:
//!
//! 1. `scope_guards` for every document the operation touches, held until it completes
//! 2. `before_create` just before a new document is inserted
//! 3. `before_update` just before a document is replaced, `after_update` once the
//!    replacement is written
//! 4. `after_destroy` right after a document is removed, with its last stored state
//!
//! All hooks default to no-ops.

use async_trait::async_trait;

use crate::{Result, document::Document, list::ScopeGuard};

#[async_trait]
pub trait Lifecycle: Send + Sync {
    /// Serializes the operation against other writers of the documents' scopes.
    ///
    /// The returned guards are held by the caller until the store write and every
    /// following hook have completed.
    async fn scope_guards(&self, _docs: &[&Document]) -> Result<Vec<ScopeGuard>> {
        Ok(Vec::new())
    }

    /// Called with the document about to be inserted.
    async fn before_create(&self, _doc: &mut Document) -> Result<()> {
        Ok(())
    }

    /// Called with the stored document and its replacement.
    async fn before_update(&self, _stored: &Document, _doc: &mut Document) -> Result<()> {
        Ok(())
    }

    /// Called with the previous and the new state of a replaced document.
    async fn after_update(&self, _stored: &Document, _doc: &Document) -> Result<()> {
        Ok(())
    }

    /// Called with the last stored state of a removed document.
    async fn after_destroy(&self, _doc: &Document) -> Result<()> {
        Ok(())
    }
}
