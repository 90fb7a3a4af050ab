//!
//! Listkeeper: dense, scoped list positions for records in a document store.
//!
//! ## Core Concepts
//!
//! * **Documents (`document::Document`)**: Records are stored as JSON objects. Typed records
//!   implement [`Model`] and convert to and from documents through serde.
//! * **Stores (`store::DocumentStore`)**: The pluggable backing store. Listkeeper only needs
//!   field-level writes, filtered queries and range-guarded delta updates from it.
//!   [`store::InMemory`] is the bundled implementation.
//! * **Scopes (`scope::ScopeKey`)**: The values of the configured scope fields partition a
//!   collection into independent lists.
//! * **Lists (`list::List`)**: The list engine. It keeps the position field of every listed
//!   record in a scope dense (`1..=N`) across inserts, moves, removals and destroys.
//! * **Collections (`collection::Collection`)**: A typed view over a store collection that
//!   calls the registered [`Lifecycle`] hooks at create, update and destroy time.

pub mod collection;
pub mod config;
pub mod constants;
pub mod dirty;
pub mod document;
pub mod lifecycle;
pub mod list;
pub mod scope;
pub mod store;

pub use collection::Collection;
pub use config::{ListConfig, ScopeField};
pub use document::{Document, Model, RecordId};
pub use lifecycle::Lifecycle;
pub use list::{List, ScopeGuard};
pub use scope::{ScopeKey, ScopeResolver};
pub use store::{DocumentStore, Filter, InMemory};

/// Result type used throughout the Listkeeper library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Listkeeper library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured errors from the backing store
    #[error(transparent)]
    Store(store::StoreError),

    /// Setup-time configuration errors
    #[error(transparent)]
    Config(config::ConfigError),

    /// Errors raised by the list engine
    #[error(transparent)]
    List(list::ListError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Store(_) => "store",
            Error::Config(_) => "config",
            Error::List(_) => "list",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a record was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_not_found(),
            Error::List(list_err) => list_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is a setup-time configuration error.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Check if this error came from the backing store.
    pub fn is_store_error(&self) -> bool {
        matches!(self, Error::Store(_))
    }

    /// Check if this error indicates a list whose positions are not dense.
    pub fn is_invariant_violation(&self) -> bool {
        match self {
            Error::List(list_err) => list_err.is_invariant_violation(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Store(store_err) => store_err.is_io_error(),
            _ => false,
        }
    }

    /// Check if this error is related to serialization.
    pub fn is_serialization_error(&self) -> bool {
        match self {
            Error::Serialize(_) => true,
            Error::Store(store_err) => store_err.is_serialization_error(),
            _ => false,
        }
    }
}
