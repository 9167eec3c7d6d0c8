//! # Pagestore - a searchable page cache on SQLite
//!
//! Pagestore keeps rendered "page" records in a local SQLite database so
//! they can be looked up by key, by tag, or by full-text search. Each page
//! carries:
//! - a unique `key`
//! - optional rendered `html`
//! - an optional `json` payload (stored opaquely, handy for ajax-style
//!   clients)
//! - a set of tags
//! - a searchable fulltext blob, which is indexed and then never returned
//!
//! The store is a cache in front of a rendering pipeline: everything in it
//! can be regenerated, so by default durability is relaxed
//! ([`Durability::Relaxed`]) in exchange for speed. Callers that need
//! fsync-on-commit behaviour can pick [`Durability::Strict`].
//!
//! A store is a scoped resource: mutations accumulate in one session
//! transaction and are committed when the store is released (explicitly via
//! [`PageStore::close`], or on drop).
//!
//! ```no_run
//! use pagestore::{Field, PageStore, Projection};
//!
//! fn main() -> pagestore::Result<()> {
//!     let mut store = PageStore::open_in_memory()?;
//!     store.store(
//!         "mango",
//!         Some("<i>MANGO!</i>"),
//!         Some(r#"["philippines","has","mango"]"#),
//!         "mango fruit smoothies in the philippines are the best",
//!         &["food", "fruit"],
//!     )?;
//!
//!     let keys = store.search("smoothies", &Projection::single(Field::Key), None)?;
//!     let by_tag = store.get_by_tag("fruit", &Projection::default())?;
//!     store.close()?;
//!     let _ = (keys, by_tag);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod projection;
pub mod store;

// Re-exports for convenient access
pub use config::{Durability, StoreConfig};
pub use projection::{Field, Projected, Projection, Value};
pub use store::{PageStore, StoreStats};

/// Result type alias for pagestore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for pagestore operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A projected column name was not in the whitelist. This check always
    /// runs, in every build profile: column names are the only identifiers
    /// spliced into query text, so rejecting unknown ones is the injection
    /// guard.
    #[error("invalid column name: {0:?}")]
    InvalidColumn(String),

    /// A multi-column projection was requested with no columns at all.
    #[error("projection must request at least one column")]
    EmptyProjection,

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),
}
