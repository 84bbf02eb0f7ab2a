//! Infrastructure Storage Layer
//!
//! Adapters implementing `core_kernel::KeyValueStore`, the durable string
//! store the payment sync queue is persisted in.
//!
//! # Adapters
//!
//! - **`InMemoryStore`**: process-local map, for tests and ephemeral runs
//! - **`FileStore`**: one file per key under a storage directory; every write
//!   goes to a temporary file that is then renamed over the old one, so a
//!   reader sees either the previous value or the new one
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_store::{FileStore, StoreConfig};
//!
//! let store = FileStore::open(StoreConfig::new("./data")).await?;
//! store.set("syncPayments", "[]").await?;
//! ```

pub mod config;
pub mod error;
pub mod file;
pub mod memory;

pub use config::StoreConfig;
pub use error::StoreError;
pub use file::FileStore;
pub use memory::InMemoryStore;
