//! Storage backends for the byline blog store.
//!
//! Ships two implementations of [`byline_core::store::BlogStore`]: a MongoDB
//! backend for deployment and an in-memory backend for tests and local
//! development. Both share the same error type; the memory backend simply
//! never produces the database variants.

mod doc;
mod memory;
mod mongo;

pub mod error;

pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use mongo::MongoStore;
