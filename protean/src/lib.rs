//! Main protean crate: runtime-declared resources over a document store.
//!
//! This crate is the primary entry point for users of the protean framework.
//! It re-exports the core types from the sub-crates and provides convenient
//! access to the storage backends.
//!
//! # Features
//!
//! - **Runtime schemas** - Tenants declare resources with typed, required
//!   fields while the process is running; no compile-time knowledge of the
//!   data shape is needed anywhere
//! - **Schema-validated storage** - Payloads are checked against the declared
//!   schema before anything is written, and stored documents decode back to
//!   client-safe JSON
//! - **Type-checked filtering** - AND-combined per-field predicates validated
//!   against the schema when they are built
//! - **Tenant isolation** - Storage namespaces derived deterministically from
//!   tenant and resource name
//! - **Usage analytics** - Request logs aggregate into time-bucketed
//!   statistics per tenant
//!
//! # Quick Start
//!
//! ```ignore
//! use protean::{prelude::*, memory::{InMemoryStore, InMemoryDefinitions}};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> ApiResult<()> {
//!     // Declare a resource for a tenant (normally the management flow's job)
//!     let definitions = InMemoryDefinitions::new();
//!     definitions
//!         .register("acme", ResourceDefinition::new("books", vec![
//!             PropertyDefinition::required("title", PropertyType::String),
//!             PropertyDefinition::optional("pages", PropertyType::Number),
//!         ]))
//!         .await?;
//!
//!     let resources = Resources::new(InMemoryStore::new(), definitions);
//!
//!     // Create an object of the declared resource
//!     let payload = json!({"title": "Dune", "pages": 412});
//!     let created = resources
//!         .create_object("acme", "books", payload.as_object().unwrap())
//!         .await?;
//!     println!("created {}", created["id"]);
//!
//!     // List objects with a type-checked filter
//!     let listed = resources
//!         .list_objects(
//!             "acme",
//!             "books",
//!             vec![("pages".to_string(), FilterOp::Gte, json!(100))],
//!             &PaginationParams::default(),
//!         )
//!         .await?;
//!     println!("{} matching objects", listed.count);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Usage analytics
//!
//! The (external) request logger appends [`usage::LogEntry`] values; the
//! usage operation buckets the trailing window by quantized timestamp:
//!
//! ```ignore
//! let report = resources.usage("acme", chrono::Duration::hours(1)).await?;
//! for (bucket, stats) in &report.items {
//!     println!("{bucket}: {} requests, avg {}ms", stats.request_count, stats.avg_response);
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - Fast in-memory storage for development and testing
//! - [`mongodb`] - Persistent MongoDB backend (requires the `mongodb`
//!   feature)

pub mod prelude;

pub use protean_core::{
    backend, document, error, filter, namespace, page, resources, schema, usage,
};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use protean_memory::{InMemoryDefinitions, InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use protean_mongodb::{MongoDbStore, MongoDbStoreBuilder};
}
