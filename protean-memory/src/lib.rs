//! In-memory storage and definition backends for protean.
//!
//! This crate provides thread-safe, in-process implementations of the
//! [`StorageBackend`](protean_core::backend::StorageBackend) and
//! [`DefinitionSource`](protean_core::schema::DefinitionSource) traits. Both
//! use async-aware read-write locks and are intended for development,
//! testing, and small single-node deployments.
//!
//! # Quick Start
//!
//! ```ignore
//! use protean::{prelude::*, memory::{InMemoryStore, InMemoryDefinitions}};
//! use serde_json::json;
//!
//! let definitions = InMemoryDefinitions::new();
//! definitions
//!     .register("acme", ResourceDefinition::new("books", vec![
//!         PropertyDefinition::required("title", PropertyType::String),
//!     ]))
//!     .await?;
//!
//! let resources = Resources::new(InMemoryStore::new(), definitions);
//! resources
//!     .create_object("acme", "books", json!({"title": "Dune"}).as_object().unwrap())
//!     .await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as protean_memory;

pub mod definitions;
pub mod evaluator;
pub mod store;

pub use definitions::InMemoryDefinitions;
pub use store::{InMemoryStore, InMemoryStoreBuilder};
