//! A runtime-schema document API layer: tenants declare resources with typed
//! fields at runtime, and this crate provides the generic machinery to serve
//! them against a document store.
//!
//! This crate is the core of the protean project and provides:
//!
//! - **Property schemas** ([`schema`]) - Runtime resource definitions with typed, required fields
//! - **Document codec** ([`document`]) - Schema-validated conversion between client JSON and stored BSON
//! - **Filter model** ([`filter`]) - Type-checked, AND-combined query predicates
//! - **Namespace derivation** ([`namespace`]) - Deterministic tenant-isolated collection names
//! - **Usage aggregation** ([`usage`]) - Time-bucketed request statistics from request logs
//! - **Storage abstraction** ([`backend`]) - Traits for implementing storage backends
//! - **Resource operations** ([`resources`]) - The create/list/get/delete/usage service surface
//! - **Error handling** ([`error`]) - Error taxonomy with transport status mapping
//!
//! # Example
//!
//! ```ignore
//! use protean::{prelude::*, memory::{InMemoryStore, InMemoryDefinitions}};
//! use serde_json::{Map, json};
//!
//! let definitions = InMemoryDefinitions::new();
//! definitions
//!     .register("acme", ResourceDefinition::new("books", vec![
//!         PropertyDefinition::required("title", PropertyType::String),
//!         PropertyDefinition::optional("pages", PropertyType::Number),
//!     ]))
//!     .await?;
//!
//! let resources = Resources::new(InMemoryStore::new(), definitions);
//! let created = resources
//!     .create_object("acme", "books", json!({"title": "Dune", "pages": 412}).as_object().unwrap())
//!     .await?;
//!
//! println!("created object {}", created["id"]);
//! ```

#[allow(unused_extern_crates)]
extern crate self as protean_core;

pub mod backend;
pub mod document;
pub mod error;
pub mod filter;
pub mod namespace;
pub mod page;
pub mod resources;
pub mod schema;
pub mod usage;
