//! MongoDB storage backend for protean.
//!
//! This crate implements the
//! [`StorageBackend`](protean_core::backend::StorageBackend) trait against
//! the async MongoDB driver. Each derived namespace maps to one MongoDB
//! collection; document identities are stored as binary UUIDs under `_id`,
//! and filters translate to native query documents so selection runs inside
//! the server.
//!
//! To use this backend, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! protean = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Connection
//!
//! ```ignore
//! use protean::mongodb::MongoDbStore;
//!
//! let store = MongoDbStore::builder("mongodb://localhost:27017", "protean")
//!     .build()
//!     .await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as protean_mongodb;

pub mod query;
pub mod store;

pub use store::{MongoDbStore, MongoDbStoreBuilder};
