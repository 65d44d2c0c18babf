//! Storage backend abstraction consumed by the resource operations.
//!
//! The [`StorageBackend`] trait is the small CRUD surface the core needs from
//! a document store, plus per-tenant request-log listing. Implementations
//! must be thread-safe (`Send + Sync`) and support concurrent access; the
//! core itself holds no locks around backend calls.
//!
//! All methods are async and cancellation-safe in the usual sense: dropping
//! the future aborts the in-flight call, so a disconnected client stops
//! costing storage work. This core never retries a failed backend call;
//! retry policy, if any, lives inside the backend.

use async_trait::async_trait;
use bson::Document;
use std::fmt::Debug;

use crate::{
    document::DocumentId,
    error::ApiResult,
    filter::Query,
    usage::LogEntry,
};

/// Abstract interface for document storage backends.
///
/// A `namespace` is an opaque collection identifier produced by
/// [`namespace`](crate::namespace::namespace); backends must keep distinct
/// namespaces fully isolated from one another.
#[async_trait]
pub trait StorageBackend: Send + Sync + Debug {
    /// Stores a new document and assigns its identity.
    ///
    /// The identity is generated here, exactly once; the document handed in
    /// never carries one.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Internal`](crate::error::ApiError::Internal) on a
    /// storage fault.
    async fn insert(&self, namespace: &str, document: Document) -> ApiResult<DocumentId>;

    /// Selects documents matching the query's filter, honoring its limit,
    /// offset, and sort.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Internal`](crate::error::ApiError::Internal) on a
    /// storage fault.
    async fn find_many(&self, namespace: &str, query: Query) -> ApiResult<Vec<Document>>;

    /// Fetches one document by identity.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ObjectNotFound`](crate::error::ApiError::ObjectNotFound)
    /// when no such document exists in the namespace, or
    /// [`ApiError::Internal`](crate::error::ApiError::Internal) on a storage
    /// fault.
    async fn find_one(&self, namespace: &str, id: DocumentId) -> ApiResult<Document>;

    /// Deletes one document by identity.
    ///
    /// Deleting an absent identity is an error, never a silent success.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ObjectNotFound`](crate::error::ApiError::ObjectNotFound)
    /// when no such document exists, or
    /// [`ApiError::Internal`](crate::error::ApiError::Internal) on a storage
    /// fault.
    async fn delete(&self, namespace: &str, id: DocumentId) -> ApiResult<()>;

    /// Lists a tenant's request-log entries matching the query.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Internal`](crate::error::ApiError::Internal) on a
    /// storage fault; callers discard any partial aggregate they were
    /// building.
    async fn list_logs(&self, tenant: &str, query: Query) -> ApiResult<Vec<LogEntry>>;
}

#[async_trait]
impl<B> StorageBackend for &B
where
    B: StorageBackend + ?Sized,
{
    async fn insert(&self, namespace: &str, document: Document) -> ApiResult<DocumentId> {
        (**self).insert(namespace, document).await
    }

    async fn find_many(&self, namespace: &str, query: Query) -> ApiResult<Vec<Document>> {
        (**self).find_many(namespace, query).await
    }

    async fn find_one(&self, namespace: &str, id: DocumentId) -> ApiResult<Document> {
        (**self).find_one(namespace, id).await
    }

    async fn delete(&self, namespace: &str, id: DocumentId) -> ApiResult<()> {
        (**self).delete(namespace, id).await
    }

    async fn list_logs(&self, tenant: &str, query: Query) -> ApiResult<Vec<LogEntry>> {
        (**self).list_logs(tenant, query).await
    }
}

#[async_trait]
impl<B> StorageBackend for Box<B>
where
    B: StorageBackend + ?Sized,
{
    async fn insert(&self, namespace: &str, document: Document) -> ApiResult<DocumentId> {
        (**self).insert(namespace, document).await
    }

    async fn find_many(&self, namespace: &str, query: Query) -> ApiResult<Vec<Document>> {
        (**self).find_many(namespace, query).await
    }

    async fn find_one(&self, namespace: &str, id: DocumentId) -> ApiResult<Document> {
        (**self).find_one(namespace, id).await
    }

    async fn delete(&self, namespace: &str, id: DocumentId) -> ApiResult<()> {
        (**self).delete(namespace, id).await
    }

    async fn list_logs(&self, tenant: &str, query: Query) -> ApiResult<Vec<LogEntry>> {
        (**self).list_logs(tenant, query).await
    }
}

/// Factory trait for constructing backend instances.
#[async_trait]
pub trait StorageBackendBuilder {
    type Backend: StorageBackend;

    /// Builds and connects the backend.
    async fn build(self) -> ApiResult<Self::Backend>;
}
