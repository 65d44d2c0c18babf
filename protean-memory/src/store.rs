//! In-memory storage backend.
//!
//! Documents are stored as BSON values in nested HashMaps guarded by
//! async-safe read-write locks; request logs live beside them keyed by
//! tenant. Queries scan the whole namespace, which is acceptable for the
//! small datasets this backend is meant for.

use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use async_trait::async_trait;
use bson::{Document, ser::serialize_to_bson};
use mea::rwlock::RwLock;

use protean_core::{
    backend::{StorageBackend, StorageBackendBuilder},
    document::{DocumentId, STORED_ID_FIELD},
    error::{ApiError, ApiResult},
    filter::{Query, Sort, SortDirection},
    usage::LogEntry,
};

use crate::evaluator::{Comparable, DocumentEvaluator};

type DocumentMap = HashMap<String, Document>;
type NamespaceMap = HashMap<String, DocumentMap>;

/// Thread-safe in-memory storage backend.
///
/// `InMemoryStore` is cloneable and uses `Arc`-wrapped internal state;
/// clones share the same underlying data. It implements both halves of the
/// storage contract: document CRUD per namespace and request-log listing per
/// tenant. The external logging collaborator appends entries through
/// [`append_log`](InMemoryStore::append_log).
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// namespace -> (document id -> document)
    documents: Arc<RwLock<NamespaceMap>>,
    /// tenant -> request log entries, in append order
    logs: Arc<RwLock<HashMap<String, Vec<LogEntry>>>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for constructing an `InMemoryStore`.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Appends one request-log entry for a tenant.
    ///
    /// This is the hook the (external) request-logging collaborator writes
    /// through; the core only ever reads logs back.
    pub async fn append_log(&self, tenant: &str, entry: LogEntry) {
        self.logs
            .write()
            .await
            .entry(tenant.to_string())
            .or_default()
            .push(entry);
    }
}

/// Orders two documents by a sort specification, using the same value
/// comparison the filter evaluator uses.
fn compare_documents(a: &Document, b: &Document, sort: &Sort) -> Ordering {
    let left = a
        .get(&sort.field)
        .map(Comparable::from)
        .unwrap_or(Comparable::Null);
    let right = b
        .get(&sort.field)
        .map(Comparable::from)
        .unwrap_or(Comparable::Null);

    match sort.direction {
        SortDirection::Asc => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
        SortDirection::Desc => right.partial_cmp(&left).unwrap_or(Ordering::Equal),
    }
}

#[async_trait]
impl StorageBackend for InMemoryStore {
    async fn insert(&self, namespace: &str, mut document: Document) -> ApiResult<DocumentId> {
        let id = DocumentId::new();
        document.insert(STORED_ID_FIELD, id.as_uuid());

        self.documents
            .write()
            .await
            .entry(namespace.to_string())
            .or_default()
            .insert(id.to_string(), document);

        Ok(id)
    }

    async fn find_many(&self, namespace: &str, query: Query) -> ApiResult<Vec<Document>> {
        let store = self.documents.read().await;
        let collection = match store.get(namespace) {
            Some(collection) => collection,
            None => return Ok(vec![]),
        };

        let mut documents = match &query.filter {
            Some(filter) => DocumentEvaluator::filter_documents(collection.values(), filter),
            None => collection.values().cloned().collect::<Vec<_>>(),
        };

        if let Some(sort) = &query.sort {
            documents.sort_by(|a, b| compare_documents(a, b, sort));
        }

        Ok(documents
            .into_iter()
            .skip(query.offset.unwrap_or(0))
            .take(query.limit.unwrap_or(usize::MAX))
            .collect())
    }

    async fn find_one(&self, namespace: &str, id: DocumentId) -> ApiResult<Document> {
        self.documents
            .read()
            .await
            .get(namespace)
            .and_then(|collection| collection.get(&id.to_string()))
            .cloned()
            .ok_or_else(|| ApiError::ObjectNotFound(id.to_string()))
    }

    async fn delete(&self, namespace: &str, id: DocumentId) -> ApiResult<()> {
        let mut store = self.documents.write().await;

        store
            .get_mut(namespace)
            .and_then(|collection| collection.remove(&id.to_string()))
            .map(|_| ())
            .ok_or_else(|| ApiError::ObjectNotFound(id.to_string()))
    }

    async fn list_logs(&self, tenant: &str, query: Query) -> ApiResult<Vec<LogEntry>> {
        let logs = self.logs.read().await;
        let entries = match logs.get(tenant) {
            Some(entries) => entries,
            None => return Ok(vec![]),
        };

        // Filters and sorts see the entry's wire form, the same shape a
        // persistent backend would index.
        let mut selected = Vec::with_capacity(entries.len());
        for entry in entries {
            let rendered = serialize_to_bson(entry)?
                .as_document()
                .cloned()
                .ok_or_else(|| ApiError::internal("log entry did not serialize to a document"))?;

            let matched = match &query.filter {
                Some(filter) => DocumentEvaluator::new(&rendered).matches(filter)?,
                None => true,
            };

            if matched {
                selected.push((rendered, entry.clone()));
            }
        }

        if let Some(sort) = &query.sort {
            selected.sort_by(|(a, _), (b, _)| compare_documents(a, b, sort));
        }

        Ok(selected
            .into_iter()
            .map(|(_, entry)| entry)
            .skip(query.offset.unwrap_or(0))
            .take(query.limit.unwrap_or(usize::MAX))
            .collect())
    }
}

/// Builder for constructing [`InMemoryStore`] instances.
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl StorageBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> ApiResult<Self::Backend> {
        Ok(InMemoryStore::new())
    }
}
