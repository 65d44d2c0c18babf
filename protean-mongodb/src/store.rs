use async_trait::async_trait;
use bson::{Bson, Document, de::deserialize_from_bson, doc};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection as MongoCollection,
    options::{ClientOptions, FindOptions},
};

use protean_core::{
    backend::{StorageBackend, StorageBackendBuilder},
    document::{DocumentId, STORED_ID_FIELD},
    error::{ApiError, ApiResult},
    filter::{FilterVisitor, Query, SortDirection},
    namespace::logs_namespace,
    usage::LogEntry,
};

use crate::query::MongoFilterTranslator;

#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    fn get_collection(&self, namespace: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(namespace)
    }

    fn find_options(query: &Query) -> FindOptions {
        let mut options = FindOptions::default();

        if let Some(limit) = query.limit {
            options.limit = Some(limit as i64);
        }
        if let Some(skip) = query.offset {
            options.skip = Some(skip as u64);
        }
        if let Some(sort) = &query.sort {
            options.sort = Some(doc! {
                sort.field.clone(): match sort.direction {
                    SortDirection::Asc => 1,
                    SortDirection::Desc => -1,
                }
            });
        }

        options
    }

    fn translate_filter(query: &Query) -> ApiResult<Document> {
        match &query.filter {
            Some(filter) => MongoFilterTranslator.visit_filter(filter),
            None => Ok(doc! {}),
        }
    }
}

#[async_trait]
impl StorageBackend for MongoDbStore {
    async fn insert(&self, namespace: &str, mut document: Document) -> ApiResult<DocumentId> {
        let id = DocumentId::new();
        document.insert(STORED_ID_FIELD, id.as_uuid());

        self.get_collection(namespace)
            .insert_one(document)
            .await
            .map_err(ApiError::internal)?;

        Ok(id)
    }

    async fn find_many(&self, namespace: &str, query: Query) -> ApiResult<Vec<Document>> {
        Ok(self
            .get_collection(namespace)
            .find(Self::translate_filter(&query)?)
            .with_options(Self::find_options(&query))
            .await
            .map_err(ApiError::internal)?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(ApiError::internal)?)
    }

    async fn find_one(&self, namespace: &str, id: DocumentId) -> ApiResult<Document> {
        self.get_collection(namespace)
            .find_one(doc! { STORED_ID_FIELD: id.as_uuid() })
            .await
            .map_err(ApiError::internal)?
            .ok_or_else(|| ApiError::ObjectNotFound(id.to_string()))
    }

    async fn delete(&self, namespace: &str, id: DocumentId) -> ApiResult<()> {
        let result = self
            .get_collection(namespace)
            .delete_one(doc! { STORED_ID_FIELD: id.as_uuid() })
            .await
            .map_err(ApiError::internal)?;

        if result.deleted_count == 0 {
            return Err(ApiError::ObjectNotFound(id.to_string()));
        }

        Ok(())
    }

    async fn list_logs(&self, tenant: &str, query: Query) -> ApiResult<Vec<LogEntry>> {
        self.get_collection(&logs_namespace(tenant))
            .find(Self::translate_filter(&query)?)
            .with_options(Self::find_options(&query))
            .await
            .map_err(ApiError::internal)?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(ApiError::internal)?
            .into_iter()
            .map(|entry| {
                deserialize_from_bson::<LogEntry>(Bson::Document(entry))
                    .map_err(ApiError::internal)
            })
            .collect::<ApiResult<Vec<LogEntry>>>()
    }
}

pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }
}

#[async_trait]
impl StorageBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    async fn build(self) -> ApiResult<Self::Backend> {
        Ok(MongoDbStore::new(
            Client::with_options(
                ClientOptions::parse(&self.dsn)
                    .await
                    .map_err(ApiError::internal)?,
            )
            .map_err(ApiError::internal)?,
            self.database,
        ))
    }
}
