//! The resource operations exposed to the transport boundary.
//!
//! [`Resources`] composes the definition collaborator, the document codec,
//! the namer, and the storage backend into the five generic operations a
//! tenant resource supports: create, list, get, delete, and usage. Each
//! operation resolves one definition snapshot, validates everything before
//! the first write, and returns either the response payload or an
//! [`ApiError`] the boundary maps to a transport status.
//!
//! The service holds no state beyond its two collaborators and introduces no
//! locks; any number of requests may run concurrently.

use bson::Bson;
use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    backend::StorageBackend,
    document::{self, DocumentId, STORED_ID_FIELD},
    error::{ApiError, ApiResult},
    filter::{FilterBuilder, FilterOp, Query},
    namespace,
    page::PaginationParams,
    schema::{DefinitionSource, ResourceDefinition},
    usage::{EndpointType, LogFields, UsageAggregator, UsageReport},
};

/// Cap on log entries fed into one usage aggregation.
const USAGE_LOG_LIMIT: usize = 10_000;

/// A list response: the decoded objects, their count, and the definition
/// they were decoded against.
#[derive(Debug, Serialize)]
pub struct ObjectList {
    /// The decoded objects.
    pub items: Vec<Map<String, Value>>,
    /// Number of items returned.
    pub count: usize,
    /// The resource definition the items conform to.
    pub definition: ResourceDefinition,
}

/// The generic operations over a tenant's declared resources.
#[derive(Debug)]
pub struct Resources<B, D> {
    backend: B,
    definitions: D,
}

impl<B, D> Resources<B, D>
where
    B: StorageBackend,
    D: DefinitionSource,
{
    /// Creates the service from its two collaborators.
    pub fn new(backend: B, definitions: D) -> Self {
        Self {
            backend,
            definitions,
        }
    }

    /// The storage backend, for callers that also drive it directly.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Validates a payload against the resource's definition and stores it.
    ///
    /// The response is the validated fields plus the assigned `"id"`. Nothing
    /// is written when validation fails.
    pub async fn create_object(
        &self,
        tenant: &str,
        path_name: &str,
        payload: &Map<String, Value>,
    ) -> ApiResult<Map<String, Value>> {
        let definition = self.resolve(tenant, path_name).await?;
        let encoded = document::encode(&definition, payload)?;

        let namespace = namespace::namespace(tenant, path_name);
        let id = self.backend.insert(&namespace, encoded.clone()).await?;
        tracing::info!(tenant, resource = path_name, id = %id, "object created");

        let mut stored = encoded;
        stored.insert(STORED_ID_FIELD, id.as_uuid());

        document::decode(&definition, &stored)
    }

    /// Lists the resource's objects matching the given conditions.
    ///
    /// Conditions arrive untyped from the boundary and are validated against
    /// the resolved definition before any storage call; they AND-combine.
    pub async fn list_objects(
        &self,
        tenant: &str,
        path_name: &str,
        conditions: Vec<(String, FilterOp, Value)>,
        pagination: &PaginationParams,
    ) -> ApiResult<ObjectList> {
        let definition = self.resolve(tenant, path_name).await?;

        let mut builder = FilterBuilder::for_fields(&definition);
        for (field, op, operand) in conditions {
            builder = builder.condition(field, op, document::json_to_bson(&operand))?;
        }

        let query = Query::builder()
            .filter(builder.build())
            .limit(pagination.per_page)
            .offset(pagination.offset())
            .build();

        let namespace = namespace::namespace(tenant, path_name);
        let stored = self.backend.find_many(&namespace, query).await?;

        let items = stored
            .iter()
            .map(|document| document::decode(&definition, document))
            .collect::<ApiResult<Vec<_>>>()?;
        tracing::debug!(tenant, resource = path_name, count = items.len(), "objects listed");

        Ok(ObjectList {
            count: items.len(),
            items,
            definition,
        })
    }

    /// Fetches one object by its identifier string.
    pub async fn get_object(
        &self,
        tenant: &str,
        path_name: &str,
        id: &str,
    ) -> ApiResult<Map<String, Value>> {
        let definition = self.resolve(tenant, path_name).await?;
        let id = DocumentId::parse(id)?;

        let namespace = namespace::namespace(tenant, path_name);
        let stored = self.backend.find_one(&namespace, id).await?;

        document::decode(&definition, &stored)
    }

    /// Deletes one object by its identifier string.
    ///
    /// Deleting an absent identifier is
    /// [`ApiError::ObjectNotFound`], never a silent success; a successful
    /// delete has no-content semantics upward.
    pub async fn delete_object(&self, tenant: &str, path_name: &str, id: &str) -> ApiResult<()> {
        ensure_tenant(tenant)?;
        ensure_path(path_name)?;
        let id = DocumentId::parse(id)?;

        let namespace = namespace::namespace(tenant, path_name);
        self.backend.delete(&namespace, id).await?;
        tracing::info!(tenant, resource = path_name, id = %id, "object deleted");

        Ok(())
    }

    /// Aggregates the tenant's resource-endpoint traffic over the trailing
    /// `window` into per-bucket usage statistics.
    ///
    /// A storage failure aborts the whole report; a partial aggregate is
    /// never returned as if complete.
    pub async fn usage(&self, tenant: &str, window: Duration) -> ApiResult<UsageReport> {
        ensure_tenant(tenant)?;

        let since = Utc::now() - window;
        let filter = FilterBuilder::for_fields(&LogFields)
            .condition("created", FilterOp::Gte, Bson::Int64(since.timestamp()))?
            .condition("endpoint_type", FilterOp::Eq, EndpointType::Resource.as_str())?
            .build();

        let query = Query::builder()
            .filter(filter)
            .limit(USAGE_LOG_LIMIT)
            .build();

        let logs = self.backend.list_logs(tenant, query).await?;

        let mut aggregator = UsageAggregator::new();
        aggregator.extend(&logs);
        tracing::debug!(tenant, entries = logs.len(), "usage aggregated");

        Ok(UsageReport {
            items: aggregator.finish(),
        })
    }

    async fn resolve(&self, tenant: &str, path_name: &str) -> ApiResult<ResourceDefinition> {
        ensure_tenant(tenant)?;
        ensure_path(path_name)?;

        self.definitions.resolve(tenant, path_name).await
    }
}

/// A malformed tenant slug would break namespace injectivity; reject it
/// before deriving anything from it.
fn ensure_tenant(tenant: &str) -> ApiResult<()> {
    if !namespace::is_valid_slug(tenant) {
        return Err(ApiError::InvalidIdentifier(tenant.to_string()));
    }

    Ok(())
}

/// A malformed path can name no declared resource.
fn ensure_path(path_name: &str) -> ApiResult<()> {
    if !namespace::is_valid_slug(path_name) {
        return Err(ApiError::ResourceNotFound(path_name.to_string()));
    }

    Ok(())
}
