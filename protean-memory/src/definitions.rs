//! In-memory definition source.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use mea::rwlock::RwLock;

use protean_core::{
    error::{ApiError, ApiResult},
    schema::{DefinitionSource, ResourceDefinition},
};

/// Thread-safe in-memory store of resource definitions, keyed by tenant and
/// path name.
///
/// [`register`](InMemoryDefinitions::register) plays the role of the
/// out-of-band management flow: it validates a definition before storing it,
/// so everything resolved later can be assumed well-formed. Registering the
/// same path again replaces the definition atomically; in-flight requests
/// keep the snapshot they already resolved.
#[derive(Default, Clone, Debug)]
pub struct InMemoryDefinitions {
    definitions: Arc<RwLock<HashMap<(String, String), ResourceDefinition>>>,
}

impl InMemoryDefinitions {
    /// Creates an empty definition source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and stores a tenant's resource definition.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidDefinition`] when the definition fails
    /// validation; nothing is stored in that case.
    pub async fn register(&self, tenant: &str, definition: ResourceDefinition) -> ApiResult<()> {
        definition.validate()?;

        self.definitions
            .write()
            .await
            .insert((tenant.to_string(), definition.path_name.clone()), definition);

        Ok(())
    }

    /// Removes a tenant's resource definition, if present.
    pub async fn remove(&self, tenant: &str, path_name: &str) {
        self.definitions
            .write()
            .await
            .remove(&(tenant.to_string(), path_name.to_string()));
    }
}

#[async_trait]
impl DefinitionSource for InMemoryDefinitions {
    async fn resolve(&self, tenant: &str, path_name: &str) -> ApiResult<ResourceDefinition> {
        self.definitions
            .read()
            .await
            .get(&(tenant.to_string(), path_name.to_string()))
            .cloned()
            .ok_or_else(|| ApiError::ResourceNotFound(path_name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protean_core::schema::{PropertyDefinition, PropertyType};

    fn books() -> ResourceDefinition {
        ResourceDefinition::new(
            "books",
            vec![PropertyDefinition::required("title", PropertyType::String)],
        )
    }

    #[tokio::test]
    async fn registered_definitions_resolve_per_tenant() {
        let definitions = InMemoryDefinitions::new();
        definitions.register("acme", books()).await.unwrap();

        assert!(definitions.resolve("acme", "books").await.is_ok());
        assert!(matches!(
            definitions.resolve("globex", "books").await,
            Err(ApiError::ResourceNotFound(_))
        ));
    }

    #[tokio::test]
    async fn invalid_definitions_are_rejected_at_registration() {
        let definitions = InMemoryDefinitions::new();
        let reserved = ResourceDefinition::new("users", vec![]);

        assert!(matches!(
            definitions.register("acme", reserved).await,
            Err(ApiError::InvalidDefinition(_))
        ));
        assert!(definitions.resolve("acme", "users").await.is_err());
    }

    #[tokio::test]
    async fn re_registering_replaces_the_definition() {
        let definitions = InMemoryDefinitions::new();
        definitions.register("acme", books()).await.unwrap();

        let mut updated = books();
        updated
            .properties
            .push(PropertyDefinition::optional("pages", PropertyType::Number));
        definitions.register("acme", updated.clone()).await.unwrap();

        let resolved = definitions.resolve("acme", "books").await.unwrap();
        assert_eq!(resolved, updated);
    }
}
