//! Runtime resource definitions: the property schemas tenants declare.
//!
//! A [`ResourceDefinition`] is created and updated by an out-of-band
//! management flow and is strictly read-only here: every request resolves one
//! owned snapshot through a [`DefinitionSource`] and uses that snapshot for
//! the whole request, so a concurrent definition update can never be observed
//! as a mix of old and new property sets.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, ApiResult},
    filter::FieldTypes,
    namespace,
};

/// The closed set of types a declared property may have.
///
/// Definitions referencing any other type string fail to deserialize, so the
/// codec can assume every resolved definition is well-typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    /// UTF-8 text.
    String,
    /// Integer or floating point number.
    Number,
    /// True or false.
    Boolean,
    /// A list of values.
    Array,
    /// A nested key/value object. Members are not validated further.
    Object,
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PropertyType::String => "string",
            PropertyType::Number => "number",
            PropertyType::Boolean => "boolean",
            PropertyType::Array => "array",
            PropertyType::Object => "object",
        })
    }
}

/// One declared field of a resource: name, type, requiredness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    /// The field name, unique within the resource.
    pub name: String,
    /// The declared value type.
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    /// Whether a payload missing this field is rejected.
    #[serde(default)]
    pub required: bool,
}

impl PropertyDefinition {
    /// Declares a property a payload must always carry.
    pub fn required(name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            property_type,
            required: true,
        }
    }

    /// Declares a property a payload may omit.
    pub fn optional(name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            property_type,
            required: false,
        }
    }
}

/// A tenant-declared resource: a path name plus its ordered properties.
///
/// Immutable once resolved for a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    /// The path segment the resource is served under.
    pub path_name: String,
    /// The declared properties, in declaration order.
    pub properties: Vec<PropertyDefinition>,
}

impl ResourceDefinition {
    /// Creates a definition from a path name and its properties.
    pub fn new(path_name: impl Into<String>, properties: Vec<PropertyDefinition>) -> Self {
        Self {
            path_name: path_name.into(),
            properties,
        }
    }

    /// Looks up a declared property by name.
    pub fn property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties
            .iter()
            .find(|property| property.name == name)
    }

    /// Checks the definition the way the management flow must before storing
    /// it: path name well-formed and not reserved, property names well-formed
    /// and unique, and the identity field name left alone.
    ///
    /// The codec and filter model assume every resolved definition passed
    /// this check.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidDefinition`] describing the first problem
    /// found.
    pub fn validate(&self) -> ApiResult<()> {
        if !namespace::is_valid_slug(&self.path_name) {
            return Err(ApiError::InvalidDefinition(format!(
                "path name '{}' is not a valid slug",
                self.path_name
            )));
        }

        if namespace::is_reserved_path(&self.path_name) {
            return Err(ApiError::InvalidDefinition(format!(
                "path name '{}' is reserved",
                self.path_name
            )));
        }

        for (index, property) in self.properties.iter().enumerate() {
            if property.name == crate::document::ID_FIELD {
                return Err(ApiError::InvalidDefinition(
                    "property name 'id' is reserved for the identity field".to_string(),
                ));
            }

            if !is_valid_property_name(&property.name) {
                return Err(ApiError::InvalidDefinition(format!(
                    "property name '{}' is not a valid identifier",
                    property.name
                )));
            }

            if self.properties[..index]
                .iter()
                .any(|earlier| earlier.name == property.name)
            {
                return Err(ApiError::InvalidDefinition(format!(
                    "duplicate property name '{}'",
                    property.name
                )));
            }
        }

        Ok(())
    }
}

impl FieldTypes for ResourceDefinition {
    fn field_type(&self, field: &str) -> Option<PropertyType> {
        self.property(field)
            .map(|property| property.property_type)
    }
}

/// Property names are lowercase identifiers: `[a-z_][a-z0-9_]*`.
fn is_valid_property_name(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// The definition collaborator: resolves the schema snapshot for a request.
///
/// Implementations must return an owned snapshot; callers perform exactly one
/// resolve per logical request and reuse it for both encode and decode.
#[async_trait]
pub trait DefinitionSource: Send + Sync {
    /// Resolves the resource definition declared by `tenant` under
    /// `path_name`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ResourceNotFound`] when the tenant has no such
    /// resource, or [`ApiError::Internal`] when the lookup itself fails.
    async fn resolve(&self, tenant: &str, path_name: &str) -> ApiResult<ResourceDefinition>;
}

#[async_trait]
impl<D> DefinitionSource for &D
where
    D: DefinitionSource + ?Sized,
{
    async fn resolve(&self, tenant: &str, path_name: &str) -> ApiResult<ResourceDefinition> {
        (**self).resolve(tenant, path_name).await
    }
}

#[async_trait]
impl<D> DefinitionSource for Box<D>
where
    D: DefinitionSource + ?Sized,
{
    async fn resolve(&self, tenant: &str, path_name: &str) -> ApiResult<ResourceDefinition> {
        (**self).resolve(tenant, path_name).await
    }
}
