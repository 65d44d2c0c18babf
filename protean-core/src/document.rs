//! Schema-driven conversion between untyped client payloads and stored
//! documents.
//!
//! [`encode`] takes a client JSON object plus the resolved
//! [`ResourceDefinition`] and produces a BSON document containing exactly the
//! declared fields, or rejects the payload before anything is written.
//! [`decode`] renders a stored document back into a client-safe JSON object,
//! surfacing the storage-assigned identity as an `"id"` string.
//!
//! Both functions are pure: they borrow their inputs immutably and allocate
//! independent outputs, so they are safe to call from any number of request
//! workers concurrently.

use bson::{Bson, de::deserialize_from_bson};
use serde_json::{Map, Value};

use crate::{
    error::{ApiError, ApiResult},
    schema::{PropertyType, ResourceDefinition},
};

/// The identity key surfaced to clients.
pub const ID_FIELD: &str = "id";

/// The identity key used in the stored form.
pub const STORED_ID_FIELD: &str = "_id";

/// The system-assigned identity of a stored document.
///
/// Assigned exactly once, at creation, by the storage backend; never accepted
/// from a client payload. Rendered as the canonical hyphenated UUID string,
/// which is URL-safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(bson::Uuid);

impl DocumentId {
    /// Generates a fresh identity. Called by storage backends on insert.
    pub fn new() -> Self {
        Self(bson::Uuid::new())
    }

    /// Parses a client-supplied identifier string.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidIdentifier`] naming the offending value.
    pub fn parse(input: &str) -> ApiResult<Self> {
        bson::Uuid::parse_str(input)
            .map(Self)
            .map_err(|_| ApiError::InvalidIdentifier(input.to_string()))
    }

    /// The underlying UUID, for building storage keys.
    pub fn as_uuid(&self) -> bson::Uuid {
        self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<DocumentId> for Bson {
    fn from(id: DocumentId) -> Self {
        id.0.into()
    }
}

/// Validates a client payload against the resolved definition and produces
/// the document to store.
///
/// Rules, applied before any write is attempted:
/// - every payload key must be a declared property (`id` is silently
///   ignored);
/// - every `required` property must be present;
/// - every present value's type tag must match the declared type, where JSON
///   `null` is accepted only for non-required properties (an explicit clear);
/// - the output contains the declared properties in declaration order and
///   nothing else.
///
/// # Errors
///
/// [`ApiError::UnknownField`], [`ApiError::MissingField`], or
/// [`ApiError::TypeMismatch`], each naming the offending field.
pub fn encode(
    definition: &ResourceDefinition,
    payload: &Map<String, Value>,
) -> ApiResult<bson::Document> {
    for key in payload.keys() {
        if key == ID_FIELD {
            continue;
        }

        if definition.property(key).is_none() {
            return Err(ApiError::UnknownField(key.clone()));
        }
    }

    let mut document = bson::Document::new();

    for property in &definition.properties {
        match payload.get(&property.name) {
            Some(Value::Null) if property.required => {
                return Err(ApiError::TypeMismatch {
                    field: property.name.clone(),
                    expected: property.property_type,
                });
            }
            Some(Value::Null) => {
                document.insert(property.name.clone(), Bson::Null);
            }
            Some(value) => {
                if !matches_json(property.property_type, value) {
                    return Err(ApiError::TypeMismatch {
                        field: property.name.clone(),
                        expected: property.property_type,
                    });
                }

                document.insert(property.name.clone(), json_to_bson(value));
            }
            None if property.required => {
                return Err(ApiError::MissingField(property.name.clone()));
            }
            None => {}
        }
    }

    Ok(document)
}

/// Renders a stored document into the client-safe JSON object.
///
/// Emits exactly the declared properties present in the stored document plus
/// `"id"`, the string form of the stored identity.
///
/// # Errors
///
/// Returns [`ApiError::Internal`] when the stored document carries no
/// readable identity; a document written through [`encode`] and the storage
/// backend always does.
pub fn decode(
    definition: &ResourceDefinition,
    stored: &bson::Document,
) -> ApiResult<Map<String, Value>> {
    let id_value = stored
        .get(STORED_ID_FIELD)
        .ok_or_else(|| ApiError::internal("stored document carries no identity field"))?;

    let id: bson::Uuid = deserialize_from_bson(id_value.clone())
        .map_err(|_| ApiError::internal("stored identity field is not a UUID"))?;

    let mut object = Map::new();
    object.insert(ID_FIELD.to_string(), Value::String(id.to_string()));

    for property in &definition.properties {
        if let Some(value) = stored.get(&property.name) {
            object.insert(property.name.clone(), bson_to_json(value));
        }
    }

    Ok(object)
}

/// Tag compatibility between a declared type and a JSON value.
fn matches_json(expected: PropertyType, value: &Value) -> bool {
    match expected {
        PropertyType::String => value.is_string(),
        PropertyType::Number => value.is_number(),
        PropertyType::Boolean => value.is_boolean(),
        PropertyType::Array => value.is_array(),
        PropertyType::Object => value.is_object(),
    }
}

/// Converts a JSON value to its stored BSON form.
///
/// Whole numbers become `Int64`, everything else numeric becomes `Double`,
/// so integers survive a round trip unchanged.
pub fn json_to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Bson::Int64(i),
            None => Bson::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => Bson::String(s.clone()),
        Value::Array(items) => Bson::Array(items.iter().map(json_to_bson).collect()),
        Value::Object(map) => Bson::Document(
            map.iter()
                .map(|(key, value)| (key.clone(), json_to_bson(value)))
                .collect(),
        ),
    }
}

/// Renders a stored BSON value as client-facing JSON.
pub fn bson_to_json(value: &Bson) -> Value {
    match value {
        Bson::Null => Value::Null,
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(n) => Value::from(*n),
        Bson::Int64(n) => Value::from(*n),
        Bson::Double(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Bson::String(s) => Value::String(s.clone()),
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
        Bson::Document(document) => Value::Object(
            document
                .iter()
                .map(|(key, value)| (key.to_string(), bson_to_json(value)))
                .collect(),
        ),
        // Tags the codec never writes (binary, datetime, ...) have no client
        // rendering.
        _ => Value::Null,
    }
}
