//! Error types and result types for resource operations.
//!
//! Every fallible operation in this crate returns [`ApiResult<T>`]. The error
//! taxonomy is deliberately small: a variant is either not-found, invalid
//! client input, or an internal storage fault, and [`ApiError::status_code`]
//! gives the transport layer its status mapping without the transport layer
//! ever matching on variants.

use bson::error::Error as BsonError;
use thiserror::Error;

use crate::schema::PropertyType;

/// Represents all errors a resource operation can surface to the boundary.
///
/// Messages carry what a user-facing report needs (field name, expected type,
/// offending identifier). Storage-side detail is never part of the rendered
/// message; it is recorded through `tracing` where the error is constructed
/// and kept on the variant for programmatic access only.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No resource definition exists for the tenant and path name.
    #[error("resource '{0}' does not exist")]
    ResourceNotFound(String),
    /// No document with the given identifier exists in the resource.
    #[error("object '{0}' does not exist")]
    ObjectNotFound(String),
    /// The payload carries a field the resource does not declare.
    #[error("unknown field '{0}'")]
    UnknownField(String),
    /// A declared required field is absent from the payload.
    #[error("missing required field '{0}'")]
    MissingField(String),
    /// A payload value's type tag disagrees with the declared property type.
    #[error("field '{field}' must be of type '{expected}'")]
    TypeMismatch {
        /// The offending field name.
        field: String,
        /// The type the resource declares for the field.
        expected: PropertyType,
    },
    /// A client-supplied identifier string could not be parsed.
    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),
    /// A resource definition failed validation at definition time.
    #[error("invalid definition: {0}")]
    InvalidDefinition(String),
    /// A filter names a field with no known type.
    #[error("cannot filter on unknown field '{0}'")]
    UnknownFilterField(String),
    /// A filter operand's type tag disagrees with the field's known type.
    #[error("filter on '{field}' requires a '{expected}' operand")]
    FilterTypeMismatch {
        /// The filtered field name.
        field: String,
        /// The type the field is known to have.
        expected: PropertyType,
    },
    /// The storage collaborator failed. The rendered message is a stable
    /// summary; the backend detail lives in the variant and in the log.
    #[error("internal storage error")]
    Internal(String),
}

impl ApiError {
    /// Wraps a storage-side failure, recording its detail at error level.
    ///
    /// The detail never reaches the boundary message verbatim.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        let detail = err.to_string();
        tracing::error!(%detail, "storage operation failed");

        ApiError::Internal(detail)
    }

    /// Returns the transport status this error maps to at the boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::ResourceNotFound(_) | ApiError::ObjectNotFound(_) => 404,
            ApiError::UnknownField(_)
            | ApiError::MissingField(_)
            | ApiError::TypeMismatch { .. }
            | ApiError::InvalidIdentifier(_)
            | ApiError::InvalidDefinition(_)
            | ApiError::UnknownFilterField(_)
            | ApiError::FilterTypeMismatch { .. } => 400,
            ApiError::Internal(_) => 500,
        }
    }

    /// True for the not-found half of the taxonomy.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ApiError::ResourceNotFound(_) | ApiError::ObjectNotFound(_)
        )
    }
}

/// A specialized `Result` type for resource operations.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<BsonError> for ApiError {
    fn from(err: BsonError) -> Self {
        ApiError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(ApiError::ResourceNotFound("books".into()).status_code(), 404);
        assert_eq!(ApiError::ObjectNotFound("abc".into()).status_code(), 404);
        assert_eq!(ApiError::UnknownField("color".into()).status_code(), 400);
        assert_eq!(
            ApiError::TypeMismatch {
                field: "age".into(),
                expected: PropertyType::Number,
            }
            .status_code(),
            400
        );
        assert_eq!(ApiError::Internal("connection reset".into()).status_code(), 500);
    }

    #[test]
    fn internal_message_hides_backend_detail() {
        let err = ApiError::Internal("topology closed: server 10.0.0.3 unreachable".into());

        assert_eq!(err.to_string(), "internal storage error");
    }

    #[test]
    fn messages_name_the_field_and_expected_type() {
        let err = ApiError::TypeMismatch {
            field: "age".into(),
            expected: PropertyType::Number,
        };

        assert_eq!(err.to_string(), "field 'age' must be of type 'number'");
    }
}
