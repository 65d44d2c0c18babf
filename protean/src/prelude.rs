//! Convenient re-exports of commonly used types from protean.
//!
//! Import this prelude module to quickly access the most frequently used
//! types and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use protean::prelude::*;
//! ```

pub use protean_core::{
    backend::{StorageBackend, StorageBackendBuilder},
    document::{DocumentId, ID_FIELD},
    error::{ApiError, ApiResult},
    filter::{
        Condition, FieldTypes, Filter, FilterBuilder, FilterOp, FilterVisitor, Query,
        QueryBuilder, Sort, SortDirection,
    },
    page::PaginationParams,
    resources::{ObjectList, Resources},
    schema::{DefinitionSource, PropertyDefinition, PropertyType, ResourceDefinition},
    usage::{EndpointType, LogEntry, LogFields, UsageAggregator, UsageBucket, UsageReport},
};
