//! Query predicates and query construction for document selection.
//!
//! A [`Filter`] is a flat mapping from field name to one
//! [`Condition`]; all entries must hold for a candidate to match (logical
//! AND). There is deliberately no OR and no nesting. Operand types are
//! checked against the field's known type when the filter is built, so a
//! type-mismatched filter fails with [`ApiError`] before any storage call.
//!
//! # Building filters
//!
//! ```ignore
//! use protean_core::filter::{FilterBuilder, FilterOp};
//!
//! let filter = FilterBuilder::for_fields(&definition)
//!     .condition("pages", FilterOp::Gte, 100_i64)?
//!     .build();
//! ```
//!
//! Backends consume filters through the [`FilterVisitor`] trait: the
//! in-memory backend evaluates conditions against BSON documents, the MongoDB
//! backend translates them into native query documents.

use bson::Bson;
use std::collections::BTreeMap;

use crate::{
    error::{ApiError, ApiResult},
    schema::PropertyType,
};

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

/// Sort specification for query results.
#[derive(Debug, Clone)]
pub struct Sort {
    /// The field name to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: SortDirection,
}

/// The closed set of comparison operators a filter condition may use.
///
/// Passed by value everywhere; there are no package-level operator constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Equal to.
    Eq,
    /// Not equal to.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal to.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal to.
    Lte,
    /// Equal to any element of the operand array.
    In,
}

/// One predicate applied to a single field.
#[derive(Debug, Clone)]
pub struct Condition {
    /// The comparison operator.
    pub op: FilterOp,
    /// The value compared against; for [`FilterOp::In`], an array.
    pub operand: Bson,
}

/// An immutable, AND-combined set of per-field conditions.
///
/// Filters are plain values: `Clone + Send + Sync`, safe to share across
/// concurrent queries. Construct them with [`FilterBuilder`] so operand types
/// are validated up front.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: BTreeMap<String, Condition>,
}

impl Filter {
    /// True when the filter has no conditions and matches everything.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// The number of conditions.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Looks up the condition on a field, if any.
    pub fn get(&self, field: &str) -> Option<&Condition> {
        self.conditions.get(field)
    }

    /// Iterates conditions in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.conditions
            .iter()
            .map(|(field, condition)| (field.as_str(), condition))
    }
}

/// A name-to-type view a filter can be validated against.
///
/// Implemented by [`ResourceDefinition`](crate::schema::ResourceDefinition)
/// for document filters and by
/// [`LogFields`](crate::usage::LogFields) for request-log filters.
pub trait FieldTypes {
    /// The known type of `field`, or `None` when the field does not exist.
    fn field_type(&self, field: &str) -> Option<PropertyType>;
}

/// Builds a [`Filter`], validating every condition against a set of known
/// field types.
#[derive(Debug)]
pub struct FilterBuilder<'a, T: FieldTypes + ?Sized> {
    types: &'a T,
    conditions: BTreeMap<String, Condition>,
}

impl<'a, T: FieldTypes + ?Sized> FilterBuilder<'a, T> {
    /// Creates a builder validating against `types`.
    pub fn for_fields(types: &'a T) -> Self {
        Self {
            types,
            conditions: BTreeMap::new(),
        }
    }

    /// Adds one condition, replacing any earlier condition on the same field.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnknownFilterField`] when the field has no known
    /// type, or [`ApiError::FilterTypeMismatch`] when the operand's tag
    /// disagrees with it. For [`FilterOp::In`] the operand must be an array
    /// whose every element matches the field type.
    pub fn condition(
        mut self,
        field: impl Into<String>,
        op: FilterOp,
        operand: impl Into<Bson>,
    ) -> ApiResult<Self> {
        let field = field.into();
        let operand = operand.into();

        let expected = self
            .types
            .field_type(&field)
            .ok_or_else(|| ApiError::UnknownFilterField(field.clone()))?;

        let well_typed = match op {
            FilterOp::In => match &operand {
                Bson::Array(elements) => elements
                    .iter()
                    .all(|element| operand_matches(expected, element)),
                _ => false,
            },
            _ => operand_matches(expected, &operand),
        };

        if !well_typed {
            return Err(ApiError::FilterTypeMismatch { field, expected });
        }

        self.conditions
            .insert(field, Condition { op, operand });

        Ok(self)
    }

    /// Finalizes the filter.
    pub fn build(self) -> Filter {
        Filter {
            conditions: self.conditions,
        }
    }
}

/// Tag compatibility between a known field type and a BSON operand.
fn operand_matches(expected: PropertyType, operand: &Bson) -> bool {
    match expected {
        PropertyType::String => matches!(operand, Bson::String(_)),
        PropertyType::Number => matches!(
            operand,
            Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_)
        ),
        PropertyType::Boolean => matches!(operand, Bson::Boolean(_)),
        PropertyType::Array => matches!(operand, Bson::Array(_)),
        PropertyType::Object => matches!(operand, Bson::Document(_)),
    }
}

/// Consumes a [`Filter`] one condition at a time.
///
/// `visit_filter` drives the traversal: every condition is visited in
/// field-name order and the outputs are AND-combined by `visit_all`. An empty
/// filter goes straight to `visit_all` with no outputs, which implementations
/// must treat as match-everything.
pub trait FilterVisitor {
    type Output;
    type Error: Into<ApiError>;

    /// Produces this visitor's representation of one condition.
    fn visit_condition(
        &mut self,
        field: &str,
        op: FilterOp,
        operand: &Bson,
    ) -> Result<Self::Output, Self::Error>;

    /// AND-combines the per-condition outputs.
    fn visit_all(&mut self, outputs: Vec<Self::Output>) -> Result<Self::Output, Self::Error>;

    /// Visits every condition and combines the results.
    fn visit_filter(&mut self, filter: &Filter) -> Result<Self::Output, Self::Error> {
        let outputs = filter
            .iter()
            .map(|(field, condition)| {
                self.visit_condition(field, condition.op, &condition.operand)
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.visit_all(outputs)
    }
}

/// A structured query for selecting documents or log entries.
///
/// Encapsulates the optional filter plus limit, offset, and sort. Use
/// [`QueryBuilder`] for fluent construction.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Optional filter; `None` matches everything.
    pub filter: Option<Filter>,
    /// Maximum number of results to return.
    pub limit: Option<usize>,
    /// Number of results to skip (for pagination).
    pub offset: Option<usize>,
    /// Sort specification for results.
    pub sort: Option<Sort>,
}

impl Query {
    /// Creates an empty query with no filter or limits.
    pub fn new() -> Self {
        Query::default()
    }

    /// Creates a builder for fluent construction.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    /// Creates a new query builder.
    pub fn new() -> Self {
        QueryBuilder {
            query: Query::default(),
        }
    }

    /// Sets the filter for this query.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.query.filter = Some(filter);
        self
    }

    /// Sets the maximum number of results to return.
    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    /// Sets the number of results to skip.
    pub fn offset(mut self, offset: usize) -> Self {
        self.query.offset = Some(offset);
        self
    }

    /// Sets the sort specification.
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.query.sort = Some(Sort {
            field: field.into(),
            direction,
        });
        self
    }

    /// Builds and returns the final query.
    pub fn build(self) -> Query {
        self.query
    }
}
