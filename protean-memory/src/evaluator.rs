//! Filter evaluation against in-memory BSON documents.
//!
//! This module is the in-process realization of the filter semantics the
//! storage collaborator is required to support: every condition in a filter
//! must hold for a document to match.

use bson::Bson;
use std::{cmp::Ordering, collections::HashMap};

use protean_core::{
    error::{ApiError, ApiResult},
    filter::{Filter, FilterOp, FilterVisitor},
};

/// Type-erased, comparable representation of BSON values.
///
/// Normalizes all numeric widths to f64 so a filter built with an `Int64`
/// operand compares against `Int32` or `Double` fields the way a client
/// expects.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value (all integers and floats normalized to f64)
    Number(f64),
    /// String value
    String(&'a str),
    /// Array of comparable values
    Array(Vec<Comparable<'a>>),
    /// Map/Object of comparable values
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr.iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>(),
            ),
            Bson::Document(doc) => Comparable::Map(
                doc.iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>(),
            ),
            _ => Comparable::Null, // Other types are not comparable
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Evaluates a filter against one BSON document.
pub(crate) struct DocumentEvaluator<'a> {
    document: &'a bson::Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a bson::Document) -> Self {
        Self { document }
    }

    pub fn matches(&mut self, filter: &Filter) -> ApiResult<bool> {
        self.visit_filter(filter)
    }

    /// Keeps the documents a filter matches, in input order.
    pub fn filter_documents(
        documents: impl IntoIterator<Item = &'a bson::Document>,
        filter: &Filter,
    ) -> Vec<bson::Document> {
        documents
            .into_iter()
            .filter(|doc| {
                DocumentEvaluator::new(doc)
                    .matches(filter)
                    .unwrap_or(false)
            })
            .cloned()
            .collect::<Vec<_>>()
    }
}

impl<'a> FilterVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = ApiError;

    fn visit_condition(
        &mut self,
        field: &str,
        op: FilterOp,
        operand: &Bson,
    ) -> Result<Self::Output, Self::Error> {
        let Some(field_value) = self.document.get(field) else {
            // An absent field satisfies nothing.
            return Ok(false);
        };

        match op {
            FilterOp::Eq => Ok(Comparable::from(field_value) == Comparable::from(operand)),
            FilterOp::Ne => Ok(Comparable::from(field_value) != Comparable::from(operand)),
            FilterOp::Gt | FilterOp::Gte | FilterOp::Lt | FilterOp::Lte => {
                match Comparable::from(field_value).partial_cmp(&Comparable::from(operand)) {
                    Some(ordering) => Ok(match op {
                        FilterOp::Gt => ordering == Ordering::Greater,
                        FilterOp::Gte => {
                            ordering == Ordering::Greater || ordering == Ordering::Equal
                        }
                        FilterOp::Lt => ordering == Ordering::Less,
                        FilterOp::Lte => ordering == Ordering::Less || ordering == Ordering::Equal,
                        _ => unreachable!(),
                    }),
                    None => Ok(false),
                }
            }
            FilterOp::In => match operand {
                Bson::Array(options) => Ok(options
                    .iter()
                    .any(|option| Comparable::from(field_value) == Comparable::from(option))),
                // The builder guarantees an array operand.
                _ => Ok(false),
            },
        }
    }

    fn visit_all(&mut self, outputs: Vec<Self::Output>) -> Result<Self::Output, Self::Error> {
        Ok(outputs.into_iter().all(|matched| matched))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use protean_core::{
        filter::FilterBuilder,
        schema::{PropertyDefinition, PropertyType, ResourceDefinition},
    };

    fn numbers() -> ResourceDefinition {
        ResourceDefinition::new(
            "numbers",
            vec![
                PropertyDefinition::required("value", PropertyType::Number),
                PropertyDefinition::optional("label", PropertyType::String),
            ],
        )
    }

    #[test]
    fn gte_selects_the_matching_subset() {
        let documents = vec![
            doc! { "value": 5_i64 },
            doc! { "value": 10_i64 },
            doc! { "value": 15_i64 },
        ];

        let filter = FilterBuilder::for_fields(&numbers())
            .condition("value", FilterOp::Gte, 10_i64)
            .unwrap()
            .build();

        let matched = DocumentEvaluator::filter_documents(&documents, &filter);

        assert_eq!(matched, vec![doc! { "value": 10_i64 }, doc! { "value": 15_i64 }]);
    }

    #[test]
    fn conditions_combine_with_logical_and() {
        let documents = vec![
            doc! { "value": 5_i64, "label": "low" },
            doc! { "value": 10_i64, "label": "low" },
            doc! { "value": 10_i64, "label": "high" },
        ];

        let filter = FilterBuilder::for_fields(&numbers())
            .condition("value", FilterOp::Gte, 10_i64)
            .unwrap()
            .condition("label", FilterOp::Eq, "low")
            .unwrap()
            .build();

        let matched = DocumentEvaluator::filter_documents(&documents, &filter);

        assert_eq!(matched, vec![doc! { "value": 10_i64, "label": "low" }]);
    }

    #[test]
    fn an_empty_filter_matches_everything() {
        let documents = vec![doc! { "value": 1_i64 }, doc! { "value": 2_i64 }];

        let matched = DocumentEvaluator::filter_documents(&documents, &Filter::default());

        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn in_matches_any_listed_option() {
        let documents = vec![
            doc! { "value": 1_i64 },
            doc! { "value": 2_i64 },
            doc! { "value": 3_i64 },
        ];

        let filter = FilterBuilder::for_fields(&numbers())
            .condition(
                "value",
                FilterOp::In,
                vec![Bson::Int64(1), Bson::Int64(3)],
            )
            .unwrap()
            .build();

        let matched = DocumentEvaluator::filter_documents(&documents, &filter);

        assert_eq!(matched, vec![doc! { "value": 1_i64 }, doc! { "value": 3_i64 }]);
    }

    #[test]
    fn numeric_widths_compare_across_tags() {
        let documents = vec![doc! { "value": 10_i32 }, doc! { "value": 9.5_f64 }];

        let filter = FilterBuilder::for_fields(&numbers())
            .condition("value", FilterOp::Gte, 10_i64)
            .unwrap()
            .build();

        let matched = DocumentEvaluator::filter_documents(&documents, &filter);

        assert_eq!(matched, vec![doc! { "value": 10_i32 }]);
    }

    #[test]
    fn documents_missing_the_field_never_match() {
        let documents = vec![doc! { "label": "unlabeled" }];

        let filter = FilterBuilder::for_fields(&numbers())
            .condition("value", FilterOp::Eq, 1_i64)
            .unwrap()
            .build();

        assert!(DocumentEvaluator::filter_documents(&documents, &filter).is_empty());
    }
}
