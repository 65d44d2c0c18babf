//! Filter translation from the protean filter model to MongoDB query syntax.

use bson::{Bson, Document, doc};

use protean_core::{
    error::ApiError,
    filter::{FilterOp, FilterVisitor},
};

/// Translates filters into MongoDB query documents.
///
/// Every condition becomes one `{field: {$op: operand}}` clause; conditions
/// AND-combine under `$and`. An empty filter translates to the empty query
/// document, which matches everything.
pub(crate) struct MongoFilterTranslator;

impl FilterVisitor for MongoFilterTranslator {
    type Output = Document;
    type Error = ApiError;

    fn visit_condition(
        &mut self,
        field: &str,
        op: FilterOp,
        operand: &Bson,
    ) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: match op {
                FilterOp::Eq => doc! { "$eq": operand },
                FilterOp::Ne => doc! { "$ne": operand },
                FilterOp::Gt => doc! { "$gt": operand },
                FilterOp::Gte => doc! { "$gte": operand },
                FilterOp::Lt => doc! { "$lt": operand },
                FilterOp::Lte => doc! { "$lte": operand },
                FilterOp::In => doc! { "$in": operand },
            }
        })
    }

    fn visit_all(&mut self, mut outputs: Vec<Self::Output>) -> Result<Self::Output, Self::Error> {
        Ok(match outputs.len() {
            0 => doc! {},
            1 => outputs.remove(0),
            _ => doc! { "$and": outputs },
        })
    }
}
