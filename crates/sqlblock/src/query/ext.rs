//! Common clause extensions built on custom fragments.

use super::{ClausePosition, Query};
use crate::block::Block;

/// Extension methods for [`Query`].
///
/// # Example
///
/// ```
/// use sqlblock::{Query, QueryExt};
///
/// let sql = Query::new().distinct().fields(["id"]).from("customer").to_sql();
/// assert_eq!(sql, "SELECT DISTINCT id FROM customer");
/// ```
pub trait QueryExt: Sized {
    /// Append `FOR UPDATE` after the LIMIT clause.
    fn for_update(self) -> Self;

    /// Insert `DISTINCT` right after `SELECT`.
    fn distinct(self) -> Self;

    /// Append `UNION ( <other> )` after the WHERE clause.
    fn union(self, other: &Query) -> Self;

    /// Append `UNION ALL ( <other> )` after the WHERE clause.
    fn union_all(self, other: &Query) -> Self;
}

impl QueryExt for Query {
    fn for_update(self) -> Self {
        self.add_expression_after(ClausePosition::Limit, Block::raw("FOR UPDATE"))
    }

    fn distinct(self) -> Self {
        self.add_expression_after(ClausePosition::Select, Block::raw("DISTINCT"))
    }

    fn union(self, other: &Query) -> Self {
        self.add_expression_after(ClausePosition::Where, Block::new("UNION (", other.to_sql(), ")"))
    }

    fn union_all(self, other: &Query) -> Self {
        self.add_expression_after(
            ClausePosition::Where,
            Block::new("UNION ALL (", other.to_sql(), ")"),
        )
    }
}
