//! Aggregate function fragments for SELECT fields and HAVING clauses.
//!
//! ```
//! use sqlblock::agg::{count, sum_gt};
//! use sqlblock::ops::lt;
//!
//! assert_eq!(sum_gt("role.id", 2).to_string(), "SUM( role.id ) > 2");
//! assert_eq!(lt(count("role.id"), 10).to_string(), "COUNT( role.id ) < 10");
//! ```

use crate::block::Block;
use crate::ops::Operand;

/// `FUNC( field )`
pub fn func(name: &str, field: &str) -> Block {
    Block::new(format!("{name}("), field, ")")
}

/// `FUNC( field ) <op> <value>`
pub fn agg<V: Operand>(name: &str, field: &str, op: &str, value: V) -> Block {
    Block::new(func(name, field).to_string(), op, value.operand())
}

macro_rules! aggregate {
    ($($name:ident => $sql:literal { $eq:ident, $gt:ident, $lt:ident, $ge:ident, $le:ident })*) => {
        $(
            #[doc = concat!("`", $sql, "( field )`")]
            pub fn $name(field: &str) -> Block {
                func($sql, field)
            }

            #[doc = concat!("`", $sql, "( field ) = value`")]
            pub fn $eq<V: Operand>(field: &str, value: V) -> Block {
                agg($sql, field, "=", value)
            }

            pub fn $gt<V: Operand>(field: &str, value: V) -> Block {
                agg($sql, field, ">", value)
            }

            pub fn $lt<V: Operand>(field: &str, value: V) -> Block {
                agg($sql, field, "<", value)
            }

            pub fn $ge<V: Operand>(field: &str, value: V) -> Block {
                agg($sql, field, ">=", value)
            }

            pub fn $le<V: Operand>(field: &str, value: V) -> Block {
                agg($sql, field, "<=", value)
            }
        )*
    };
}

aggregate! {
    sum => "SUM" { sum_eq, sum_gt, sum_lt, sum_ge, sum_le }
    count => "COUNT" { count_eq, count_gt, count_lt, count_ge, count_le }
    avg => "AVG" { avg_eq, avg_gt, avg_lt, avg_ge, avg_le }
    min => "MIN" { min_eq, min_gt, min_lt, min_ge, min_le }
    max => "MAX" { max_eq, max_gt, max_lt, max_ge, max_le }
}
