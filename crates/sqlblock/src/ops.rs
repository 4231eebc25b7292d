//! Condition operators.
//!
//! Every function returns a [`Block`] usable with [`Query::where_`](crate::Query::where_),
//! [`Query::having`](crate::Query::having) or [`Query::on`](crate::Query::on).
//!
//! Text values become `?` placeholders (bind them in the same order at execution time);
//! numeric and boolean values are inlined. The `_raw` variants inline the given text.
//!
//! ```
//! use sqlblock::ops::{eq, gt, like, or, sub};
//!
//! assert_eq!(eq("name", "Leng").to_string(), "name = ?");
//! assert_eq!(gt("age", 30).to_string(), "age > 30");
//! assert_eq!(
//!     sub(or(like("name", "%bat"), like("name", "man%"))).to_string(),
//!     "( name LIKE ? OR name LIKE ? )"
//! );
//! ```

use crate::block::{Block, Fragment};
use crate::value::quote_literal;

/// A value on the right-hand side of an operator.
pub trait Operand {
    /// Text used in a condition: `?` for text, the literal for numbers.
    fn operand(&self) -> String;

    /// Inline SQL literal (text is single-quoted with `'` doubled).
    fn literal(&self) -> String;
}

impl Operand for str {
    fn operand(&self) -> String {
        "?".to_string()
    }

    fn literal(&self) -> String {
        quote_literal(self)
    }
}

impl Operand for String {
    fn operand(&self) -> String {
        "?".to_string()
    }

    fn literal(&self) -> String {
        quote_literal(self)
    }
}

impl<T: Operand + ?Sized> Operand for &T {
    fn operand(&self) -> String {
        (**self).operand()
    }

    fn literal(&self) -> String {
        (**self).literal()
    }
}

macro_rules! impl_inline_operand {
    ($($t:ty),* $(,)?) => {
        $(
            impl Operand for $t {
                fn operand(&self) -> String {
                    self.to_string()
                }

                fn literal(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_inline_operand!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64, bool);

fn text(field: impl Into<Fragment>) -> String {
    field.into().into_string()
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

// ==================== Comparison ====================

macro_rules! comparison {
    ($($(#[$doc:meta])* $name:ident, $raw:ident => $op:literal;)*) => {
        $(
            $(#[$doc])*
            pub fn $name<V: Operand>(field: impl Into<Fragment>, value: V) -> Block {
                Block::new(text(field), $op, value.operand())
            }

            /// Same comparison with `value` inlined verbatim (e.g. another column).
            pub fn $raw(field: impl Into<Fragment>, value: &str) -> Block {
                Block::new(text(field), $op, value)
            }
        )*
    };
}

comparison! {
    /// `field = value`
    eq, eq_raw => "=";
    /// `field != value`
    neq, neq_raw => "!=";
    /// `field > value`
    gt, gt_raw => ">";
    /// `field >= value`
    ge, ge_raw => ">=";
    /// `field < value`
    lt, lt_raw => "<";
    /// `field <= value`
    le, le_raw => "<=";
}

// ==================== Pattern matching ====================

pub fn like(field: impl Into<Fragment>, pattern: &str) -> Block {
    Block::new(text(field), "LIKE", pattern.operand())
}

/// `field LIKE '<pattern>'` with the pattern inlined as a quoted literal.
pub fn like_raw(field: impl Into<Fragment>, pattern: &str) -> Block {
    Block::new(text(field), "LIKE", quote_literal(pattern))
}

pub fn not_like(field: impl Into<Fragment>, pattern: &str) -> Block {
    Block::new(text(field), "NOT LIKE", pattern.operand())
}

pub fn not_like_raw(field: impl Into<Fragment>, pattern: &str) -> Block {
    Block::new(text(field), "NOT LIKE", quote_literal(pattern))
}

/// `REGEXP_LIKE( field, ? )`
pub fn regexp(field: impl Into<Fragment>) -> Block {
    Block::new("REGEXP_LIKE(", format!("{}, ?", text(field)), ")")
}

/// `REGEXP_LIKE( field, '<regex>' )`, with optional match flags such as `'i'`.
pub fn regexp_raw(field: impl Into<Fragment>, regex: &str, flags: Option<&str>) -> Block {
    let args = match flags {
        Some(flags) => format!("{}, {}, {}", text(field), quote_literal(regex), quote_literal(flags)),
        None => format!("{}, {}", text(field), quote_literal(regex)),
    };
    Block::new("REGEXP_LIKE(", args, ")")
}

pub fn not_regexp(field: impl Into<Fragment>) -> Block {
    Block::new("NOT REGEXP_LIKE(", format!("{}, ?", text(field)), ")")
}

pub fn not_regexp_raw(field: impl Into<Fragment>, regex: &str, flags: Option<&str>) -> Block {
    let inner = regexp_raw(field, regex, flags);
    Block::new("NOT", inner.to_string(), "")
}

/// MySQL full-text search: `MATCH( field ) AGAINST ( ? IN NATURAL LANGUAGE MODE )`.
pub fn match_against(field: &str) -> Block {
    match_against_mode(&[field], "NATURAL LANGUAGE MODE")
}

/// Full-text search over several columns.
pub fn match_against_any(fields: &[&str]) -> Block {
    match_against_mode(fields, "NATURAL LANGUAGE MODE")
}

/// Full-text search with an explicit mode, e.g. `BOOLEAN MODE`.
pub fn match_against_mode(fields: &[&str], mode: &str) -> Block {
    Block::new("MATCH(", fields.join(","), format!(") AGAINST ( ? IN {mode} )"))
}

// ==================== Ranges and NULL ====================

/// `field BETWEEN low AND high`
pub fn between<V: Operand>(field: impl Into<Fragment>, low: V, high: V) -> Block {
    Block::new(
        format!("{} BETWEEN", text(field)),
        low.operand(),
        format!("AND {}", high.operand()),
    )
}

pub fn is_null(field: impl Into<Fragment>) -> Block {
    Block::pair(text(field), "IS NULL")
}

pub fn is_not_null(field: impl Into<Fragment>) -> Block {
    Block::pair(text(field), "IS NOT NULL")
}

// ==================== IN lists ====================

/// `field IN (?,?,...)` with one placeholder per value.
pub fn in_list<V: Operand>(field: impl Into<Fragment>, values: &[V]) -> Block {
    in_size(field, values.len())
}

pub fn not_in_list<V: Operand>(field: impl Into<Fragment>, values: &[V]) -> Block {
    not_in_size(field, values.len())
}

/// `field IN (?,?,...)` with `n` placeholders.
pub fn in_size(field: impl Into<Fragment>, n: usize) -> Block {
    Block::new(text(field), "IN", format!("({})", placeholders(n)))
}

pub fn not_in_size(field: impl Into<Fragment>, n: usize) -> Block {
    Block::new(text(field), "NOT IN", format!("({})", placeholders(n)))
}

/// `field IN (<values>)` with the list text passed through, e.g. `"1,2,3"`.
pub fn in_raw(field: impl Into<Fragment>, values: &str) -> Block {
    Block::new(text(field), "IN", format!("({values})"))
}

pub fn not_in_raw(field: impl Into<Fragment>, values: &str) -> Block {
    Block::new(text(field), "NOT IN", format!("({values})"))
}

/// `field IN (...)` with every value inlined as a literal.
pub fn in_literals<V: Operand>(field: impl Into<Fragment>, values: &[V]) -> Block {
    let list: Vec<String> = values.iter().map(Operand::literal).collect();
    in_raw(field, &list.join(","))
}

pub fn not_in_literals<V: Operand>(field: impl Into<Fragment>, values: &[V]) -> Block {
    let list: Vec<String> = values.iter().map(Operand::literal).collect();
    not_in_raw(field, &list.join(","))
}

// ==================== Combinators ====================

/// Parenthesize: `( expr )`.
pub fn sub(expr: impl Into<Fragment>) -> Block {
    Block::new("(", text(expr), ")")
}

/// `left AND right`
pub fn and(left: impl Into<Fragment>, right: impl Into<Fragment>) -> Block {
    Block::new(text(left), "AND", text(right))
}

/// `left OR right`
pub fn or(left: impl Into<Fragment>, right: impl Into<Fragment>) -> Block {
    Block::new(text(left), "OR", text(right))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_values_are_placeholders() {
        assert_eq!(eq("name", "Bat Man").to_string(), "name = ?");
        assert_eq!(neq("name", String::from("x")).to_string(), "name != ?");
        assert_eq!(like("name", "%bat").to_string(), "name LIKE ?");
    }

    #[test]
    fn test_numbers_are_inlined() {
        assert_eq!(gt("id", 1).to_string(), "id > 1");
        assert_eq!(le("price", 9.5).to_string(), "price <= 9.5");
        assert_eq!(between("age", 10, 50).to_string(), "age BETWEEN 10 AND 50");
    }

    #[test]
    fn test_raw_variants() {
        assert_eq!(eq_raw("name", "nickname").to_string(), "name = nickname");
        assert_eq!(like_raw("name", "%bat").to_string(), "name LIKE '%bat'");
        assert_eq!(like_raw("name", "o'k%").to_string(), "name LIKE 'o''k%'");
    }

    #[test]
    fn test_between_text() {
        assert_eq!(between("name", "a", "z").to_string(), "name BETWEEN ? AND ?");
    }

    #[test]
    fn test_in_lists() {
        assert_eq!(in_list("id", &[1, 12, 18, 25, 55]).to_string(), "id IN (?,?,?,?,?)");
        assert_eq!(in_size("id", 2).to_string(), "id IN (?,?)");
        assert_eq!(in_literals("id", &[1, 12, 18]).to_string(), "id IN (1,12,18)");
        assert_eq!(
            in_literals("name", &["Leng", "Bat's Man"]).to_string(),
            "name IN ('Leng','Bat''s Man')"
        );
        assert_eq!(not_in_raw("user.id", "1,2,3").to_string(), "user.id NOT IN (1,2,3)");
    }

    #[test]
    fn test_null_checks() {
        assert_eq!(is_null("nickname").to_string(), "nickname IS NULL");
        assert_eq!(is_not_null("nickname").to_string(), "nickname IS NOT NULL");
    }

    #[test]
    fn test_match_against() {
        assert_eq!(
            match_against("name").to_string(),
            "MATCH( name ) AGAINST ( ? IN NATURAL LANGUAGE MODE )"
        );
        assert_eq!(
            match_against_any(&["name", "nickname"]).to_string(),
            "MATCH( name,nickname ) AGAINST ( ? IN NATURAL LANGUAGE MODE )"
        );
    }

    #[test]
    fn test_regexp() {
        assert_eq!(regexp("name").to_string(), "REGEXP_LIKE( name, ? )");
        assert_eq!(
            regexp_raw("name", "^a", Some("i")).to_string(),
            "REGEXP_LIKE( name, '^a', 'i' )"
        );
        assert_eq!(
            not_regexp_raw("name", "^a", None).to_string(),
            "NOT REGEXP_LIKE( name, '^a' )"
        );
    }

    #[test]
    fn test_combinators() {
        let expr = or(gt("user.status", 0), not_in_literals("user.id", &[1, 2, 3]));
        assert_eq!(expr.to_string(), "user.status > 0 OR user.id NOT IN (1,2,3)");
        assert_eq!(sub(and(le("id", 100), gt("age", 50))).to_string(), "( id <= 100 AND age > 50 )");
    }
}
