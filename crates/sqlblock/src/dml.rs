//! INSERT / UPDATE / DELETE / MERGE builders over an [`Entity`].
//!
//! Every builder renders either inline literals (the default) or `?` placeholders
//! (`parameterize(true)`), in which case [`Statement::params`] returns the values to bind,
//! in placeholder order.
//!
//! ```
//! use sqlblock::{Insert, Record, Statement};
//!
//! let user = Record::new("users").set("id", 1).set("name", "O'Connor");
//! assert_eq!(
//!     Insert::new(&user).to_sql(),
//!     "INSERT INTO users ( id, name ) VALUES ( 1, 'O''Connor' )"
//! );
//!
//! let insert = Insert::new(&user).parameterize(true);
//! assert_eq!(insert.to_sql(), "INSERT INTO users ( id, name ) VALUES ( ?, ? )");
//! assert_eq!(insert.params().len(), 2);
//! ```

mod delete;
mod insert;
mod merge;
mod update;

#[cfg(test)]
mod tests;

pub use delete::Delete;
pub use insert::Insert;
pub use merge::Merge;
pub use update::Update;

use crate::entity::Entity;
use crate::ident::{quote, snake_case};
use crate::query::Query;
use crate::value::{DataMap, Value};

/// A rendered DML statement with its bind values.
pub trait Statement {
    /// Render the SQL text.
    fn to_sql(&self) -> String;

    /// Values for the `?` placeholders of [`Statement::to_sql`], in order.
    ///
    /// Placeholders written inside raw blocks (e.g. `repeated + ?`) are not covered.
    fn params(&self) -> Vec<Value>;
}

/// State shared by all DML builders.
#[derive(Debug, Clone, Default)]
pub(crate) struct Target {
    table: String,
    data: DataMap,
    ignore: Vec<String>,
    pub(crate) parameterize: bool,
    pub(crate) escape_table: bool,
}

impl Target {
    pub(crate) fn new<E: Entity>(entity: E) -> Self {
        let table = match entity.table_name().trim() {
            "" => snake_case(entity.type_name()),
            name => name.to_string(),
        };
        Self {
            table,
            data: entity.data_map(),
            ignore: entity.ignore_fields(),
            parameterize: false,
            escape_table: false,
        }
    }

    pub(crate) fn table(&self) -> String {
        if self.escape_table {
            quote(&self.table, '"')
        } else {
            self.table.clone()
        }
    }

    /// Snake-cased columns with relations and ignored properties removed.
    pub(crate) fn columns(&self) -> Vec<(String, &Value)> {
        self.data
            .iter()
            .filter(|(key, _)| !self.ignore.iter().any(|i| i.as_str() == *key))
            .filter(|(_, value)| !value.is_relation())
            .map(|(key, value)| (snake_case(key), value))
            .collect()
    }

    /// Snake-cased columns with relations removed; ignored properties are kept.
    pub(crate) fn all_columns(&self) -> Vec<(String, &Value)> {
        self.data
            .iter()
            .filter(|(_, value)| !value.is_relation())
            .map(|(key, value)| (snake_case(key), value))
            .collect()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub(crate) fn render(&self, value: &Value) -> String {
        render_value(value, self.parameterize)
    }
}

/// `?` for a bindable value in parameterized mode, otherwise the inline literal.
///
/// Null and raw values are always inlined.
pub(crate) fn render_value(value: &Value, parameterize: bool) -> String {
    if parameterize && is_bindable(value) {
        "?".to_string()
    } else {
        value.to_literal()
    }
}

pub(crate) fn is_bindable(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Raw(_)) && !value.is_relation()
}

/// The bind values for `values` when rendered in parameterized mode.
pub(crate) fn bind_values<'a>(
    values: impl IntoIterator<Item = &'a Value>,
    parameterize: bool,
) -> Vec<Value> {
    if !parameterize {
        return Vec::new();
    }
    values
        .into_iter()
        .filter(|v| is_bindable(v))
        .cloned()
        .collect()
}

/// Build a filter from condition blocks, ANDed together.
pub(crate) fn where_from_blocks<I, F>(blocks: I) -> Query
where
    I: IntoIterator<Item = F>,
    F: Into<crate::block::Fragment>,
{
    Query::new().where_all(blocks)
}
