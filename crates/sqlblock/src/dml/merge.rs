use super::{Insert, Statement};
use crate::entity::Entity;
use crate::query::Query;
use crate::value::Value;

/// `MERGE INTO` builder: an [`Insert`] for engines with upsert-by-merge.
///
/// Columns named by the entity's `ignore_fields` are left out, as for [`Insert`].
#[derive(Debug, Clone)]
pub struct Merge {
    insert: Insert,
}

impl Merge {
    pub fn new<E: Entity>(entity: E) -> Self {
        Self {
            insert: Insert::new(entity),
        }
    }

    /// Column-list-only form, usually followed by [`Merge::select`].
    pub fn columns<E, I, S>(entity: E, columns: I) -> Self
    where
        E: Entity,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            insert: Insert::columns(entity, columns),
        }
    }

    pub fn parameterize(mut self, enabled: bool) -> Self {
        self.insert = self.insert.parameterize(enabled);
        self
    }

    pub fn escape_table(mut self, enabled: bool) -> Self {
        self.insert = self.insert.escape_table(enabled);
        self
    }

    pub fn select(mut self, query: Query) -> Self {
        self.insert = self.insert.select(query);
        self
    }

    pub fn select_params<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.insert = self.insert.select_params(values);
        self
    }
}

impl Statement for Merge {
    fn to_sql(&self) -> String {
        self.insert.render("MERGE INTO")
    }

    fn params(&self) -> Vec<Value> {
        self.insert.params()
    }
}
