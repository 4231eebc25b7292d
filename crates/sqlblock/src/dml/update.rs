use super::{Statement, Target, bind_values, where_from_blocks};
use crate::block::Fragment;
use crate::entity::Entity;
use crate::query::Query;
use crate::value::Value;

/// `UPDATE ... SET` builder.
///
/// The filter comes from an attached [`Query`] or from condition blocks; an entity never
/// contributes to the WHERE clause of an update.
///
/// # Example
///
/// ```
/// use sqlblock::ops::{eq, gt};
/// use sqlblock::{Record, Statement, Update};
///
/// let sql = Update::new(Record::new("users").set("name", "Leng"))
///     .where_blocks([gt("id", 100), eq("age", 60)])
///     .to_sql();
/// assert_eq!(sql, "UPDATE users SET name = 'Leng' WHERE id > 100 AND age = 60");
/// ```
#[derive(Debug, Clone)]
pub struct Update {
    target: Target,
    filter: Option<Query>,
    filter_params: Vec<Value>,
}

impl Update {
    pub fn new<E: Entity>(entity: E) -> Self {
        Self {
            target: Target::new(entity),
            filter: None,
            filter_params: Vec::new(),
        }
    }

    pub fn parameterize(mut self, enabled: bool) -> Self {
        self.target.parameterize = enabled;
        self
    }

    pub fn escape_table(mut self, enabled: bool) -> Self {
        self.target.escape_table = enabled;
        self
    }

    /// Use the clauses of `query` (WHERE and anything after it) as the filter.
    pub fn where_query(mut self, query: Query) -> Self {
        self.filter = Some(query);
        self
    }

    /// Filter on condition blocks ANDed together.
    pub fn where_blocks<I, F>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Fragment>,
    {
        self.filter = Some(where_from_blocks(blocks));
        self
    }

    /// Values for placeholders in the filter, appended after the SET values.
    pub fn where_params<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.filter_params.extend(values.into_iter().map(Into::into));
        self
    }
}

impl Statement for Update {
    fn to_sql(&self) -> String {
        let mut sql = format!("UPDATE {} SET", self.target.table());

        let assignments: Vec<String> = self
            .target
            .columns()
            .into_iter()
            .map(|(name, value)| format!("{name} = {}", self.target.render(value)))
            .collect();
        if !assignments.is_empty() {
            sql.push(' ');
            sql.push_str(&assignments.join(", "));
        }

        if let Some(filter) = &self.filter {
            let clauses = filter.to_clause_sql();
            if !clauses.is_empty() {
                sql.push(' ');
                sql.push_str(&clauses);
            }
        }
        sql.trim_end().to_string()
    }

    fn params(&self) -> Vec<Value> {
        let mut params = bind_values(
            self.target.columns().into_iter().map(|(_, v)| v),
            self.target.parameterize,
        );
        params.extend(self.filter_params.iter().cloned());
        params
    }
}
