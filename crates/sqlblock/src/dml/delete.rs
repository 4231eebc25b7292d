use super::{Statement, Target, bind_values, where_from_blocks};
use crate::block::Fragment;
use crate::entity::Entity;
use crate::query::Query;
use crate::value::Value;

/// `DELETE FROM` builder.
///
/// Without an explicit filter the entity itself becomes the filter: every non-relation
/// column is ANDed as an equality ("delete by example").
///
/// # Example
///
/// ```
/// use sqlblock::{Delete, Record, Statement};
///
/// let user = Record::new("users").set("name", "O'Connor").set("id", 111);
/// assert_eq!(
///     Delete::new(&user).to_sql(),
///     "DELETE FROM users WHERE name = 'O''Connor' AND id = 111"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Delete {
    target: Target,
    filter: Option<Query>,
    filter_params: Vec<Value>,
}

impl Delete {
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

    /// Use the clauses of `query` as the filter instead of the entity.
    pub fn where_query(mut self, query: Query) -> Self {
        self.filter = Some(query);
        self
    }

    /// Filter on condition blocks ANDed together instead of the entity.
    pub fn where_blocks<I, F>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Fragment>,
    {
        self.filter = Some(where_from_blocks(blocks));
        self
    }

    /// Values for placeholders in an explicit filter.
    pub fn where_params<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.filter_params.extend(values.into_iter().map(Into::into));
        self
    }

    fn example_conditions(&self) -> Vec<String> {
        self.target
            .all_columns()
            .into_iter()
            .map(|(name, value)| match value {
                Value::Null => format!("{name} IS NULL"),
                _ => format!("{name} = {}", self.target.render(value)),
            })
            .collect()
    }
}

impl Statement for Delete {
    fn to_sql(&self) -> String {
        let mut sql = format!("DELETE FROM {}", self.target.table());

        let filter = match &self.filter {
            Some(query) => query.to_clause_sql(),
            None => {
                let conditions = self.example_conditions();
                if conditions.is_empty() {
                    String::new()
                } else {
                    format!("WHERE {}", conditions.join(" AND "))
                }
            }
        };
        if !filter.is_empty() {
            sql.push(' ');
            sql.push_str(&filter);
        }
        sql
    }

    fn params(&self) -> Vec<Value> {
        match &self.filter {
            Some(_) => self.filter_params.clone(),
            None => bind_values(
                self.target.all_columns().into_iter().map(|(_, v)| v),
                self.target.parameterize,
            ),
        }
    }
}
