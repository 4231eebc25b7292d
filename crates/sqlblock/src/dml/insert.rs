use super::{Statement, Target, bind_values, render_value};
use crate::entity::Entity;
use crate::query::Query;
use crate::value::{DataMap, Value};

/// `INSERT INTO` builder.
///
/// # Example
///
/// ```
/// use sqlblock::ops::eq;
/// use sqlblock::{Insert, Query, Record, Statement};
///
/// let sql = Insert::columns(Record::new("users"), ["id", "name"])
///     .select(Query::new().fields(["user_id", "fullname"]).from("customer").where_(eq("status", 0)))
///     .to_sql();
/// assert_eq!(
///     sql,
///     "INSERT INTO users ( id, name ) SELECT user_id, fullname FROM customer WHERE status = 0"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Insert {
    target: Target,
    columns: Option<Vec<String>>,
    select: Option<Query>,
    select_params: Vec<Value>,
    ignore: bool,
    on_duplicate: Option<DataMap>,
}

impl Insert {
    pub fn new<E: Entity>(entity: E) -> Self {
        Self {
            target: Target::new(entity),
            columns: None,
            select: None,
            select_params: Vec::new(),
            ignore: false,
            on_duplicate: None,
        }
    }

    /// Column-list-only form, usually followed by [`Insert::select`].
    pub fn columns<E, I, S>(entity: E, columns: I) -> Self
    where
        E: Entity,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut insert = Self::new(entity);
        insert.columns = Some(columns.into_iter().map(Into::into).collect());
        insert
    }

    /// Render values as `?` placeholders.
    pub fn parameterize(mut self, enabled: bool) -> Self {
        self.target.parameterize = enabled;
        self
    }

    /// Wrap the table name in double quotes.
    pub fn escape_table(mut self, enabled: bool) -> Self {
        self.target.escape_table = enabled;
        self
    }

    /// `INSERT INTO t ( cols ) SELECT ...`
    pub fn select(mut self, query: Query) -> Self {
        self.select = Some(query);
        self
    }

    /// Bind values for the `?` placeholders inside the [`Insert::select`] query.
    ///
    /// They are bound after the VALUES parameters and before the ON DUPLICATE ones,
    /// matching their position in the statement.
    pub fn select_params<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.select_params.extend(values.into_iter().map(Into::into));
        self
    }

    /// `INSERT IGNORE INTO`
    pub fn ignore(mut self) -> Self {
        self.ignore = true;
        self
    }

    /// Append `ON DUPLICATE KEY UPDATE col = value, ...`.
    ///
    /// [`Value::Raw`] values render verbatim; null values are skipped.
    pub fn on_duplicate_update(mut self, fields: DataMap) -> Self {
        self.on_duplicate = Some(fields);
        self
    }

    fn duplicate_values(&self) -> Vec<(&str, &Value)> {
        match &self.on_duplicate {
            Some(fields) => fields.iter().filter(|(_, v)| !v.is_null()).collect(),
            None => Vec::new(),
        }
    }

    pub(super) fn render(&self, keyword: &str) -> String {
        let mut sql = format!("{keyword} {}", self.target.table());

        if let Some(columns) = &self.columns {
            sql.push_str(&format!(" ( {} )", columns.join(", ")));
        } else if !self.target.is_empty() {
            let (names, values): (Vec<String>, Vec<String>) = self
                .target
                .columns()
                .into_iter()
                .map(|(name, value)| (name, self.target.render(value)))
                .unzip();
            sql.push_str(&format!(
                " ( {} ) VALUES ( {} )",
                names.join(", "),
                values.join(", ")
            ));
        }

        if let Some(query) = &self.select {
            sql.push(' ');
            sql.push_str(&query.to_sql());
        }

        let duplicates = self.duplicate_values();
        if self.on_duplicate.is_some() {
            let parts: Vec<String> = duplicates
                .iter()
                .map(|(name, value)| {
                    format!("{name} = {}", render_value(value, self.target.parameterize))
                })
                .collect();
            sql.push_str(" ON DUPLICATE KEY UPDATE ");
            sql.push_str(&parts.join(", "));
        }

        sql.trim_end().to_string()
    }
}

impl Statement for Insert {
    fn to_sql(&self) -> String {
        if self.ignore {
            self.render("INSERT IGNORE INTO")
        } else {
            self.render("INSERT INTO")
        }
    }

    fn params(&self) -> Vec<Value> {
        let parameterize = self.target.parameterize;
        let mut params = match self.columns {
            Some(_) => Vec::new(),
            None => bind_values(
                self.target.columns().into_iter().map(|(_, v)| v),
                parameterize,
            ),
        };
        if self.select.is_some() {
            params.extend(self.select_params.iter().cloned());
        }
        params.extend(bind_values(
            self.duplicate_values().into_iter().map(|(_, v)| v),
            parameterize,
        ));
        params
    }
}
