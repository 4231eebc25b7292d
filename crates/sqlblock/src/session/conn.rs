use crate::dml::Statement;
use crate::error::{DbError, DbResult};
use crate::logger::SqlLogger;
use crate::placeholder::to_positional;
use crate::query::Query;
use crate::value::{DataMap, Value};
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Row, Transaction};

enum Executor<'a> {
    Client(&'a Client),
    Transaction(&'a Transaction<'a>),
}

/// Statement executor handed to session operations.
///
/// Wraps either a pooled client or an open transaction. Every call rewrites `?`
/// placeholders to `$n`, logs the statement and classifies driver errors.
pub struct Conn<'a> {
    executor: Executor<'a>,
    logger: &'a SqlLogger,
    throw_on_duplicate: bool,
}

fn bind(params: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

fn decode(row: &Row, index: usize, key: &str) -> DbResult<Value> {
    row.try_get::<_, Value>(index)
        .map_err(|e| DbError::decode(key, e.to_string()))
}

/// Map a row to a `DataMap` keyed by lowercased column names.
pub fn row_to_map(row: &Row) -> DbResult<DataMap> {
    let mut map = DataMap::with_capacity(row.len());
    for (i, column) in row.columns().iter().enumerate() {
        let key = column.name().to_lowercase();
        let value = decode(row, i, &key)?;
        map.insert(key, value);
    }
    Ok(map)
}

/// Map a row to a `DataMap` whose keys are `columns`, by position.
///
/// Columns beyond `columns.len()` keep their own names.
pub fn row_to_aliased_map(row: &Row, columns: &[String]) -> DbResult<DataMap> {
    let mut map = DataMap::with_capacity(row.len());
    for (i, column) in row.columns().iter().enumerate() {
        let key = columns.get(i).map_or(column.name(), String::as_str);
        let value = decode(row, i, key)?;
        map.insert(key, value);
    }
    Ok(map)
}

/// Compile `query` with `"` as the identifier quote.
pub(crate) fn postgres_sql(query: &Query) -> String {
    if query.dialect().quote_char == '"' {
        return query.to_sql();
    }
    let dialect = query.dialect().clone().with_quote_char('"');
    query.clone().set_dialect(dialect).to_sql()
}

impl<'a> Conn<'a> {
    pub(crate) fn from_client(
        client: &'a Client,
        logger: &'a SqlLogger,
        throw_on_duplicate: bool,
    ) -> Self {
        Self {
            executor: Executor::Client(client),
            logger,
            throw_on_duplicate,
        }
    }

    pub(crate) fn from_transaction(
        tx: &'a Transaction<'a>,
        logger: &'a SqlLogger,
        throw_on_duplicate: bool,
    ) -> Self {
        Self {
            executor: Executor::Transaction(tx),
            logger,
            throw_on_duplicate,
        }
    }

    /// Whether this connection is inside a transaction.
    pub fn in_transaction(&self) -> bool {
        matches!(self.executor, Executor::Transaction(_))
    }

    fn classify(&self, err: tokio_postgres::Error) -> DbError {
        if self.throw_on_duplicate {
            DbError::from_db_error(err)
        } else {
            DbError::Query(err)
        }
    }

    async fn run_execute(&self, sql: &str, params: &[Value]) -> DbResult<u64> {
        let sql = to_positional(sql);
        self.logger.log_query(&sql, params);
        let params = bind(params);
        let result = match self.executor {
            Executor::Client(c) => c.execute(sql.as_str(), &params).await,
            Executor::Transaction(t) => t.execute(sql.as_str(), &params).await,
        };
        result.map_err(|e| self.classify(e))
    }

    async fn run_query(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Row>> {
        let sql = to_positional(sql);
        self.logger.log_query(&sql, params);
        let params = bind(params);
        let result = match self.executor {
            Executor::Client(c) => c.query(sql.as_str(), &params).await,
            Executor::Transaction(t) => t.query(sql.as_str(), &params).await,
        };
        result.map_err(|e| self.classify(e))
    }

    /// Execute a statement and return the number of affected rows.
    pub async fn execute(&self, sql: &str, params: &[Value]) -> DbResult<u64> {
        self.run_execute(sql, params).await
    }

    /// Run an UPDATE/DELETE-like statement.
    ///
    /// A statement the database reports as unsupported is logged and counts as 0 rows.
    pub async fn update(&self, sql: &str, params: &[Value]) -> DbResult<u64> {
        match self.run_execute(sql, params).await {
            Err(err) if err.is_unsupported() => {
                self.logger.log_unsupported(&err);
                Ok(0)
            }
            other => other,
        }
    }

    /// Run an INSERT and return the generated keys.
    ///
    /// Keys are the first column of each row produced by a `RETURNING` clause; without
    /// one the result is empty. Unsupported statements are logged and yield no keys.
    pub async fn insert(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Value>> {
        let rows = match self.run_query(sql, params).await {
            Err(err) if err.is_unsupported() => {
                self.logger.log_unsupported(&err);
                return Ok(Vec::new());
            }
            other => other?,
        };
        rows.iter()
            .filter(|row| !row.is_empty())
            .map(|row| {
                let name = row.columns()[0].name().to_string();
                decode(row, 0, &name)
            })
            .collect()
    }

    /// Run a query and return the raw driver rows.
    pub async fn query(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Row>> {
        self.run_query(sql, params).await
    }

    /// Run a query and key each row's values by `columns`, in order.
    pub async fn query_columns(
        &self,
        sql: &str,
        params: &[Value],
        columns: &[String],
    ) -> DbResult<Vec<DataMap>> {
        let rows = self.run_query(sql, params).await?;
        rows.iter().map(|row| row_to_aliased_map(row, columns)).collect()
    }

    /// Run a query and map each row (keyed by lowercased column name) with `f`.
    pub async fn query_as<T>(
        &self,
        sql: &str,
        params: &[Value],
        mut f: impl FnMut(DataMap) -> T,
    ) -> DbResult<Vec<T>> {
        let rows = self.run_query(sql, params).await?;
        rows.iter().map(|row| row_to_map(row).map(&mut f)).collect()
    }

    /// Compile `query` and return rows keyed by the result column names.
    ///
    /// Qualified fields come back under their `<table>-<column>` aliases. Aliases are
    /// always double-quoted here, whatever quote character the query's dialect uses.
    pub async fn select(&self, query: &Query, params: &[Value]) -> DbResult<Vec<DataMap>> {
        let rows = self.run_query(&postgres_sql(query), params).await?;
        rows.iter().map(|row| row_to_aliased_map(row, &[])).collect()
    }

    /// Execute a DML builder with its own parameters.
    pub async fn execute_statement(&self, statement: &impl Statement) -> DbResult<u64> {
        self.update(&statement.to_sql(), &statement.params()).await
    }

    /// Execute an INSERT/MERGE builder and return generated keys.
    pub async fn insert_statement(&self, statement: &impl Statement) -> DbResult<Vec<Value>> {
        self.insert(&statement.to_sql(), &statement.params()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_sql_double_quotes_aliases() {
        let query = Query::new().table("user").fields(["id"]).from("user");
        assert_eq!(postgres_sql(&query), "SELECT user.id as \"user-id\" FROM user");
    }

    #[test]
    fn test_postgres_sql_keeps_ansi_queries() {
        let query = Query::ansi().table("user").fields(["id"]).from("user");
        assert_eq!(postgres_sql(&query), query.to_sql());
    }
}
