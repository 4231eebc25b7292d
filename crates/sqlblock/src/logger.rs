//! `tracing`-based statement logging for [`Session`](crate::Session).
//!
//! SQL and bound parameters are emitted on the `sqlblock.sql` target, each at its own
//! level (or not at all). Errors, retries and unsupported statements are always emitted.
//!
//! ```
//! use sqlblock::SqlLogger;
//! use tracing::Level;
//!
//! let logger = SqlLogger::new().levels(Level::INFO, Level::DEBUG).max_sql_length(500);
//! assert_eq!(logger.sql_level, Some(Level::INFO));
//! ```

use crate::error::DbError;
use crate::value::Value;
use tracing::Level;

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN  => tracing::warn!($($field)*),
            Level::INFO  => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Statement logger with independent levels for SQL text and parameters.
#[derive(Debug, Clone)]
pub struct SqlLogger {
    /// Level for SQL text. `None` disables it.
    pub sql_level: Option<Level>,
    /// Level for bound parameters. `None` disables it.
    pub params_level: Option<Level>,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for SqlLogger {
    fn default() -> Self {
        Self {
            sql_level: Some(Level::DEBUG),
            params_level: None,
            max_sql_length: Some(200),
        }
    }
}

impl SqlLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Level for SQL text; pass `None` to turn it off.
    pub fn sql_level(mut self, level: impl Into<Option<Level>>) -> Self {
        self.sql_level = level.into();
        self
    }

    /// Level for bound parameters; pass `None` to turn it off.
    pub fn params_level(mut self, level: impl Into<Option<Level>>) -> Self {
        self.params_level = level.into();
        self
    }

    pub fn levels(
        self,
        sql_level: impl Into<Option<Level>>,
        params_level: impl Into<Option<Level>>,
    ) -> Self {
        self.sql_level(sql_level).params_level(params_level)
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    /// Log a statement about to be executed.
    pub fn log_query(&self, sql: &str, params: &[Value]) {
        if let Some(level) = self.sql_level {
            let sql = self.truncate_sql(sql);
            emit_at_level!(level, target: "sqlblock.sql", param_count = params.len(), sql = %sql);
        }
        if let Some(level) = self.params_level {
            let params = tracing::field::debug(params);
            emit_at_level!(level, target: "sqlblock.sql", params = params);
        }
    }

    pub fn log_error(&self, err: &DbError) {
        tracing::error!(target: "sqlblock.sql", error = %err, "statement failed");
    }

    pub fn log_retry(&self, retries_left: u32, err: &DbError) {
        tracing::warn!(target: "sqlblock.sql", retries_left, error = %err, "retrying");
    }

    pub fn log_unsupported(&self, err: &DbError) {
        tracing::warn!(target: "sqlblock.sql", error = %err, "statement not supported by database");
    }
}
