//! Error types for sqlblock

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Result type alias for sqlblock operations
pub type DbResult<T> = Result<T, DbError>;

/// SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// SQLSTATE for "feature not supported".
const FEATURE_NOT_SUPPORTED: &str = "0A000";

/// Error types for database operations
#[derive(Debug, Error)]
pub enum DbError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Duplicate key violation. Never retried.
    #[error("{}", duplicate_message(.column, .entry))]
    DuplicateKey {
        column: String,
        entry: String,
        message: String,
    },

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// The database does not support the statement
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

fn duplicate_message(column: &str, entry: &str) -> String {
    if entry.is_empty() {
        format!("Duplicate entry for key '{column}'")
    } else {
        format!("Duplicate entry '{entry}' for key '{column}'")
    }
}

fn duplicate_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"Key \((?P<column>[^)]*)\)=\((?P<entry>.*)\) already exists")
                .expect("invalid built-in duplicate regex"),
            Regex::new(r"Duplicate entry '(?P<entry>.*)' for key '(?P<column>[^']*)'")
                .expect("invalid built-in duplicate regex"),
            Regex::new(r"Duplicate key during [A-Z]+ \[key=(?P<column>[^\]]*)\]")
                .expect("invalid built-in duplicate regex"),
        ]
    })
}

/// Extract `(column, entry)` from a duplicate-key message.
///
/// Recognizes the Postgres detail (`Key (email)=(a@b.c) already exists.`), the MySQL
/// message (`Duplicate entry 'a@b.c' for key 'email'`) and the Ignite bracketed form
/// (`Duplicate key during INSERT [key=email]`, no entry).
pub fn parse_duplicate(message: &str) -> Option<(String, String)> {
    duplicate_patterns().iter().find_map(|re| {
        let caps = re.captures(message)?;
        let entry = caps.name("entry").map_or("", |m| m.as_str());
        Some((caps["column"].to_string(), entry.to_string()))
    })
}

impl DbError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    pub fn duplicate(
        column: impl Into<String>,
        entry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::DuplicateKey {
            column: column.into(),
            entry: entry.into(),
            message: message.into(),
        }
    }

    /// Check if this is a duplicate key error
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }

    /// Whether a retry policy may run the failed operation again.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::DuplicateKey { .. } | Self::Config(_) | Self::Decode { .. }
        )
    }

    /// Check if the database rejected the statement as unsupported
    pub fn is_unsupported(&self) -> bool {
        match self {
            Self::Unsupported(_) => true,
            Self::Query(err) => err
                .code()
                .is_some_and(|code| code.code() == FEATURE_NOT_SUPPORTED),
            _ => false,
        }
    }

    /// Parse a tokio_postgres error into a more specific DbError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let message = db_err.message().to_string();
            match db_err.code().code() {
                UNIQUE_VIOLATION => {
                    let parsed = db_err.detail().and_then(parse_duplicate);
                    let (column, entry) = parsed.unwrap_or_else(|| {
                        (db_err.constraint().unwrap_or("unknown").to_string(), String::new())
                    });
                    return Self::duplicate(column, entry, message);
                }
                FEATURE_NOT_SUPPORTED => return Self::Unsupported(message),
                _ => {}
            }
            if let Some((column, entry)) = parse_duplicate(&message) {
                return Self::duplicate(column, entry, message);
            }
        }
        Self::Query(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for DbError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<toml::de::Error> for DbError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_postgres_detail() {
        assert_eq!(
            parse_duplicate("Key (email)=(leng@example.com) already exists."),
            Some(("email".to_string(), "leng@example.com".to_string()))
        );
    }

    #[test]
    fn test_parse_mysql_message() {
        assert_eq!(
            parse_duplicate("Duplicate entry 'leng' for key 'username'"),
            Some(("username".to_string(), "leng".to_string()))
        );
    }

    #[test]
    fn test_parse_bracketed_message() {
        assert_eq!(
            parse_duplicate("Duplicate key during INSERT [key=SQL_PUBLIC_USER_abc]"),
            Some(("SQL_PUBLIC_USER_abc".to_string(), String::new()))
        );
        assert_eq!(parse_duplicate("syntax error at or near \"FROM\""), None);
    }

    #[test]
    fn test_duplicate_display() {
        let err = DbError::duplicate("username", "leng", "raw");
        assert_eq!(err.to_string(), "Duplicate entry 'leng' for key 'username'");
        let err = DbError::duplicate("username", "", "raw");
        assert_eq!(err.to_string(), "Duplicate entry for key 'username'");
    }

    #[test]
    fn test_retry_classification() {
        assert!(!DbError::duplicate("id", "1", "").is_retryable());
        assert!(DbError::duplicate("id", "1", "").is_duplicate_key());
        assert!(DbError::Connection("reset".into()).is_retryable());
        assert!(DbError::Unsupported("x".into()).is_unsupported());
    }
}
