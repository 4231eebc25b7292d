//! # sqlblock
//!
//! A composable SQL builder with a thin async session layer for Postgres.
//!
//! ## Features
//!
//! - **Fragment-based queries**: fields, joins, conditions, grouping, ordering and limits
//!   are kept as an ordered model and compiled deterministically to SQL text
//! - **Table-aware compilation**: fields are qualified and aliased as `<table>-<column>`,
//!   join conditions are qualified with the joined table
//! - **Dialects**: MySQL-style (default) or ANSI quoting, custom alias tokens
//! - **DML builders**: `Insert`, `Update`, `Delete` and `Merge` over any [`Entity`]
//! - **Session**: once / retry / transaction orchestration over a `deadpool-postgres` pool,
//!   with duplicate-key classification and `tracing` statement logging
//!
//! ## Query builder
//!
//! ```
//! use sqlblock::Query;
//! use sqlblock::ops::{eq, gt};
//!
//! let sql = Query::new()
//!     .fields(["id", "name"])
//!     .from("user")
//!     .where_(gt("age", 30))
//!     .limit(10, 0)
//!     .to_sql();
//! assert_eq!(sql, "SELECT id, name FROM user WHERE age > 30 LIMIT 10 OFFSET 0");
//!
//! let sql = Query::new()
//!     .table("user")
//!     .fields(["id", "name"])
//!     .table("address")
//!     .fields(["street1"])
//!     .from("user")
//!     .left_join("address")
//!     .on("user_id = user.id")
//!     .where_(eq("user.name", "Leng"))
//!     .to_sql();
//! assert_eq!(
//!     sql,
//!     "SELECT user.id as `user-id`, user.name as `user-name`, address.street1 as `address-street1` \
//!      FROM user LEFT JOIN address ON (address.user_id = user.id) WHERE user.name = ?"
//! );
//! ```
//!
//! ## DML
//!
//! ```
//! use sqlblock::{Delete, Record, Statement};
//!
//! let user = Record::new("users").set("name", "O'Connor").set("id", 111);
//! assert_eq!(
//!     Delete::new(&user).to_sql(),
//!     "DELETE FROM users WHERE name = 'O''Connor' AND id = 111"
//! );
//! ```

pub mod agg;
pub mod block;
pub mod condition;
pub mod config;
pub mod dml;
pub mod entity;
pub mod error;
pub mod ident;
pub mod logger;
pub mod ops;
pub mod placeholder;
pub mod query;
pub mod sort;
pub mod value;

pub use block::{Block, Fragment};
pub use condition::{Condition, Logic};
pub use config::PoolConfig;
pub use dml::{Delete, Insert, Merge, Statement, Update};
pub use entity::{Entity, Record};
pub use error::{DbError, DbResult};
pub use logger::SqlLogger;
pub use placeholder::to_positional;
pub use query::{
    ClausePosition, CompiledQuery, Dialect, JoinKind, Query, QueryExt, QueryParts,
};
pub use sort::{Direction, Sort};
pub use value::{DataMap, Value};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub mod session;

#[cfg(feature = "pool")]
pub use pool::{
    connect, create_pool, create_pool_from_config, create_pool_with_manager_config,
    create_pool_with_tls,
};

#[cfg(feature = "pool")]
pub use session::{Conn, Session};

#[cfg(feature = "derive")]
pub use sqlblock_derive::Entity;
