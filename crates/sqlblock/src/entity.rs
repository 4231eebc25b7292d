//! Entity abstraction consumed by the DML builders.
//!
//! An entity exposes its columns as an ordered [`DataMap`]. Implement [`Entity`] by hand,
//! derive it with `#[derive(Entity)]`, or build rows dynamically with [`Record`].
//!
//! ```
//! use sqlblock::{Entity, Record};
//!
//! let user = Record::new("users").set("id", 1).set("name", "Leng");
//! assert_eq!(user.table_name(), "users");
//! assert_eq!(user.data_map().keys().collect::<Vec<_>>(), vec!["id", "name"]);
//! ```

use crate::value::{DataMap, Value};

/// A source of column values for INSERT / UPDATE / DELETE / MERGE.
pub trait Entity {
    /// Declared table name. Blank means "derive it from [`Entity::type_name`]".
    fn table_name(&self) -> &str {
        ""
    }

    /// Type name used for table-name derivation (converted to snake_case).
    fn type_name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Column → value map in declaration order. Only set properties appear.
    fn data_map(&self) -> DataMap;

    /// Properties skipped by INSERT, UPDATE and MERGE.
    fn ignore_fields(&self) -> Vec<String> {
        Vec::new()
    }
}

impl<E: Entity + ?Sized> Entity for &E {
    fn table_name(&self) -> &str {
        (**self).table_name()
    }

    fn type_name(&self) -> &str {
        (**self).type_name()
    }

    fn data_map(&self) -> DataMap {
        (**self).data_map()
    }

    fn ignore_fields(&self) -> Vec<String> {
        (**self).ignore_fields()
    }
}

/// A dynamically-built entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    table: String,
    data: DataMap,
    ignore: Vec<String>,
}

impl Record {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    /// Wrap an existing map.
    pub fn from_map(table: impl Into<String>, data: DataMap) -> Self {
        Self {
            table: table.into(),
            data,
            ignore: Vec::new(),
        }
    }

    /// Set a property, keeping its original position if already set.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key, value);
        self
    }

    /// Mark a property as ignored for INSERT / UPDATE / MERGE.
    pub fn ignore(mut self, key: impl Into<String>) -> Self {
        self.ignore.push(key.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

impl Entity for Record {
    fn table_name(&self) -> &str {
        &self.table
    }

    fn type_name(&self) -> &str {
        "record"
    }

    fn data_map(&self) -> DataMap {
        self.data.clone()
    }

    fn ignore_fields(&self) -> Vec<String> {
        self.ignore.clone()
    }
}
