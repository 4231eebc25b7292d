//! WHERE / HAVING / ON condition primitives.
//!
//! A [`Condition`] is one clause fragment plus the boolean operator that joins it to the
//! *next* fragment. The compiler drops the operator of the last condition in a clause, so
//! `[and("a"), or("b"), and("c")]` renders `a AND b OR c`.

use crate::block::Fragment;
use std::fmt;

/// Boolean operator carried by a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Logic {
    #[default]
    And,
    Or,
    /// No operator; used for a standalone fragment.
    None,
}

impl Logic {
    /// SQL keyword, or `""` for [`Logic::None`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Logic::And => "AND",
            Logic::Or => "OR",
            Logic::None => "",
        }
    }
}

/// One condition fragment, immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    statement: String,
    logic: Logic,
}

impl Condition {
    pub fn new(statement: impl Into<Fragment>, logic: Logic) -> Self {
        Self {
            statement: statement.into().into_string(),
            logic,
        }
    }

    /// Condition joined to the next one with `AND`.
    pub fn and(statement: impl Into<Fragment>) -> Self {
        Self::new(statement, Logic::And)
    }

    /// Condition joined to the next one with `OR`.
    pub fn or(statement: impl Into<Fragment>) -> Self {
        Self::new(statement, Logic::Or)
    }

    /// Condition without an operator.
    pub fn bare(statement: impl Into<Fragment>) -> Self {
        Self::new(statement, Logic::None)
    }

    pub fn statement(&self) -> &str {
        &self.statement
    }

    pub fn logic(&self) -> Logic {
        self.logic
    }

    pub fn operator(&self) -> &'static str {
        self.logic.as_str()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.logic {
            Logic::None => f.write_str(&self.statement),
            logic => write!(f, "{} {}", self.statement, logic.as_str()),
        }
    }
}
