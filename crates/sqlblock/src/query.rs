//! SELECT query model.
//!
//! [`Query`] accumulates ordered fragments (fields per table alias, FROM sources, joins,
//! conditions, grouping, ordering, limit) and compiles them deterministically into SQL text.
//!
//! ```
//! use sqlblock::Query;
//! use sqlblock::ops::gt;
//!
//! let sql = Query::new()
//!     .fields(["id", "name"])
//!     .from("user")
//!     .where_(gt("age", 30))
//!     .limit(10, 0)
//!     .to_sql();
//! assert_eq!(sql, "SELECT id, name FROM user WHERE age > 30 LIMIT 10 OFFSET 0");
//! ```
//!
//! Builders are single-use values: configure, compile, discard. Compilation takes `&self`
//! and is a pure function of the builder state, so compiling twice yields identical text.

mod compile;
mod ext;


pub use compile::{CompiledQuery, QueryParts};
pub use ext::QueryExt;

use crate::block::{Block, Fragment};
use crate::condition::Condition;
use crate::sort::{Direction, Sort};
use indexmap::IndexMap;
use std::fmt;

// ==================== Dialect ====================

/// Identifier quoting settings used by the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    /// Quote character for aliases and (optionally) table names.
    pub quote_char: char,
    /// Token separating `source = output` in a field spec.
    pub alias_assign: String,
    /// Whether table names are wrapped in `quote_char`.
    pub quote_table_names: bool,
}

impl Default for Dialect {
    fn default() -> Self {
        Self::mysql()
    }
}

impl Dialect {
    /// Backtick aliases, unquoted table names.
    pub fn mysql() -> Self {
        Self {
            quote_char: '`',
            alias_assign: "=".to_string(),
            quote_table_names: false,
        }
    }

    /// Double-quoted aliases and table names.
    pub fn ansi() -> Self {
        Self {
            quote_char: '"',
            alias_assign: "=".to_string(),
            quote_table_names: true,
        }
    }

    /// Apache Ignite uses ANSI quoting.
    pub fn ignite() -> Self {
        Self::ansi()
    }

    pub fn with_quote_char(mut self, quote_char: char) -> Self {
        self.quote_char = quote_char;
        self
    }

    pub fn with_alias_assign(mut self, token: impl Into<String>) -> Self {
        self.alias_assign = token.into();
        self
    }

    pub fn with_quote_table_names(mut self, enabled: bool) -> Self {
        self.quote_table_names = enabled;
        self
    }
}

// ==================== Clause positions ====================

/// Points in the rendered SQL where custom fragments can be spliced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClausePosition {
    /// Right after `SELECT`, before the field list.
    Select,
    /// Right after the field list.
    Field,
    From,
    Join,
    Where,
    GroupBy,
    Having,
    Order,
    Limit,
}

impl ClausePosition {
    pub const ALL: [ClausePosition; 9] = [
        ClausePosition::Select,
        ClausePosition::Field,
        ClausePosition::From,
        ClausePosition::Join,
        ClausePosition::Where,
        ClausePosition::GroupBy,
        ClausePosition::Having,
        ClausePosition::Order,
        ClausePosition::Limit,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

// ==================== Sources and joins ====================

/// One FROM source.
#[derive(Debug, Clone)]
pub enum TableRef {
    Name(String),
    Sub(Box<Query>),
}

/// SQL join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Join,
    LeftJoin,
    LeftOuterJoin,
    RightJoin,
    RightOuterJoin,
    InnerJoin,
    CrossJoin,
}

impl JoinKind {
    /// Hyphenated key form, e.g. `left-outer-join`.
    pub fn key(&self) -> &'static str {
        match self {
            JoinKind::Join => "join",
            JoinKind::LeftJoin => "left-join",
            JoinKind::LeftOuterJoin => "left-outer-join",
            JoinKind::RightJoin => "right-join",
            JoinKind::RightOuterJoin => "right-outer-join",
            JoinKind::InnerJoin => "inner-join",
            JoinKind::CrossJoin => "cross-join",
        }
    }

    /// SQL keyword: the key's tokens upper-cased and space-joined.
    pub fn keyword(&self) -> String {
        self.key().split('-').collect::<Vec<_>>().join(" ").to_uppercase()
    }
}

/// What a join attaches: a table or an aliased sub-query.
#[derive(Debug, Clone)]
pub enum JoinTarget {
    Table(String),
    Sub { query: Box<Query>, alias: String },
}

impl JoinTarget {
    /// Table name or sub-query alias.
    pub fn name(&self) -> &str {
        match self {
            JoinTarget::Table(name) => name,
            JoinTarget::Sub { alias, .. } => alias,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Join {
    pub kind: JoinKind,
    pub target: JoinTarget,
    pub conditions: Vec<Condition>,
}

// ==================== Query ====================

/// Mutable SELECT builder.
#[derive(Debug, Clone, Default)]
pub struct Query {
    dialect: Dialect,
    current_table: String,
    fields: IndexMap<String, Vec<String>>,
    from: Vec<TableRef>,
    alias: Option<String>,
    joins: Vec<Join>,
    wheres: Vec<Condition>,
    group_by: Vec<String>,
    havings: Vec<Condition>,
    order: Vec<Sort>,
    limit: Option<(u64, u64)>,
    custom: [Vec<Block>; 9],
}

impl Query {
    /// Create a query with the default (MySQL-style) dialect.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    /// Query with `"` quoting and quoted table names.
    pub fn ansi() -> Self {
        Self::with_dialect(Dialect::ansi())
    }

    /// Query preset for Apache Ignite.
    pub fn ignite() -> Self {
        Self::with_dialect(Dialect::ignite())
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Replace the dialect, keeping everything registered so far.
    pub fn set_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    // ---------- fields ----------

    /// Set the table alias that subsequent [`Query::fields`] calls register under.
    ///
    /// The context is sticky: it stays in effect until the next `table()` call.
    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.current_table = name.into();
        self
    }

    /// Register columns under the current table alias, replacing any previous
    /// registration for that alias.
    ///
    /// A spec of the form `"user.id = user_id"` selects `user.id` under the alias
    /// `<table>-user_id`. Under the empty alias fields are emitted verbatim.
    pub fn fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        self.fields.insert(self.current_table.clone(), names);
        self
    }

    // ---------- from ----------

    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.from.push(TableRef::Name(table.into()));
        self
    }

    /// Add several raw table names (an implicit cross join).
    pub fn from_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.from
            .extend(tables.into_iter().map(|t| TableRef::Name(t.into())));
        self
    }

    /// Select from a sub-query. Alias the sub-query with [`Query::as_table`] on it.
    pub fn from_query(mut self, query: Query) -> Self {
        self.from.push(TableRef::Sub(Box::new(query)));
        self
    }

    /// Name this query when it is used as a sub-select source: `(...) AS alias`.
    pub fn as_table(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The alias set by [`Query::as_table`].
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    // ---------- joins ----------

    fn push_join(mut self, kind: JoinKind, target: JoinTarget) -> Self {
        let existing = self
            .joins
            .iter()
            .position(|j| j.kind == kind && j.target.name() == target.name());
        match existing {
            Some(idx) => {
                self.joins[idx].target = target;
                self.joins[idx].conditions.clear();
            }
            None => self.joins.push(Join {
                kind,
                target,
                conditions: Vec::new(),
            }),
        }
        self
    }

    /// Register a join against a table; the join becomes the target of `on*` calls.
    pub fn join_table(self, kind: JoinKind, table: impl Into<String>) -> Self {
        self.push_join(kind, JoinTarget::Table(table.into()))
    }

    /// Register a join against an aliased sub-query.
    pub fn join_query(self, kind: JoinKind, query: Query, alias: impl Into<String>) -> Self {
        self.push_join(
            kind,
            JoinTarget::Sub {
                query: Box::new(query),
                alias: alias.into(),
            },
        )
    }

    pub fn join(self, table: impl Into<String>) -> Self {
        self.join_table(JoinKind::Join, table)
    }

    pub fn left_join(self, table: impl Into<String>) -> Self {
        self.join_table(JoinKind::LeftJoin, table)
    }

    pub fn left_outer_join(self, table: impl Into<String>) -> Self {
        self.join_table(JoinKind::LeftOuterJoin, table)
    }

    pub fn right_join(self, table: impl Into<String>) -> Self {
        self.join_table(JoinKind::RightJoin, table)
    }

    pub fn right_outer_join(self, table: impl Into<String>) -> Self {
        self.join_table(JoinKind::RightOuterJoin, table)
    }

    pub fn inner_join(self, table: impl Into<String>) -> Self {
        self.join_table(JoinKind::InnerJoin, table)
    }

    pub fn cross_join(self, table: impl Into<String>) -> Self {
        self.join_table(JoinKind::CrossJoin, table)
    }

    /// Add conditions to the most recently registered join. No-op without a join.
    pub fn on_conditions(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        if let Some(join) = self.joins.last_mut() {
            join.conditions.extend(conditions);
        }
        self
    }

    pub fn on(self, condition: impl Into<Fragment>) -> Self {
        self.on_conditions([Condition::and(condition)])
    }

    pub fn on_and(self, condition: impl Into<Fragment>) -> Self {
        self.on(condition)
    }

    pub fn on_or(self, condition: impl Into<Fragment>) -> Self {
        self.on_conditions([Condition::or(condition)])
    }

    /// Add several AND-joined join conditions.
    pub fn on_all<I, F>(self, conditions: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Fragment>,
    {
        self.on_conditions(conditions.into_iter().map(Condition::and))
    }

    /// Add several OR-joined join conditions.
    pub fn on_any<I, F>(self, conditions: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Fragment>,
    {
        self.on_conditions(conditions.into_iter().map(Condition::or))
    }

    // ---------- where ----------

    pub fn where_conditions(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        self.wheres.extend(conditions);
        self
    }

    /// Add an AND-joined condition (a raw string or a [`Block`]).
    pub fn where_(self, condition: impl Into<Fragment>) -> Self {
        self.where_conditions([Condition::and(condition)])
    }

    pub fn where_and(self, condition: impl Into<Fragment>) -> Self {
        self.where_(condition)
    }

    pub fn where_or(self, condition: impl Into<Fragment>) -> Self {
        self.where_conditions([Condition::or(condition)])
    }

    pub fn where_all<I, F>(self, conditions: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Fragment>,
    {
        self.where_conditions(conditions.into_iter().map(Condition::and))
    }

    pub fn where_any<I, F>(self, conditions: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Fragment>,
    {
        self.where_conditions(conditions.into_iter().map(Condition::or))
    }

    /// AND-join a mix of raw strings and blocks, e.g. `[Fragment::from("a = 1"), eq("b", 2).into()]`.
    pub fn where_mix(self, conditions: impl IntoIterator<Item = Fragment>) -> Self {
        self.where_all(conditions)
    }

    // ---------- group by / having ----------

    pub fn group_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Emit `GROUP BY ...` as a custom fragment right after the WHERE clause.
    pub fn group_by_main<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        self.add_expression_after(ClausePosition::Where, Block::pair("GROUP BY", fields.join(", ")))
    }

    pub fn having_conditions(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        self.havings.extend(conditions);
        self
    }

    pub fn having(self, condition: impl Into<Fragment>) -> Self {
        self.having_conditions([Condition::and(condition)])
    }

    pub fn having_and(self, condition: impl Into<Fragment>) -> Self {
        self.having(condition)
    }

    pub fn having_or(self, condition: impl Into<Fragment>) -> Self {
        self.having_conditions([Condition::or(condition)])
    }

    pub fn having_all<I, F>(self, conditions: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Fragment>,
    {
        self.having_conditions(conditions.into_iter().map(Condition::and))
    }

    pub fn having_any<I, F>(self, conditions: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Fragment>,
    {
        self.having_conditions(conditions.into_iter().map(Condition::or))
    }

    pub fn having_mix(self, conditions: impl IntoIterator<Item = Fragment>) -> Self {
        self.having_all(conditions)
    }

    // ---------- order / limit ----------

    /// Order by `field`, descending when `desc` is set.
    pub fn order(mut self, field: impl Into<String>, desc: bool) -> Self {
        let direction = if desc { Direction::Desc } else { Direction::Asc };
        self.order.push(Sort::new(field, direction));
        self
    }

    pub fn order_asc<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order.extend(fields.into_iter().map(Sort::asc));
        self
    }

    pub fn order_desc<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order.extend(fields.into_iter().map(Sort::desc));
        self
    }

    pub fn order_by(mut self, sorts: impl IntoIterator<Item = Sort>) -> Self {
        self.order.extend(sorts);
        self
    }

    /// Set `LIMIT page_size OFFSET offset`, replacing any previous limit.
    pub fn limit(mut self, page_size: u64, offset: u64) -> Self {
        self.limit = Some((page_size, offset));
        self
    }

    // ---------- custom fragments ----------

    /// Splice `block` verbatim right after the clause at `position`.
    pub fn add_expression_after(mut self, position: ClausePosition, block: Block) -> Self {
        self.custom[position.index()].push(block);
        self
    }

    /// Fragments registered at `position`, in insertion order.
    pub fn expressions_at(&self, position: ClausePosition) -> &[Block] {
        &self.custom[position.index()]
    }

    // ---------- accessors ----------

    /// Field specs keyed by table alias, in registration order.
    pub fn selected_fields(&self) -> &IndexMap<String, Vec<String>> {
        &self.fields
    }

    pub fn sources(&self) -> &[TableRef] {
        &self.from
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn where_list(&self) -> &[Condition] {
        &self.wheres
    }

    pub fn group_by_list(&self) -> &[String] {
        &self.group_by
    }

    pub fn having_list(&self) -> &[Condition] {
        &self.havings
    }

    pub fn order_list(&self) -> &[Sort] {
        &self.order
    }

    pub fn limit_offset(&self) -> Option<(u64, u64)> {
        self.limit
    }

    // ---------- compile ----------

    /// Render every clause separately without assembling the statement.
    pub fn precompile(&self) -> QueryParts {
        compile::precompile(self, " ")
    }

    /// Compile to single-line SQL plus the generated column aliases.
    pub fn compile(&self) -> CompiledQuery {
        compile::compile(self, " ")
    }

    /// Compile with each clause on its own line.
    pub fn compile_pretty(&self) -> CompiledQuery {
        compile::compile(self, "\n")
    }

    pub fn to_sql(&self) -> String {
        self.compile().sql
    }

    /// Everything after `SELECT <fields> FROM `, i.e. the rendered clauses alone.
    ///
    /// For a query holding only conditions this is `WHERE ...`, which is how the DML
    /// builders reuse a query as their filter.
    pub fn to_clause_sql(&self) -> String {
        compile::clauses(self, " ")
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}
