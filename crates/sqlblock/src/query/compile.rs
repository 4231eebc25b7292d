//! Query compiler: one pure function per clause.
//!
//! Clause order is fixed: FROM, JOIN, WHERE, GROUP BY, HAVING, ORDER BY, LIMIT. An empty
//! clause renders as an empty string (no dangling keyword). Custom fragments registered
//! for a position are appended right after that clause.

use super::{ClausePosition, Join, JoinTarget, Query, TableRef};
use crate::condition::Condition;
use crate::ident::{escape_table_names, quote};

/// Output of [`Query::compile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    /// Final SQL text.
    pub sql: String,
    /// Generated `<table>-<column>` aliases, in select order.
    pub columns: Vec<String>,
    /// The rendered field list alone.
    pub select_fields: String,
}

/// Every clause rendered separately, as returned by [`Query::precompile`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParts {
    pub columns: Vec<String>,
    pub select_fields: String,
    pub from: String,
    pub join: String,
    pub where_clause: String,
    pub group_by: String,
    pub having: String,
    pub order: String,
    pub limit: String,
}

impl QueryParts {
    /// Clause texts paired with the position whose custom fragments follow them.
    fn clauses(&self) -> [(&str, ClausePosition); 7] {
        [
            (&self.from, ClausePosition::From),
            (&self.join, ClausePosition::Join),
            (&self.where_clause, ClausePosition::Where),
            (&self.group_by, ClausePosition::GroupBy),
            (&self.having, ClausePosition::Having),
            (&self.order, ClausePosition::Order),
            (&self.limit, ClausePosition::Limit),
        ]
    }
}

pub(crate) fn precompile(query: &Query, linebreak: &str) -> QueryParts {
    let (columns, select_fields) = select_part(query);
    QueryParts {
        columns,
        select_fields,
        from: from_part(query),
        join: join_part(query, linebreak),
        where_clause: condition_part("WHERE", &query.wheres, query),
        group_by: group_by_part(query),
        having: condition_part("HAVING", &query.havings, query),
        order: order_part(query),
        limit: limit_part(query),
    }
}

pub(crate) fn compile(query: &Query, linebreak: &str) -> CompiledQuery {
    let parts = precompile(query, linebreak);
    let tail = assemble_clauses(query, &parts, linebreak);

    let mut head = vec!["SELECT".to_string()];
    head.extend(custom_texts(query, ClausePosition::Select));
    if !parts.select_fields.is_empty() {
        head.push(parts.select_fields.clone());
    }
    head.extend(custom_texts(query, ClausePosition::Field));
    let head = head.join(" ");

    let sql = if tail.is_empty() {
        head
    } else {
        format!("{head} FROM {tail}")
    };

    CompiledQuery {
        sql: sql.trim().to_string(),
        columns: parts.columns,
        select_fields: parts.select_fields,
    }
}

pub(crate) fn clauses(query: &Query, linebreak: &str) -> String {
    let parts = precompile(query, linebreak);
    assemble_clauses(query, &parts, linebreak)
}

fn assemble_clauses(query: &Query, parts: &QueryParts, linebreak: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    for (text, position) in parts.clauses() {
        let text = text.trim();
        if !text.is_empty() {
            out.push(text.to_string());
        }
        let custom = custom_texts(query, position);
        if !custom.is_empty() {
            out.push(custom.join(" "));
        }
    }
    out.join(linebreak).trim().to_string()
}

fn custom_texts(query: &Query, position: ClausePosition) -> Vec<String> {
    query
        .expressions_at(position)
        .iter()
        .map(|b| b.to_string().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn escape_if(query: &Query, text: &str) -> String {
    if query.dialect.quote_table_names {
        escape_table_names(text, query.dialect.quote_char)
    } else {
        text.to_string()
    }
}

fn table_name(query: &Query, name: &str) -> String {
    if query.dialect.quote_table_names {
        quote(name, query.dialect.quote_char)
    } else {
        name.to_string()
    }
}

// ==================== SELECT ====================

/// Render the field list, returning `(aliases, sql)`.
pub(crate) fn select_part(query: &Query) -> (Vec<String>, String) {
    let dialect = &query.dialect;
    let mut columns = Vec::new();
    let mut rendered = Vec::new();

    for (table, cols) in &query.fields {
        for spec in cols {
            if table.is_empty() {
                rendered.push(spec.clone());
                continue;
            }

            let (source, output) = match spec.split_once(dialect.alias_assign.as_str()) {
                Some((src, out)) if !dialect.alias_assign.is_empty() => {
                    let src = src.trim();
                    let source = match src.split_once('.') {
                        Some((tbl, col)) if dialect.quote_table_names => {
                            format!("{}.{}", quote(tbl, dialect.quote_char), col)
                        }
                        _ => src.to_string(),
                    };
                    (source, out.trim().to_string())
                }
                _ => (format!("{}.{}", table_name(query, table), spec), spec.clone()),
            };

            let alias = format!("{table}-{output}");
            rendered.push(format!("{} as {}", source, quote(&alias, dialect.quote_char)));
            columns.push(alias);
        }
    }

    (columns, rendered.join(", "))
}

// ==================== FROM ====================

pub(crate) fn from_part(query: &Query) -> String {
    match query.from.first() {
        None => String::new(),
        Some(TableRef::Name(_)) => {
            let mut names: Vec<&str> = Vec::new();
            for source in &query.from {
                if let TableRef::Name(name) = source {
                    if !name.is_empty() && !names.contains(&name.as_str()) {
                        names.push(name);
                    }
                }
            }
            names
                .iter()
                .map(|n| table_name(query, n))
                .collect::<Vec<_>>()
                .join(", ")
        }
        Some(TableRef::Sub(sub)) => {
            let sql = sub.to_sql();
            match sub.alias() {
                Some(alias) => {
                    let text = format!("({}) AS {}", sql, table_name(query, alias));
                    escape_if(query, &text)
                }
                None => format!("({sql})"),
            }
        }
    }
}

// ==================== JOIN ====================

pub(crate) fn join_part(query: &Query, linebreak: &str) -> String {
    query
        .joins
        .iter()
        .filter_map(|join| render_join(query, join))
        .collect::<Vec<_>>()
        .join(linebreak)
}

fn render_join(query: &Query, join: &Join) -> Option<String> {
    if join.conditions.is_empty() {
        return None;
    }

    let table = table_name(query, join.target.name());
    let conditions: Vec<Condition> = join
        .conditions
        .iter()
        .map(|c| {
            let statement = c.statement().trim();
            let lhs = statement.split('=').next().unwrap_or_default();
            let qualified = if lhs.contains('.') {
                statement.to_string()
            } else {
                format!("{table}.{statement}")
            };
            Condition::new(escape_if(query, &qualified), c.logic())
        })
        .collect();

    let target = match &join.target {
        JoinTarget::Table(_) => table.clone(),
        JoinTarget::Sub { query: sub, .. } => format!("({}) AS {}", sub.to_sql(), table),
    };

    Some(format!(
        "{} {} ON ({})",
        join.kind.keyword(),
        target,
        join_conditions(&conditions)
    ))
}

/// Join conditions with their operators, dropping the last condition's operator.
pub(crate) fn join_conditions(conditions: &[Condition]) -> String {
    let mut out = String::new();
    for (i, c) in conditions.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(c.statement().trim());
        if i + 1 < conditions.len() && !c.operator().is_empty() {
            out.push(' ');
            out.push_str(c.operator());
        }
    }
    out
}

// ==================== WHERE / HAVING ====================

pub(crate) fn condition_part(keyword: &str, conditions: &[Condition], query: &Query) -> String {
    if conditions.is_empty() {
        return String::new();
    }
    let escaped: Vec<Condition> = conditions
        .iter()
        .map(|c| Condition::new(escape_if(query, c.statement()), c.logic()))
        .collect();
    format!("{} {}", keyword, join_conditions(&escaped))
}

// ==================== GROUP BY / ORDER / LIMIT ====================

pub(crate) fn group_by_part(query: &Query) -> String {
    if query.group_by.is_empty() {
        return String::new();
    }
    let fields: Vec<String> = query.group_by.iter().map(|f| escape_if(query, f)).collect();
    format!("GROUP BY {}", fields.join(", "))
}

pub(crate) fn order_part(query: &Query) -> String {
    if query.order.is_empty() {
        return String::new();
    }
    let sorts: Vec<String> = query
        .order
        .iter()
        .map(|s| escape_if(query, &s.to_string()))
        .collect();
    format!("ORDER BY {}", sorts.join(", "))
}

pub(crate) fn limit_part(query: &Query) -> String {
    match query.limit {
        Some((limit, offset)) => format!("LIMIT {limit} OFFSET {offset}"),
        None => String::new(),
    }
}
