//! InfluxQL statement rendering
//!
//! Turns [`QueryCriteria`] into the single statement shape this crate
//! supports:
//!
//! ```text
//! SELECT <expr>[,<expr>...] | *
//! FROM <measurement>
//! WHERE tenantId = '<tenant>' [AND id = '<id>']
//!       [AND time >= <from>] [AND time <= <to>]
//! [GROUP BY <tag>[,<tag>...] | GROUP BY time(<n><unit>)];
//! ```

use crate::query::criteria::{Grouping, QueryCriteria};
use crate::query::error::{QueryError, QueryResult};

const TENANT_COLUMN: &str = "tenantId";
const ID_COLUMN: &str = "id";
const TIME_COLUMN: &str = "time";

/// A rendered statement bound to the database it must run against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundQuery {
    database: Option<String>,
    command: String,
}

impl BoundQuery {
    pub fn new(database: Option<String>, command: impl Into<String>) -> Self {
        Self {
            database,
            command: command.into(),
        }
    }

    /// Target database, if one was configured
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// The InfluxQL text
    pub fn command(&self) -> &str {
        &self.command
    }
}

impl std::fmt::Display for BoundQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.command)
    }
}

/// Render criteria into a bound statement
pub fn render(criteria: &QueryCriteria) -> QueryResult<BoundQuery> {
    let table = criteria.table().ok_or(QueryError::MissingTable)?;
    Ok(render_from(criteria, table))
}

/// Render criteria, using `measurement` when the criteria name no table
pub fn render_or(criteria: &QueryCriteria, measurement: &str) -> QueryResult<BoundQuery> {
    match criteria.table() {
        Some(table) => Ok(render_from(criteria, table)),
        None if !measurement.is_empty() => Ok(render_from(criteria, measurement)),
        None => Err(QueryError::MissingTable),
    }
}

fn render_from(criteria: &QueryCriteria, table: &str) -> BoundQuery {
    let selection = if criteria.select_criteria().is_empty() {
        "*".to_string()
    } else {
        // Raw expressions, order preserved: it decides the column order
        criteria.select_criteria().join(",")
    };

    let mut clauses = vec![
        format!("SELECT {}", selection),
        format!("FROM {}", quote_identifier(table)),
        format!(
            "WHERE {} = {}",
            TENANT_COLUMN,
            quote_literal(criteria.tenant_id())
        ),
    ];

    if let Some(id) = criteria.id() {
        clauses.push(format!("AND {} = {}", ID_COLUMN, quote_literal(id)));
    }

    if let Some(from) = criteria.from_bound() {
        clauses.push(format!("AND {} >= {}", TIME_COLUMN, from));
    }
    if let Some(to) = criteria.to_bound() {
        clauses.push(format!("AND {} <= {}", TIME_COLUMN, to));
    }

    match criteria.grouping() {
        Grouping::None => {}
        Grouping::Columns(columns) => {
            let columns: Vec<String> = columns.iter().map(|c| quote_identifier(c)).collect();
            clauses.push(format!("GROUP BY {}", columns.join(",")));
        }
        Grouping::Time { value, unit } => {
            clauses.push(format!("GROUP BY time({}{})", value, unit.store_unit_token()));
        }
    }

    let mut sql = clauses.join(" ");
    sql.push(';');

    tracing::debug!(
        database = criteria.database().unwrap_or_default(),
        query = %sql,
        "Built query"
    );

    BoundQuery::new(criteria.database().map(str::to_string), sql)
}

/// Single-quoted string literal with `\` and `'` escaped
pub(crate) fn quote_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if c == '\'' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

/// Identifiers are emitted bare when they are plain words, double-quoted otherwise
pub(crate) fn quote_identifier(name: &str) -> String {
    let mut chars = name.chars();
    let plain = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if plain {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
    }
}
