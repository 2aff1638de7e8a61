//! Helpers for building parameterized Cypher statements.
//!
//! Labels come from the closed `EntityKind`/`Relation` enums. Property
//! keys cannot be bound as parameters in Cypher, so they are validated as
//! plain identifiers before being spliced into statement text. Property
//! values are always bound — never interpolated.

use chrono::{DateTime, Utc};
use neo4rs::Query;

use nexusnet_common::{PropertyValue, SubmissionError};

/// Accept only `[A-Za-z_][A-Za-z0-9_]*` as a property key.
pub(crate) fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn check_keys(props: &[(String, PropertyValue)]) -> Result<(), SubmissionError> {
    for (key, _) in props {
        if !is_identifier(key) {
            return Err(SubmissionError::Validation(format!(
                "invalid property key: {key:?}"
            )));
        }
    }
    Ok(())
}

/// `n.key0 = $p0 AND n.key1 = $p1 AND ...` — keys must be pre-checked.
pub(crate) fn predicate_clause(props: &[(String, PropertyValue)]) -> String {
    props
        .iter()
        .enumerate()
        .map(|(i, (key, _))| format!("n.{key} = $p{i}"))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// `n.key0 = $p0, n.key1 = $p1, ...` for SET lists.
pub(crate) fn assignment_clause(props: &[(String, PropertyValue)]) -> String {
    props
        .iter()
        .enumerate()
        .map(|(i, (key, _))| format!("n.{key} = $p{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Bind every property value as `$p{i}`.
pub(crate) fn bind_values(mut q: Query, props: &[(String, PropertyValue)]) -> Query {
    for (i, (_, value)) in props.iter().enumerate() {
        let name = format!("p{i}");
        q = match value {
            PropertyValue::Text(s) => q.param(name.as_str(), s.as_str()),
            PropertyValue::List(items) => q.param(name.as_str(), items.clone()),
        };
    }
    q
}

/// Format a DateTime<Utc> as a local datetime string without timezone
/// offset. Neo4j's datetime() requires "YYYY-MM-DDThh:mm:ss" format.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
