use neo4rs::{query, Query, Txn};

use nexusnet_common::{EntityKind, NodeHandle, PropertyValue, SubmissionError};

use crate::cypher::{bind_values, check_keys, predicate_clause};
use crate::GraphClient;

/// Decides whether a node matching a set of candidate identifying
/// properties already exists. AND-equality over every candidate property;
/// first match wins (the store does not guarantee there is only one).
#[derive(Clone)]
pub struct IdentityResolver {
    client: GraphClient,
}

impl IdentityResolver {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Resolve against current store state, outside any transaction.
    pub async fn resolve(
        &self,
        kind: EntityKind,
        props: &[(String, PropertyValue)],
    ) -> Result<Option<NodeHandle>, SubmissionError> {
        let q = match_query(kind, props)?;
        self.client
            .guard(async {
                let mut stream = self.client.graph.execute(q).await?;
                Ok(stream.next().await?.map(|row| row_handle(kind, &row)))
            })
            .await
    }

    /// Resolve inside an open transaction, seeing its uncommitted writes.
    pub async fn resolve_in(
        &self,
        txn: &mut Txn,
        kind: EntityKind,
        props: &[(String, PropertyValue)],
    ) -> Result<Option<NodeHandle>, SubmissionError> {
        let q = match_query(kind, props)?;
        let mut stream = txn.execute(q).await.map_err(SubmissionError::store)?;
        let row = stream
            .next(txn.handle())
            .await
            .map_err(SubmissionError::store)?;
        Ok(row.map(|row| row_handle(kind, &row)))
    }

    /// Convenience: resolve by the business identity key alone.
    pub async fn resolve_by_name(
        &self,
        kind: EntityKind,
        name: &str,
    ) -> Result<Option<NodeHandle>, SubmissionError> {
        self.resolve(kind, &name_props(name)).await
    }
}

pub(crate) fn name_props(name: &str) -> Vec<(String, PropertyValue)> {
    vec![("name".to_string(), PropertyValue::Text(name.to_string()))]
}

fn match_query(
    kind: EntityKind,
    props: &[(String, PropertyValue)],
) -> Result<Query, SubmissionError> {
    if props.is_empty() {
        return Err(SubmissionError::Validation(
            "at least one candidate property is required to resolve identity".into(),
        ));
    }
    check_keys(props)?;

    let statement = format!(
        "MATCH (n:{label}) WHERE {predicate} RETURN n.uid AS uid, n.name AS name LIMIT 1",
        label = kind.label(),
        predicate = predicate_clause(props),
    );
    Ok(bind_values(query(&statement), props))
}

fn row_handle(kind: EntityKind, row: &neo4rs::Row) -> NodeHandle {
    NodeHandle {
        kind,
        uid: row.get::<String>("uid").unwrap_or_default(),
        name: row.get::<String>("name").unwrap_or_default(),
    }
}
