use chrono::Utc;
use neo4rs::{query, Query, Txn};
use tracing::info;

use nexusnet_common::{NodeHandle, Relation, SubmissionError};

use crate::cypher::format_datetime;
use crate::GraphClient;

/// Establishes a directed, typed edge between two resolved entities.
///
/// Idempotent: MERGE on the typed edge (including `role` for WORKS_ON)
/// means a resubmitted form cannot produce a second edge for the same
/// semantic fact, while the same researcher pair under a different role
/// still gets its own edge.
pub struct RelationshipBinder {
    client: GraphClient,
}

impl RelationshipBinder {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Bind as a standalone statement against current store state.
    pub async fn bind(
        &self,
        source: &NodeHandle,
        target: &NodeHandle,
        rel: Relation,
    ) -> Result<(), SubmissionError> {
        let q = merge_query(source, target, rel);
        self.client.guard(self.client.graph.run(q)).await?;
        log_bound(source, target, rel);
        Ok(())
    }

    /// Bind inside an open transaction.
    pub async fn bind_in(
        &self,
        txn: &mut Txn,
        source: &NodeHandle,
        target: &NodeHandle,
        rel: Relation,
    ) -> Result<(), SubmissionError> {
        let q = merge_query(source, target, rel);
        txn.run(q).await.map_err(SubmissionError::store)?;
        log_bound(source, target, rel);
        Ok(())
    }
}

fn merge_query(source: &NodeHandle, target: &NodeHandle, rel: Relation) -> Query {
    let mut statement = format!(
        "MATCH (a:{src} {{uid: $src}})
         MATCH (b:{dst} {{uid: $dst}})",
        src = source.kind.label(),
        dst = target.kind.label(),
    );

    match rel {
        Relation::WorksOn { .. } => {
            statement.push_str(
                "\n         MERGE (a)-[r:WORKS_ON {role: $role}]->(b)
         ON CREATE SET r.created_at = datetime($ts)",
            );
        }
        Relation::HasCaseStudy => {
            statement.push_str("\n         MERGE (a)-[r:HAS_CASE_STUDY]->(b)");
        }
        Relation::BelongsTo => {
            statement.push_str("\n         MERGE (a)-[r:BELONGS_TO]->(b)");
        }
    }

    let q = query(&statement)
        .param("src", source.uid.as_str())
        .param("dst", target.uid.as_str());

    match rel {
        Relation::WorksOn { role } => q
            .param("role", role.as_str())
            .param("ts", format_datetime(&Utc::now())),
        _ => q,
    }
}

fn log_bound(source: &NodeHandle, target: &NodeHandle, rel: Relation) {
    info!(
        rel = rel.rel_type(),
        source = %source.name,
        target = %target.name,
        "Relationship bound"
    );
}
