use neo4rs::{query, Txn};
use tracing::info;
use uuid::Uuid;

use nexusnet_common::{
    normalize_properties, EntityKind, IdentityPolicies, IdentityPolicy, NodeHandle, PropertyValue,
    SubmissionError,
};

use crate::cypher::{assignment_clause, bind_values, check_keys};
use crate::resolver::{name_props, IdentityResolver};

/// Create-or-reuse for survey entities. Exactly one node per call, no
/// relationship side effects. The identity policy table decides whether a
/// recurring identity key is merged, rejected, or duplicated.
pub struct EntityUpserter {
    resolver: IdentityResolver,
    policies: IdentityPolicies,
}

impl EntityUpserter {
    pub fn new(resolver: IdentityResolver, policies: IdentityPolicies) -> Self {
        Self { resolver, policies }
    }

    /// Upsert one entity inside an open transaction.
    ///
    /// Properties are sentinel-normalized first: every empty value is
    /// stored as "Not Available" so no field is silently absent. A fresh
    /// node additionally receives a generated `uid` distinct from its
    /// business key.
    pub async fn upsert_in(
        &self,
        txn: &mut Txn,
        kind: EntityKind,
        props: Vec<(String, PropertyValue)>,
    ) -> Result<NodeHandle, SubmissionError> {
        let props = normalize_properties(props);
        check_keys(&props)?;
        let name = identity_key(&props)?;

        match self.policies.for_kind(kind) {
            IdentityPolicy::RejectDuplicate => {
                if self
                    .resolver
                    .resolve_in(txn, kind, &name_props(&name))
                    .await?
                    .is_some()
                {
                    return Err(SubmissionError::DuplicateEntity { kind, name });
                }
                self.create(txn, kind, name, &props).await
            }
            IdentityPolicy::MergeByKey => self.merge_by_name(txn, kind, name, &props).await,
            IdentityPolicy::AlwaysCreate => self.create(txn, kind, name, &props).await,
        }
    }

    async fn create(
        &self,
        txn: &mut Txn,
        kind: EntityKind,
        name: String,
        props: &[(String, PropertyValue)],
    ) -> Result<NodeHandle, SubmissionError> {
        let uid = Uuid::new_v4().to_string();
        let statement = format!(
            "CREATE (n:{label}) SET n.uid = $uid, {assignments} RETURN n.uid AS uid",
            label = kind.label(),
            assignments = assignment_clause(props),
        );
        let q = bind_values(query(&statement), props).param("uid", uid.as_str());

        run_returning_uid(txn, q).await?;
        info!(kind = %kind, name = %name, %uid, "Created node");
        Ok(NodeHandle { kind, uid, name })
    }

    /// MERGE on the name key. ON CREATE sets all supplied properties plus
    /// a fresh uid; a matched node keeps its stored values untouched
    /// (first write wins). MERGE is the store's conditional create, so two
    /// concurrent submissions naming the same new entity cannot race into
    /// duplicates.
    async fn merge_by_name(
        &self,
        txn: &mut Txn,
        kind: EntityKind,
        name: String,
        props: &[(String, PropertyValue)],
    ) -> Result<NodeHandle, SubmissionError> {
        let others: Vec<(String, PropertyValue)> = props
            .iter()
            .filter(|(key, _)| key != "name")
            .cloned()
            .collect();

        let fresh_uid = Uuid::new_v4().to_string();
        let mut on_create = "n.uid = $uid".to_string();
        if !others.is_empty() {
            on_create.push_str(", ");
            on_create.push_str(&assignment_clause(&others));
        }
        // ON MATCH backfills a uid onto nodes written before this schema
        // (coalesce keeps any stored uid), so the handle is never empty.
        let statement = format!(
            "MERGE (n:{label} {{name: $name}}) ON CREATE SET {on_create} \
             ON MATCH SET n.uid = coalesce(n.uid, $uid) RETURN n.uid AS uid",
            label = kind.label(),
        );
        let q = bind_values(query(&statement), &others)
            .param("name", name.as_str())
            .param("uid", fresh_uid.as_str());

        let uid = run_returning_uid(txn, q).await?;
        if uid == fresh_uid {
            info!(kind = %kind, name = %name, %uid, "Created node");
        } else {
            info!(kind = %kind, name = %name, %uid, "Reused existing node");
        }
        Ok(NodeHandle { kind, uid, name })
    }
}

fn identity_key(props: &[(String, PropertyValue)]) -> Result<String, SubmissionError> {
    match props.iter().find(|(key, _)| key == "name") {
        Some((_, PropertyValue::Text(name))) if !name.trim().is_empty() => Ok(name.clone()),
        _ => Err(SubmissionError::Validation(
            "entity is missing its 'name' identity key".into(),
        )),
    }
}

async fn run_returning_uid(txn: &mut Txn, q: neo4rs::Query) -> Result<String, SubmissionError> {
    let mut stream = txn.execute(q).await.map_err(SubmissionError::store)?;
    let row = stream
        .next(txn.handle())
        .await
        .map_err(SubmissionError::store)?;
    match row {
        Some(row) => match row.get::<String>("uid") {
            Ok(uid) if !uid.is_empty() => Ok(uid),
            _ => Err(SubmissionError::StoreUnavailable(
                "upserted node is missing its uid".into(),
            )),
        },
        None => Err(SubmissionError::StoreUnavailable(
            "upsert returned no row".into(),
        )),
    }
}
