//! Submission orchestration for the NEXUSNET survey.
//!
//! Composes the identity resolver, entity upserter, and relationship
//! binder into the two top-level use cases: register a project (with its
//! coordinator) and register a case study (with its leader and
//! institution, attached to an existing project). Each submission runs as
//! one store transaction so a failed write cannot leave orphaned nodes.

pub mod validate;

use std::time::Duration;

use neo4rs::Txn;
use tracing::{info, warn};

use nexusnet_common::{
    CaseStudySubmission, EntityKind, IdentityPolicies, NodeHandle, ProjectSubmission, Relation,
    Role, SubmissionError,
};
use nexusnet_graph::{
    EntityUpserter, GraphClient, GraphReader, IdentityResolver, RelationshipBinder,
};

pub struct SurveyIntake {
    client: GraphClient,
    resolver: IdentityResolver,
    upserter: EntityUpserter,
    binder: RelationshipBinder,
    reader: GraphReader,
}

impl SurveyIntake {
    pub fn new(client: GraphClient) -> Self {
        Self::with_policies(client, IdentityPolicies::default())
    }

    pub fn with_policies(client: GraphClient, policies: IdentityPolicies) -> Self {
        let resolver = IdentityResolver::new(client.clone());
        Self {
            resolver: resolver.clone(),
            upserter: EntityUpserter::new(resolver, policies),
            binder: RelationshipBinder::new(client.clone()),
            reader: GraphReader::new(client.clone()),
            client,
        }
    }

    /// Register a new project and its coordinator.
    ///
    /// Rejected with `DuplicateEntity` if a project with that name already
    /// exists; the coordinator is merged by name and may pre-exist.
    pub async fn submit_project(
        &self,
        submission: ProjectSubmission,
    ) -> Result<NodeHandle, SubmissionError> {
        validate::validate_project(&submission)?;

        let handle = self.run_project_txn(submission).await?;
        info!(project = %handle.name, "Project submission committed");
        Ok(handle)
    }

    /// Register a new case study against an existing project.
    ///
    /// Fails fast with `ReferenceNotFound` before any write if the project
    /// name does not resolve.
    pub async fn submit_case_study(
        &self,
        submission: CaseStudySubmission,
    ) -> Result<NodeHandle, SubmissionError> {
        validate::validate_case_study(&submission)?;

        let project = self
            .resolver
            .resolve_by_name(EntityKind::Project, &submission.project_name)
            .await?
            .ok_or_else(|| SubmissionError::ReferenceNotFound {
                kind: EntityKind::Project,
                name: submission.project_name.clone(),
            })?;

        let handle = self.run_case_study_txn(project, submission).await?;
        info!(case_study = %handle.name, "Case study submission committed");
        Ok(handle)
    }

    /// Read path for the project selection control.
    pub async fn list_project_names(&self) -> Result<Vec<String>, SubmissionError> {
        self.reader.list_project_names().await
    }

    async fn run_project_txn(
        &self,
        submission: ProjectSubmission,
    ) -> Result<NodeHandle, SubmissionError> {
        let deadline = self.client.store_timeout();
        let mut txn = self.client.start_txn().await?;
        let mut completed = Vec::new();
        let result = match tokio::time::timeout(
            deadline,
            self.project_writes(&mut txn, &mut completed, submission),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(SubmissionError::deadline(deadline.as_secs())),
        };
        settle(txn, deadline, completed, result).await
    }

    async fn project_writes(
        &self,
        txn: &mut Txn,
        completed: &mut Vec<String>,
        submission: ProjectSubmission,
    ) -> Result<NodeHandle, SubmissionError> {
        let coordinator = self
            .upserter
            .upsert_in(txn, EntityKind::Researcher, submission.coordinator.into_properties())
            .await?;
        completed.push(format!("upsert Researcher '{}'", coordinator.name));

        let project = self
            .upserter
            .upsert_in(txn, EntityKind::Project, submission.project.into_properties())
            .await?;
        completed.push(format!("upsert Project '{}'", project.name));

        self.binder
            .bind_in(
                txn,
                &coordinator,
                &project,
                Relation::WorksOn {
                    role: Role::ProjectCoordinator,
                },
            )
            .await?;
        completed.push("bind WORKS_ON coordinator -> project".to_string());

        Ok(project)
    }

    async fn run_case_study_txn(
        &self,
        project: NodeHandle,
        submission: CaseStudySubmission,
    ) -> Result<NodeHandle, SubmissionError> {
        let deadline = self.client.store_timeout();
        let mut txn = self.client.start_txn().await?;
        let mut completed = Vec::new();
        let result = match tokio::time::timeout(
            deadline,
            self.case_study_writes(&mut txn, &mut completed, &project, submission),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(SubmissionError::deadline(deadline.as_secs())),
        };
        settle(txn, deadline, completed, result).await
    }

    async fn case_study_writes(
        &self,
        txn: &mut Txn,
        completed: &mut Vec<String>,
        project: &NodeHandle,
        submission: CaseStudySubmission,
    ) -> Result<NodeHandle, SubmissionError> {
        let host_institution = submission
            .leader
            .host_institution
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let case_study = self
            .upserter
            .upsert_in(txn, EntityKind::CaseStudy, submission.case_study.into_properties())
            .await?;
        completed.push(format!("upsert CaseStudy '{}'", case_study.name));

        let leader = self
            .upserter
            .upsert_in(txn, EntityKind::Researcher, submission.leader.into_properties())
            .await?;
        completed.push(format!("upsert Researcher '{}'", leader.name));

        // Institutions are created lazily, on first reference. A leader
        // without a host institution gets no BELONGS_TO edge.
        let institution = match host_institution {
            Some(name) => {
                let handle = self
                    .upserter
                    .upsert_in(
                        txn,
                        EntityKind::Institution,
                        vec![("name".to_string(), name.into())],
                    )
                    .await?;
                completed.push(format!("upsert Institution '{}'", handle.name));
                Some(handle)
            }
            None => None,
        };

        self.binder
            .bind_in(txn, project, &case_study, Relation::HasCaseStudy)
            .await?;
        completed.push("bind HAS_CASE_STUDY project -> case study".to_string());

        let leader_role = Relation::WorksOn {
            role: Role::CaseStudyLeader,
        };
        self.binder
            .bind_in(txn, &leader, &case_study, leader_role)
            .await?;
        completed.push("bind WORKS_ON leader -> case study".to_string());

        self.binder
            .bind_in(txn, &leader, project, leader_role)
            .await?;
        completed.push("bind WORKS_ON leader -> project".to_string());

        if let Some(institution) = &institution {
            self.binder
                .bind_in(txn, &leader, institution, Relation::BelongsTo)
                .await?;
            completed.push("bind BELONGS_TO leader -> institution".to_string());
        }

        Ok(case_study)
    }
}

/// Commit on success; roll back on failure, including deadline expiry, so
/// a timed-out submission never leaves an open transaction behind. If
/// rollback itself fails (or times out) we can no longer vouch for what
/// the store kept, so the error enumerates the writes that had been
/// issued for external reconciliation.
async fn settle(
    txn: Txn,
    deadline: Duration,
    completed: Vec<String>,
    result: Result<NodeHandle, SubmissionError>,
) -> Result<NodeHandle, SubmissionError> {
    match result {
        Ok(handle) => {
            match tokio::time::timeout(deadline, txn.commit()).await {
                Ok(Ok(())) => Ok(handle),
                Ok(Err(err)) => Err(SubmissionError::store(err)),
                Err(_) => Err(SubmissionError::deadline(deadline.as_secs())),
            }
        }
        Err(err) => {
            warn!(error = %err, "Submission failed, rolling back");
            // Rollback gets a floor of a few seconds even under a short
            // submission deadline; abandoning cleanup early would turn an
            // ordinary failure into an incomplete submission.
            let rollback_deadline = deadline.max(Duration::from_secs(5));
            match tokio::time::timeout(rollback_deadline, txn.rollback()).await {
                Ok(Ok(())) => Err(err),
                Ok(Err(rollback_err)) => {
                    warn!(error = %rollback_err, "Rollback failed");
                    Err(SubmissionError::IncompleteSubmission { completed })
                }
                Err(_) => {
                    warn!("Rollback timed out");
                    Err(SubmissionError::IncompleteSubmission { completed })
                }
            }
        }
    }
}
