//! End-to-end submission tests: the two orchestrated use cases against a
//! real Neo4j instance.
//!
//! Requirements: Docker (for Neo4j via testcontainers)
//!
//! Run with: cargo test -p nexusnet-intake --features test-utils --test submission_test

#![cfg(feature = "test-utils")]

use nexusnet_common::{
    CaseStudyFields, CaseStudySubmission, EntityKind, ProjectFields, ProjectSubmission,
    ResearcherFields, SubmissionError,
};
use nexusnet_graph::{query, GraphClient};
use nexusnet_intake::SurveyIntake;

async fn setup() -> (impl std::any::Any, GraphClient, SurveyIntake) {
    let (container, client) = nexusnet_graph::testutil::neo4j_container().await;
    nexusnet_graph::migrate::migrate(&client)
        .await
        .expect("migration failed");
    let intake = SurveyIntake::new(client.clone());
    (container, client, intake)
}

async fn count(client: &GraphClient, cypher: &str) -> i64 {
    let mut stream = client
        .inner()
        .execute(query(cypher))
        .await
        .expect("count query");
    stream
        .next()
        .await
        .expect("count row")
        .map(|row| row.get::<i64>("c").unwrap_or(0))
        .unwrap_or(0)
}

fn nexus_a() -> ProjectSubmission {
    ProjectSubmission {
        project: ProjectFields {
            name: "NexusA".into(),
            funded_by: Some("HORIZON 2020".into()),
            website: Some("http://x".into()),
            funding_amount: None,
            start_date: Some("2023-01-01".into()),
            end_date: Some("2026-01-01".into()),
        },
        coordinator: ResearcherFields {
            name: "Dr. A".into(),
            contact_mail: Some("a@x.org".into()),
            host_institution: Some("Inst1".into()),
        },
    }
}

fn cs1() -> CaseStudySubmission {
    CaseStudySubmission {
        project_name: "NexusA".into(),
        case_study: CaseStudyFields {
            name: "CS1".into(),
            country: "Italy".into(),
            scale: "National".into(),
            ..Default::default()
        },
        leader: ResearcherFields {
            name: "Dr. B".into(),
            contact_mail: None,
            host_institution: Some("Inst2".into()),
        },
    }
}

#[tokio::test]
async fn register_project_then_case_study_end_to_end() {
    let (_guard, client, intake) = setup().await;

    let project = intake.submit_project(nexus_a()).await.expect("project");
    assert_eq!(project.kind, EntityKind::Project);
    assert_eq!(project.name, "NexusA");

    assert_eq!(count(&client, "MATCH (n:Project) RETURN count(n) AS c").await, 1);
    assert_eq!(
        count(&client, "MATCH (n:Researcher {name: 'Dr. A'}) RETURN count(n) AS c").await,
        1
    );
    assert_eq!(
        count(
            &client,
            "MATCH (:Researcher {name: 'Dr. A'})-[r:WORKS_ON {role: 'Project Coordinator'}]->
                   (:Project {name: 'NexusA'}) RETURN count(r) AS c"
        )
        .await,
        1
    );

    let cs = intake.submit_case_study(cs1()).await.expect("case study");
    assert_eq!(cs.kind, EntityKind::CaseStudy);

    assert_eq!(count(&client, "MATCH (n:CaseStudy) RETURN count(n) AS c").await, 1);
    assert_eq!(
        count(&client, "MATCH (n:Researcher {name: 'Dr. B'}) RETURN count(n) AS c").await,
        1
    );
    assert_eq!(
        count(&client, "MATCH (n:Institution {name: 'Inst2'}) RETURN count(n) AS c").await,
        1
    );

    // The four case-study relationships, each exactly once.
    for edge in [
        "MATCH (:Project {name: 'NexusA'})-[r:HAS_CASE_STUDY]->(:CaseStudy {name: 'CS1'}) RETURN count(r) AS c",
        "MATCH (:Researcher {name: 'Dr. B'})-[r:WORKS_ON {role: 'Case Study Leader'}]->(:CaseStudy {name: 'CS1'}) RETURN count(r) AS c",
        "MATCH (:Researcher {name: 'Dr. B'})-[r:WORKS_ON {role: 'Case Study Leader'}]->(:Project {name: 'NexusA'}) RETURN count(r) AS c",
        "MATCH (:Researcher {name: 'Dr. B'})-[r:BELONGS_TO]->(:Institution {name: 'Inst2'}) RETURN count(r) AS c",
    ] {
        assert_eq!(count(&client, edge).await, 1, "missing or duplicated: {edge}");
    }
}

#[tokio::test]
async fn repeated_project_registration_is_rejected() {
    let (_guard, client, intake) = setup().await;

    intake.submit_project(nexus_a()).await.expect("first");

    for _ in 0..2 {
        let err = intake
            .submit_project(nexus_a())
            .await
            .expect_err("duplicate must be rejected");
        assert!(matches!(err, SubmissionError::DuplicateEntity { .. }));
    }

    assert_eq!(count(&client, "MATCH (n:Project) RETURN count(n) AS c").await, 1);
}

#[tokio::test]
async fn case_study_against_unknown_project_writes_nothing() {
    let (_guard, client, intake) = setup().await;

    let mut submission = cs1();
    submission.project_name = "DoesNotExist".into();

    let err = intake
        .submit_case_study(submission)
        .await
        .expect_err("must fail fast");
    assert!(matches!(
        err,
        SubmissionError::ReferenceNotFound {
            kind: EntityKind::Project,
            ..
        }
    ));

    assert_eq!(count(&client, "MATCH (n) RETURN count(n) AS c").await, 0);
}

#[tokio::test]
async fn shared_leader_is_reused_across_case_studies() {
    let (_guard, client, intake) = setup().await;

    intake.submit_project(nexus_a()).await.expect("project");
    intake.submit_case_study(cs1()).await.expect("cs1");

    let mut second = cs1();
    second.case_study.name = "CS2".into();
    intake.submit_case_study(second).await.expect("cs2");

    // One researcher node, one WORKS_ON per case study, and a single
    // merged WORKS_ON to the shared project.
    assert_eq!(
        count(&client, "MATCH (n:Researcher {name: 'Dr. B'}) RETURN count(n) AS c").await,
        1
    );
    assert_eq!(
        count(
            &client,
            "MATCH (:Researcher {name: 'Dr. B'})-[r:WORKS_ON]->(:CaseStudy) RETURN count(r) AS c"
        )
        .await,
        2
    );
    assert_eq!(
        count(
            &client,
            "MATCH (:Researcher {name: 'Dr. B'})-[r:WORKS_ON]->(:Project) RETURN count(r) AS c"
        )
        .await,
        1
    );
}

#[tokio::test]
async fn resubmitting_a_case_study_changes_nothing() {
    let (_guard, client, intake) = setup().await;

    intake.submit_project(nexus_a()).await.expect("project");
    intake.submit_case_study(cs1()).await.expect("first");
    intake.submit_case_study(cs1()).await.expect("resubmit");

    assert_eq!(count(&client, "MATCH (n:CaseStudy) RETURN count(n) AS c").await, 1);
    assert_eq!(
        count(&client, "MATCH ()-[r:HAS_CASE_STUDY]->() RETURN count(r) AS c").await,
        1
    );
    assert_eq!(
        count(&client, "MATCH ()-[r:WORKS_ON]->() RETURN count(r) AS c").await,
        3,
        "coordinator edge plus the two leader edges, no duplicates"
    );
    assert_eq!(
        count(&client, "MATCH ()-[r:BELONGS_TO]->() RETURN count(r) AS c").await,
        1
    );
}

#[tokio::test]
async fn leader_without_institution_gets_no_belongs_to_edge() {
    let (_guard, client, intake) = setup().await;

    intake.submit_project(nexus_a()).await.expect("project");

    let mut submission = cs1();
    submission.leader.host_institution = None;
    intake.submit_case_study(submission).await.expect("case study");

    assert_eq!(count(&client, "MATCH (n:Institution) RETURN count(n) AS c").await, 0);
    assert_eq!(
        count(&client, "MATCH ()-[r:BELONGS_TO]->() RETURN count(r) AS c").await,
        0
    );
}

#[tokio::test]
async fn expired_deadline_surfaces_as_store_unavailable_and_writes_nothing() {
    let (container, client) = nexusnet_graph::testutil::neo4j_container().await;
    nexusnet_graph::migrate::migrate(&client)
        .await
        .expect("migration failed");

    // A second client against the same store, with a deadline no real
    // round trip can meet.
    let host_port = container
        .get_host_port_ipv4(7687)
        .await
        .expect("host port");
    let hurried = GraphClient::connect(
        &format!("bolt://127.0.0.1:{host_port}"),
        "neo4j",
        "test",
        std::time::Duration::from_millis(1),
    )
    .await
    .expect("connect");
    let intake = SurveyIntake::new(hurried);

    let err = intake
        .submit_project(nexus_a())
        .await
        .expect_err("deadline must expire");
    assert!(matches!(err, SubmissionError::StoreUnavailable(_)));

    // The timed-out transaction was rolled back, not left half-applied.
    assert_eq!(count(&client, "MATCH (n) RETURN count(n) AS c").await, 0);
}

#[tokio::test]
async fn project_names_listing_feeds_the_selection_control() {
    let (_guard, _client, intake) = setup().await;

    assert!(intake.list_project_names().await.expect("empty list").is_empty());

    intake.submit_project(nexus_a()).await.expect("project a");

    let mut second = nexus_a();
    second.project.name = "Alpha".into();
    intake.submit_project(second).await.expect("project b");

    assert_eq!(
        intake.list_project_names().await.expect("list"),
        vec!["Alpha".to_string(), "NexusA".to_string()]
    );
}
