use neo4rs::query;
use tracing::{info, warn};

use crate::GraphClient;

/// Run idempotent schema migrations: constraints, indexes.
/// "Already exists" errors are ignored so this is safe on every start.
pub async fn migrate(client: &GraphClient) -> Result<(), neo4rs::Error> {
    let g = &client.graph;

    info!("Running schema migrations...");

    // --- uid uniqueness constraints ---
    let constraints = [
        "CREATE CONSTRAINT project_uid IF NOT EXISTS FOR (n:Project) REQUIRE n.uid IS UNIQUE",
        "CREATE CONSTRAINT researcher_uid IF NOT EXISTS FOR (n:Researcher) REQUIRE n.uid IS UNIQUE",
        "CREATE CONSTRAINT institution_uid IF NOT EXISTS FOR (n:Institution) REQUIRE n.uid IS UNIQUE",
        "CREATE CONSTRAINT case_study_uid IF NOT EXISTS FOR (n:CaseStudy) REQUIRE n.uid IS UNIQUE",
        // Project name is a strict business uniqueness constraint,
        // enforced at the schema level as well as at write time.
        "CREATE CONSTRAINT project_name IF NOT EXISTS FOR (n:Project) REQUIRE n.name IS UNIQUE",
    ];

    for c in &constraints {
        run_ignoring_exists(g, c).await?;
    }
    info!("Uniqueness constraints created");

    // --- Identity key indexes (MERGE lookup path) ---
    let indexes = [
        "CREATE INDEX researcher_name IF NOT EXISTS FOR (n:Researcher) ON (n.name)",
        "CREATE INDEX institution_name IF NOT EXISTS FOR (n:Institution) ON (n.name)",
        "CREATE INDEX case_study_name IF NOT EXISTS FOR (n:CaseStudy) ON (n.name)",
    ];

    for idx in &indexes {
        run_ignoring_exists(g, idx).await?;
    }
    info!("Identity key indexes created");

    info!("Schema migrations complete");
    Ok(())
}

async fn run_ignoring_exists(g: &neo4rs::Graph, cypher: &str) -> Result<(), neo4rs::Error> {
    match g.run(query(cypher)).await {
        Ok(_) => Ok(()),
        Err(e) => {
            let msg = e.to_string().to_lowercase();
            if msg.contains("already exists") || msg.contains("equivalent") {
                warn!(
                    "Already exists (skipped): {}",
                    cypher.chars().take(80).collect::<String>()
                );
                Ok(())
            } else {
                Err(e)
            }
        }
    }
}
