use neo4rs::query;

use nexusnet_common::SubmissionError;

use crate::GraphClient;

/// Read-side queries consumed by the form layer.
pub struct GraphReader {
    client: GraphClient,
}

impl GraphReader {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// All project names, ordered. Populates the case-study project
    /// selection control.
    pub async fn list_project_names(&self) -> Result<Vec<String>, SubmissionError> {
        let q = query("MATCH (p:Project) RETURN p.name AS name ORDER BY name");
        self.client
            .guard(async {
                let mut names = Vec::new();
                let mut stream = self.client.graph.execute(q).await?;
                while let Some(row) = stream.next().await? {
                    if let Ok(name) = row.get::<String>("name") {
                        names.push(name);
                    }
                }
                Ok(names)
            })
            .await
    }
}
