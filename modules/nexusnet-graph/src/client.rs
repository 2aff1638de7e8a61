use std::future::Future;
use std::time::Duration;

use neo4rs::{query, ConfigBuilder, Graph, Txn};

use nexusnet_common::SubmissionError;

/// Thin wrapper around neo4rs::Graph providing connection setup and a
/// per-call deadline. Every component receives a clone at construction —
/// there is no ambient global connection.
#[derive(Clone)]
pub struct GraphClient {
    pub(crate) graph: Graph,
    pub(crate) timeout: Duration,
}

impl GraphClient {
    /// Connect to Neo4j with the given credentials.
    pub async fn connect(
        uri: &str,
        user: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<Self, neo4rs::Error> {
        let config = ConfigBuilder::default()
            .uri(uri)
            .user(user)
            .password(password)
            .fetch_size(500)
            .max_connections(10)
            .build()
            .unwrap();
        let graph = Graph::connect(config).await?;
        Ok(Self { graph, timeout })
    }

    /// Get a reference to the underlying neo4rs Graph.
    pub fn inner(&self) -> &Graph {
        &self.graph
    }

    pub fn store_timeout(&self) -> Duration {
        self.timeout
    }

    /// Run a store call under the configured deadline. Timeouts and driver
    /// errors both surface as `StoreUnavailable`; nothing is retried.
    pub(crate) async fn guard<T, F>(&self, fut: F) -> Result<T, SubmissionError>
    where
        F: Future<Output = Result<T, neo4rs::Error>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(SubmissionError::store(e)),
            Err(_) => Err(SubmissionError::deadline(self.timeout.as_secs())),
        }
    }

    /// Open an explicit transaction. The caller owns commit/rollback.
    pub async fn start_txn(&self) -> Result<Txn, SubmissionError> {
        self.guard(self.graph.start_txn()).await
    }

    /// Administrative reset: detach-delete every node and relationship.
    /// Test fixtures and explicit admin action only.
    pub async fn delete_all(&self) -> Result<(), SubmissionError> {
        self.guard(self.graph.run(query("MATCH (n) DETACH DELETE n")))
            .await
    }
}
