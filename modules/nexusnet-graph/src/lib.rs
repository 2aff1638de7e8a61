//! Graph upsert layer for the NEXUSNET survey: identity resolution,
//! sentinel-normalizing entity upserts, idempotent relationship binding,
//! read queries, and schema migrations against Neo4j.

pub mod bind;
pub mod client;
mod cypher;
pub mod migrate;
pub mod reader;
pub mod resolver;
pub mod upsert;

#[cfg(feature = "test-utils")]
pub mod testutil;

pub use bind::RelationshipBinder;
pub use client::GraphClient;
pub use reader::GraphReader;
pub use resolver::IdentityResolver;
pub use upsert::EntityUpserter;

// Re-exported for integration tests and callers issuing raw statements.
pub use neo4rs::query;
