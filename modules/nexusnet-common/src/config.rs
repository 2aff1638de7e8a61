use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Neo4j
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,

    // Per-call store deadline, seconds
    pub store_timeout_secs: u64,

    // Web server
    pub web_host: String,
    pub web_port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            neo4j_uri: required_env("NEO4J_URI"),
            neo4j_user: required_env("NEO4J_USER"),
            neo4j_password: required_env("NEO4J_PASSWORD"),
            store_timeout_secs: env::var("STORE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("STORE_TIMEOUT_SECS must be a number"),
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: env::var("WEB_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("WEB_PORT must be a number"),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
