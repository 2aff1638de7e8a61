//! Shared types for the NEXUSNET survey graph: entity and relationship
//! vocabulary, property values with sentinel normalization, the identity
//! policy table, the error taxonomy, and env-based configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::SubmissionError;
pub use types::{
    normalize_properties, CaseStudyFields, CaseStudySubmission, EntityKind, IdentityPolicies,
    IdentityPolicy, NodeHandle, ProjectFields, ProjectSubmission, PropertyValue, Relation,
    ResearcherFields, Role, FUNDING_PROGRAMMES, NOT_AVAILABLE,
};
