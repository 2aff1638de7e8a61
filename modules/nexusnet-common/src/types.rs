use serde::{Deserialize, Serialize};

/// Sentinel stored for every survey field the respondent left empty.
/// Guarantees that "answered as empty" is distinguishable from a property
/// that was never part of the schema.
pub const NOT_AVAILABLE: &str = "Not Available";

/// Funding programmes offered by the questionnaire. Advisory vocabulary
/// only — `funded_by` is persisted as free text, matching the survey's
/// "Other" escape hatch.
pub const FUNDING_PROGRAMMES: &[&str] = &[
    "HORIZON 2020",
    "HORIZON EUROPE",
    "Life",
    "Prima",
    "Interreg",
    "Erasmus+",
    "Marie Sklodowska-Curie",
    "National/Regional Funding",
    "Other",
];

// --- Entity kinds ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Project,
    Researcher,
    Institution,
    CaseStudy,
}

impl EntityKind {
    /// Graph label for this kind. Closed set — never built from user input.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Project => "Project",
            EntityKind::Researcher => "Researcher",
            EntityKind::Institution => "Institution",
            EntityKind::CaseStudy => "CaseStudy",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// --- Relationships ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    ProjectCoordinator,
    CaseStudyLeader,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::ProjectCoordinator => "Project Coordinator",
            Role::CaseStudyLeader => "Case Study Leader",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Typed, directed relationship between two resolved entities.
///
/// `WorksOn` carries a role and a creation timestamp; the other two are
/// existence-only edges. A (source, target, role) triple is unique for
/// `WorksOn`; a plain (source, target) pair is unique for the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    WorksOn { role: Role },
    HasCaseStudy,
    BelongsTo,
}

impl Relation {
    pub fn rel_type(&self) -> &'static str {
        match self {
            Relation::WorksOn { .. } => "WORKS_ON",
            Relation::HasCaseStudy => "HAS_CASE_STUDY",
            Relation::BelongsTo => "BELONGS_TO",
        }
    }

    /// Whether this relation type stamps a `created_at` on first creation.
    pub fn stamps_created_at(&self) -> bool {
        matches!(self, Relation::WorksOn { .. })
    }
}

// --- Property values ---

/// Scalar or list-of-scalar property value, the only shapes the survey
/// produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    List(Vec<String>),
}

impl PropertyValue {
    pub fn is_empty(&self) -> bool {
        match self {
            PropertyValue::Text(s) => s.trim().is_empty(),
            PropertyValue::List(items) => items.iter().all(|s| s.trim().is_empty()),
        }
    }

    /// Replace an empty value with the `"Not Available"` sentinel.
    pub fn normalize(self) -> PropertyValue {
        if self.is_empty() {
            PropertyValue::Text(NOT_AVAILABLE.to_string())
        } else {
            self
        }
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<Option<String>> for PropertyValue {
    fn from(s: Option<String>) -> Self {
        PropertyValue::Text(s.unwrap_or_default())
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(items: Vec<String>) -> Self {
        PropertyValue::List(items)
    }
}

/// Normalize a property set: every empty value becomes the sentinel.
/// The identity key (`name`) is exempt — an empty name is rejected by
/// validation long before it reaches the store.
pub fn normalize_properties(props: Vec<(String, PropertyValue)>) -> Vec<(String, PropertyValue)> {
    props
        .into_iter()
        .map(|(key, value)| {
            if key == "name" {
                (key, value)
            } else {
                (key, value.normalize())
            }
        })
        .collect()
}

// --- Handles ---

/// Stable reference to a persisted node: the generated uid, not the
/// human-readable name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeHandle {
    pub kind: EntityKind,
    pub uid: String,
    pub name: String,
}

// --- Identity policy ---

/// How the upserter treats an incoming entity whose identity key may
/// already exist. One policy per kind, picked once — the reference
/// implementation's three code paths disagreed on this, so it is an
/// explicit table here rather than per-feature behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityPolicy {
    /// MERGE on the identity key; first write wins for existing nodes.
    MergeByKey,
    /// Resolve first and fail with `DuplicateEntity` on a hit.
    RejectDuplicate,
    /// Create unconditionally, duplicates allowed.
    AlwaysCreate,
}

#[derive(Debug, Clone, Copy)]
pub struct IdentityPolicies {
    pub project: IdentityPolicy,
    pub researcher: IdentityPolicy,
    pub institution: IdentityPolicy,
    pub case_study: IdentityPolicy,
}

impl Default for IdentityPolicies {
    fn default() -> Self {
        Self {
            project: IdentityPolicy::RejectDuplicate,
            researcher: IdentityPolicy::MergeByKey,
            institution: IdentityPolicy::MergeByKey,
            case_study: IdentityPolicy::MergeByKey,
        }
    }
}

impl IdentityPolicies {
    pub fn for_kind(&self, kind: EntityKind) -> IdentityPolicy {
        match kind {
            EntityKind::Project => self.project,
            EntityKind::Researcher => self.researcher,
            EntityKind::Institution => self.institution,
            EntityKind::CaseStudy => self.case_study,
        }
    }
}

// --- Survey field structs ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectFields {
    pub name: String,
    #[serde(default)]
    pub funded_by: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub funding_amount: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl ProjectFields {
    pub fn into_properties(self) -> Vec<(String, PropertyValue)> {
        normalize_properties(vec![
            ("name".into(), self.name.into()),
            ("funded_by".into(), self.funded_by.into()),
            ("website".into(), self.website.into()),
            ("funding_amount".into(), self.funding_amount.into()),
            ("start_date".into(), self.start_date.into()),
            ("end_date".into(), self.end_date.into()),
        ])
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearcherFields {
    pub name: String,
    #[serde(default)]
    pub contact_mail: Option<String>,
    #[serde(default)]
    pub host_institution: Option<String>,
}

impl ResearcherFields {
    pub fn into_properties(self) -> Vec<(String, PropertyValue)> {
        normalize_properties(vec![
            ("name".into(), self.name.into()),
            ("contact_mail".into(), self.contact_mail.into()),
            ("host_institution".into(), self.host_institution.into()),
        ])
    }
}

/// Flat case-study answer sheet. Every field maps 1:1 to a stored node
/// property; empties become the `"Not Available"` sentinel at upsert time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaseStudyFields {
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub scale: String,
    #[serde(default)]
    pub transboundary: String,
    #[serde(default)]
    pub objectives: String,
    #[serde(default)]
    pub nexus_sectors: Vec<String>,
    #[serde(default)]
    pub layers_of_analysis: Vec<String>,
    #[serde(default)]
    pub systems_analysis: String,
    #[serde(default)]
    pub semantics_ontologies: String,
    #[serde(default)]
    pub footprint_calcs: String,
    #[serde(default)]
    pub decision_support_systems: String,
    #[serde(default)]
    pub ai_methodology: Vec<String>,
    #[serde(default)]
    pub climate_proj_years: String,
    #[serde(default)]
    pub existing_models: String,
    #[serde(default)]
    pub model_adjustments: String,
    #[serde(default)]
    pub nexus_indicators: String,
    #[serde(default)]
    pub lifecycle_assessment: String,
    #[serde(default)]
    pub monitoring_techniques: Vec<String>,
    #[serde(default)]
    pub stakeholders: Vec<String>,
    #[serde(default)]
    pub stakeholder_sectors: Vec<String>,
    #[serde(default)]
    pub stakeholder_approach: Vec<String>,
    #[serde(default)]
    pub visualization: String,
    #[serde(default)]
    pub sdgs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub usage: String,
    #[serde(default)]
    pub helix: String,
    #[serde(default)]
    pub impacts: Vec<String>,
    #[serde(default)]
    pub impact_description: String,
}

impl CaseStudyFields {
    pub fn into_properties(self) -> Vec<(String, PropertyValue)> {
        normalize_properties(vec![
            ("name".into(), self.name.into()),
            ("country".into(), self.country.into()),
            ("scale".into(), self.scale.into()),
            ("transboundary".into(), self.transboundary.into()),
            ("objectives".into(), self.objectives.into()),
            ("nexus_sectors".into(), self.nexus_sectors.into()),
            ("layers_of_analysis".into(), self.layers_of_analysis.into()),
            ("systems_analysis".into(), self.systems_analysis.into()),
            ("semantics_ontologies".into(), self.semantics_ontologies.into()),
            ("footprint_calcs".into(), self.footprint_calcs.into()),
            (
                "decision_support_systems".into(),
                self.decision_support_systems.into(),
            ),
            ("ai_methodology".into(), self.ai_methodology.into()),
            ("climate_proj_years".into(), self.climate_proj_years.into()),
            ("existing_models".into(), self.existing_models.into()),
            ("model_adjustments".into(), self.model_adjustments.into()),
            ("nexus_indicators".into(), self.nexus_indicators.into()),
            ("lifecycle_assessment".into(), self.lifecycle_assessment.into()),
            (
                "monitoring_techniques".into(),
                self.monitoring_techniques.into(),
            ),
            ("stakeholders".into(), self.stakeholders.into()),
            ("stakeholder_sectors".into(), self.stakeholder_sectors.into()),
            ("stakeholder_approach".into(), self.stakeholder_approach.into()),
            ("visualization".into(), self.visualization.into()),
            ("sdgs".into(), self.sdgs.into()),
            ("outputs".into(), self.outputs.into()),
            ("usage".into(), self.usage.into()),
            ("helix".into(), self.helix.into()),
            ("impacts".into(), self.impacts.into()),
            ("impact_description".into(), self.impact_description.into()),
        ])
    }
}

// --- Submission payloads ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSubmission {
    pub project: ProjectFields,
    pub coordinator: ResearcherFields,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseStudySubmission {
    pub project_name: String,
    pub case_study: CaseStudyFields,
    pub leader: ResearcherFields,
}
