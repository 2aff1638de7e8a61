//! Input validation, applied before any store interaction.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use url::Url;

use nexusnet_common::{CaseStudySubmission, ProjectSubmission, ResearcherFields, SubmissionError};

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap())
}

pub fn validate_project(submission: &ProjectSubmission) -> Result<(), SubmissionError> {
    require_name(&submission.project.name, "project name")?;
    validate_researcher(&submission.coordinator, "coordinator")?;

    if let Some(website) = present(&submission.project.website) {
        let parsed = Url::parse(website)
            .map_err(|_| invalid(format!("project website is not a valid URL: {website:?}")))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(invalid("project website must use http or https".into()));
        }
    }

    if let Some(amount) = present(&submission.project.funding_amount) {
        amount
            .parse::<f64>()
            .map_err(|_| invalid(format!("funding amount is not numeric: {amount:?}")))?;
    }

    let start = parse_date(&submission.project.start_date, "start date")?;
    let end = parse_date(&submission.project.end_date, "end date")?;
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(invalid("project start date is after its end date".into()));
        }
    }

    Ok(())
}

pub fn validate_case_study(submission: &CaseStudySubmission) -> Result<(), SubmissionError> {
    require_name(&submission.project_name, "project name")?;
    require_name(&submission.case_study.name, "case study name")?;
    validate_researcher(&submission.leader, "case study leader")?;
    Ok(())
}

fn validate_researcher(researcher: &ResearcherFields, who: &str) -> Result<(), SubmissionError> {
    require_name(&researcher.name, &format!("{who} name"))?;
    if let Some(mail) = present(&researcher.contact_mail) {
        if !email_re().is_match(mail) {
            return Err(invalid(format!("{who} contact mail is not an email: {mail:?}")));
        }
    }
    Ok(())
}

fn require_name(name: &str, what: &str) -> Result<(), SubmissionError> {
    if name.trim().is_empty() {
        return Err(invalid(format!("{what} must not be empty")));
    }
    Ok(())
}

/// Treat `None` and whitespace-only the same: absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(value: &Option<String>, what: &str) -> Result<Option<NaiveDate>, SubmissionError> {
    match present(value) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| invalid(format!("{what} must be YYYY-MM-DD, got {raw:?}"))),
    }
}

fn invalid(msg: String) -> SubmissionError {
    SubmissionError::Validation(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexusnet_common::{CaseStudyFields, ProjectFields};

    fn project() -> ProjectSubmission {
        ProjectSubmission {
            project: ProjectFields {
                name: "NexusA".into(),
                funded_by: Some("HORIZON 2020".into()),
                website: Some("http://x".into()),
                funding_amount: Some("1500000".into()),
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

    #[test]
    fn accepts_the_reference_project() {
        assert!(validate_project(&project()).is_ok());
    }

    #[test]
    fn rejects_empty_names() {
        let mut sub = project();
        sub.project.name = "  ".into();
        assert!(matches!(
            validate_project(&sub),
            Err(SubmissionError::Validation(_))
        ));

        let mut sub = project();
        sub.coordinator.name = String::new();
        assert!(validate_project(&sub).is_err());
    }

    #[test]
    fn rejects_bad_mail_url_amount_and_dates() {
        let mut sub = project();
        sub.coordinator.contact_mail = Some("not-a-mail".into());
        assert!(validate_project(&sub).is_err());

        let mut sub = project();
        sub.project.website = Some("ftp://files.example.org".into());
        assert!(validate_project(&sub).is_err());

        let mut sub = project();
        sub.project.funding_amount = Some("a lot".into());
        assert!(validate_project(&sub).is_err());

        let mut sub = project();
        sub.project.start_date = Some("01.01.2023".into());
        assert!(validate_project(&sub).is_err());

        let mut sub = project();
        sub.project.start_date = Some("2026-01-01".into());
        sub.project.end_date = Some("2023-01-01".into());
        assert!(validate_project(&sub).is_err());
    }

    #[test]
    fn empty_optionals_are_treated_as_absent() {
        let mut sub = project();
        sub.project.website = Some("   ".into());
        sub.project.funding_amount = Some(String::new());
        sub.coordinator.contact_mail = None;
        assert!(validate_project(&sub).is_ok());
    }

    #[test]
    fn case_study_requires_names_only() {
        let sub = CaseStudySubmission {
            project_name: "NexusA".into(),
            case_study: CaseStudyFields {
                name: "CS1".into(),
                ..Default::default()
            },
            leader: ResearcherFields {
                name: "Dr. B".into(),
                contact_mail: None,
                host_institution: None,
            },
        };
        assert!(validate_case_study(&sub).is_ok());

        let mut missing = sub.clone();
        missing.case_study.name = String::new();
        assert!(validate_case_study(&missing).is_err());

        let mut missing = sub;
        missing.project_name = String::new();
        assert!(validate_case_study(&missing).is_err());
    }
}
