use serde_json::Value;
use thiserror::Error;

use crate::models::resume::ParsedResume;

/// Why a completion payload was rejected. Messages are shown to end users verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Invalid resume data structure")]
    NotAnObject,

    #[error("Missing or invalid basics section")]
    Basics,

    #[error("Missing required basic information")]
    MissingBasicInfo,

    #[error("Invalid experience section")]
    ExperienceSection,

    #[error("Invalid education section")]
    EducationSection,

    #[error("Invalid skills section")]
    SkillsSection,

    /// `position` is 1-indexed.
    #[error("Invalid experience entry at position {position}")]
    ExperienceEntry { position: usize },

    #[error("Invalid highlights in experience entry {position}")]
    Highlights { position: usize },

    #[error("Invalid education entry at position {position}")]
    EducationEntry { position: usize },

    /// Passed the structural checks but a field has the wrong type (e.g. a numeric name).
    #[error("Invalid resume data structure: {0}")]
    Malformed(String),
}

/// Checks untrusted model output against the resume shape and converts it.
///
/// Checks run in a fixed order and stop at the first violation:
/// root object, `basics`, required basics, section arrays, then each entry.
pub fn validate_resume(candidate: Value) -> Result<ParsedResume, SchemaError> {
    check_structure(&candidate)?;
    serde_json::from_value(candidate).map_err(|e| SchemaError::Malformed(e.to_string()))
}

fn check_structure(candidate: &Value) -> Result<(), SchemaError> {
    let resume = candidate.as_object().ok_or(SchemaError::NotAnObject)?;

    let basics = resume
        .get("basics")
        .and_then(Value::as_object)
        .ok_or(SchemaError::Basics)?;
    if !["name", "title", "summary"]
        .iter()
        .all(|field| is_truthy(basics.get(*field)))
    {
        return Err(SchemaError::MissingBasicInfo);
    }

    let experience = resume
        .get("experience")
        .and_then(Value::as_array)
        .ok_or(SchemaError::ExperienceSection)?;
    let education = resume
        .get("education")
        .and_then(Value::as_array)
        .ok_or(SchemaError::EducationSection)?;
    if !resume.get("skills").is_some_and(Value::is_array) {
        return Err(SchemaError::SkillsSection);
    }

    for (index, entry) in experience.iter().enumerate() {
        let position = index + 1;
        if !is_truthy(entry.get("company")) || !is_truthy(entry.get("position")) {
            return Err(SchemaError::ExperienceEntry { position });
        }
        if !entry.get("highlights").is_some_and(Value::is_array) {
            return Err(SchemaError::Highlights { position });
        }
    }

    for (index, entry) in education.iter().enumerate() {
        if !["institution", "degree", "field"]
            .iter()
            .all(|field| is_truthy(entry.get(*field)))
        {
            return Err(SchemaError::EducationEntry {
                position: index + 1,
            });
        }
    }

    Ok(())
}

/// Presence test matching loose JSON truthiness: absent, null, false, 0 and "" fail.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
