use crate::graph::{DependencyGraph, has_cycle};
use crate::tidp::{ProjectSnapshot, Tidp};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

pub const DISCIPLINES: [&str; 5] = ["architecture", "structural", "mep", "civil", "general"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TidpValidationError {
    message: String,
}

impl TidpValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TidpValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TidpValidationError {}

pub fn validate_tidp(tidp: &Tidp) -> Result<(), TidpValidationError> {
    if tidp.id.trim().is_empty() {
        return Err(TidpValidationError::new("tidp id must not be empty"));
    }

    if tidp.team_name.trim().chars().count() < 2 {
        return Err(TidpValidationError::new(format!(
            "tidp {} team name must be at least 2 characters",
            tidp.id
        )));
    }

    let discipline = tidp.discipline.trim().to_lowercase();
    if !DISCIPLINES.contains(&discipline.as_str()) {
        return Err(TidpValidationError::new(format!(
            "tidp {} has unknown discipline '{}' (expected one of {})",
            tidp.id,
            tidp.discipline,
            DISCIPLINES.join(", ")
        )));
    }

    let mut seen = HashSet::with_capacity(tidp.containers.len());
    for container in &tidp.containers {
        if container.id.trim().is_empty() {
            return Err(TidpValidationError::new(format!(
                "tidp {} has a container with an empty id",
                tidp.id
            )));
        }
        if !seen.insert(container.id.as_str()) {
            return Err(TidpValidationError::new(format!(
                "tidp {} has duplicate container id {}",
                tidp.id, container.id
            )));
        }
    }
    Ok(())
}

/// Every TIDP must be valid on its own and TIDP ids must be unique.
pub fn validate_snapshot(snapshot: &ProjectSnapshot) -> Result<(), TidpValidationError> {
    let mut seen = HashSet::with_capacity(snapshot.tidps.len());
    for tidp in &snapshot.tidps {
        validate_tidp(tidp)?;
        if !seen.insert(tidp.id.as_str()) {
            return Err(TidpValidationError::new(format!("duplicate tidp id {}", tidp.id)));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyValidation {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
}

/// Checks the TIDP-level dependency declarations of `tidp` against the rest of
/// the project. Issues make the result invalid, warnings do not.
pub fn validate_dependencies(tidp: &Tidp, project: &[Tidp]) -> DependencyValidation {
    let mut issues = Vec::new();
    let mut warnings = Vec::new();

    let project_cyclic = has_cycle(&DependencyGraph::build(project));
    let known: HashSet<&str> = project.iter().map(|t| t.id.as_str()).collect();

    for (idx, dependency) in tidp.dependencies.iter().enumerate() {
        let label = idx + 1;

        if project_cyclic {
            issues.push(format!("dependency {label} creates a circular dependency"));
        }

        if let Some(predecessor) = dependency.predecessor_id.as_deref() {
            if !known.contains(predecessor) {
                warnings.push(format!(
                    "dependency {label} references unknown tidp {predecessor}"
                ));
            }
        }

        if let (Some(required), Some(available)) =
            (dependency.required_date, dependency.available_date)
        {
            if available > required {
                issues.push(format!(
                    "dependency {label} is available {available} after it is required {required}"
                ));
            }
        }
    }

    DependencyValidation {
        is_valid: issues.is_empty(),
        issues,
        warnings,
    }
}
