//! ISO 19650 suitability codes and the transitions allowed between them.

use crate::tidp::{Container, Tidp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SuitabilityCode {
    S0,
    S1,
    S2,
    S3,
    S4,
    S5,
    S6,
    S7,
}

impl SuitabilityCode {
    pub const ALL: [SuitabilityCode; 8] = [
        Self::S0,
        Self::S1,
        Self::S2,
        Self::S3,
        Self::S4,
        Self::S5,
        Self::S6,
        Self::S7,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S0 => "S0",
            Self::S1 => "S1",
            Self::S2 => "S2",
            Self::S3 => "S3",
            Self::S4 => "S4",
            Self::S5 => "S5",
            Self::S6 => "S6",
            Self::S7 => "S7",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::S0 => "Work in Progress",
            Self::S1 => "Fit for coordination",
            Self::S2 => "Fit for information",
            Self::S3 => "Fit for review & comment",
            Self::S4 => "Fit for stage approval",
            Self::S5 => "Fit for construction",
            Self::S6 => "Fit for PIM authorization",
            Self::S7 => "Fit for AIM authorization",
        }
    }

    /// Codes reachable in one step. S0 restarts are allowed from everywhere.
    pub fn allowed_transitions(&self) -> &'static [SuitabilityCode] {
        use SuitabilityCode::*;
        match self {
            S0 => &[S1, S2, S3],
            S1 => &[S0, S2, S3],
            S2 => &[S0, S3, S4],
            S3 => &[S0, S4, S5],
            S4 => &[S0, S5, S6],
            S5 => &[S0, S6, S7],
            S6 => &[S0, S7],
            S7 => &[S0],
        }
    }

    pub fn can_transition_to(&self, next: SuitabilityCode) -> bool {
        *self == next || self.allowed_transitions().contains(&next)
    }

    fn from_digit(digit: u32) -> Option<Self> {
        Self::ALL.get(usize::try_from(digit).ok()?).copied()
    }

    /// Reads the code from the start of a review-process string such as
    /// "S2 - Fit for information".
    pub fn extract(text: &str) -> Option<Self> {
        leading_digit(text).and_then(Self::from_digit)
    }
}

/// Digit following a leading `S`, whether or not it names a known code.
fn leading_digit(text: &str) -> Option<u32> {
    let mut chars = text.strip_prefix('S')?.chars();
    chars.next()?.to_digit(10)
}

impl fmt::Display for SuitabilityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SuitabilityCode {
    type Err = SuitabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::extract(s.trim()).ok_or_else(|| SuitabilityError::InvalidCode(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SuitabilityError {
    #[error("invalid suitability code: {0}")]
    InvalidCode(String),
    #[error(
        "invalid transition from {from} ({}) to {to} ({}), allowed: {}",
        .from.label(),
        .to.label(),
        join_codes(.from.allowed_transitions())
    )]
    TransitionNotAllowed {
        from: SuitabilityCode,
        to: SuitabilityCode,
    },
}

fn join_codes(codes: &[SuitabilityCode]) -> String {
    codes
        .iter()
        .map(SuitabilityCode::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A missing or unrecognised current code accepts any valid new code.
pub fn validate_suitability_transition(
    current: Option<&str>,
    new: &str,
) -> Result<(), SuitabilityError> {
    let next = SuitabilityCode::extract(new)
        .ok_or_else(|| SuitabilityError::InvalidCode(new.to_string()))?;

    let Some(from) = current.and_then(SuitabilityCode::extract) else {
        return Ok(());
    };
    if from.can_transition_to(next) {
        Ok(())
    } else {
        Err(SuitabilityError::TransitionNotAllowed { from, to: next })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionViolation {
    pub container_id: String,
    pub container_name: String,
    pub current_code: String,
    pub new_code: String,
    pub reason: String,
}

/// Compares each updated container's suitability with the stored one of the
/// same id. Containers that are new, or whose code is unchanged, pass.
pub fn validate_container_transitions(
    existing: &Tidp,
    updated: &[Container],
) -> Vec<TransitionViolation> {
    let current: HashMap<&str, &str> = existing
        .containers
        .iter()
        .filter_map(|c| Some((c.id.as_str(), c.suitability.as_deref()?)))
        .collect();

    let mut violations = Vec::new();
    for container in updated {
        let Some(current_code) = current.get(container.id.as_str()) else {
            continue;
        };
        let Some(new_code) = container.suitability.as_deref() else {
            continue;
        };
        if *current_code == new_code {
            continue;
        }
        if let Err(err) = validate_suitability_transition(Some(current_code), new_code) {
            violations.push(TransitionViolation {
                container_id: container.id.clone(),
                container_name: if container.name.is_empty() {
                    container.id.clone()
                } else {
                    container.name.clone()
                },
                current_code: current_code.to_string(),
                new_code: new_code.to_string(),
                reason: err.to_string(),
            });
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_prefix_from_review_text() {
        assert_eq!(
            SuitabilityCode::extract("S2 - Fit for information"),
            Some(SuitabilityCode::S2)
        );
        assert_eq!(SuitabilityCode::extract("s2"), None);
        assert_eq!(SuitabilityCode::extract("S9"), None);
        assert_eq!("S7".parse::<SuitabilityCode>().unwrap().label(), "Fit for AIM authorization");
    }

    #[test]
    fn forward_steps_and_restarts_are_allowed() {
        assert!(validate_suitability_transition(Some("S1"), "S3").is_ok());
        assert!(validate_suitability_transition(Some("S6"), "S0").is_ok());
        assert!(validate_suitability_transition(Some("S4"), "S4 - again").is_ok());
        assert!(validate_suitability_transition(None, "S5").is_ok());
        assert!(validate_suitability_transition(Some("Pending"), "S5").is_ok());
    }

    #[test]
    fn skipping_ahead_is_rejected() {
        let err = validate_suitability_transition(Some("S0"), "S4").unwrap_err();
        assert_eq!(
            err,
            SuitabilityError::TransitionNotAllowed {
                from: SuitabilityCode::S0,
                to: SuitabilityCode::S4
            }
        );
        assert!(err.to_string().contains("allowed: S1, S2, S3"));
    }

    #[test]
    fn invalid_new_code_is_rejected() {
        assert_eq!(
            validate_suitability_transition(Some("S1"), "A1"),
            Err(SuitabilityError::InvalidCode("A1".into()))
        );
    }

    #[test]
    fn container_transitions_report_violations() {
        let mut a = Container::new("a", "Model", "1 week");
        a.suitability = Some("S1".into());
        let mut b = Container::new("b", "", "1 week");
        b.suitability = Some("S3".into());
        let existing =
            Tidp::new("t", "Team", "general").with_containers(vec![a.clone(), b.clone()]);

        a.suitability = Some("S2".into());
        b.suitability = Some("S1".into());
        let mut fresh = Container::new("c", "New", "1 day");
        fresh.suitability = Some("S7".into());

        let violations = validate_container_transitions(&existing, &[a, b, fresh]);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].container_id, "b");
        assert_eq!(violations[0].container_name, "b");
        assert_eq!(violations[0].current_code, "S3");
    }
}
