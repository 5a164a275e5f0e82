use crate::duration::{DurationEstimate, DurationUnits, Hours};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single information deliverable produced by one task team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Free-text effort such as "2 weeks". Parsed on demand, never rewritten.
    #[serde(default, alias = "estimatedProductionTime", alias = "Est. Time")]
    pub estimated_time: String,
    /// Ids of predecessor containers. May name containers outside the project.
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_milestone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// ISO 19650 review/authorisation code, e.g. "S2 - Fit for information".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suitability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Container {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        estimated_time: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            estimated_time: estimated_time.into(),
            dependencies: Vec::new(),
            due_date: None,
            delivery_milestone: None,
            status: None,
            suitability: None,
            format: None,
            description: None,
        }
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    pub fn estimated_hours(&self) -> Hours {
        self.duration_estimate(&DurationUnits::default()).hours
    }

    pub fn duration_estimate(&self, units: &DurationUnits) -> DurationEstimate {
        DurationEstimate::parse_with_units(&self.estimated_time, units)
    }
}

/// A TIDP-level dependency declaration on another team's plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TidpDependency {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predecessor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Task Information Delivery Plan: one task team's containers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tidp {
    pub id: String,
    pub team_name: String,
    #[serde(default)]
    pub discipline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub containers: Vec<Container>,
    #[serde(default)]
    pub dependencies: Vec<TidpDependency>,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_status() -> String {
    "Draft".to_string()
}

impl Tidp {
    pub fn new(
        id: impl Into<String>,
        team_name: impl Into<String>,
        discipline: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            team_name: team_name.into(),
            discipline: discipline.into(),
            leader: None,
            company: None,
            project_id: None,
            version: default_version(),
            status: default_status(),
            containers: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    pub fn with_containers(mut self, containers: Vec<Container>) -> Self {
        self.containers = containers;
        self
    }
}

/// All TIDPs of one project, as handed over by the storage layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    pub project_id: String,
    #[serde(default)]
    pub tidps: Vec<Tidp>,
}

impl ProjectSnapshot {
    pub fn new(project_id: impl Into<String>, tidps: Vec<Tidp>) -> Self {
        Self {
            project_id: project_id.into(),
            tidps,
        }
    }

    /// Containers paired with their owning TIDP, in snapshot order.
    pub fn containers(&self) -> impl Iterator<Item = (&Tidp, &Container)> {
        self.tidps
            .iter()
            .flat_map(|tidp| tidp.containers.iter().map(move |c| (tidp, c)))
    }

    pub fn container_count(&self) -> usize {
        self.tidps.iter().map(|t| t.containers.len()).sum()
    }
}

/// Per-team export summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TidpSummary {
    pub id: String,
    pub team_name: String,
    pub discipline: String,
    pub leader: Option<String>,
    pub company: Option<String>,
    pub container_count: usize,
    pub total_estimated_hours: Hours,
    /// Distinct delivery milestones in first-seen order.
    pub milestones: Vec<String>,
    pub version: String,
    pub status: String,
}

impl TidpSummary {
    pub fn from_tidp(tidp: &Tidp) -> Self {
        Self::from_tidp_with_units(tidp, &DurationUnits::default())
    }

    pub fn from_tidp_with_units(tidp: &Tidp, units: &DurationUnits) -> Self {
        let total_estimated_hours = tidp
            .containers
            .iter()
            .map(|c| c.duration_estimate(units).hours)
            .fold(0, Hours::saturating_add);

        let mut milestones: Vec<String> = Vec::new();
        for milestone in tidp
            .containers
            .iter()
            .filter_map(|c| c.delivery_milestone.as_ref())
        {
            if !milestones.contains(milestone) {
                milestones.push(milestone.clone());
            }
        }

        Self {
            id: tidp.id.clone(),
            team_name: tidp.team_name.clone(),
            discipline: tidp.discipline.clone(),
            leader: tidp.leader.clone(),
            company: tidp.company.clone(),
            container_count: tidp.containers.len(),
            total_estimated_hours,
            milestones,
            version: tidp.version.clone(),
            status: tidp.status.clone(),
        }
    }
}
