use crate::calculations::{CriticalPath, ScheduledContainer, compute_critical_path};
use crate::duration::DurationUnits;
use crate::graph::{DependencyGraph, topological_order};
use crate::tidp::Tidp;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyType {
    InformationDependency,
}

/// The predecessor side of a matrix entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencySource {
    pub tidp_id: String,
    pub tidp_name: String,
    pub container_id: String,
}

/// The dependent side of a matrix entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyTarget {
    pub tidp_id: String,
    pub tidp_name: String,
    pub container_id: String,
    pub container_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyMatrixEntry {
    pub from: DependencySource,
    pub to: DependencyTarget,
    #[serde(rename = "type")]
    pub dependency_type: DependencyType,
    /// Team-level flag: both owning TIDPs have at least one critical
    /// container. This does not prove the edge itself is critical.
    pub is_on_critical_path: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyMatrixSummary {
    pub total_dependencies: usize,
    pub critical_dependencies: usize,
    pub teams_involved: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyMatrix {
    pub entries: Vec<DependencyMatrixEntry>,
    pub summary: DependencyMatrixSummary,
}

/// Matrix, critical path and summary in one report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyMatrixReport {
    pub matrix: Vec<DependencyMatrixEntry>,
    pub critical_path: Vec<ScheduledContainer>,
    pub summary: DependencyMatrixSummary,
}

impl DependencyMatrixReport {
    pub fn new(matrix: DependencyMatrix, critical_path: &CriticalPath) -> Self {
        Self {
            matrix: matrix.entries,
            critical_path: critical_path.entries.clone(),
            summary: matrix.summary,
        }
    }

    /// Builds the whole report from raw TIDPs. A cyclic snapshot still gets
    /// its matrix, with an empty critical path and no critical entries.
    pub fn generate(tidps: &[Tidp], units: &DurationUnits) -> Self {
        let graph = DependencyGraph::build_with_units(tidps, units);
        let critical_path = match topological_order(&graph) {
            Some(order) => compute_critical_path(&graph, &order),
            None => {
                warn!("circular dependency in snapshot, matrix has no critical path");
                CriticalPath::default()
            }
        };
        Self::new(build_dependency_matrix(tidps, &critical_path), &critical_path)
    }
}

/// One entry per declared dependency whose predecessor belongs to a TIDP in
/// `tidps`, in declaration order.
pub fn build_dependency_matrix(tidps: &[Tidp], critical_path: &CriticalPath) -> DependencyMatrix {
    let mut owner_of: HashMap<&str, &Tidp> = HashMap::new();
    for tidp in tidps {
        for container in &tidp.containers {
            owner_of.entry(container.id.as_str()).or_insert(tidp);
        }
    }

    let critical_teams: HashSet<&str> = critical_path
        .entries
        .iter()
        .map(|entry| entry.tidp_id.as_str())
        .collect();

    let mut entries = Vec::new();
    for tidp in tidps {
        for container in &tidp.containers {
            for dep_id in &container.dependencies {
                let Some(dependency_tidp) = owner_of.get(dep_id.as_str()) else {
                    continue;
                };
                let is_on_critical_path = critical_teams.contains(dependency_tidp.id.as_str())
                    && critical_teams.contains(tidp.id.as_str());
                entries.push(DependencyMatrixEntry {
                    from: DependencySource {
                        tidp_id: dependency_tidp.id.clone(),
                        tidp_name: dependency_tidp.team_name.clone(),
                        container_id: dep_id.clone(),
                    },
                    to: DependencyTarget {
                        tidp_id: tidp.id.clone(),
                        tidp_name: tidp.team_name.clone(),
                        container_id: container.id.clone(),
                        container_name: container.name.clone(),
                    },
                    dependency_type: DependencyType::InformationDependency,
                    is_on_critical_path,
                });
            }
        }
    }

    let teams: HashSet<&str> = entries
        .iter()
        .flat_map(|e| [e.from.tidp_name.as_str(), e.to.tidp_name.as_str()])
        .collect();
    let summary = DependencyMatrixSummary {
        total_dependencies: entries.len(),
        critical_dependencies: entries.iter().filter(|e| e.is_on_critical_path).count(),
        teams_involved: teams.len(),
    };

    DependencyMatrix { entries, summary }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tidp::Container;

    fn snapshot() -> Vec<Tidp> {
        vec![
            Tidp::new("arch", "Architecture", "architecture").with_containers(vec![
                Container::new("a1", "Concept model", "1 week"),
                Container::new("a2", "GA drawings", "1 day").with_dependencies(["a1"]),
            ]),
            Tidp::new("str", "Structures", "structural").with_containers(vec![
                Container::new("s1", "Frame model", "2 weeks").with_dependencies(["a1", "ext-9"]),
            ]),
            Tidp::new("mep", "MEP", "mep").with_containers(vec![
                Container::new("m1", "Services", "1 day").with_dependencies(["a2"]),
            ]),
        ]
    }

    #[test]
    fn builds_entries_for_resolved_dependencies_only() {
        let report = DependencyMatrixReport::generate(&snapshot(), &DurationUnits::default());
        assert_eq!(report.summary.total_dependencies, 3);
        assert_eq!(report.matrix[1].from.container_id, "a1");
        assert_eq!(report.matrix[1].to.container_name, "Frame model");
        assert_eq!(report.summary.teams_involved, 3);
    }

    #[test]
    fn critical_flag_uses_team_membership() {
        // critical path: a1 (0-40) -> s1 (40-120)
        let report = DependencyMatrixReport::generate(&snapshot(), &DurationUnits::default());
        let ids: Vec<&str> = report.critical_path.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "s1"]);

        let flags: Vec<(&str, bool)> = report
            .matrix
            .iter()
            .map(|e| (e.to.container_id.as_str(), e.is_on_critical_path))
            .collect();
        // a1 -> a2 is flagged because Architecture owns a critical container,
        // even though a2 itself has float.
        assert_eq!(flags, vec![("a2", true), ("s1", true), ("m1", false)]);
        assert_eq!(report.summary.critical_dependencies, 2);
    }

    #[test]
    fn cyclic_snapshot_still_builds_matrix() {
        let tidps = vec![Tidp::new("t", "Team", "civil").with_containers(vec![
            Container::new("x", "X", "1 day").with_dependencies(["y"]),
            Container::new("y", "Y", "1 day").with_dependencies(["x"]),
        ])];
        let report = DependencyMatrixReport::generate(&tidps, &DurationUnits::default());
        assert_eq!(report.summary.total_dependencies, 2);
        assert_eq!(report.summary.critical_dependencies, 0);
        assert_eq!(report.summary.teams_involved, 1);
        assert!(report.critical_path.is_empty());
    }

    #[test]
    fn serializes_with_type_tag() {
        let report = DependencyMatrixReport::generate(&snapshot(), &DurationUnits::default());
        let json = serde_json::to_value(&report.matrix[0]).unwrap();
        assert_eq!(json["type"], "information_dependency");
        assert_eq!(json["from"]["tidpName"], "Architecture");
        assert_eq!(json["isOnCriticalPath"], true);
    }
}
