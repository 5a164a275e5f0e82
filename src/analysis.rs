use crate::calculations::{CriticalPath, compute_critical_path};
use crate::config::AnalysisConfig;
use crate::duration::Hours;
use crate::graph::{
    DependencyGraph, UnparsedDuration, UnresolvedDependency, find_cycle, topological_order,
};
use crate::matrix::{DependencyMatrixReport, build_dependency_matrix};
use crate::persistence::{PersistenceError, ProjectStore};
use crate::resource::{ResourceAllocation, aggregate_resources_with_units};
use crate::tidp::ProjectSnapshot;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("circular dependency detected: {}", describe_cycle(.cycle))]
    CircularDependency { cycle: Vec<String> },
    #[error("project {0} not found")]
    ProjectNotFound(String),
    #[error(transparent)]
    Store(#[from] PersistenceError),
}

fn describe_cycle(cycle: &[String]) -> String {
    match cycle.first() {
        Some(first) => format!("{} -> {}", cycle.join(" -> "), first),
        None => String::new(),
    }
}

/// Everything computed for one project snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAnalysis {
    pub project_id: String,
    pub container_count: usize,
    pub dependency_count: usize,
    pub topological_order: Vec<String>,
    pub critical_path: CriticalPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_matrix: Option<DependencyMatrixReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_allocation: Option<ResourceAllocation>,
    pub unresolved_dependencies: Vec<UnresolvedDependency>,
    pub unparsed_durations: Vec<UnparsedDuration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub container_count: usize,
    pub dependency_count: usize,
    pub critical_count: usize,
    pub critical_path: Vec<String>,
    pub project_duration: Hours,
    pub unresolved_count: usize,
    pub unparsed_count: usize,
}

impl AnalysisSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("containers={}", self.container_count));
        parts.push(format!("dependencies={}", self.dependency_count));
        parts.push(format!("critical={}", self.critical_count));
        parts.push(format!("duration={}h", self.project_duration));
        if self.unresolved_count > 0 {
            parts.push(format!("unresolved={}", self.unresolved_count));
        }
        if self.unparsed_count > 0 {
            parts.push(format!("unparsed={}", self.unparsed_count));
        }
        if !self.critical_path.is_empty() {
            parts.push(format!("crit_path={}", self.critical_path.join("->")));
        }
        parts.join(", ")
    }
}

impl ProjectAnalysis {
    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary {
            container_count: self.container_count,
            dependency_count: self.dependency_count,
            critical_count: self.critical_path.entries.len(),
            critical_path: self
                .critical_path
                .entries
                .iter()
                .map(|e| e.id.clone())
                .collect(),
            project_duration: self.critical_path.project_duration,
            unresolved_count: self.unresolved_dependencies.len(),
            unparsed_count: self.unparsed_durations.len(),
        }
    }
}

/// Graph, cycle check, topological sort and CPM over one snapshot, plus the
/// optional matrix and resource reports. Fails only on circular dependencies.
pub fn analyze_snapshot(
    snapshot: &ProjectSnapshot,
    config: &AnalysisConfig,
) -> Result<ProjectAnalysis, AnalysisError> {
    let units = &config.duration_units;
    let graph = DependencyGraph::build_with_units(&snapshot.tidps, units);

    if let Some(cycle) = find_cycle(&graph) {
        warn!(project_id = %snapshot.project_id, ?cycle, "circular dependency detected");
        return Err(AnalysisError::CircularDependency { cycle });
    }
    let Some(order) = topological_order(&graph) else {
        return Err(AnalysisError::CircularDependency { cycle: Vec::new() });
    };

    let critical_path = compute_critical_path(&graph, &order);

    let dependency_matrix = config.include_dependency_matrix.then(|| {
        DependencyMatrixReport::new(
            build_dependency_matrix(&snapshot.tidps, &critical_path),
            &critical_path,
        )
    });
    let resource_allocation = config
        .include_resource_allocation
        .then(|| aggregate_resources_with_units(&snapshot.tidps, units));

    let analysis = ProjectAnalysis {
        project_id: snapshot.project_id.clone(),
        container_count: graph.node_count(),
        dependency_count: graph.edge_count(),
        topological_order: order.iter().map(|ix| graph.node(*ix).id.clone()).collect(),
        critical_path,
        dependency_matrix,
        resource_allocation,
        unresolved_dependencies: graph.unresolved().to_vec(),
        unparsed_durations: graph.unparsed_durations(),
    };

    info!(
        project_id = %analysis.project_id,
        summary = %analysis.summary().to_cli_summary(),
        "analysed project"
    );
    Ok(analysis)
}

/// Loads the project through `store`, then analyses it.
pub fn analyze_project<S: ProjectStore + ?Sized>(
    store: &S,
    project_id: &str,
    config: &AnalysisConfig,
) -> Result<ProjectAnalysis, AnalysisError> {
    let snapshot = store
        .load_project(project_id)?
        .ok_or_else(|| AnalysisError::ProjectNotFound(project_id.to_string()))?;
    analyze_snapshot(&snapshot, config)
}

/// Independent snapshots analysed in parallel. Results keep input order.
pub fn analyze_projects(
    snapshots: &[ProjectSnapshot],
    config: &AnalysisConfig,
) -> Vec<Result<ProjectAnalysis, AnalysisError>> {
    snapshots
        .par_iter()
        .map(|snapshot| analyze_snapshot(snapshot, config))
        .collect()
}
