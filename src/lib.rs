pub mod analysis;
pub mod calculations;
pub mod config;
pub mod duration;
pub mod graph;
pub mod matrix;
pub mod persistence;
pub mod report;
pub mod resource;
pub mod suitability;
pub mod tidp;
pub mod tidp_validation;

pub use analysis::{
    AnalysisError, AnalysisSummary, ProjectAnalysis, analyze_project, analyze_projects,
    analyze_snapshot,
};
pub use calculations::{CriticalPath, ScheduledContainer, compute_critical_path};
pub use config::{AnalysisConfig, ConfigError};
pub use duration::{DurationEstimate, DurationUnits, Hours, parse_duration_hours};
pub use graph::{DependencyGraph, find_cycle, has_cycle, topological_order};
pub use matrix::{DependencyMatrix, DependencyMatrixReport, build_dependency_matrix};
pub use persistence::{InMemoryProjectStore, PersistenceError, PersistenceResult, ProjectStore};
pub use resource::{ResourceAllocation, aggregate_resources};
pub use tidp::{Container, ProjectSnapshot, Tidp, TidpDependency, TidpSummary};
