pub mod cycle;
pub mod dependency_graph;
pub mod topological;

pub use cycle::{find_cycle, has_cycle};
pub use dependency_graph::{DependencyGraph, GraphNode, UnparsedDuration, UnresolvedDependency};
pub use topological::{topological_ids, topological_order};
