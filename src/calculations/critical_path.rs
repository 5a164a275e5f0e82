use super::backward_pass::BackwardPass;
use super::forward_pass::{self, ForwardPass};
use crate::duration::Hours;
use crate::graph::{DependencyGraph, GraphNode};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// CPM times for one container, in hours from project start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledContainer {
    pub id: String,
    pub name: String,
    pub tidp_id: String,
    pub tidp_name: String,
    pub discipline: String,
    pub duration: Hours,
    pub es: Hours,
    pub ef: Hours,
    pub ls: Hours,
    pub lf: Hours,
    pub total_float: Hours,
}

impl ScheduledContainer {
    fn from_node(node: &GraphNode, early: (Hours, Hours), late: (Hours, Hours)) -> Self {
        let (es, ef) = early;
        let (ls, lf) = late;
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            tidp_id: node.tidp_id.clone(),
            tidp_name: node.tidp_name.clone(),
            discipline: node.discipline.clone(),
            duration: node.duration,
            es,
            ef,
            ls,
            lf,
            total_float: lf.saturating_sub(ef),
        }
    }

    /// Zero float and non-zero duration. Zero-hour containers (including
    /// unparsed estimates) never count as critical.
    pub fn is_critical(&self) -> bool {
        self.total_float == 0 && self.duration > 0
    }
}

/// Output of one CPM computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalPath {
    pub project_duration: Hours,
    /// Every scheduled container, in topological order.
    pub schedule: Vec<ScheduledContainer>,
    /// Critical containers sorted by early start, then id.
    pub entries: Vec<ScheduledContainer>,
}

impl CriticalPath {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.id.as_str()).collect()
    }

    pub fn contains(&self, container_id: &str) -> bool {
        self.entries.iter().any(|e| e.id == container_id)
    }

    pub fn find(&self, container_id: &str) -> Option<&ScheduledContainer> {
        self.schedule.iter().find(|e| e.id == container_id)
    }
}

/// Runs the forward and backward passes over `order`, which must be a
/// topological order of `graph`.
pub fn compute_critical_path(graph: &DependencyGraph, order: &[NodeIndex]) -> CriticalPath {
    if order.is_empty() {
        return CriticalPath::default();
    }

    let early = ForwardPass::new(graph, order).execute();
    let project_duration = forward_pass::project_duration(&early);
    let late = BackwardPass::new(graph, order).execute(project_duration);

    let schedule: Vec<ScheduledContainer> = order
        .iter()
        .filter_map(|ix| {
            let early = early.get(ix)?;
            let late = late.get(ix)?;
            Some(ScheduledContainer::from_node(graph.node(*ix), *early, *late))
        })
        .collect();

    let mut entries: Vec<ScheduledContainer> = schedule
        .iter()
        .filter(|entry| entry.is_critical())
        .cloned()
        .collect();
    entries.sort_by(|a, b| a.es.cmp(&b.es).then_with(|| a.id.cmp(&b.id)));

    debug!(
        project_duration,
        scheduled = schedule.len(),
        critical = entries.len(),
        "computed critical path"
    );

    CriticalPath {
        project_duration,
        schedule,
        entries,
    }
}
