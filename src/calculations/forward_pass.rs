use crate::duration::Hours;
use crate::graph::DependencyGraph;
use petgraph::graph::NodeIndex;
use std::collections::HashMap;

pub struct ForwardPass<'a> {
    graph: &'a DependencyGraph,
    order: &'a [NodeIndex],
}

impl<'a> ForwardPass<'a> {
    pub fn new(graph: &'a DependencyGraph, order: &'a [NodeIndex]) -> Self {
        Self { graph, order }
    }

    /// Earliest (start, finish) per node, in hours from project start.
    pub fn execute(&self) -> HashMap<NodeIndex, (Hours, Hours)> {
        let mut results: HashMap<NodeIndex, (Hours, Hours)> =
            HashMap::with_capacity(self.order.len());

        for &node_ix in self.order {
            // Early start is max of all predecessor finishes
            let early_start = self
                .graph
                .predecessors(node_ix)
                .into_iter()
                .filter_map(|pred_ix| results.get(&pred_ix).map(|(_, ef)| *ef))
                .max()
                .unwrap_or(0);

            let duration = self.graph.node(node_ix).duration;
            results.insert(node_ix, (early_start, early_start.saturating_add(duration)));
        }

        results
    }
}

/// Largest early finish, or 0 for an empty schedule.
pub fn project_duration(early: &HashMap<NodeIndex, (Hours, Hours)>) -> Hours {
    early.values().map(|(_, ef)| *ef).max().unwrap_or(0)
}
