use crate::duration::Hours;
use crate::graph::DependencyGraph;
use petgraph::graph::NodeIndex;
use std::collections::HashMap;

pub struct BackwardPass<'a> {
    graph: &'a DependencyGraph,
    order: &'a [NodeIndex],
}

impl<'a> BackwardPass<'a> {
    pub fn new(graph: &'a DependencyGraph, order: &'a [NodeIndex]) -> Self {
        Self { graph, order }
    }

    /// Latest (start, finish) per node. Nodes without successors finish at
    /// `project_duration`.
    pub fn execute(&self, project_duration: Hours) -> HashMap<NodeIndex, (Hours, Hours)> {
        let mut results: HashMap<NodeIndex, (Hours, Hours)> =
            HashMap::with_capacity(self.order.len());

        // Reverse topological order
        for &node_ix in self.order.iter().rev() {
            // Determine allowed late finish from successors' late starts
            let late_finish = self
                .graph
                .successors(node_ix)
                .into_iter()
                .filter_map(|succ_ix| results.get(&succ_ix).map(|(ls, _)| *ls))
                .min()
                .unwrap_or(project_duration)
                .min(project_duration);

            let duration = self.graph.node(node_ix).duration;
            let late_start = late_finish.saturating_sub(duration);
            results.insert(node_ix, (late_start, late_finish));
        }

        results
    }
}
