use super::dependency_graph::DependencyGraph;
use petgraph::graph::NodeIndex;
use std::collections::VecDeque;
use tracing::debug;

/// Kahn's algorithm. Ready nodes leave the queue in snapshot order.
///
/// Returns `None` when some nodes never reach in-degree zero, i.e. the graph
/// has a cycle. A partial order is never returned.
pub fn topological_order(graph: &DependencyGraph) -> Option<Vec<NodeIndex>> {
    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|ix| graph.in_degree(ix))
        .collect();

    let mut queue: VecDeque<NodeIndex> = graph
        .node_indices()
        .filter(|ix| in_degree[ix.index()] == 0)
        .collect();

    let mut order = Vec::with_capacity(graph.node_count());
    while let Some(node_ix) = queue.pop_front() {
        order.push(node_ix);
        for succ_ix in graph.successors(node_ix) {
            let remaining = &mut in_degree[succ_ix.index()];
            *remaining -= 1;
            if *remaining == 0 {
                queue.push_back(succ_ix);
            }
        }
    }

    if order.len() < graph.node_count() {
        debug!(
            scheduled = order.len(),
            total = graph.node_count(),
            "topological sort stalled on a cycle"
        );
        return None;
    }
    Some(order)
}

/// Container ids in processing order.
pub fn topological_ids(graph: &DependencyGraph) -> Option<Vec<String>> {
    topological_order(graph).map(|order| {
        order
            .into_iter()
            .map(|ix| graph.node(ix).id.clone())
            .collect()
    })
}
