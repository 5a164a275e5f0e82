use crate::duration::{DurationUnits, Hours};
use crate::tidp::Tidp;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// A container annotated with its owning team and parsed duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    pub tidp_id: String,
    pub tidp_name: String,
    pub discipline: String,
    pub duration_text: String,
    pub duration: Hours,
    pub duration_recognized: bool,
}

/// A declared predecessor that is not part of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedDependency {
    pub container_id: String,
    pub missing_id: String,
}

/// Container whose estimate did not parse and was scheduled as zero hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnparsedDuration {
    pub container_id: String,
    pub tidp_id: String,
    pub estimated_time: String,
}

/// Dependency graph over one project snapshot. Edges point from predecessor
/// to dependent and only connect containers present in the snapshot.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<GraphNode, ()>,
    id_to_index: HashMap<String, NodeIndex>,
    unresolved: Vec<UnresolvedDependency>,
}

impl DependencyGraph {
    pub fn build(tidps: &[Tidp]) -> Self {
        Self::build_with_units(tidps, &DurationUnits::default())
    }

    pub fn build_with_units(tidps: &[Tidp], units: &DurationUnits) -> Self {
        let mut graph: DiGraph<GraphNode, ()> = DiGraph::new();
        let mut id_to_index: HashMap<String, NodeIndex> = HashMap::new();
        let mut owners: Vec<(NodeIndex, &[String])> = Vec::new();

        // Add nodes first
        for tidp in tidps {
            for container in &tidp.containers {
                if id_to_index.contains_key(&container.id) {
                    warn!(
                        container_id = %container.id,
                        tidp_id = %tidp.id,
                        "duplicate container id in snapshot, keeping first occurrence"
                    );
                    continue;
                }
                let estimate = container.duration_estimate(units);
                if !estimate.recognized {
                    warn!(
                        container_id = %container.id,
                        estimated_time = %container.estimated_time,
                        "unrecognised duration estimate, treating as zero hours"
                    );
                }
                let node_ix = graph.add_node(GraphNode {
                    id: container.id.clone(),
                    name: container.name.clone(),
                    tidp_id: tidp.id.clone(),
                    tidp_name: tidp.team_name.clone(),
                    discipline: tidp.discipline.clone(),
                    duration_text: container.estimated_time.clone(),
                    duration: estimate.hours,
                    duration_recognized: estimate.recognized,
                });
                id_to_index.insert(container.id.clone(), node_ix);
                owners.push((node_ix, container.dependencies.as_slice()));
            }
        }

        // Add edges: pred -> container
        let mut unresolved = Vec::new();
        for (node_ix, dependencies) in owners {
            for pred_id in dependencies {
                match id_to_index.get(pred_id) {
                    Some(&pred_ix) => {
                        graph.update_edge(pred_ix, node_ix, ());
                    }
                    None => unresolved.push(UnresolvedDependency {
                        container_id: graph[node_ix].id.clone(),
                        missing_id: pred_id.clone(),
                    }),
                }
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            unresolved = unresolved.len(),
            "built dependency graph"
        );

        Self {
            graph,
            id_to_index,
            unresolved,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Node indices in snapshot order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn node(&self, index: NodeIndex) -> &GraphNode {
        &self.graph[index]
    }

    pub fn index_of(&self, container_id: &str) -> Option<NodeIndex> {
        self.id_to_index.get(container_id).copied()
    }

    pub fn node_by_id(&self, container_id: &str) -> Option<&GraphNode> {
        self.index_of(container_id).map(|ix| &self.graph[ix])
    }

    pub fn contains(&self, container_id: &str) -> bool {
        self.id_to_index.contains_key(container_id)
    }

    /// Dependents of `index`, in snapshot order.
    pub fn successors(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors(index, Direction::Outgoing)
    }

    /// Predecessors of `index`, in snapshot order.
    pub fn predecessors(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors(index, Direction::Incoming)
    }

    pub fn in_degree(&self, index: NodeIndex) -> usize {
        self.graph
            .neighbors_directed(index, Direction::Incoming)
            .count()
    }

    fn neighbors(&self, index: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> =
            self.graph.neighbors_directed(index, direction).collect();
        neighbors.sort_unstable();
        neighbors
    }

    pub fn unresolved(&self) -> &[UnresolvedDependency] {
        &self.unresolved
    }

    pub fn unparsed_durations(&self) -> Vec<UnparsedDuration> {
        self.graph
            .node_weights()
            .filter(|node| !node.duration_recognized)
            .map(|node| UnparsedDuration {
                container_id: node.id.clone(),
                tidp_id: node.tidp_id.clone(),
                estimated_time: node.duration_text.clone(),
            })
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn inner(&self) -> &DiGraph<GraphNode, ()> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tidp::Container;

    fn snapshot() -> Vec<Tidp> {
        vec![
            Tidp::new("arch", "Architecture", "architecture").with_containers(vec![
                Container::new("a", "Model", "1 day"),
                Container::new("b", "Plans", "2 days").with_dependencies(["a", "external-1"]),
            ]),
            Tidp::new("str", "Structures", "structural").with_containers(vec![
                Container::new("c", "Frame", "???").with_dependencies(["a", "a", "b"]),
            ]),
        ]
    }

    #[test]
    fn builds_nodes_edges_and_unresolved() {
        let graph = DependencyGraph::build(&snapshot());
        assert_eq!(graph.node_count(), 3);
        // duplicate a -> c collapses into one edge
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(
            graph.unresolved(),
            &[UnresolvedDependency {
                container_id: "b".into(),
                missing_id: "external-1".into(),
            }]
        );

        let c = graph.node_by_id("c").unwrap();
        assert_eq!(c.tidp_name, "Structures");
        assert_eq!(c.duration, 0);

        let a_ix = graph.index_of("a").unwrap();
        let succ_ids: Vec<&str> = graph
            .successors(a_ix)
            .into_iter()
            .map(|ix| graph.node(ix).id.as_str())
            .collect();
        assert_eq!(succ_ids, vec!["b", "c"]);
        assert_eq!(graph.in_degree(graph.index_of("c").unwrap()), 2);
    }

    #[test]
    fn lists_unparsed_durations() {
        let graph = DependencyGraph::build(&snapshot());
        let unparsed = graph.unparsed_durations();
        assert_eq!(unparsed.len(), 1);
        assert_eq!(unparsed[0].container_id, "c");
        assert_eq!(unparsed[0].estimated_time, "???");
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let tidps = vec![
            Tidp::new("t1", "One", "civil")
                .with_containers(vec![Container::new("x", "First", "1 hour")]),
            Tidp::new("t2", "Two", "civil")
                .with_containers(vec![Container::new("x", "Second", "5 hours")]),
        ];
        let graph = DependencyGraph::build(&tidps);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.node_by_id("x").unwrap().name, "First");
    }
}
