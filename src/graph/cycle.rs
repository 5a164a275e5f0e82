use super::dependency_graph::DependencyGraph;
use petgraph::graph::NodeIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Three-color depth-first search over every component of the graph.
pub fn has_cycle(graph: &DependencyGraph) -> bool {
    find_cycle_indices(graph).is_some()
}

/// One circular chain of container ids, listed in dependency order. The last
/// id depends back on the first.
pub fn find_cycle(graph: &DependencyGraph) -> Option<Vec<String>> {
    find_cycle_indices(graph).map(|cycle| {
        cycle
            .into_iter()
            .map(|ix| graph.node(ix).id.clone())
            .collect()
    })
}

fn find_cycle_indices(graph: &DependencyGraph) -> Option<Vec<NodeIndex>> {
    let mut color = vec![Color::White; graph.node_count()];

    for root in graph.node_indices() {
        if color[root.index()] != Color::White {
            continue;
        }

        // Explicit stack of (node, successors, next successor to visit).
        color[root.index()] = Color::Gray;
        let mut stack: Vec<(NodeIndex, Vec<NodeIndex>, usize)> =
            vec![(root, graph.successors(root), 0)];

        while let Some((node, successors, cursor)) = stack.last_mut() {
            let Some(&next) = successors.get(*cursor) else {
                color[node.index()] = Color::Black;
                stack.pop();
                continue;
            };
            *cursor += 1;

            match color[next.index()] {
                Color::White => {
                    color[next.index()] = Color::Gray;
                    stack.push((next, graph.successors(next), 0));
                }
                Color::Gray => {
                    let start = stack
                        .iter()
                        .position(|(ix, _, _)| *ix == next)
                        .unwrap_or(0);
                    return Some(stack[start..].iter().map(|(ix, _, _)| *ix).collect());
                }
                Color::Black => {}
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tidp::{Container, Tidp};
    use petgraph::algo::is_cyclic_directed;

    fn graph_of(edges: &[(&str, Vec<&str>)]) -> DependencyGraph {
        let containers = edges
            .iter()
            .map(|(id, deps)| {
                Container::new(*id, *id, "1 day").with_dependencies(deps.iter().copied())
            })
            .collect();
        DependencyGraph::build(&[Tidp::new("t", "Team", "general").with_containers(containers)])
    }

    #[test]
    fn detects_two_node_cycle() {
        let graph = graph_of(&[("a", vec!["b"]), ("b", vec!["a"])]);
        assert!(has_cycle(&graph));
        let cycle = find_cycle(&graph).unwrap();
        assert_eq!(cycle.len(), 2);
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let graph = graph_of(&[("a", vec!["a"])]);
        assert!(has_cycle(&graph));
        assert_eq!(find_cycle(&graph), Some(vec!["a".to_string()]));
    }

    #[test]
    fn finds_cycle_in_later_component() {
        let graph = graph_of(&[
            ("a", vec![]),
            ("b", vec!["a"]),
            ("x", vec!["z"]),
            ("y", vec!["x"]),
            ("z", vec!["y"]),
        ]);
        assert!(has_cycle(&graph));
        let mut cycle = find_cycle(&graph).unwrap();
        cycle.sort();
        assert_eq!(cycle, vec!["x", "y", "z"]);
    }

    #[test]
    fn diamond_is_acyclic() {
        let graph = graph_of(&[
            ("a", vec![]),
            ("b", vec!["a"]),
            ("c", vec!["a"]),
            ("d", vec!["b", "c"]),
        ]);
        assert!(!has_cycle(&graph));
        assert!(find_cycle(&graph).is_none());
    }

    #[test]
    fn external_references_are_ignored() {
        let graph = graph_of(&[("a", vec!["outside"]), ("outside-2", vec!["a"])]);
        assert!(!has_cycle(&graph));
    }

    #[test]
    fn agrees_with_petgraph() {
        let cases: Vec<Vec<(&str, Vec<&str>)>> = vec![
            vec![],
            vec![("a", vec![])],
            vec![("a", vec!["c"]), ("b", vec!["a"]), ("c", vec!["b"])],
            vec![("a", vec![]), ("b", vec!["a"]), ("c", vec!["b", "a"]), ("d", vec!["c"])],
            vec![("a", vec!["d"]), ("b", vec!["a"]), ("c", vec!["b"]), ("d", vec!["c"])],
            vec![("a", vec![]), ("b", vec!["a", "c"]), ("c", vec![]), ("d", vec!["b", "c"])],
        ];
        for edges in cases {
            let graph = graph_of(&edges);
            assert_eq!(
                has_cycle(&graph),
                is_cyclic_directed(graph.inner()),
                "mismatch for {edges:?}"
            );
        }
    }
}
