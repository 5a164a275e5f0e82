use tidp_engine::{
    Container, CriticalPath, DependencyGraph, Tidp, compute_critical_path, has_cycle,
    topological_order,
};

fn team(id: &str, containers: Vec<Container>) -> Tidp {
    Tidp::new(id, format!("Team {id}"), "general").with_containers(containers)
}

fn cpm(tidps: &[Tidp]) -> Option<CriticalPath> {
    let graph = DependencyGraph::build(tidps);
    let order = topological_order(&graph)?;
    Some(compute_critical_path(&graph, &order))
}

fn diamond() -> Vec<Tidp> {
    vec![
        team(
            "t1",
            vec![
                Container::new("A", "Survey", "8 hours"),
                Container::new("B", "Model", "2 days").with_dependencies(["A"]),
            ],
        ),
        team(
            "t2",
            vec![
                Container::new("C", "Report", "1 day").with_dependencies(["A"]),
                Container::new("D", "Issue", "8 hours").with_dependencies(["B", "C"]),
            ],
        ),
    ]
}

#[test]
fn diamond_has_expected_duration_and_critical_chain() {
    let path = cpm(&diamond()).expect("acyclic");
    assert_eq!(path.project_duration, 32);
    assert_eq!(path.ids(), vec!["A", "B", "D"]);

    let c = path.find("C").unwrap();
    assert_eq!((c.es, c.ef, c.ls, c.lf, c.total_float), (8, 16, 16, 24, 8));
    assert!(!path.contains("C"));
}

#[test]
fn closing_the_diamond_creates_a_cycle() {
    let mut tidps = diamond();
    tidps[0].containers[0].dependencies = vec!["D".to_string()];

    let graph = DependencyGraph::build(&tidps);
    assert!(has_cycle(&graph));
    assert!(topological_order(&graph).is_none());
    assert!(cpm(&tidps).is_none());
}

#[test]
fn critical_entries_have_zero_float_and_reach_project_end() {
    let tidps = vec![
        team(
            "t1",
            vec![
                Container::new("a", "A", "3 days"),
                Container::new("b", "B", "1 week").with_dependencies(["a"]),
                Container::new("c", "C", "2 hours"),
            ],
        ),
        team(
            "t2",
            vec![
                Container::new("d", "D", "1 day").with_dependencies(["c"]),
                Container::new("e", "E", "4 hours").with_dependencies(["b", "d"]),
            ],
        ),
    ];
    let path = cpm(&tidps).unwrap();

    for entry in &path.entries {
        assert_eq!(entry.lf - entry.ef, 0, "{} should have no float", entry.id);
        assert!(entry.duration > 0);
    }
    let max_ef = path.schedule.iter().map(|e| e.ef).max().unwrap();
    let max_critical_ef = path.entries.iter().map(|e| e.ef).max().unwrap();
    assert_eq!(max_ef, max_critical_ef);
    assert_eq!(max_ef, path.project_duration);
}

#[test]
fn entries_are_sorted_by_start_then_id() {
    let tidps = vec![team(
        "t1",
        vec![
            Container::new("z", "Z", "1 day"),
            Container::new("m", "M", "1 day"),
            Container::new("a", "A", "1 day").with_dependencies(["z", "m"]),
        ],
    )];
    let path = cpm(&tidps).unwrap();
    assert_eq!(path.ids(), vec!["m", "z", "a"]);
}

#[test]
fn dangling_references_do_not_shift_starts() {
    let tidps = vec![team(
        "t1",
        vec![
            Container::new("a", "A", "1 day").with_dependencies(["external-42"]),
            Container::new("b", "B", "1 day").with_dependencies(["a", "ghost"]),
        ],
    )];
    let graph = DependencyGraph::build(&tidps);
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.unresolved().len(), 2);
    assert!(!has_cycle(&graph));

    let path = cpm(&tidps).unwrap();
    assert_eq!(path.find("a").unwrap().es, 0);
    assert_eq!(path.find("b").unwrap().es, 8);
}

#[test]
fn all_zero_durations_give_no_critical_path() {
    let tidps = vec![team(
        "t1",
        vec![
            Container::new("a", "A", "tbc"),
            Container::new("b", "B", "").with_dependencies(["a"]),
        ],
    )];
    let path = cpm(&tidps).unwrap();
    assert_eq!(path.project_duration, 0);
    assert!(path.is_empty());
    assert_eq!(path.schedule.len(), 2);
}

#[test]
fn empty_snapshot_is_zeroed() {
    let path = cpm(&[]).unwrap();
    assert_eq!(path, CriticalPath::default());
}

#[test]
fn serializes_in_camel_case() {
    let path = cpm(&diamond()).unwrap();
    let json = serde_json::to_value(&path).unwrap();
    assert_eq!(json["projectDuration"], 32);
    assert_eq!(json["entries"][0]["tidpName"], "Team t1");
    assert_eq!(json["entries"][0]["totalFloat"], 0);
}
