#![allow(unused_crate_dependencies)]

use std::collections::HashSet;

use harmony_tree::harmony::{
	ExplorerConfig, ExplorerError, JsonFileSink, LayoutConfig, NodeState, Point, Rule, Session, Snapshot,
	compute_positions,
};

#[test]
fn explore_curate_and_export() {
	let mut session = Session::default();
	let root = session.set_root("#3366CC").unwrap();

	let analogous = session.generate_branch(Rule::Analogous).unwrap();
	let hexes: Vec<_> = analogous
		.iter()
		.map(|id| session.tree().node(id).unwrap().hex.clone())
		.collect();
	assert_eq!(hexes, ["#33B2CC", "#4C33CC"]);

	session.select_node(Some(&analogous[0])).unwrap();
	session.set_selected_state(NodeState::Adopted).unwrap();
	session.set_node_state(&analogous[1], NodeState::Rejected).unwrap();

	let tints = session.generate_branch(Rule::Tint).unwrap();
	assert_eq!(tints.len(), 3);
	for id in &tints {
		let node = session.tree().node(id).unwrap();
		assert_eq!(node.parent_id.as_ref(), Some(&analogous[0]));
		assert_eq!(node.depth, 2);
	}

	let stats = session.tree().stats();
	assert_eq!((stats.total, stats.adopted, stats.pending, stats.rejected), (6, 2, 3, 1));

	let css = session.css_variables();
	assert!(css.starts_with(":root {\n  --color-root1: #3366CC;"));
	assert!(css.contains("--color-analogous1: #33B2CC;"));
	assert_eq!(session.tree().root_id(), Some(&root));
}

#[test]
fn layout_centers_children_under_parent() {
	let mut session = Session::default();
	let root = session.set_root("#FF0000").unwrap();
	let kids = session.generate_branch(Rule::Tetrad).unwrap();
	let positions = session.positions();

	assert_eq!(positions[&root], Point::new(0.0, 0.0));
	let xs: Vec<_> = kids.iter().map(|id| positions[id].x).collect();
	assert_eq!(xs, [-200.0, 0.0, 200.0]);
	assert!(kids.iter().all(|id| positions[id].y == 160.0));

	let again = compute_positions(session.tree().root_id(), session.tree().nodes(), &LayoutConfig::default());
	assert_eq!(again, positions);
}

#[test]
fn snapshot_file_round_trip() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("session.json");

	let mut session = Session::default().with_sink(JsonFileSink::new(&path));
	session.set_root("#7B1FA2").unwrap();
	let split = session.generate_branch(Rule::Split).unwrap();
	session.select_node(Some(&split[1])).unwrap();
	session.generate_branch(Rule::Shade).unwrap();

	let text = std::fs::read_to_string(&path).unwrap();
	let mut restored = Session::default();
	restored.load_json(&text).unwrap();

	let ids = |s: &Session| s.tree().nodes().iter().map(|n| n.id.clone()).collect::<Vec<_>>();
	assert_eq!(ids(&restored), ids(&session));
	assert_eq!(restored.tree().selected_id(), Some(&split[1]));
	assert_eq!(restored.tree().edges(), session.tree().edges());
	assert_eq!(restored.positions(), session.positions());
	assert_eq!(restored.tree().history().to_vec(), session.tree().history().to_vec());
}

#[test]
fn snapshot_rejects_two_roots() {
	let json = r##"{
		"version": 3.1,
		"nodes": {
			"a": {"id": "a", "parentId": null, "hex": "#112233", "derivation": {"rule": "root", "params": {}}},
			"b": {"id": "b", "parentId": null, "hex": "#445566", "derivation": {"rule": "root", "params": {}}}
		}
	}"##;
	let err = Snapshot::from_json(json)
		.unwrap()
		.restore(&ExplorerConfig::default())
		.unwrap_err();
	assert!(matches!(err, ExplorerError::MalformedSnapshot(_)));
}

#[test]
fn node_ids_are_unique_across_reseeds() {
	let mut session = Session::default();
	let mut seen = HashSet::new();
	for hex in ["#000000", "#FFFFFF", "#808080"] {
		seen.insert(session.set_root(hex).unwrap());
		for id in session.generate_branch(Rule::Triad).unwrap() {
			assert!(seen.insert(id));
		}
	}
	assert_eq!(seen.len(), 9);
	assert_eq!(session.tree().history().len(), 9);
}

#[test]
fn rule_names_parse() {
	for rule in Rule::ALL {
		assert_eq!(rule.name().parse::<Rule>().unwrap(), rule);
	}
	let mut session = Session::default();
	assert_eq!(session.generate_branch(Rule::Tone), Err(ExplorerError::NoSelection));
	assert!(matches!(
		session.generate_branch_named("pentad"),
		Err(ExplorerError::UnknownRule(_))
	));
}
