//! Whole-session JSON snapshots.
//!
//! A snapshot is the canonical serialization of the tree model:
//!
//! ```json
//! { "version": 3.1, "rootId": "n…", "nodes": { "n…": { … } }, "edges": [ … ],
//!   "maxDepth": 3, "selectedNodeId": "n…", "history": [ … ],
//!   "createdAt": 1700000000000, "viewport": { "x": 0, "y": 0, "scale": 1 } }
//! ```
//!
//! Loading is forgiving about age and strict about structure. Old or
//! unversioned snapshots are merged with current defaults. Derived data
//! (`rgb`, `hsl`, `depth`, `edges`) is rebuilt from the authoritative fields.
//! Anything that cannot form a single consistent tree is rejected.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::config::ExplorerConfig;
use super::error::{ExplorerError, Result};
use super::history::{History, HistoryEntry};
use super::tree::ColorTree;
use super::types::{ColorNode, Edge, NodeId, now_millis};
use super::viewport::Viewport;

/// Schema version written by this crate.
pub const SNAPSHOT_VERSION: f64 = 3.1;

/// Snapshots older than this are loaded best-effort with a warning.
pub const MIN_COMPATIBLE_VERSION: f64 = 2.0;

/// Serialized session state. Every field is optional on input.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
	/// Schema version; missing means legacy.
	#[serde(default)]
	pub version: f64,
	/// Id of the parentless node.
	#[serde(default)]
	pub root_id: Option<NodeId>,
	/// Nodes in insertion order.
	#[serde(default, with = "node_map")]
	pub nodes: Vec<ColorNode>,
	/// Stored edges, only checked against the parent links.
	#[serde(default)]
	pub edges: Option<Vec<Edge>>,
	/// Branching cap in effect when saved.
	#[serde(default)]
	pub max_depth: Option<u32>,
	/// Selection, dropped if it names no node.
	#[serde(default)]
	pub selected_node_id: Option<NodeId>,
	/// History, newest first.
	#[serde(default)]
	pub history: Option<Vec<HistoryEntry>>,
	/// Tree creation time, Unix milliseconds.
	#[serde(default)]
	pub created_at: Option<i64>,
	/// Pan and zoom at save time.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub viewport: Option<Viewport>,
}

impl Snapshot {
	/// Capture the full state of `tree`.
	pub fn capture(tree: &ColorTree) -> Self {
		Self {
			version: SNAPSHOT_VERSION,
			root_id: tree.root_id().cloned(),
			nodes: tree.nodes().to_vec(),
			edges: Some(tree.edges().to_vec()),
			max_depth: Some(tree.max_depth()),
			selected_node_id: tree.selected_id().cloned(),
			history: Some(tree.history().to_vec()),
			created_at: Some(tree.created_at()),
			viewport: Some(tree.viewport.clone()),
		}
	}

	/// Parse snapshot JSON without validating the tree.
	pub fn from_json(text: &str) -> Result<Self> {
		Ok(serde_json::from_str(text)?)
	}

	/// Pretty-printed JSON.
	pub fn to_json(&self) -> Result<String> {
		Ok(serde_json::to_string_pretty(self)?)
	}

	/// Validate and rebuild a tree from this snapshot.
	pub fn restore(self, config: &ExplorerConfig) -> Result<ColorTree> {
		if self.version < MIN_COMPATIBLE_VERSION {
			warn!(
				"harmony-tree: snapshot version {} is older than {}, merging with defaults",
				self.version, MIN_COMPATIBLE_VERSION
			);
		}

		let mut nodes = self.nodes;
		let mut seen = HashSet::with_capacity(nodes.len());
		for node in &mut nodes {
			if !seen.insert(node.id.clone()) {
				return Err(malformed(format!("duplicate node id {}", node.id)));
			}
			if !node.refresh_color() {
				return Err(malformed(format!("node {} has invalid color {:?}", node.id, node.hex)));
			}
		}

		let root_id = resolve_root(self.root_id, &nodes)?;
		assign_depths(&mut nodes)?;

		if let Some(stored) = &self.edges {
			let derived: HashSet<(&NodeId, &NodeId)> = nodes
				.iter()
				.filter_map(|n| n.parent_id.as_ref().map(|p| (p, &n.id)))
				.collect();
			let stored: HashSet<(&NodeId, &NodeId)> = stored.iter().map(|e| (&e.from, &e.to)).collect();
			if stored != derived {
				warn!("harmony-tree: snapshot edges disagree with parent links, rebuilding");
			}
		}

		let selected = self.selected_node_id.filter(|id| {
			let known = seen.contains(id);
			if !known {
				warn!("harmony-tree: dropping selection of missing node {id}");
			}
			known
		});

		let history = History::from_entries(self.history.unwrap_or_default(), config.history_capacity);
		info!("harmony-tree: restored {} nodes from snapshot", nodes.len());

		Ok(ColorTree::from_parts(
			root_id,
			nodes,
			self.max_depth.unwrap_or(config.max_depth),
			selected,
			history,
			self.viewport.unwrap_or_default(),
			self.created_at.unwrap_or_else(now_millis),
		))
	}
}

fn malformed(message: String) -> ExplorerError {
	ExplorerError::MalformedSnapshot(message)
}

/// Work out the root id, checking it against the parentless nodes.
fn resolve_root(stored: Option<NodeId>, nodes: &[ColorNode]) -> Result<Option<NodeId>> {
	let known: HashSet<&NodeId> = nodes.iter().map(|n| &n.id).collect();
	if let Some(missing) = nodes
		.iter()
		.filter_map(|n| n.parent_id.as_ref())
		.find(|p| !known.contains(p))
	{
		return Err(malformed(format!("parent {missing} does not exist")));
	}

	let roots: Vec<&NodeId> = nodes.iter().filter(|n| n.is_root()).map(|n| &n.id).collect();
	match (stored, roots.as_slice()) {
		(None, []) if nodes.is_empty() => Ok(None),
		(_, []) => Err(malformed("no parentless root node".into())),
		(Some(id), [root]) if &&id == root => Ok(Some(id)),
		(Some(id), [_]) => Err(malformed(format!("rootId {id} is not the parentless node"))),
		(None, [root]) => {
			warn!("harmony-tree: snapshot has no rootId, using {root}");
			Ok(Some((*root).clone()))
		}
		(_, _) => Err(malformed(format!("{} parentless nodes, expected one", roots.len()))),
	}
}

/// Recompute every depth from the parent chain, rejecting cycles.
fn assign_depths(nodes: &mut [ColorNode]) -> Result<()> {
	let position: HashMap<&NodeId, usize> = nodes.iter().enumerate().map(|(i, n)| (&n.id, i)).collect();
	let parents: Vec<Option<usize>> = nodes
		.iter()
		.map(|n| n.parent_id.as_ref().and_then(|p| position.get(p).copied()))
		.collect();

	let mut depths: Vec<Option<u32>> = vec![None; nodes.len()];
	for start in 0..nodes.len() {
		let mut chain = Vec::new();
		let mut cur = start;
		let base = loop {
			if let Some(d) = depths[cur] {
				break d;
			}
			match parents[cur] {
				None => {
					depths[cur] = Some(0);
					break 0;
				}
				Some(parent) => {
					if chain.len() > nodes.len() {
						return Err(malformed(format!("cycle through node {}", nodes[start].id)));
					}
					chain.push(cur);
					cur = parent;
				}
			}
		};
		for (steps, &i) in chain.iter().rev().enumerate() {
			depths[i] = Some(base + steps as u32 + 1);
		}
	}

	let mut corrected = 0;
	for (node, depth) in nodes.iter_mut().zip(depths) {
		let depth = depth.unwrap_or(0);
		if node.depth != depth {
			corrected += 1;
			node.depth = depth;
		}
	}
	if corrected > 0 {
		warn!("harmony-tree: corrected depth of {corrected} snapshot nodes");
	}
	Ok(())
}

/// Receives snapshots after each successful mutation.
///
/// Persistence is best-effort: a failing sink is reported but never undoes
/// the mutation that triggered it.
pub trait SnapshotSink {
	/// Store `snapshot`, replacing whatever was stored before.
	fn persist(&mut self, snapshot: &Snapshot) -> Result<()>;
}

/// Writes each snapshot as pretty JSON to a fixed path.
#[derive(Clone, Debug)]
pub struct JsonFileSink {
	path: PathBuf,
}

impl JsonFileSink {
	/// Sink writing to `path`.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Target file.
	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl SnapshotSink for JsonFileSink {
	fn persist(&mut self, snapshot: &Snapshot) -> Result<()> {
		let json = snapshot.to_json()?;
		fs::write(&self.path, json)
			.map_err(|e| ExplorerError::Persist(format!("{}: {e}", self.path.display())))
	}
}

/// Serializes nodes as an id-keyed object while keeping insertion order.
mod node_map {
	use std::fmt;

	use serde::de::{self, MapAccess, Visitor};
	use serde::{Deserializer, Serializer};

	use super::super::types::{ColorNode, NodeId};

	pub fn serialize<S: Serializer>(nodes: &[ColorNode], serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_map(nodes.iter().map(|node| (&node.id, node)))
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ColorNode>, D::Error> {
		struct NodeMapVisitor;

		impl<'de> Visitor<'de> for NodeMapVisitor {
			type Value = Vec<ColorNode>;

			fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str("an object mapping node ids to nodes")
			}

			fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
				let mut nodes = Vec::with_capacity(map.size_hint().unwrap_or(0));
				while let Some((key, node)) = map.next_entry::<NodeId, ColorNode>()? {
					if key != node.id {
						return Err(de::Error::custom(format!(
							"node stored under {key} has id {}",
							node.id
						)));
					}
					nodes.push(node);
				}
				Ok(nodes)
			}
		}

		deserializer.deserialize_map(NodeMapVisitor)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::harmony::rules::{Rule, RuleParams};
	use crate::harmony::types::NodeState;

	fn sample_tree() -> ColorTree {
		let mut tree = ColorTree::default();
		tree.set_root("#3366CC").unwrap();
		let kids = tree.generate_branch(Rule::Triad, &RuleParams::default()).unwrap();
		tree.set_node_state(&kids[1], NodeState::Adopted).unwrap();
		tree.select_node(Some(&kids[0])).unwrap();
		tree.branch_from(&kids[0], Rule::Tint, &RuleParams::default()).unwrap();
		tree.viewport.scale = 2.0;
		tree
	}

	#[test]
	fn capture_uses_camel_case_and_id_keyed_nodes() {
		let tree = sample_tree();
		let value = serde_json::to_value(Snapshot::capture(&tree)).unwrap();
		assert_eq!(value["version"], json!(3.1));
		assert_eq!(value["maxDepth"], json!(3));
		assert_eq!(value["rootId"], json!(tree.root_id().unwrap().as_str()));
		assert_eq!(value["selectedNodeId"], json!(tree.selected_id().unwrap().as_str()));
		let nodes = value["nodes"].as_object().unwrap();
		assert_eq!(nodes.len(), 6);
		let root = &nodes[tree.root_id().unwrap().as_str()];
		assert_eq!(root["parentId"], json!(null));
		assert_eq!(root["derivation"], json!({"rule": "root", "params": {}}));
		assert_eq!(root["state"], json!("adopted"));
		assert_eq!(value["edges"].as_array().unwrap().len(), 5);
		assert_eq!(value["viewport"]["scale"], json!(2.0));
	}

	#[test]
	fn restore_preserves_order_and_selection() {
		let tree = sample_tree();
		let json = Snapshot::capture(&tree).to_json().unwrap();
		let restored = Snapshot::from_json(&json)
			.unwrap()
			.restore(&ExplorerConfig::default())
			.unwrap();

		assert_eq!(restored.nodes(), tree.nodes());
		assert_eq!(restored.edges(), tree.edges());
		assert_eq!(restored.selected_id(), tree.selected_id());
		assert_eq!(restored.history(), tree.history());
		assert_eq!(restored.viewport, tree.viewport);
		assert_eq!(restored.created_at(), tree.created_at());
		let layout = ExplorerConfig::default().layout;
		assert_eq!(restored.positions(&layout), tree.positions(&layout));
	}

	#[test]
	fn legacy_snapshot_is_merged_with_defaults() {
		let text = json!({
			"nodes": {
				"a": {"id": "a", "parentId": null, "hex": "#3366cc",
					"derivation": {"rule": "root", "params": {}}},
				"b": {"id": "b", "parentId": "a", "hex": "#CC9933", "depth": 7,
					"derivation": {"rule": "complementary", "params": {}}, "state": "rejected"}
			}
		})
		.to_string();
		let tree = Snapshot::from_json(&text)
			.unwrap()
			.restore(&ExplorerConfig::default())
			.unwrap();

		assert_eq!(tree.root_id(), Some(&NodeId::from("a")));
		assert_eq!(tree.max_depth(), 3);
		assert!(tree.history().is_empty());
		let root = tree.root().unwrap();
		assert_eq!(root.hex, "#3366CC");
		assert_eq!(root.rgb.r, 51);
		assert_eq!(root.hsl.h, 220);
		assert_eq!(root.state, NodeState::Adopted);
		let child = tree.node(&NodeId::from("b")).unwrap();
		assert_eq!(child.depth, 1);
		assert_eq!(child.state, NodeState::Rejected);
		assert_eq!(tree.edges(), [Edge { from: "a".into(), to: "b".into() }]);
	}

	#[test]
	fn missing_state_defaults_by_position() {
		let text = json!({
			"version": 3.1,
			"nodes": {
				"a": {"id": "a", "parentId": null, "hex": "#3366CC",
					"derivation": {"rule": "root", "params": {}}},
				"b": {"id": "b", "parentId": "a", "hex": "#CC9933",
					"derivation": {"rule": "complementary", "params": {}}},
				"c": {"id": "c", "parentId": "a", "hex": "#CC3366",
					"derivation": {"rule": "triad", "params": {"offset": 120}}, "state": "adopted"}
			}
		})
		.to_string();
		let tree = Snapshot::from_json(&text)
			.unwrap()
			.restore(&ExplorerConfig::default())
			.unwrap();

		let state = |id: &str| tree.node(&NodeId::from(id)).unwrap().state;
		assert_eq!(state("a"), NodeState::Adopted);
		assert_eq!(state("b"), NodeState::Pending);
		assert_eq!(state("c"), NodeState::Adopted);
		assert_eq!(crate::harmony::export::palette_nodes(&tree).len(), 2);
	}

	#[test]
	fn dangling_selection_is_dropped() {
		let text = json!({
			"version": 3.1,
			"rootId": "a",
			"selectedNodeId": "zzz",
			"nodes": {"a": {"id": "a", "parentId": null, "hex": "#000000",
				"derivation": {"rule": "root", "params": {}}}}
		})
		.to_string();
		let tree = Snapshot::from_json(&text)
			.unwrap()
			.restore(&ExplorerConfig::default())
			.unwrap();
		assert_eq!(tree.selected_id(), None);
	}

	#[test]
	fn history_is_trimmed_to_capacity() {
		let history: Vec<_> = (0..40)
			.map(|i| json!({"hex": "#000000", "rule": "tone", "timestamp": i}))
			.collect();
		let text = json!({"version": 3.1, "nodes": {}, "history": history}).to_string();
		let tree = Snapshot::from_json(&text)
			.unwrap()
			.restore(&ExplorerConfig::default())
			.unwrap();
		assert!(tree.is_empty());
		assert_eq!(tree.history().len(), 20);
		assert_eq!(tree.history().get(0).unwrap().timestamp, 0);
	}

	fn restore_err(value: serde_json::Value) -> ExplorerError {
		match Snapshot::from_json(&value.to_string()).and_then(|s| s.restore(&ExplorerConfig::default())) {
			Ok(_) => panic!("snapshot should have been rejected"),
			Err(err) => err,
		}
	}

	#[test]
	fn structural_problems_are_rejected() {
		let root = |id: &str| json!({"id": id, "parentId": null, "hex": "#000000",
			"derivation": {"rule": "root", "params": {}}});
		let child = |id: &str, parent: &str| json!({"id": id, "parentId": parent, "hex": "#FFFFFF",
			"derivation": {"rule": "tint", "params": {"step": 1}}});

		let cases = [
			json!([1, 2, 3]),
			json!({"nodes": {"a": root("b")}}),
			json!({"nodes": {"a": root("a"), "b": child("b", "missing")}}),
			json!({"nodes": {"a": root("a"), "b": root("b")}}),
			json!({"rootId": "b", "nodes": {"a": root("a"), "b": child("b", "a")}}),
			json!({"nodes": {"a": child("a", "b"), "b": child("b", "a")}}),
			json!({"nodes": {"a": {"id": "a", "parentId": null, "hex": "blue",
				"derivation": {"rule": "root", "params": {}}}}}),
		];
		for case in cases {
			let err = restore_err(case.clone());
			assert!(
				matches!(err, ExplorerError::MalformedSnapshot(_)),
				"{case} gave {err:?}"
			);
		}
	}

	#[test]
	fn file_sink_writes_loadable_json() {
		let dir = tempfile::tempdir().unwrap();
		let mut sink = JsonFileSink::new(dir.path().join("state.json"));
		let tree = sample_tree();
		sink.persist(&Snapshot::capture(&tree)).unwrap();

		let text = fs::read_to_string(sink.path()).unwrap();
		let restored = Snapshot::from_json(&text)
			.unwrap()
			.restore(&ExplorerConfig::default())
			.unwrap();
		assert_eq!(restored.len(), tree.len());
	}

	#[test]
	fn file_sink_reports_io_errors() {
		let dir = tempfile::tempdir().unwrap();
		let mut sink = JsonFileSink::new(dir.path().join("missing").join("state.json"));
		let err = sink.persist(&Snapshot::capture(&ColorTree::default())).unwrap_err();
		assert!(matches!(err, ExplorerError::Persist(_)));
	}
}
