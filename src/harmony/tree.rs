//! The derivation tree: an arena of color nodes linked by parent id.
//!
//! There is exactly one tree per session. Setting a new root discards the
//! previous tree; nodes are otherwise only ever added by branching and are
//! never removed individually. Every operation that returns an error leaves
//! the tree untouched.

use std::collections::HashMap;

use serde::Serialize;

use super::config::ExplorerConfig;
use super::error::{ExplorerError, Result};
use super::history::History;
use super::layout::{LayoutConfig, Positions, compute_positions};
use super::rules::{Rule, RuleParams};
use super::types::{ColorNode, Edge, NodeId, NodeState, now_millis};
use super::viewport::Viewport;

/// Node counts per curation state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
	/// Number of nodes.
	pub total: usize,
	/// Nodes marked adopted.
	pub adopted: usize,
	/// Nodes still pending.
	pub pending: usize,
	/// Nodes marked rejected.
	pub rejected: usize,
	/// Largest depth present (0 for an empty or root-only tree).
	pub deepest: u32,
}

/// Session tree state.
#[derive(Clone, Debug)]
pub struct ColorTree {
	root_id: Option<NodeId>,
	/// Insertion order; sibling order for layout comes from here.
	nodes: Vec<ColorNode>,
	index: HashMap<NodeId, usize>,
	edges: Vec<Edge>,
	max_depth: u32,
	selected: Option<NodeId>,
	history: History,
	/// Display state only; never read by tree operations.
	pub viewport: Viewport,
	created_at: i64,
}

impl ColorTree {
	/// Empty tree using the depth cap and history capacity of `config`.
	pub fn new(config: &ExplorerConfig) -> Self {
		Self {
			root_id: None,
			nodes: Vec::new(),
			index: HashMap::new(),
			edges: Vec::new(),
			max_depth: config.max_depth,
			selected: None,
			history: History::new(config.history_capacity),
			viewport: Viewport::default(),
			created_at: now_millis(),
		}
	}

	/// Assemble a tree from already-validated parts.
	///
	/// Edges are derived from `parent_id`, so they always agree with the nodes.
	pub(crate) fn from_parts(
		root_id: Option<NodeId>,
		nodes: Vec<ColorNode>,
		max_depth: u32,
		selected: Option<NodeId>,
		history: History,
		viewport: Viewport,
		created_at: i64,
	) -> Self {
		let mut tree = Self {
			root_id,
			nodes: Vec::with_capacity(nodes.len()),
			index: HashMap::with_capacity(nodes.len()),
			edges: Vec::new(),
			max_depth,
			selected: None,
			history,
			viewport,
			created_at,
		};
		for node in nodes {
			tree.attach(node);
		}
		tree.selected = selected.filter(|id| tree.index.contains_key(id));
		tree
	}

	/// Replace the whole tree with a single adopted root of color `hex`.
	///
	/// The root is selected and recorded in history. On an invalid hex the
	/// existing tree is kept as is.
	pub fn set_root(&mut self, hex: &str) -> Result<NodeId> {
		let root = ColorNode::root(hex)?;
		let id = root.id.clone();

		self.nodes.clear();
		self.index.clear();
		self.edges.clear();
		self.insert(root);
		self.root_id = Some(id.clone());
		self.selected = Some(id.clone());
		Ok(id)
	}

	/// Apply `rule` to the selected node and insert the children.
	///
	/// Selection is left where it was.
	pub fn generate_branch(&mut self, rule: Rule, params: &RuleParams) -> Result<Vec<NodeId>> {
		let selected = self.selected.clone().ok_or(ExplorerError::NoSelection)?;
		self.branch_from(&selected, rule, params)
	}

	/// Apply `rule` to the node `base_id` and insert the children, in
	/// generation order, into nodes, edges and history.
	pub fn branch_from(&mut self, base_id: &NodeId, rule: Rule, params: &RuleParams) -> Result<Vec<NodeId>> {
		let base = self.require(base_id)?;
		if base.depth >= self.max_depth {
			return Err(ExplorerError::DepthLimitReached {
				depth: base.depth,
				max_depth: self.max_depth,
			});
		}

		let children = rule.derive(base, params);
		let ids = children.iter().map(|node| node.id.clone()).collect();
		for child in children {
			self.insert(child);
		}
		Ok(ids)
	}

	/// Set the curation state of a specific node.
	pub fn set_node_state(&mut self, id: &NodeId, state: NodeState) -> Result<()> {
		let &i = self
			.index
			.get(id)
			.ok_or_else(|| ExplorerError::UnknownNode(id.clone()))?;
		self.nodes[i].state = state;
		Ok(())
	}

	/// Set the curation state of the selected node.
	pub fn set_selected_state(&mut self, state: NodeState) -> Result<()> {
		let selected = self.selected.clone().ok_or(ExplorerError::NoSelection)?;
		self.set_node_state(&selected, state)
	}

	/// Select a node, or clear the selection with `None`.
	pub fn select_node(&mut self, id: Option<&NodeId>) -> Result<()> {
		match id {
			Some(id) => {
				self.require(id)?;
				self.selected = Some(id.clone());
			}
			None => self.selected = None,
		}
		Ok(())
	}

	/// Drop every node, edge and the selection. History survives unless
	/// `with_history` is set.
	pub fn clear(&mut self, with_history: bool) {
		self.root_id = None;
		self.nodes.clear();
		self.index.clear();
		self.edges.clear();
		self.selected = None;
		if with_history {
			self.history.clear();
		}
	}

	/// Forget every history entry; nodes are kept.
	pub fn clear_history(&mut self) {
		self.history.clear();
	}

	/// Reseed the tree from the history entry at `index` (0 = newest).
	pub fn apply_history(&mut self, index: usize) -> Result<NodeId> {
		let hex = self
			.history
			.get(index)
			.map(|entry| entry.hex.clone())
			.ok_or(ExplorerError::UnknownHistoryEntry(index))?;
		self.set_root(&hex)
	}

	/// Change the branching cap. Existing nodes deeper than the cap stay.
	pub fn set_max_depth(&mut self, max_depth: u32) {
		self.max_depth = max_depth;
	}

	/// Current branching cap.
	pub fn max_depth(&self) -> u32 {
		self.max_depth
	}

	/// Whether `rule` may currently be applied to `id`.
	pub fn can_branch(&self, id: &NodeId) -> bool {
		self.node(id).is_some_and(|node| node.depth < self.max_depth)
	}

	/// Root id, `None` for an empty tree.
	pub fn root_id(&self) -> Option<&NodeId> {
		self.root_id.as_ref()
	}

	/// Root node, `None` for an empty tree.
	pub fn root(&self) -> Option<&ColorNode> {
		self.root_id.as_ref().and_then(|id| self.node(id))
	}

	/// Selected node id.
	pub fn selected_id(&self) -> Option<&NodeId> {
		self.selected.as_ref()
	}

	/// Selected node.
	pub fn selected(&self) -> Option<&ColorNode> {
		self.selected.as_ref().and_then(|id| self.node(id))
	}

	/// Node by id.
	pub fn node(&self, id: &NodeId) -> Option<&ColorNode> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	/// All nodes in insertion order.
	pub fn nodes(&self) -> &[ColorNode] {
		&self.nodes
	}

	/// All edges in insertion order.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Direct children of `id`, in insertion order.
	pub fn children(&self, id: &NodeId) -> Vec<&ColorNode> {
		self.nodes
			.iter()
			.filter(|node| node.parent_id.as_ref() == Some(id))
			.collect()
	}

	/// Nodes the user has adopted, in insertion order.
	pub fn adopted(&self) -> Vec<&ColorNode> {
		self.with_state(NodeState::Adopted)
	}

	/// Nodes in `state`, in insertion order.
	pub fn with_state(&self, state: NodeState) -> Vec<&ColorNode> {
		self.nodes.iter().filter(|node| node.state == state).collect()
	}

	/// Number of nodes.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Whether the tree has no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Created colors, newest first.
	pub fn history(&self) -> &History {
		&self.history
	}

	/// Creation time, Unix milliseconds.
	pub fn created_at(&self) -> i64 {
		self.created_at
	}

	/// Counts per state and the deepest level.
	pub fn stats(&self) -> TreeStats {
		self.nodes.iter().fold(TreeStats::default(), |mut stats, node| {
			stats.total += 1;
			match node.state {
				NodeState::Adopted => stats.adopted += 1,
				NodeState::Pending => stats.pending += 1,
				NodeState::Rejected => stats.rejected += 1,
			}
			stats.deepest = stats.deepest.max(node.depth);
			stats
		})
	}

	/// Display coordinates for every node reachable from the root.
	pub fn positions(&self, config: &LayoutConfig) -> Positions {
		compute_positions(self.root_id.as_ref(), &self.nodes, config)
	}

	fn require(&self, id: &NodeId) -> Result<&ColorNode> {
		self.node(id).ok_or_else(|| ExplorerError::UnknownNode(id.clone()))
	}

	/// Add a node and record it in history.
	fn insert(&mut self, node: ColorNode) {
		self.history.push(&node.hex, node.derivation.rule_name());
		self.attach(node);
	}

	fn attach(&mut self, node: ColorNode) {
		if let Some(parent) = &node.parent_id {
			self.edges.push(Edge {
				from: parent.clone(),
				to: node.id.clone(),
			});
		}
		self.index.insert(node.id.clone(), self.nodes.len());
		self.nodes.push(node);
	}
}

impl Default for ColorTree {
	fn default() -> Self {
		Self::new(&ExplorerConfig::default())
	}
}
