//! A single exploration session: one tree, its config and an optional
//! snapshot sink.
//!
//! Every successful mutation hands a fresh [`Snapshot`] to the sink. A sink
//! failure is logged and swallowed; the in-memory tree stays authoritative.

use log::{debug, info, warn};

use super::config::ExplorerConfig;
use super::error::Result;
use super::export::{self, PaletteSheet};
use super::layout::Positions;
use super::rules::Rule;
use super::snapshot::{Snapshot, SnapshotSink};
use super::tree::ColorTree;
use super::types::{NodeId, NodeState};

/// Owns the tree for one exploration and persists it after each change.
pub struct Session {
	tree: ColorTree,
	config: ExplorerConfig,
	sink: Option<Box<dyn SnapshotSink>>,
}

impl Session {
	/// Empty session using `config`.
	pub fn new(config: ExplorerConfig) -> Self {
		Self {
			tree: ColorTree::new(&config),
			config,
			sink: None,
		}
	}

	/// Persist a snapshot after every successful mutation.
	pub fn with_sink(mut self, sink: impl SnapshotSink + 'static) -> Self {
		self.sink = Some(Box::new(sink));
		self
	}

	/// Current tree.
	pub fn tree(&self) -> &ColorTree {
		&self.tree
	}

	/// Active configuration.
	pub fn config(&self) -> &ExplorerConfig {
		&self.config
	}

	/// Start a new tree from `hex`.
	pub fn set_root(&mut self, hex: &str) -> Result<NodeId> {
		let id = self.tree.set_root(hex)?;
		info!("harmony-tree: new root {}", self.describe(&id));
		self.persist();
		Ok(id)
	}

	/// Branch from the selected node with `rule`.
	pub fn generate_branch(&mut self, rule: Rule) -> Result<Vec<NodeId>> {
		let ids = self.tree.generate_branch(rule, &self.config.rules)?;
		info!("harmony-tree: {rule} branch added {} nodes", ids.len());
		self.persist();
		Ok(ids)
	}

	/// Like [`Session::generate_branch`], taking the rule by name.
	pub fn generate_branch_named(&mut self, rule: &str) -> Result<Vec<NodeId>> {
		self.generate_branch(rule.parse()?)
	}

	/// Set the curation state of the selected node.
	pub fn set_selected_state(&mut self, state: NodeState) -> Result<()> {
		self.tree.set_selected_state(state)?;
		debug!("harmony-tree: selected node marked {state}");
		self.persist();
		Ok(())
	}

	/// Set the curation state of node `id`.
	pub fn set_node_state(&mut self, id: &NodeId, state: NodeState) -> Result<()> {
		self.tree.set_node_state(id, state)?;
		debug!("harmony-tree: {id} marked {state}");
		self.persist();
		Ok(())
	}

	/// Change or clear the selection.
	pub fn select_node(&mut self, id: Option<&NodeId>) -> Result<()> {
		self.tree.select_node(id)?;
		self.persist();
		Ok(())
	}

	/// Empty the tree; history goes too when the config says so.
	pub fn clear(&mut self) {
		self.tree.clear(self.config.clear_history_with_tree);
		info!("harmony-tree: tree cleared");
		self.persist();
	}

	/// Forget every history entry.
	pub fn clear_history(&mut self) {
		self.tree.clear_history();
		self.persist();
	}

	/// Reseed from history entry `index`, newest first.
	pub fn apply_history(&mut self, index: usize) -> Result<NodeId> {
		let id = self.tree.apply_history(index)?;
		info!("harmony-tree: reseeded from history {}", self.describe(&id));
		self.persist();
		Ok(id)
	}

	/// Change the branching cap for this session.
	pub fn set_max_depth(&mut self, max_depth: u32) {
		self.config.max_depth = max_depth;
		self.tree.set_max_depth(max_depth);
		self.persist();
	}

	/// Snapshot of the current tree.
	pub fn snapshot(&self) -> Snapshot {
		Snapshot::capture(&self.tree)
	}

	/// Replace the tree with one restored from snapshot JSON.
	///
	/// On any error the current tree is kept.
	pub fn load_json(&mut self, text: &str) -> Result<()> {
		let tree = Snapshot::from_json(text)?.restore(&self.config)?;
		self.config.max_depth = tree.max_depth();
		self.tree = tree;
		info!("harmony-tree: loaded {} nodes", self.tree.len());
		self.persist();
		Ok(())
	}

	/// Layout coordinates using the configured spacing.
	pub fn positions(&self) -> Positions {
		self.tree.positions(&self.config.layout)
	}

	/// Frame the whole tree in a `width` x `height` canvas.
	pub fn fit_view(&mut self, width: f64, height: f64) {
		let positions = self.positions();
		self.tree
			.viewport
			.fit(&positions, width, height, &self.config.viewport);
	}

	/// Zoom around a screen point, clamped to the configured range.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		self.tree.viewport.zoom_at(sx, sy, factor, &self.config.viewport);
	}

	/// CSS variables for adopted colors.
	pub fn css_variables(&self) -> String {
		export::css_variables(&self.tree.adopted())
	}

	/// SCSS variables for adopted colors.
	pub fn scss_variables(&self) -> String {
		export::scss_variables(&self.tree.adopted())
	}

	/// Palette JSON for [`export::palette_nodes`].
	pub fn palette_json(&self) -> Result<String> {
		export::palette_json(&export::palette_nodes(&self.tree))
	}

	/// Palette image geometry for [`export::palette_nodes`].
	pub fn palette_sheet(&self) -> PaletteSheet {
		PaletteSheet::layout(&export::palette_nodes(&self.tree))
	}

	fn describe(&self, id: &NodeId) -> String {
		match self.tree.node(id) {
			Some(node) => format!("{} ({id})", node.hex),
			None => id.to_string(),
		}
	}

	fn persist(&mut self) {
		let Some(sink) = self.sink.as_mut() else {
			return;
		};
		if let Err(e) = sink.persist(&Snapshot::capture(&self.tree)) {
			warn!("harmony-tree: {e}");
		}
	}
}

impl Default for Session {
	fn default() -> Self {
		Self::new(ExplorerConfig::default())
	}
}
