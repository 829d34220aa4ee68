//! Session configuration.
//!
//! Every field has a default, and partial JSON documents fill in the rest, so
//! a config file only needs to mention what it changes.

use serde::{Deserialize, Serialize};

use super::error::{ExplorerError, Result};
use super::history::DEFAULT_HISTORY_CAPACITY;
use super::layout::LayoutConfig;
use super::rules::RuleParams;
use super::viewport::ViewportConfig;

/// Default branching cap.
pub const DEFAULT_MAX_DEPTH: u32 = 3;

/// Everything a session can be tuned with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
	/// Nodes at this depth or deeper cannot be branched from.
	pub max_depth: u32,
	/// Number of history entries retained.
	pub history_capacity: usize,
	/// Number of history entries a UI should list.
	pub history_display: usize,
	/// When set, clearing the tree also clears the history.
	pub clear_history_with_tree: bool,
	/// Offsets for the hue-rotation rules.
	pub rules: RuleParams,
	/// Tree layout spacing.
	pub layout: LayoutConfig,
	/// Zoom limits and fit tuning.
	pub viewport: ViewportConfig,
}

impl Default for ExplorerConfig {
	fn default() -> Self {
		Self {
			max_depth: DEFAULT_MAX_DEPTH,
			history_capacity: DEFAULT_HISTORY_CAPACITY,
			history_display: 10,
			clear_history_with_tree: false,
			rules: RuleParams::default(),
			layout: LayoutConfig::default(),
			viewport: ViewportConfig::default(),
		}
	}
}

impl ExplorerConfig {
	/// Parse a (possibly partial) JSON config and check its values.
	pub fn from_json(text: &str) -> Result<Self> {
		let config: Self = serde_json::from_str(text).map_err(|e| ExplorerError::InvalidConfig(e.to_string()))?;
		config.validate()?;
		Ok(config)
	}

	/// Reject values no session can work with.
	pub fn validate(&self) -> Result<()> {
		self.rules.validate()
	}
}
