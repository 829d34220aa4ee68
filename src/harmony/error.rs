//! Recoverable failures reported by tree operations.
//!
//! Every variant is user-facing. A failing operation leaves the tree exactly as
//! it was before the call, so callers only need to decide how to present the
//! error.

use thiserror::Error;

use super::types::NodeId;

/// Why an explorer operation was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExplorerError {
	/// Input did not match the 6-hex-digit pattern (optional leading `#`).
	#[error("invalid hex color format: {0:?}")]
	InvalidColorFormat(String),

	/// Branching or a state change was requested with nothing selected.
	#[error("no node is selected")]
	NoSelection,

	/// The given id does not name a node in the current tree.
	#[error("unknown node: {0}")]
	UnknownNode(NodeId),

	/// The base node is already at (or past) the configured depth cap.
	#[error("maximum depth {max_depth} reached (node depth {depth})")]
	DepthLimitReached {
		/// Depth of the node branching was requested on.
		depth: u32,
		/// Configured cap.
		max_depth: u32,
	},

	/// Rule name is not one of the eight derivation rules.
	#[error("unknown derivation rule: {0:?}")]
	UnknownRule(String),

	/// State name is not one of adopted, pending or rejected.
	#[error("unknown node state: {0:?}")]
	UnknownState(String),

	/// History index out of range.
	#[error("no history entry at index {0}")]
	UnknownHistoryEntry(usize),

	/// Snapshot could not be parsed or is structurally inconsistent.
	#[error("malformed snapshot: {0}")]
	MalformedSnapshot(String),

	/// A configuration document could not be parsed.
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	/// Writing a snapshot to its sink failed.
	#[error("failed to persist snapshot: {0}")]
	Persist(String),
}

impl From<serde_json::Error> for ExplorerError {
	fn from(err: serde_json::Error) -> Self {
		ExplorerError::MalformedSnapshot(err.to_string())
	}
}

/// Result alias for explorer operations.
pub type Result<T> = std::result::Result<T, ExplorerError>;
