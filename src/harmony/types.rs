//! Node and edge records for the derivation tree.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::color::{Hsl, Rgb, hex_to_rgb};
use super::error::ExplorerError;
use super::rules::Rule;

/// Opaque node identifier, unique for the lifetime of a session.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
	/// Mint a fresh id (`n` followed by a random UUID in simple form).
	pub fn fresh() -> Self {
		Self(format!("n{}", Uuid::new_v4().simple()))
	}

	/// Raw id string.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for NodeId {
	fn from(value: &str) -> Self {
		Self(value.to_string())
	}
}

/// User curation state, independent of tree structure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
	/// Not yet reviewed. New children start here.
	#[default]
	Pending,
	/// Kept for the palette.
	Adopted,
	/// Discarded, but still shown in the tree.
	Rejected,
}

impl NodeState {
	/// Every state.
	pub const ALL: [NodeState; 3] = [NodeState::Adopted, NodeState::Pending, NodeState::Rejected];

	/// Lower-case name.
	pub fn name(self) -> &'static str {
		match self {
			NodeState::Pending => "pending",
			NodeState::Adopted => "adopted",
			NodeState::Rejected => "rejected",
		}
	}
}

impl fmt::Display for NodeState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for NodeState {
	type Err = ExplorerError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		NodeState::ALL
			.into_iter()
			.find(|state| state.name().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| ExplorerError::UnknownState(s.to_string()))
	}
}

/// Provenance of a node: the rule that produced it and the parameter used.
///
/// Serialized as `{"rule": "...", "params": {...}}`. Parameters are recorded
/// for inspection and export only; they are never used to recompute colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "rule", content = "params", rename_all = "lowercase")]
pub enum Derivation {
	/// The seed color.
	Root {},
	/// Hue rotated by `delta` degrees (negative or positive).
	Analogous {
		/// Signed rotation in degrees.
		delta: i32,
	},
	/// Hue rotated by 180 degrees.
	Complementary {},
	/// Hue rotated by `offset` degrees around the complement.
	Split {
		/// Rotation from the base hue in degrees.
		offset: i32,
	},
	/// Hue rotated by 120 or 240 degrees.
	Triad {
		/// Rotation from the base hue in degrees.
		offset: i32,
	},
	/// Hue rotated by 90, 180 or 270 degrees.
	Tetrad {
		/// Rotation from the base hue in degrees.
		offset: i32,
	},
	/// Lighter, slightly desaturated step.
	Tint {
		/// 1-based step.
		step: u8,
	},
	/// Darker, slightly saturated step.
	Shade {
		/// 1-based step.
		step: u8,
	},
	/// Desaturated step.
	Tone {
		/// 1-based step.
		step: u8,
	},
}

impl Derivation {
	/// The rule that produced the node, or `None` for the root.
	pub fn rule(&self) -> Option<Rule> {
		match self {
			Derivation::Root {} => None,
			Derivation::Analogous { .. } => Some(Rule::Analogous),
			Derivation::Complementary {} => Some(Rule::Complementary),
			Derivation::Split { .. } => Some(Rule::Split),
			Derivation::Triad { .. } => Some(Rule::Triad),
			Derivation::Tetrad { .. } => Some(Rule::Tetrad),
			Derivation::Tint { .. } => Some(Rule::Tint),
			Derivation::Shade { .. } => Some(Rule::Shade),
			Derivation::Tone { .. } => Some(Rule::Tone),
		}
	}

	/// Rule name as shown to users and written to history (`"root"` for the seed).
	pub fn rule_name(&self) -> &'static str {
		self.rule().map_or("root", Rule::name)
	}
}

/// One explored color.
///
/// `hex` is authoritative; `rgb` and `hsl` are cached views computed from it
/// when the node is built and never edited independently.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredNode")]
pub struct ColorNode {
	/// Unique within the tree.
	pub id: NodeId,
	/// `None` only for the root.
	pub parent_id: Option<NodeId>,
	/// Upper-case `#RRGGBB`.
	pub hex: String,
	/// Channels derived from `hex`.
	pub rgb: Rgb,
	/// HSL derived from `hex`.
	pub hsl: Hsl,
	/// Rule and parameters that produced this color.
	pub derivation: Derivation,
	/// Curation state.
	pub state: NodeState,
	/// Distance from the root.
	pub depth: u32,
	/// Unix milliseconds.
	pub created_at: i64,
}

/// Node as found in stored snapshots, where derived fields and the state may
/// be missing.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredNode {
	id: NodeId,
	#[serde(default)]
	parent_id: Option<NodeId>,
	hex: String,
	#[serde(default)]
	rgb: Rgb,
	#[serde(default)]
	hsl: Hsl,
	derivation: Derivation,
	#[serde(default)]
	state: Option<NodeState>,
	#[serde(default)]
	depth: u32,
	#[serde(default)]
	created_at: i64,
}

impl From<StoredNode> for ColorNode {
	fn from(stored: StoredNode) -> Self {
		// Roots are adopted on creation; keep that for nodes saved without a state.
		let state = stored.state.unwrap_or(if stored.parent_id.is_none() {
			NodeState::Adopted
		} else {
			NodeState::Pending
		});
		Self {
			id: stored.id,
			parent_id: stored.parent_id,
			hex: stored.hex,
			rgb: stored.rgb,
			hsl: stored.hsl,
			derivation: stored.derivation,
			state,
			depth: stored.depth,
			created_at: stored.created_at,
		}
	}
}

impl ColorNode {
	/// Build a seed node from a user-supplied hex string.
	///
	/// The root starts out adopted.
	pub fn root(hex: &str) -> Result<Self, ExplorerError> {
		let rgb = hex_to_rgb(hex).ok_or_else(|| ExplorerError::InvalidColorFormat(hex.to_string()))?;
		Ok(Self {
			state: NodeState::Adopted,
			..Self::from_rgb(rgb, None, Derivation::Root {}, 0)
		})
	}

	/// Build a pending child of `parent` with the given color.
	pub fn child_of(parent: &ColorNode, rgb: Rgb, derivation: Derivation) -> Self {
		Self::from_rgb(rgb, Some(parent.id.clone()), derivation, parent.depth + 1)
	}

	fn from_rgb(rgb: Rgb, parent_id: Option<NodeId>, derivation: Derivation, depth: u32) -> Self {
		Self {
			id: NodeId::fresh(),
			parent_id,
			hex: rgb.to_hex(),
			rgb,
			hsl: rgb.to_hsl(),
			derivation,
			state: NodeState::Pending,
			depth,
			created_at: now_millis(),
		}
	}

	/// Recompute the cached `rgb`/`hsl` views and canonicalize `hex`.
	///
	/// Returns false if `hex` is not a valid color.
	pub fn refresh_color(&mut self) -> bool {
		let Some(rgb) = hex_to_rgb(&self.hex) else {
			return false;
		};
		self.hex = rgb.to_hex();
		self.rgb = rgb;
		self.hsl = rgb.to_hsl();
		true
	}

	/// Whether this node has no parent.
	pub fn is_root(&self) -> bool {
		self.parent_id.is_none()
	}

	/// CSS custom property for this node, e.g. `--color-triad: #CC3366`.
	pub fn css_variable(&self) -> String {
		format!("--color-{}: {}", self.derivation.rule_name(), self.hex)
	}
}

/// Parent -> child link, kept alongside `parent_id` for renderers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
	/// Parent id.
	pub from: NodeId,
	/// Child id.
	pub to: NodeId,
}

/// Current wall-clock time in Unix milliseconds.
pub fn now_millis() -> i64 {
	chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn root_is_adopted_at_depth_zero() {
		let root = ColorNode::root("3366cc").unwrap();
		assert_eq!(root.hex, "#3366CC");
		assert_eq!(root.rgb, Rgb::new(51, 102, 204));
		assert_eq!(root.hsl, Hsl::new(220, 60, 50));
		assert_eq!(root.state, NodeState::Adopted);
		assert_eq!(root.depth, 0);
		assert!(root.is_root());
		assert_eq!(root.derivation.rule_name(), "root");
	}

	#[test]
	fn root_rejects_bad_hex() {
		assert_eq!(
			ColorNode::root("#12345"),
			Err(ExplorerError::InvalidColorFormat("#12345".into()))
		);
	}

	#[test]
	fn children_inherit_depth_and_parent() {
		let root = ColorNode::root("#3366CC").unwrap();
		let child = ColorNode::child_of(&root, Rgb::new(204, 153, 51), Derivation::Complementary {});
		assert_eq!(child.depth, 1);
		assert_eq!(child.parent_id.as_ref(), Some(&root.id));
		assert_eq!(child.state, NodeState::Pending);
		assert_ne!(child.id, root.id);
	}

	#[test]
	fn derivation_serializes_as_rule_and_params() {
		let json = serde_json::to_value(Derivation::Analogous { delta: -30 }).unwrap();
		assert_eq!(json, serde_json::json!({"rule": "analogous", "params": {"delta": -30}}));

		let json = serde_json::to_value(Derivation::Root {}).unwrap();
		assert_eq!(json, serde_json::json!({"rule": "root", "params": {}}));

		let parsed: Derivation =
			serde_json::from_value(serde_json::json!({"rule": "tint", "params": {"step": 2}})).unwrap();
		assert_eq!(parsed, Derivation::Tint { step: 2 });
	}

	#[test]
	fn state_parses_case_insensitively() {
		assert_eq!("Adopted".parse::<NodeState>(), Ok(NodeState::Adopted));
		assert_eq!(
			"kept".parse::<NodeState>(),
			Err(ExplorerError::UnknownState("kept".into()))
		);
	}

	#[test]
	fn css_variable_uses_rule_name() {
		let root = ColorNode::root("#3366CC").unwrap();
		assert_eq!(root.css_variable(), "--color-root: #3366CC");
	}
}
