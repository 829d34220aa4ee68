//! Top-down tree layout.
//!
//! The root sits at the origin. Each node's children occupy one row below it,
//! spread over evenly spaced slots centered on the parent's `x`. Siblings keep
//! their insertion order. Subtrees may overlap horizontally; the layout does
//! not try to pack them.
//!
//! The result is a pure function of the node list: calling it twice on an
//! unchanged tree gives identical coordinates.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use super::types::{ColorNode, NodeId};

/// Spacing between laid-out nodes, in world units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	/// Distance between neighbouring siblings.
	pub horizontal_spacing: f64,
	/// Distance between a parent row and its children's row.
	pub vertical_spacing: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			horizontal_spacing: 200.0,
			vertical_spacing: 160.0,
		}
	}
}

/// A world-space position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate, growing downwards.
	pub y: f64,
}

impl Point {
	/// Point at `(x, y)`.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Node positions keyed by id. Unreachable nodes are absent.
pub type Positions = HashMap<NodeId, Point>;

/// Axis-aligned box around a set of positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	/// Leftmost x.
	pub min_x: f64,
	/// Topmost y.
	pub min_y: f64,
	/// Rightmost x.
	pub max_x: f64,
	/// Bottommost y.
	pub max_y: f64,
}

impl Bounds {
	/// Horizontal extent.
	pub fn width(&self) -> f64 {
		self.max_x - self.min_x
	}

	/// Vertical extent.
	pub fn height(&self) -> f64 {
		self.max_y - self.min_y
	}

	/// Midpoint of the box.
	pub fn center(&self) -> Point {
		Point::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
	}

	/// Grow the box by `padding` on every side.
	pub fn padded(self, padding: f64) -> Self {
		Self {
			min_x: self.min_x - padding,
			min_y: self.min_y - padding,
			max_x: self.max_x + padding,
			max_y: self.max_y + padding,
		}
	}
}

/// Lay out the tree rooted at `root_id`.
///
/// Children are discovered through `parent_id`; their order in `nodes` is the
/// sibling order.
pub fn compute_positions(
	root_id: Option<&NodeId>,
	nodes: &[ColorNode],
	config: &LayoutConfig,
) -> Positions {
	let mut positions = Positions::new();
	let Some(root_id) = root_id else {
		return positions;
	};
	if !nodes.iter().any(|node| &node.id == root_id) {
		return positions;
	}

	let mut children: HashMap<&NodeId, Vec<&NodeId>> = HashMap::new();
	for node in nodes {
		if let Some(parent) = &node.parent_id {
			children.entry(parent).or_default().push(&node.id);
		}
	}

	let origin = Point::default();
	positions.insert(root_id.clone(), origin);
	place_children(root_id, origin, &children, config, &mut positions);

	debug!("harmony-tree: laid out {} of {} nodes", positions.len(), nodes.len());
	positions
}

fn place_children(
	parent: &NodeId,
	at: Point,
	children: &HashMap<&NodeId, Vec<&NodeId>>,
	config: &LayoutConfig,
	positions: &mut Positions,
) {
	let Some(kids) = children.get(parent) else {
		return;
	};
	let y = at.y + config.vertical_spacing;
	let start_x = at.x - (kids.len() - 1) as f64 * config.horizontal_spacing / 2.0;

	for (i, &child) in kids.iter().enumerate() {
		// Malformed input could revisit a node; the first placement wins.
		if positions.contains_key(child) {
			continue;
		}
		let point = Point::new(start_x + i as f64 * config.horizontal_spacing, y);
		positions.insert(child.clone(), point);
		place_children(child, point, children, config, positions);
	}
}

/// Bounding box of all positions, or `None` if there are none.
pub fn bounds(positions: &Positions) -> Option<Bounds> {
	let mut points = positions.values();
	let first = points.next()?;
	let init = Bounds {
		min_x: first.x,
		min_y: first.y,
		max_x: first.x,
		max_y: first.y,
	};
	Some(points.fold(init, |b, p| Bounds {
		min_x: b.min_x.min(p.x),
		min_y: b.min_y.min(p.y),
		max_x: b.max_x.max(p.x),
		max_y: b.max_y.max(p.y),
	}))
}
