//! Pan and zoom display state.
//!
//! The viewport never influences the tree model. It is carried in snapshots so
//! a restored session reopens where the user left it.

use serde::{Deserialize, Serialize};

use super::layout::{Point, Positions, bounds};

/// Zoom limits and fit-to-view tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
	/// Smallest zoom factor.
	pub min_scale: f64,
	/// Largest zoom factor.
	pub max_scale: f64,
	/// World-space margin added around the tree when fitting.
	pub fit_padding: f64,
	/// Fitting never zooms in past this.
	pub fit_max_scale: f64,
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self {
			min_scale: 0.1,
			max_scale: 4.0,
			fit_padding: 60.0,
			fit_max_scale: 1.5,
		}
	}
}

/// Translation and zoom applied to the whole tree when drawn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
	/// Screen x of the world origin.
	pub x: f64,
	/// Screen y of the world origin.
	pub y: f64,
	/// Zoom factor (1.0 = 100%).
	pub scale: f64,
}

impl Default for Viewport {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			scale: 1.0,
		}
	}
}

impl Viewport {
	/// Put the world origin in the middle of a `width` x `height` canvas at 100%.
	pub fn center(&mut self, width: f64, height: f64) {
		self.x = width / 2.0;
		self.y = height / 2.0;
		self.scale = 1.0;
	}

	/// Zoom and translate so every laid-out node is visible.
	/// An empty canvas or a tree of one node falls back to [`Viewport::center`].
	pub fn fit(&mut self, positions: &Positions, width: f64, height: f64, config: &ViewportConfig) {
		if width <= 0.0 || height <= 0.0 {
			self.center(width.max(0.0), height.max(0.0));
			return;
		}
		let Some(content) = bounds(positions).filter(|_| positions.len() > 1) else {
			self.center(width, height);
			return;
		};
		let content = content.padded(config.fit_padding);
		let scale = (width / content.width())
			.min(height / content.height())
			.min(config.fit_max_scale)
			.max(config.min_scale);
		let mid = content.center();

		self.x = width / 2.0 - mid.x * scale;
		self.y = height / 2.0 - mid.y * scale;
		self.scale = scale;
	}

	/// Back to 100% without moving the origin.
	pub fn reset_zoom(&mut self) {
		self.scale = 1.0;
	}

	/// Multiply the zoom by `factor`, keeping the screen point `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64, config: &ViewportConfig) {
		if !(self.scale.is_finite() && self.scale > 0.0) {
			self.scale = 1.0;
		}
		let scale = (self.scale * factor).clamp(config.min_scale, config.max_scale);
		let diff = scale - self.scale;
		self.x -= (sx - self.x) * diff / self.scale;
		self.y -= (sy - self.y) * diff / self.scale;
		self.scale = scale;
	}

	/// World coordinates under a screen point.
	pub fn screen_to_world(&self, sx: f64, sy: f64) -> Point {
		Point::new((sx - self.x) / self.scale, (sy - self.y) / self.scale)
	}

	/// Screen coordinates of a world point.
	pub fn world_to_screen(&self, p: Point) -> (f64, f64) {
		(p.x * self.scale + self.x, p.y * self.scale + self.y)
	}
}

/// Tracks an in-progress canvas pan.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	/// Whether a drag is in progress.
	pub active: bool,
	/// Pointer position when the drag began.
	pub start_x: f64,
	/// See `start_x`.
	pub start_y: f64,
	/// Viewport translation when the drag began.
	pub viewport_start_x: f64,
	/// See `viewport_start_x`.
	pub viewport_start_y: f64,
}

impl PanState {
	/// Start a drag at screen point `(sx, sy)`.
	pub fn begin(&mut self, sx: f64, sy: f64, viewport: &Viewport) {
		*self = Self {
			active: true,
			start_x: sx,
			start_y: sy,
			viewport_start_x: viewport.x,
			viewport_start_y: viewport.y,
		};
	}

	/// Move the viewport with the pointer. Does nothing unless a pan is active.
	pub fn drag_to(&self, sx: f64, sy: f64, viewport: &mut Viewport) {
		if !self.active {
			return;
		}
		viewport.x = self.viewport_start_x + (sx - self.start_x);
		viewport.y = self.viewport_start_y + (sy - self.start_y);
	}

	/// Finish the drag.
	pub fn end(&mut self) {
		self.active = false;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::harmony::types::NodeId;

	fn approx(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	#[test]
	fn center_resets_scale() {
		let mut vp = Viewport {
			x: 5.0,
			y: 5.0,
			scale: 3.0,
		};
		vp.center(800.0, 600.0);
		assert_eq!(vp, Viewport { x: 400.0, y: 300.0, scale: 1.0 });
	}

	#[test]
	fn fit_single_node_centers() {
		let mut positions = Positions::new();
		positions.insert(NodeId::from("root"), Point::default());
		let mut vp = Viewport::default();
		vp.fit(&positions, 800.0, 600.0, &ViewportConfig::default());
		assert_eq!(vp, Viewport { x: 400.0, y: 300.0, scale: 1.0 });
	}

	#[test]
	fn fit_frames_padded_bounds() {
		let mut positions = Positions::new();
		positions.insert(NodeId::from("a"), Point::new(-200.0, 0.0));
		positions.insert(NodeId::from("b"), Point::new(200.0, 160.0));
		let mut vp = Viewport::default();
		vp.fit(&positions, 520.0, 1000.0, &ViewportConfig::default());
		// Padded content is 520 x 280, so width is the limiting axis.
		assert!(approx(vp.scale, 1.0));
		assert!(approx(vp.x, 260.0));
		assert!(approx(vp.y, 500.0 - 80.0));
	}

	#[test]
	fn fit_on_empty_canvas_keeps_zoom_usable() {
		let config = ViewportConfig::default();
		let mut positions = Positions::new();
		positions.insert(NodeId::from("a"), Point::new(-200.0, 0.0));
		positions.insert(NodeId::from("b"), Point::new(200.0, 160.0));

		let mut vp = Viewport::default();
		vp.fit(&positions, 0.0, 0.0, &config);
		assert_eq!(vp, Viewport { x: 0.0, y: 0.0, scale: 1.0 });
		vp.zoom_at(10.0, 10.0, 2.0, &config);
		assert!(vp.x.is_finite() && vp.y.is_finite());

		vp.fit(&positions, 1.0, 1.0, &config);
		assert!(approx(vp.scale, config.min_scale));

		let mut broken = Viewport { x: 0.0, y: 0.0, scale: 0.0 };
		broken.zoom_at(5.0, 5.0, 2.0, &config);
		assert!(broken.x.is_finite() && approx(broken.scale, 2.0));
	}

	#[test]
	fn fit_never_exceeds_max_scale() {
		let mut positions = Positions::new();
		positions.insert(NodeId::from("a"), Point::new(0.0, 0.0));
		positions.insert(NodeId::from("b"), Point::new(0.0, 160.0));
		let mut vp = Viewport::default();
		vp.fit(&positions, 4000.0, 4000.0, &ViewportConfig::default());
		assert!(approx(vp.scale, 1.5));
	}

	#[test]
	fn zoom_keeps_cursor_point_fixed() {
		let config = ViewportConfig::default();
		let mut vp = Viewport {
			x: 400.0,
			y: 300.0,
			scale: 1.0,
		};
		let before = vp.screen_to_world(500.0, 350.0);
		vp.zoom_at(500.0, 350.0, 2.0, &config);
		let after = vp.screen_to_world(500.0, 350.0);
		assert!(approx(vp.scale, 2.0));
		assert!(approx(before.x, after.x) && approx(before.y, after.y));

		vp.zoom_at(0.0, 0.0, 100.0, &config);
		assert!(approx(vp.scale, 4.0));
		vp.zoom_at(0.0, 0.0, 0.0001, &config);
		assert!(approx(vp.scale, 0.1));
		vp.reset_zoom();
		assert_eq!(vp.scale, 1.0);
	}

	#[test]
	fn world_screen_round_trip() {
		let vp = Viewport {
			x: 10.0,
			y: -20.0,
			scale: 0.5,
		};
		let (sx, sy) = vp.world_to_screen(Point::new(100.0, 40.0));
		assert_eq!(vp.screen_to_world(sx, sy), Point::new(100.0, 40.0));
	}

	#[test]
	fn pan_follows_pointer_only_while_active() {
		let mut vp = Viewport::default();
		let mut pan = PanState::default();
		pan.drag_to(50.0, 50.0, &mut vp);
		assert_eq!(vp, Viewport::default());

		pan.begin(100.0, 100.0, &vp);
		pan.drag_to(130.0, 90.0, &mut vp);
		assert_eq!((vp.x, vp.y), (30.0, -10.0));
		pan.end();
		pan.drag_to(0.0, 0.0, &mut vp);
		assert_eq!((vp.x, vp.y), (30.0, -10.0));
	}
}
