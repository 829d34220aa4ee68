//! Color harmony derivation tree.
//!
//! A root color is expanded by classical harmony rules into a tree of
//! candidate colors that can be adopted or rejected, laid out top-down and
//! exported as palettes.

mod color;
mod config;
mod error;
mod export;
mod history;
mod layout;
mod rules;
mod session;
mod snapshot;
mod tree;
mod types;
mod viewport;

pub use color::{Hsl, Rgb, hex_to_rgb, hsl_to_rgb, is_valid_hex, normalize_hex, rgb_to_hex, rgb_to_hsl};
pub use config::{DEFAULT_MAX_DEPTH, ExplorerConfig};
pub use error::{ExplorerError, Result};
pub use export::{
	ADOPTED_FILE_STEM, COLORS_FILE_STEM, ExportScope, PALETTE_FILE_STEM, PALETTE_FORMAT_VERSION, PaletteCard,
	PaletteColor, PaletteDocument, PaletteSheet, Rect, css_variables, palette_json, palette_nodes, scss_variables,
};
pub use history::{DEFAULT_HISTORY_CAPACITY, History, HistoryEntry};
pub use layout::{Bounds, LayoutConfig, Point, Positions, bounds, compute_positions};
pub use rules::{Rule, RuleParams, rotate_hue};
pub use session::Session;
pub use snapshot::{JsonFileSink, MIN_COMPATIBLE_VERSION, SNAPSHOT_VERSION, Snapshot, SnapshotSink};
pub use tree::{ColorTree, TreeStats};
pub use types::{ColorNode, Derivation, Edge, NodeId, NodeState};
pub use viewport::{PanState, Viewport, ViewportConfig};
