//! Palette exporters: CSS/SCSS variable blocks, a JSON color list and the
//! card geometry for a palette image.
//!
//! Exporters take a node list and produce data; writing files, encoding
//! images and offering downloads are left to the caller.

use std::collections::HashMap;

use serde::Serialize;

use super::color::{Hsl, Rgb};
use super::error::Result;
use super::tree::ColorTree;
use super::types::{ColorNode, NodeState};

/// Version of the exported palette JSON document.
pub const PALETTE_FORMAT_VERSION: u32 = 1;

/// Filename stem for a palette image of [`palette_nodes`].
pub const PALETTE_FILE_STEM: &str = "harmony-tree-palette";
/// Filename stem for a palette image of adopted colors only.
pub const ADOPTED_FILE_STEM: &str = "harmony-tree-adopted";
/// Filename stem for CSS/SCSS variable files.
pub const COLORS_FILE_STEM: &str = "harmony-tree-colors";

/// Which nodes an export covers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportScope {
	/// Every node.
	All,
	/// Only adopted nodes.
	#[default]
	Adopted,
}

impl ExportScope {
	/// Nodes in scope, in insertion order.
	pub fn select(self, tree: &ColorTree) -> Vec<&ColorNode> {
		match self {
			ExportScope::All => tree.nodes().iter().collect(),
			ExportScope::Adopted => tree.adopted(),
		}
	}
}

/// Adopted nodes if there are any, otherwise every node ordered by depth.
pub fn palette_nodes(tree: &ColorTree) -> Vec<&ColorNode> {
	let adopted = tree.with_state(NodeState::Adopted);
	if !adopted.is_empty() {
		return adopted;
	}
	let mut all: Vec<_> = tree.nodes().iter().collect();
	all.sort_by_key(|node| node.depth);
	all
}

/// Variable names `<rule><n>`, numbering each rule from 1 in list order.
fn variable_names<'a>(nodes: &[&'a ColorNode]) -> Vec<(String, &'a ColorNode)> {
	let mut counters: HashMap<&str, usize> = HashMap::new();
	nodes
		.iter()
		.map(|&node| {
			let rule = node.derivation.rule_name();
			let n = counters.entry(rule).or_insert(0);
			*n += 1;
			(format!("{rule}{n}"), node)
		})
		.collect()
}

/// A `:root { --color-<rule><n>: <hex>; }` block.
pub fn css_variables(nodes: &[&ColorNode]) -> String {
	let body: Vec<String> = variable_names(nodes)
		.into_iter()
		.map(|(name, node)| format!("  --color-{name}: {};", node.hex))
		.collect();
	format!(":root {{\n{}\n}}\n", body.join("\n"))
}

/// `$color-<rule><n>: <hex>;` lines.
pub fn scss_variables(nodes: &[&ColorNode]) -> String {
	variable_names(nodes)
		.into_iter()
		.map(|(name, node)| format!("$color-{name}: {};\n", node.hex))
		.collect()
}

/// One color in the JSON palette document.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PaletteColor {
	/// Rule that produced the color (`root` for the seed).
	pub rule: String,
	/// Upper-case `#RRGGBB`.
	pub hex: String,
	/// Channel values.
	pub rgb: Rgb,
	/// Integer HSL values.
	pub hsl: Hsl,
}

/// `{version, colors}` palette document.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PaletteDocument {
	/// Always [`PALETTE_FORMAT_VERSION`].
	pub version: u32,
	/// Colors in export order.
	pub colors: Vec<PaletteColor>,
}

impl PaletteDocument {
	/// Document for `nodes`, in order.
	pub fn new(nodes: &[&ColorNode]) -> Self {
		Self {
			version: PALETTE_FORMAT_VERSION,
			colors: nodes
				.iter()
				.map(|node| PaletteColor {
					rule: node.derivation.rule_name().to_string(),
					hex: node.hex.clone(),
					rgb: node.rgb,
					hsl: node.hsl,
				})
				.collect(),
		}
	}
}

/// Pretty-printed palette JSON.
pub fn palette_json(nodes: &[&ColorNode]) -> Result<String> {
	Ok(serde_json::to_string_pretty(&PaletteDocument::new(nodes))?)
}

/// Axis-aligned rectangle in image pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Rect {
	/// Left edge.
	pub x: f64,
	/// Top edge.
	pub y: f64,
	/// Width in pixels.
	pub width: f64,
	/// Height in pixels.
	pub height: f64,
}

/// A single color card on the palette sheet.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PaletteCard {
	/// Card outline.
	pub card: Rect,
	/// Filled color area inside the card.
	pub swatch: Rect,
	/// Hex label.
	pub hex: String,
	/// Rule label.
	pub rule: String,
}

/// Grid geometry for a palette image: a title header above cards laid out
/// row by row.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PaletteSheet {
	/// Image width.
	pub width: f64,
	/// Image height, including the header.
	pub height: f64,
	/// Cards per row.
	pub columns: usize,
	/// Number of rows.
	pub rows: usize,
	/// Cards in node order.
	pub cards: Vec<PaletteCard>,
}

impl PaletteSheet {
	/// Card width.
	pub const CARD_WIDTH: f64 = 200.0;
	/// Card height.
	pub const CARD_HEIGHT: f64 = 140.0;
	/// Gap between cards and around the grid.
	pub const PADDING: f64 = 24.0;
	/// Title area above the grid.
	pub const HEADER_HEIGHT: f64 = 100.0;
	const SWATCH_INSET: f64 = 12.0;
	const LABEL_SPACE: f64 = 60.0;

	/// Lay the nodes out on a near-square grid. Empty input gives an empty sheet.
	pub fn layout(nodes: &[&ColorNode]) -> Self {
		let count = nodes.len();
		if count == 0 {
			return Self {
				width: 0.0,
				height: 0.0,
				columns: 0,
				rows: 0,
				cards: Vec::new(),
			};
		}

		let columns = count.min((count as f64).sqrt().ceil() as usize);
		let rows = count.div_ceil(columns);
		let width = columns as f64 * Self::CARD_WIDTH + (columns + 1) as f64 * Self::PADDING;
		let height =
			rows as f64 * Self::CARD_HEIGHT + (rows + 1) as f64 * Self::PADDING + Self::HEADER_HEIGHT;

		let cards = nodes
			.iter()
			.enumerate()
			.map(|(i, node)| {
				let (col, row) = ((i % columns) as f64, (i / columns) as f64);
				let x = col * Self::CARD_WIDTH + (col + 1.0) * Self::PADDING;
				let y = row * Self::CARD_HEIGHT + (row + 1.0) * Self::PADDING + Self::HEADER_HEIGHT;
				PaletteCard {
					card: Rect {
						x,
						y,
						width: Self::CARD_WIDTH,
						height: Self::CARD_HEIGHT,
					},
					swatch: Rect {
						x: x + Self::SWATCH_INSET,
						y: y + Self::SWATCH_INSET,
						width: Self::CARD_WIDTH - 2.0 * Self::SWATCH_INSET,
						height: Self::CARD_HEIGHT - Self::LABEL_SPACE,
					},
					hex: node.hex.clone(),
					rule: node.derivation.rule_name().to_string(),
				}
			})
			.collect();

		Self {
			width,
			height,
			columns,
			rows,
			cards,
		}
	}
}
