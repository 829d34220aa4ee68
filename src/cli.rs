//! Command-line front end: seed or load a tree, apply rules, print an export.

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use log::info;

use crate::harmony::{
	ColorTree, ExplorerConfig, JsonFileSink, NodeId, NodeState, Rule, Session, css_variables, palette_json,
	palette_nodes, scss_variables,
};

/// Output written to stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
	/// Indented outline of the tree.
	#[default]
	Tree,
	/// CSS custom properties for adopted colors.
	Css,
	/// SCSS variables for adopted colors.
	Scss,
	/// Palette JSON document.
	Json,
	/// Full session snapshot.
	Snapshot,
	/// Node coordinates, one per line.
	Layout,
	/// Recent history entries, newest first.
	History,
}

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "harmony-tree", version, about = "Branch a seed color into a harmony tree")]
pub struct Args {
	/// Root color as 6-digit hex, with or without `#`.
	#[arg(long, conflicts_with = "load")]
	pub seed: Option<String>,

	/// Restore a saved snapshot instead of seeding.
	#[arg(long)]
	pub load: Option<PathBuf>,

	/// Rule to apply to the current selection. The first new child becomes
	/// the selection for the next rule.
	#[arg(long = "rule", value_name = "RULE")]
	pub rules: Vec<String>,

	/// Mark every generated node adopted.
	#[arg(long)]
	pub adopt: bool,

	/// Depth at which branching stops.
	#[arg(long)]
	pub max_depth: Option<u32>,

	/// Number of history entries kept.
	#[arg(long)]
	pub history_capacity: Option<usize>,

	/// Number of history entries listed by `--format history`.
	#[arg(long)]
	pub history_display: Option<usize>,

	/// JSON config file; flags override its values.
	#[arg(long)]
	pub config: Option<PathBuf>,

	/// What to print.
	#[arg(long, value_enum, default_value_t = Format::Tree)]
	pub format: Format,

	/// Write the session snapshot here after every change.
	#[arg(long)]
	pub save: Option<PathBuf>,
}

impl Args {
	fn explorer_config(&self) -> Result<ExplorerConfig> {
		let mut config = match &self.config {
			Some(path) => {
				let text =
					fs::read_to_string(path).with_context(|| format!("failed to read config {}", path.display()))?;
				ExplorerConfig::from_json(&text).with_context(|| format!("failed to parse config {}", path.display()))?
			}
			None => ExplorerConfig::default(),
		};
		if let Some(max_depth) = self.max_depth {
			config.max_depth = max_depth;
		}
		if let Some(capacity) = self.history_capacity {
			config.history_capacity = capacity;
		}
		if let Some(display) = self.history_display {
			config.history_display = display;
		}
		config.validate()?;
		Ok(config)
	}
}

/// Run the CLI and return what it would print.
pub fn render(args: &Args) -> Result<String> {
	let mut session = Session::new(args.explorer_config()?);
	if let Some(path) = &args.save {
		session = session.with_sink(JsonFileSink::new(path));
	}

	match (&args.seed, &args.load) {
		(Some(seed), _) => {
			session.set_root(seed).context("invalid seed color")?;
		}
		(None, Some(path)) => {
			let text =
				fs::read_to_string(path).with_context(|| format!("failed to read snapshot {}", path.display()))?;
			session
				.load_json(&text)
				.with_context(|| format!("failed to load snapshot {}", path.display()))?;
		}
		(None, None) => bail!("either --seed or --load is required"),
	}

	for name in &args.rules {
		let rule: Rule = name.parse()?;
		let ids = session
			.generate_branch(rule)
			.with_context(|| format!("failed to apply {rule}"))?;
		if args.adopt {
			for id in &ids {
				session.set_node_state(id, NodeState::Adopted)?;
			}
		}
		if let Some(first) = ids.first() {
			session.select_node(Some(first))?;
		}
	}
	info!("harmony-tree: {} nodes", session.tree().len());

	Ok(match args.format {
		Format::Tree => outline(session.tree()),
		Format::Css => css_variables(&session.tree().adopted()),
		Format::Scss => scss_variables(&session.tree().adopted()),
		Format::Json => palette_json(&palette_nodes(session.tree()))?,
		Format::Snapshot => session.snapshot().to_json()?,
		Format::Layout => {
			let positions = session.positions();
			let mut out = String::new();
			for node in session.tree().nodes() {
				if let Some(p) = positions.get(&node.id) {
					let _ = writeln!(out, "{} {} {} {}", node.id, node.hex, p.x, p.y);
				}
			}
			out
		}
		Format::History => {
			let history = session.tree().history();
			let mut out = String::new();
			for entry in history.recent(session.config().history_display) {
				let _ = writeln!(out, "{} {} {}", entry.hex, entry.rule, entry.timestamp);
			}
			out
		}
	})
}

/// Entry point for the binary.
pub fn run(args: Args) -> Result<()> {
	print!("{}", render(&args)?);
	Ok(())
}

fn outline(tree: &ColorTree) -> String {
	let mut out = String::new();
	if let Some(root) = tree.root_id() {
		outline_node(tree, root, &mut out);
	}
	out
}

fn outline_node(tree: &ColorTree, id: &NodeId, out: &mut String) {
	let Some(node) = tree.node(id) else {
		return;
	};
	let marker = if tree.selected_id() == Some(id) { "*" } else { " " };
	let _ = writeln!(
		out,
		"{}{marker}{} {} [{}] {}",
		"  ".repeat(node.depth as usize),
		node.hex,
		node.derivation.rule_name(),
		node.state,
		node.hsl.to_css()
	);
	for child in tree.children(id) {
		outline_node(tree, &child.id, out);
	}
}
