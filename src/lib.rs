//! harmony-tree: explore color harmonies as a derivation tree.
//!
//! Seed a root color, branch it with harmony rules (complementary, triad,
//! tint, ...), curate the results and export the adopted palette. Rendering
//! is left to the host; this crate provides the model, layout coordinates
//! and viewport math.

pub mod cli;
pub mod harmony;

pub use harmony::{ColorNode, ColorTree, ExplorerConfig, ExplorerError, NodeId, NodeState, Rule, Session, Snapshot};

/// Initialize logging and panic hooks for the WASM target.
#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
	let _ = console_log::init_with_level(log::Level::Debug);
	console_error_panic_hook::set_once();
	log::info!("harmony-tree: logging initialized");
}

/// Initialize logging to stderr, filtered by `RUST_LOG` (default `info`).
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.try_init();
	log::debug!("harmony-tree: logging initialized");
}
