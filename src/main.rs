//! Command-line entrypoint.

// Bin target reuses lib deps, silence noisy lint.
#![allow(unused_crate_dependencies)]

use clap::Parser;
use harmony_tree::cli::{Args, run};
use harmony_tree::init_logging;

fn main() -> anyhow::Result<()> {
	init_logging();
	run(Args::parse())
}
