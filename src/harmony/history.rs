//! Bounded, most-recent-first log of created colors.

use std::collections::VecDeque;

use log::debug;
use serde::{Deserialize, Serialize};

use super::types::now_millis;

/// Default number of retained entries.
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// One history record. Entries are never edited after insertion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
	/// Upper-case `#RRGGBB`.
	pub hex: String,
	/// Rule name, or `root` for seeds.
	pub rule: String,
	/// Unix milliseconds.
	pub timestamp: i64,
}

/// Newest-first log, trimmed from the tail when over capacity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct History {
	entries: VecDeque<HistoryEntry>,
	capacity: usize,
}

impl History {
	/// Empty log keeping at most `capacity` entries.
	pub fn new(capacity: usize) -> Self {
		Self {
			entries: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
			capacity,
		}
	}

	/// Rebuild from stored entries (newest first), dropping anything past capacity.
	pub fn from_entries(entries: Vec<HistoryEntry>, capacity: usize) -> Self {
		let mut history = Self {
			entries: entries.into(),
			capacity,
		};
		history.trim();
		history
	}

	/// Record a color at the current time.
	pub fn push(&mut self, hex: &str, rule: &str) {
		self.push_entry(HistoryEntry {
			hex: hex.to_uppercase(),
			rule: rule.to_string(),
			timestamp: now_millis(),
		});
	}

	/// Record an already-built entry as the newest.
	pub fn push_entry(&mut self, entry: HistoryEntry) {
		self.entries.push_front(entry);
		self.trim();
	}

	fn trim(&mut self) {
		if self.entries.len() > self.capacity {
			debug!(
				"harmony-tree: history trimmed {} entries",
				self.entries.len() - self.capacity
			);
			self.entries.truncate(self.capacity);
		}
	}

	/// Change the capacity, evicting the oldest entries if it shrinks.
	pub fn set_capacity(&mut self, capacity: usize) {
		self.capacity = capacity;
		self.trim();
	}

	/// Maximum number of retained entries.
	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// Number of retained entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether nothing has been recorded.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Drop every entry; capacity is kept.
	pub fn clear(&mut self) {
		self.entries.clear();
	}

	/// Entry at `index`, 0 being the newest.
	pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
		self.entries.get(index)
	}

	/// All entries, newest first.
	pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
		self.entries.iter()
	}

	/// The `n` newest entries, for display.
	pub fn recent(&self, n: usize) -> impl Iterator<Item = &HistoryEntry> {
		self.entries.iter().take(n)
	}

	/// Owned copy, newest first.
	pub fn to_vec(&self) -> Vec<HistoryEntry> {
		self.entries.iter().cloned().collect()
	}
}

impl Default for History {
	fn default() -> Self {
		Self::new(DEFAULT_HISTORY_CAPACITY)
	}
}
