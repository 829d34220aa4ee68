//! Color-theory derivation rules.
//!
//! Each rule is a pure function of the base node's HSL. Hue arithmetic wraps
//! modulo 360; saturation and lightness arithmetic clamps to the bounds listed
//! per rule. The produced nodes are not inserted anywhere: the tree decides
//! whether and where they go.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::color::Hsl;
use super::error::ExplorerError;
use super::types::{ColorNode, Derivation};

/// The eight named derivation rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rule {
	/// Two neighbours at `h ± delta`.
	Analogous,
	/// The opposite hue.
	Complementary,
	/// The two hues either side of the complement.
	Split,
	/// Two hues a third of the wheel apart.
	Triad,
	/// Three hues a quarter of the wheel apart.
	Tetrad,
	/// Three progressively lighter steps.
	Tint,
	/// Three progressively darker steps.
	Shade,
	/// Three progressively greyer steps.
	Tone,
}

impl Rule {
	/// Every rule, in menu order.
	pub const ALL: [Rule; 8] = [
		Rule::Analogous,
		Rule::Complementary,
		Rule::Split,
		Rule::Triad,
		Rule::Tetrad,
		Rule::Tint,
		Rule::Shade,
		Rule::Tone,
	];

	/// Lower-case name used in history, exports and parsing.
	pub fn name(self) -> &'static str {
		match self {
			Rule::Analogous => "analogous",
			Rule::Complementary => "complementary",
			Rule::Split => "split",
			Rule::Triad => "triad",
			Rule::Tetrad => "tetrad",
			Rule::Tint => "tint",
			Rule::Shade => "shade",
			Rule::Tone => "tone",
		}
	}

	/// Number of children one application produces.
	pub fn child_count(self) -> usize {
		match self {
			Rule::Complementary => 1,
			Rule::Analogous | Rule::Split | Rule::Triad => 2,
			Rule::Tetrad | Rule::Tint | Rule::Shade | Rule::Tone => 3,
		}
	}

	/// Apply this rule to `base`, returning fresh pending children.
	pub fn derive(self, base: &ColorNode, params: &RuleParams) -> Vec<ColorNode> {
		self.derive_hsl(base.hsl, params)
			.into_iter()
			.map(|(hsl, derivation)| ColorNode::child_of(base, hsl.to_rgb(), derivation))
			.collect()
	}

	/// Target colors and provenance for each child, in generation order.
	pub fn derive_hsl(self, base: Hsl, params: &RuleParams) -> Vec<(Hsl, Derivation)> {
		let rotate = |offset: i32| Hsl { h: rotate_hue(base.h, offset), ..base };
		let steps = 1..=3u8;

		match self {
			Rule::Analogous => [params.analogous_delta.saturating_neg(), params.analogous_delta]
				.into_iter()
				.map(|delta| (rotate(delta), Derivation::Analogous { delta }))
				.collect(),
			Rule::Complementary => vec![(rotate(180), Derivation::Complementary {})],
			Rule::Split => [180i32.saturating_sub(params.split_delta), 180i32.saturating_add(params.split_delta)]
				.into_iter()
				.map(|offset| (rotate(offset), Derivation::Split { offset }))
				.collect(),
			Rule::Triad => [120, 240]
				.into_iter()
				.map(|offset| (rotate(offset), Derivation::Triad { offset }))
				.collect(),
			Rule::Tetrad => [90, 180, 270]
				.into_iter()
				.map(|offset| (rotate(offset), Derivation::Tetrad { offset }))
				.collect(),
			Rule::Tint => steps
				.map(|step| {
					let i = step as i32;
					let hsl = Hsl {
						h: base.h,
						s: clamp_percent((base.s as i32 - 5 * i).max(10)),
						l: clamp_percent((base.l as i32 + 15 * i).min(95)),
					};
					(hsl, Derivation::Tint { step })
				})
				.collect(),
			Rule::Shade => steps
				.map(|step| {
					let i = step as i32;
					let hsl = Hsl {
						h: base.h,
						s: clamp_percent((base.s as i32 + 3 * i).min(100)),
						l: clamp_percent((base.l as i32 - 15 * i).max(5)),
					};
					(hsl, Derivation::Shade { step })
				})
				.collect(),
			Rule::Tone => steps
				.map(|step| {
					let i = step as i32;
					let hsl = Hsl {
						s: clamp_percent((base.s as i32 - 20 * i).max(5)),
						..base
					};
					(hsl, Derivation::Tone { step })
				})
				.collect(),
		}
	}
}

impl fmt::Display for Rule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for Rule {
	type Err = ExplorerError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let wanted = s.trim().to_ascii_lowercase();
		if wanted == "split-complementary" || wanted == "split_complementary" {
			return Ok(Rule::Split);
		}
		Rule::ALL
			.into_iter()
			.find(|rule| rule.name() == wanted)
			.ok_or_else(|| ExplorerError::UnknownRule(s.to_string()))
	}
}

/// Tunable offsets for the hue-rotation rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleParams {
	/// Degrees either side of the base hue for [`Rule::Analogous`].
	pub analogous_delta: i32,
	/// Degrees either side of the complement for [`Rule::Split`].
	pub split_delta: i32,
}

impl RuleParams {
	/// Largest accepted magnitude for either offset, in degrees.
	pub const MAX_OFFSET: i32 = 360;

	/// Reject offsets outside `-360..=360`.
	pub fn validate(&self) -> Result<(), ExplorerError> {
		for (name, value) in [("analogous_delta", self.analogous_delta), ("split_delta", self.split_delta)] {
			if !(-Self::MAX_OFFSET..=Self::MAX_OFFSET).contains(&value) {
				return Err(ExplorerError::InvalidConfig(format!(
					"rules.{name} = {value} is outside -{max}..={max}",
					max = Self::MAX_OFFSET
				)));
			}
		}
		Ok(())
	}
}

impl Default for RuleParams {
	fn default() -> Self {
		Self {
			analogous_delta: 30,
			split_delta: 30,
		}
	}
}

/// Rotate a hue by `offset` degrees, wrapping into `0..360`.
pub fn rotate_hue(h: u16, offset: i32) -> u16 {
	(i64::from(h) + i64::from(offset)).rem_euclid(360) as u16
}

fn clamp_percent(value: i32) -> u8 {
	value.clamp(0, 100) as u8
}
