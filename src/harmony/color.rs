//! Conversions between hex strings, RGB triples and HSL triples.
//!
//! Hex is the source of truth for every node; RGB and HSL are cached views
//! derived from it. HSL is quantized to integer degrees and percents, so a
//! hex -> rgb -> hsl -> rgb -> hex round trip is not exact. Achromatic colors
//! come back within one unit per channel; saturated colors can drift a few
//! units because hue and saturation are rounded as well.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 8-bit RGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
}

impl Rgb {
	/// Color from its three channels.
	pub const fn new(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b }
	}

	/// Canonical `#RRGGBB` form (upper-case).
	pub fn to_hex(self) -> String {
		format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
	}

	/// Integer HSL view of this color.
	pub fn to_hsl(self) -> Hsl {
		rgb_to_hsl(self)
	}

	/// CSS functional notation, e.g. `rgb(51, 102, 204)`.
	pub fn to_css(self) -> String {
		format!("rgb({}, {}, {})", self.r, self.g, self.b)
	}

	/// Largest per-channel difference between two colors.
	pub fn max_channel_delta(self, other: Rgb) -> u8 {
		[
			self.r.abs_diff(other.r),
			self.g.abs_diff(other.g),
			self.b.abs_diff(other.b),
		]
		.into_iter()
		.max()
		.unwrap_or(0)
	}
}

/// Integer HSL: hue in degrees, saturation and lightness in percent.
///
/// Hue is nominally `0..360`, but rounding can produce exactly 360, which is
/// equivalent to 0. All hue arithmetic in the rules wraps modulo 360.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hsl {
	/// Hue in degrees, `0..=360`.
	pub h: u16,
	/// Saturation percent.
	pub s: u8,
	/// Lightness percent.
	pub l: u8,
}

impl Hsl {
	/// Color from hue degrees and saturation/lightness percents.
	pub const fn new(h: u16, s: u8, l: u8) -> Self {
		Self { h, s, l }
	}

	/// Nearest RGB color.
	pub fn to_rgb(self) -> Rgb {
		hsl_to_rgb(self)
	}

	/// CSS functional notation, e.g. `hsl(220, 60%, 50%)`.
	pub fn to_css(self) -> String {
		format!("hsl({}, {}%, {}%)", self.h, self.s, self.l)
	}
}

impl fmt::Display for Rgb {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_css())
	}
}

impl fmt::Display for Hsl {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_css())
	}
}

/// Returns true for exactly six hex digits with an optional leading `#`.
pub fn is_valid_hex(input: &str) -> bool {
	let digits = input.strip_prefix('#').unwrap_or(input);
	digits.len() == 6 && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Parse a 6-digit hex color, case-insensitive, optional `#`.
pub fn hex_to_rgb(input: &str) -> Option<Rgb> {
	if !is_valid_hex(input) {
		return None;
	}
	let digits = input.strip_prefix('#').unwrap_or(input);
	let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
	Some(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}

/// Validate and canonicalize to upper-case `#RRGGBB`.
pub fn normalize_hex(input: &str) -> Option<String> {
	hex_to_rgb(input).map(Rgb::to_hex)
}

/// Format fractional channels as `#RRGGBB`.
///
/// Channels are rounded to the nearest integer and clamped to `0..=255`, so
/// out-of-range input saturates instead of producing malformed hex.
pub fn rgb_to_hex(r: f64, g: f64, b: f64) -> String {
	Rgb::new(to_channel(r), to_channel(g), to_channel(b)).to_hex()
}

fn to_channel(value: f64) -> u8 {
	value.round().clamp(0.0, 255.0) as u8
}

/// Standard RGB -> HSL with each component rounded to an integer.
pub fn rgb_to_hsl(rgb: Rgb) -> Hsl {
	let r = rgb.r as f64 / 255.0;
	let g = rgb.g as f64 / 255.0;
	let b = rgb.b as f64 / 255.0;

	let max = r.max(g).max(b);
	let min = r.min(g).min(b);
	let l = (max + min) / 2.0;

	let (h, s) = if max == min {
		(0.0, 0.0)
	} else {
		let d = max - min;
		let s = if l > 0.5 {
			d / (2.0 - max - min)
		} else {
			d / (max + min)
		};
		let h = if max == r {
			(g - b) / d + if g < b { 6.0 } else { 0.0 }
		} else if max == g {
			(b - r) / d + 2.0
		} else {
			(r - g) / d + 4.0
		};
		(h / 6.0, s)
	};

	Hsl {
		h: (h * 360.0).round() as u16,
		s: (s * 100.0).round() as u8,
		l: (l * 100.0).round() as u8,
	}
}

/// Standard HSL -> RGB with each channel rounded to an integer.
pub fn hsl_to_rgb(hsl: Hsl) -> Rgb {
	let h = hsl.h as f64 / 360.0;
	let s = hsl.s.min(100) as f64 / 100.0;
	let l = hsl.l.min(100) as f64 / 100.0;

	let a = s * l.min(1.0 - l);
	let f = |n: f64| {
		let k = (n + h * 12.0) % 12.0;
		l - a * (k - 3.0).min(9.0 - k).min(1.0).max(-1.0)
	};

	Rgb::new(
		to_channel(f(0.0) * 255.0),
		to_channel(f(8.0) * 255.0),
		to_channel(f(4.0) * 255.0),
	)
}
