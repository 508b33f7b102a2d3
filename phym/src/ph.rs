//! Classifies a color against the fixed pH color scale

use palette::Srgb;
use std::fmt::{self, Display};

/// The five bands of the pH scale, from most acidic to most alkaline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhBand {
	/// pH below 3
	StrongAcid,
	/// pH 3 to 6
	WeakAcid,
	/// pH 7
	Neutral,
	/// pH 8 to 11
	WeakAlkali,
	/// pH above 11
	StrongAlkali,
}

impl Display for PhBand {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let name = match self {
			PhBand::StrongAcid => "strong acid",
			PhBand::WeakAcid => "weak acid",
			PhBand::Neutral => "neutral",
			PhBand::WeakAlkali => "weak alkali",
			PhBand::StrongAlkali => "strong alkali",
		};
		f.write_str(name)
	}
}

/// A reference color on the pH scale and the description of its band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhLevel {
	/// The band this reference color stands for
	pub band: PhBand,
	/// The reference color
	pub color: Srgb<u8>,
	/// A human readable description of the band
	pub description: &'static str,
}

impl PhLevel {
	/// Euclidean distance between `color` and this level's reference color in RGB space
	#[must_use]
	pub fn distance(&self, color: Srgb<u8>) -> f64 {
		let dr = f64::from(color.red) - f64::from(self.color.red);
		let dg = f64::from(color.green) - f64::from(self.color.green);
		let db = f64::from(color.blue) - f64::from(self.color.blue);
		(dr * dr + dg * dg + db * db).sqrt()
	}
}

/// The pH color scale.
///
/// The order of this array breaks ties in [`classify`].
pub static LEVELS: [PhLevel; 5] = [
	PhLevel {
		band: PhBand::StrongAcid,
		color: Srgb::new(255, 0, 0),
		description: "Strong Acid (<3) -- Grapefruit juice, soda, lemon juice, vinegar and battery acid.",
	},
	PhLevel {
		band: PhBand::WeakAcid,
		color: Srgb::new(255, 215, 0),
		description: "Weak Acid (3 - 6) -- Milk urine, saliva, and black coffee.",
	},
	PhLevel {
		band: PhBand::Neutral,
		color: Srgb::new(0, 255, 0),
		description: "Neutral (7) -- Blood",
	},
	PhLevel {
		band: PhBand::WeakAlkali,
		color: Srgb::new(0, 0, 255),
		description: "Weak alkali (8-11) -- Sea water baking soda, and ammonia.",
	},
	PhLevel {
		band: PhBand::StrongAlkali,
		color: Srgb::new(148, 0, 211),
		description: "Strong alkali (>11) -- Bleaches, oven cleaner, lye, and liquid drain cleaner.",
	},
];

/// Returns the level in [`LEVELS`] whose reference color is closest to `color`.
///
/// If several levels are equally close, the one that comes first in [`LEVELS`] is returned.
#[must_use]
pub fn classify(color: Srgb<u8>) -> &'static PhLevel {
	let mut nearest = &LEVELS[0];
	let mut min_dist = nearest.distance(color);

	for level in &LEVELS[1..] {
		let dist = level.distance(color);
		if dist < min_dist {
			min_dist = dist;
			nearest = level;
		}
	}

	nearest
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reference_colors_classify_as_themselves() {
		for level in &LEVELS {
			assert_eq!(classify(level.color), level);
		}
	}

	#[test]
	fn pure_red_is_strong_acid() {
		let level = classify(Srgb::new(255, 0, 0));
		assert_eq!(level.band, PhBand::StrongAcid);
		assert_eq!(level.color, Srgb::new(255, 0, 0));
		assert_eq!(
			level.description,
			"Strong Acid (<3) -- Grapefruit juice, soda, lemon juice, vinegar and battery acid."
		);
	}

	#[test]
	#[allow(clippy::float_cmp)]
	fn pure_green_is_neutral() {
		let level = classify(Srgb::new(0, 255, 0));
		assert_eq!(level.band, PhBand::Neutral);
		assert_eq!(level.description, "Neutral (7) -- Blood");
		assert_eq!(level.distance(Srgb::new(0, 255, 0)), 0.0);
	}

	#[test]
	fn gray_is_deterministic() {
		let gray = Srgb::new(128, 128, 128);
		let first = classify(gray);
		for _ in 0..16 {
			assert_eq!(classify(gray), first);
		}
		assert_eq!(first.band, PhBand::StrongAlkali);
	}

	#[test]
	#[allow(clippy::float_cmp)]
	fn equidistant_color_picks_earlier_level() {
		// (0, 128, 128) is exactly as far from neutral green as from weak alkali blue
		let color = Srgb::new(0, 128, 128);
		let neutral = &LEVELS[2];
		let weak_alkali = &LEVELS[3];
		assert_eq!(neutral.distance(color), weak_alkali.distance(color));
		assert_eq!(classify(color).band, PhBand::Neutral);
	}

	#[test]
	fn every_color_maps_to_a_nearest_level() {
		for r in (0..=u8::MAX).step_by(15) {
			for g in (0..=u8::MAX).step_by(15) {
				for b in (0..=u8::MAX).step_by(15) {
					let color = Srgb::new(r, g, b);
					let level = classify(color);
					assert!(LEVELS.contains(level));
					let dist = level.distance(color);
					assert!(LEVELS.iter().all(|other| dist <= other.distance(color)));
				}
			}
		}
	}

	#[test]
	fn yellow_orange_is_weak_acid() {
		assert_eq!(classify(Srgb::new(240, 200, 40)).band, PhBand::WeakAcid);
	}

	#[test]
	fn purple_is_strong_alkali() {
		assert_eq!(classify(Srgb::new(130, 20, 190)).band, PhBand::StrongAlkali);
	}
}
