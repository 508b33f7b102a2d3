//! Specifies the CLI and handles arg parsing

use clap::{Parser, ValueEnum};
use std::{
	fmt::{Debug, Display},
	ops::RangeBounds,
	path::PathBuf,
	str::FromStr,
};

/// Supported output formats for the dominant and reference colors
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatOutput {
	/// sRGB hexcode
	Hex,
	/// sRGB (r,g,b) triple
	Rgb,
	/// Whitespace with true color background
	Swatch,
}

/// Ways to colorize the output text
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorizeOutput {
	/// Foreground
	Fg,
	/// Background
	Bg,
}

/// pHym -- a simple pH meter through image processing.
///
/// Finds the dominant color of an image with k-means clustering
/// and reports where that color falls on the pH color scale.
///
/// Written by Angel Bruce G. Jimenez and Aliah Casabuena, 2019.
#[derive(Parser)]
#[command(version)]
pub struct Options {
	/// The path to the input image (JPEG or PNG)
	pub image: PathBuf,

	/// The format to print the dominant and reference colors in
	#[arg(short, long, default_value = "hex")]
	pub output: FormatOutput,

	/// Color the foreground or background of the printed colors
	#[arg(short, long)]
	pub colorize: Option<ColorizeOutput>,

	/// The number of clusters used to find the dominant color
	///
	/// Must be at least 1 and at most the number of pixels in the image.
	#[arg(short, default_value_t = phym::DEFAULT_K, value_parser = parse_valid_k)]
	pub k: u8,

	/// The seed value used for the random number generator
	///
	/// A random seed is used if none is given, so repeated runs may give slightly different dominant colors.
	#[arg(long)]
	pub seed: Option<u64>,

	/// Do not print the welcome banner
	#[arg(short, long)]
	pub quiet: bool,

	/// Print additional information, such as the running time of each step and the number of k-means iterations
	#[arg(long)]
	pub verbose: bool,
}

/// Parse a value and ensure it is in the provided, valid range
fn parse_in_range<T>(s: &str, range: impl RangeBounds<T> + Debug) -> Result<T, String>
where
	T: FromStr + Display + PartialOrd,
	T::Err: Display,
{
	let value: T = s.parse().map_err(|e| format!("{e}"))?;
	if range.contains(&value) {
		Ok(value)
	} else {
		Err(format!("{value} is not in {range:?}"))
	}
}

/// Parse the number of clusters and ensure it is >= 1
fn parse_valid_k(s: &str) -> Result<u8, String> {
	parse_in_range(s, 1..=u8::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
	use super::*;
	use clap::CommandFactory;

	#[test]
	fn command_is_valid() {
		Options::command().debug_assert();
	}

	#[test]
	fn defaults() {
		let options = Options::try_parse_from(["phym", "sample.png"]).unwrap();

		assert_eq!(options.image, PathBuf::from("sample.png"));
		assert_eq!(options.output, FormatOutput::Hex);
		assert_eq!(options.colorize, None);
		assert_eq!(options.k, phym::DEFAULT_K);
		assert_eq!(options.seed, None);
		assert!(!options.quiet);
		assert!(!options.verbose);
	}

	#[test]
	fn all_options() {
		let options = Options::try_parse_from([
			"phym", "-k", "8", "--seed", "42", "-o", "swatch", "-c", "bg", "-q", "--verbose", "sample.jpeg",
		])
		.unwrap();

		assert_eq!(options.k, 8);
		assert_eq!(options.seed, Some(42));
		assert_eq!(options.output, FormatOutput::Swatch);
		assert_eq!(options.colorize, Some(ColorizeOutput::Bg));
		assert!(options.quiet);
		assert!(options.verbose);
	}

	#[test]
	fn zero_k_is_rejected() {
		assert!(Options::try_parse_from(["phym", "-k", "0", "sample.png"]).is_err());
		assert!(Options::try_parse_from(["phym", "-k", "256", "sample.png"]).is_err());
		assert!(Options::try_parse_from(["phym", "-k", "five", "sample.png"]).is_err());
	}

	#[test]
	fn image_is_required() {
		assert!(Options::try_parse_from(["phym"]).is_err());
	}

	#[test]
	fn parse_in_range_message() {
		assert_eq!(parse_valid_k("3"), Ok(3));
		assert_eq!(parse_valid_k("0"), Err("0 is not in 1..=255".to_owned()));
	}
}
