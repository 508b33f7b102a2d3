//! A simple pH meter through image processing.
//!
//! Finds the dominant color of an image and prints where it falls on the pH color scale.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
	clippy::pedantic,
	clippy::cargo,
	clippy::use_debug,
	clippy::dbg_macro,
	clippy::todo,
	clippy::unimplemented,
	clippy::unwrap_used,
	clippy::unwrap_in_result,
	clippy::unneeded_field_pattern,
	clippy::rest_pat_in_fully_bound_structs,
	clippy::unnecessary_self_imports,
	clippy::str_to_string,
	clippy::string_to_string,
	clippy::string_slice,
	missing_docs,
	clippy::missing_docs_in_private_items,
	rustdoc::all,
	clippy::float_cmp_const,
	clippy::lossy_float_literal
)]
#![allow(clippy::doc_markdown, clippy::module_name_repetitions, clippy::missing_panics_doc)]

mod cli;
use cli::{ColorizeOutput, FormatOutput, Options};

use std::{process::ExitCode, time::Instant};

use clap::Parser;
use colored::Colorize;
use palette::Srgb;
use phym::{PhLevel, RgbCounts};

/// Record the running time of a function and print the elapsed time
macro_rules! time {
	($name: literal, $verbose: expr, $func_call: expr) => {{
		let start = Instant::now();
		let result = $func_call;
		if $verbose {
			println!("{} took {}ms", $name, start.elapsed().as_millis());
		}
		result
	}};
}

/// Printed once at startup unless `--quiet` is given
const BANNER: &str = "--------------------
pHym -- a simple pH meter through image processing.

--------------------";

fn main() -> ExitCode {
	let options = Options::parse();

	let result = measure_and_print(&options);

	// Returning Result<_> uses Debug printing instead of Display
	if let Err(e) = result {
		eprintln!("{e}");
		ExitCode::FAILURE
	} else {
		ExitCode::SUCCESS
	}
}

/// Load the image, find its dominant color, and print the pH level it matches
fn measure_and_print(options: &Options) -> Result<(), phym::Error> {
	let Options { k, verbose, .. } = *options;

	if !options.quiet {
		println!("{BANNER}");
	}

	// Input
	let image = time!("Image loading", verbose, phym::load_image(&options.image))?;
	println!("[+] Opened '{}'", options.image.display());

	if verbose {
		println!("Image has dimensions {}x{}", image.width(), image.height());
	}

	// Processing
	let counts = time!("Preprocessing", verbose, RgbCounts::from_image(&image));

	if verbose {
		println!("Reduced image to {} unique colors", counts.num_colors());
	}

	let seed = options.seed.unwrap_or_else(phym::random_seed);

	if verbose {
		println!("Running {} trials of k-means with k = {k} and seed {seed}", phym::TRIALS);
	}

	let result = time!("k-means", verbose, phym::cluster_colors(&counts, k, seed))?;

	if verbose {
		println!(
			"Best trial took {} iterations with compactness {:.2}",
			result.iterations, result.compactness
		);
		println!("Pixels per cluster: {:?}", result.counts);
	}

	// at least one centroid has pixels once k is valid
	let dominant = result.dominant_color().ok_or(phym::Error::InvalidParameter {
		k,
		pixels: counts.num_pixels(),
	})?;

	// Output
	print_reading(dominant, phym::classify(dominant), options);

	Ok(())
}

/// Print the dominant color, its reference color, and the description of the matched pH level
fn print_reading(dominant: Srgb<u8>, level: &PhLevel, options: &Options) {
	println!(
		"Dominant {} -> Reference {} ({})",
		color_text(dominant, options),
		color_text(level.color, options),
		level.band
	);
	println!("{}", level.description);
}

/// Format a color without any terminal styling
fn format_color(color: Srgb<u8>, output: FormatOutput) -> String {
	match output {
		FormatOutput::Hex => format!("#{color:X}"),
		FormatOutput::Rgb => format!("({},{},{})", color.red, color.green, color.blue),
		FormatOutput::Swatch => "   ".to_owned(),
	}
}

/// Format and colorize a color based off the provided options
fn color_text(color: Srgb<u8>, options: &Options) -> String {
	let text = format_color(color, options.output);

	if options.output == FormatOutput::Swatch {
		return text.on_truecolor(color.red, color.green, color.blue).to_string();
	}

	match options.colorize {
		Some(ColorizeOutput::Fg) => text.truecolor(color.red, color.green, color.blue).to_string(),
		Some(ColorizeOutput::Bg) => text.on_truecolor(color.red, color.green, color.blue).to_string(),
		None => text,
	}
}
