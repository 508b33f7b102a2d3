//! Estimate the pH band of a sample from a photograph.
//!
//! The dominant color of the image is found with k-means clustering in RGB space,
//! and that color is then matched to the closest reference color on a fixed pH color scale.
//!
//! # Examples
//!
//! ## Measure the pH band of an image.
//!
//! ```no_run
//! let reading = phym::measure("litmus.png")?;
//! println!("{}", reading.level.description);
//! # Ok::<(), phym::Error>(())
//! ```
//!
//! ## Reproducible results.
//!
//! Initial centroids are picked at random, so use a fixed seed to get the same result every time.
//!
//! ```no_run
//! let color = phym::extract_dominant_color_seeded("litmus.png", phym::DEFAULT_K, 42)?;
//! let level = phym::classify(color);
//! # Ok::<(), phym::Error>(())
//! ```
//!
//! ## Run each step separately.
//!
//! ```no_run
//! let image = phym::load_image("litmus.png")?;
//! let counts = phym::RgbCounts::from_image(&image);
//! let result = phym::cluster_colors(&counts, phym::DEFAULT_K, 0)?;
//! let dominant = result.dominant_color();
//! # Ok::<(), phym::Error>(())
//! ```
//!
//! # Clustering
//!
//! Each image is reduced to its distinct colors and the number of pixels of each color,
//! so clustering weighs every pixel the same as clustering the full list of pixels would.
//!
//! k-means is run [`TRIALS`] times, each trial with different random starting centroids.
//! The trial with the lowest compactness (sum of squared distances between pixels and their centroid) is kept.
//! A trial stops after [`MAX_ITER`] iterations or once no centroid moves by [`EPSILON`] or more.
//!
//! Centroids that end up without any pixels are dropped from the result,
//! so they can never be picked as the dominant color.

#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::cargo)]
#![warn(clippy::use_debug, clippy::dbg_macro, clippy::todo, clippy::unimplemented)]
#![warn(clippy::unwrap_used, clippy::unwrap_in_result)]
#![warn(clippy::unneeded_field_pattern, clippy::rest_pat_in_fully_bound_structs)]
#![warn(clippy::unnecessary_self_imports)]
#![warn(clippy::str_to_string, clippy::string_to_string, clippy::string_slice)]
#![warn(missing_docs, clippy::missing_docs_in_private_items, rustdoc::all)]
#![warn(clippy::float_cmp_const, clippy::lossy_float_literal)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::enum_glob_use)]
#![allow(clippy::unreadable_literal)]

use image::RgbImage;
use palette::Srgb;
use rand::RngCore;
use std::{collections::HashMap, path::Path};

mod error;
pub use error::Error;

mod kmeans;
pub use kmeans::{KmeansResult, Rgb};

mod ph;
pub use ph::{classify, PhBand, PhLevel, LEVELS};

/// The default number of clusters
pub const DEFAULT_K: u8 = 5;

/// The number of k-means trials, each with different starting centroids
pub const TRIALS: u32 = 10;

/// The maximum number of iterations for each k-means trial
pub const MAX_ITER: u32 = 200;

/// A k-means trial stops once every centroid moves less than this distance in an iteration
pub const EPSILON: f32 = 0.1;

/// Deduplicated RGB colors and their pixel counts
#[derive(Debug, Clone, Default)]
pub struct RgbCounts {
	/// Distinct colors with components in `0.0..=255.0`
	pub(crate) colors: Vec<Rgb>,
	/// The number of pixels with each color
	pub(crate) counts: Vec<u32>,
}

impl RgbCounts {
	/// Merges duplicate colors in a slice of sRGB pixels.
	#[must_use]
	pub fn from_srgb(pixels: &[Srgb<u8>]) -> Self {
		let mut data = Self::default();

		// Packed Srgb -> data index
		let mut memo: HashMap<u32, u32> = HashMap::new();

		for srgb in pixels {
			let key = srgb.into_u32::<palette::rgb::channels::Rgba>();
			let index = *memo.entry(key).or_insert_with(|| {
				// data.len() < u32::MAX because there are only (2^8)^3 < u32::MAX possible sRGB colors
				#[allow(clippy::cast_possible_truncation)]
				let index = data.colors.len() as u32;

				data.colors.push([srgb.red, srgb.green, srgb.blue].map(f32::from));
				data.counts.push(0);
				index
			});

			let count = &mut data.counts[index as usize];
			*count = count.saturating_add(1);
		}

		data
	}

	/// Merges duplicate colors in an RGB image.
	#[must_use]
	pub fn from_image(image: &RgbImage) -> Self {
		Self::from_srgb(palette::cast::from_component_slice(image.as_raw()))
	}

	/// The number of distinct colors
	// colors.len() <= (2^8)^3
	#[allow(clippy::cast_possible_truncation)]
	#[must_use]
	pub fn num_colors(&self) -> u32 {
		self.colors.len() as u32
	}

	/// The total number of pixels
	#[must_use]
	pub fn num_pixels(&self) -> u64 {
		self.counts.iter().copied().map(u64::from).sum()
	}

	/// Iterate over each color and its pixel count
	pub(crate) fn pairs(&self) -> impl Iterator<Item = (Rgb, u32)> + '_ {
		self.colors.iter().copied().zip(self.counts.iter().copied())
	}
}

/// The dominant color of an image and the pH level it was matched to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
	/// The dominant color of the image
	pub dominant: Srgb<u8>,
	/// The closest reference level to the dominant color
	pub level: &'static PhLevel,
}

/// Returns a random seed drawn from the operating system.
#[must_use]
pub fn random_seed() -> u64 {
	rand::rngs::OsRng.next_u64()
}

/// Loads an image file as 8-bit RGB, discarding any alpha channel.
///
/// # Errors
/// Returns [`Error::ImageLoad`] if the file does not exist, cannot be read, or is not a decodable image.
pub fn load_image(path: impl AsRef<Path>) -> Result<RgbImage, Error> {
	Ok(image::open(path)?.into_rgb8())
}

/// Runs [`TRIALS`] trials of k-means with `k` clusters and returns the trial with the lowest compactness.
///
/// # Errors
/// Returns [`Error::InvalidParameter`] if `k` is 0 or greater than the number of pixels.
pub fn cluster_colors(data: &RgbCounts, k: u8, seed: u64) -> Result<KmeansResult, Error> {
	let pixels = data.num_pixels();
	if k == 0 || u64::from(k) > pixels {
		return Err(Error::InvalidParameter { k, pixels });
	}

	Ok(kmeans::run(data, TRIALS, k, EPSILON, MAX_ITER, seed))
}

/// Finds the dominant color of the image at `path` using a random seed.
///
/// Repeated calls on the same image may give slightly different colors.
/// Use [`extract_dominant_color_seeded`] for reproducible results.
///
/// # Errors
/// Returns [`Error::ImageLoad`] if the image cannot be loaded,
/// or [`Error::InvalidParameter`] if `k` is 0 or greater than the number of pixels.
pub fn extract_dominant_color(path: impl AsRef<Path>, k: u8) -> Result<Srgb<u8>, Error> {
	extract_dominant_color_seeded(path, k, random_seed())
}

/// Finds the dominant color of the image at `path`, seeding the random starting centroids with `seed`.
///
/// # Errors
/// Returns [`Error::ImageLoad`] if the image cannot be loaded,
/// or [`Error::InvalidParameter`] if `k` is 0 or greater than the number of pixels.
pub fn extract_dominant_color_seeded(path: impl AsRef<Path>, k: u8, seed: u64) -> Result<Srgb<u8>, Error> {
	let data = RgbCounts::from_image(&load_image(path)?);
	let result = cluster_colors(&data, k, seed)?;

	// at least one centroid has pixels once k is valid
	result
		.dominant_color()
		.ok_or(Error::InvalidParameter { k, pixels: data.num_pixels() })
}

/// Finds the dominant color of the image at `path` with [`DEFAULT_K`] clusters and classifies it.
///
/// # Errors
/// Returns [`Error::ImageLoad`] if the image cannot be loaded,
/// or [`Error::InvalidParameter`] if the image has fewer than [`DEFAULT_K`] pixels.
pub fn measure(path: impl AsRef<Path>) -> Result<Reading, Error> {
	measure_seeded(path, random_seed())
}

/// Same as [`measure`], but seeds the random starting centroids with `seed`.
///
/// # Errors
/// See [`measure`].
pub fn measure_seeded(path: impl AsRef<Path>, seed: u64) -> Result<Reading, Error> {
	let dominant = extract_dominant_color_seeded(path, DEFAULT_K, seed)?;
	Ok(Reading { dominant, level: classify(dominant) })
}
