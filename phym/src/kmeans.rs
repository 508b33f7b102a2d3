//! Provides the implementation for (sort) k-means over RGB colors

use crate::RgbCounts;
use palette::Srgb;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// A point in RGB space with components in `0.0..=255.0`
pub type Rgb = [f32; 3];

/// Squared Euclidean distance in RGB space
fn squared_distance(x: Rgb, y: Rgb) -> f32 {
	let dr = x[0] - y[0];
	let dg = x[1] - y[1];
	let db = x[2] - y[2];
	dr * dr + dg * dg + db * db
}

/// Round each component of an RGB point to the nearest `u8`
// values are clamped to the u8 range before the cast
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn round_to_srgb(color: Rgb) -> Srgb<u8> {
	let [r, g, b] = color.map(|c| c.round().clamp(0.0, 255.0) as u8);
	Srgb::new(r, g, b)
}

/// Bookkeeping for each k-means data point
struct PointData {
	/// Center assignment for this data point
	assignment: Vec<u8>,
}

impl PointData {
	/// Create a [`PointData`] with the given number data points
	fn new(n: u32) -> Self {
		Self { assignment: vec![0; n as usize] }
	}
}

/// Data for each center/centroid
struct CenterData {
	/// The centroid point
	centroid: Vec<Rgb>,
	/// Vector sum for all data points in this center
	sum: Vec<[f64; 3]>,
	/// Number of pixels in this center
	count: Vec<u64>,
}

impl CenterData {
	/// Create a [`CenterData`] with the given number of centers
	fn new(k: u8) -> Self {
		let k = usize::from(k);
		Self {
			centroid: Vec::with_capacity(k),
			sum: vec![[0.0; 3]; k],
			count: vec![0; k],
		}
	}

	/// Reset data for the next k-means trial
	fn reset(&mut self) {
		self.centroid.clear();
		self.sum.fill([0.0; 3]);
		self.count.fill(0);
	}
}

/// Holds all the state used by k-means
struct KmeansState {
	/// Data for each center
	centers: CenterData,
	/// One fourth of the squared distance between each pairs of centers
	distances: Vec<(u8, f32)>,
	/// Data for each point
	points: PointData,
}

impl KmeansState {
	/// Initialize a new [`KmeansState`] with `k` centers and `n` data points
	fn new(k: u8, n: u32) -> Self {
		Self {
			centers: CenterData::new(k),
			distances: vec![(0, 0.0); usize::from(k) * usize::from(k)],
			points: PointData::new(n),
		}
	}
}

/// Result from running k-means
#[derive(Debug, Clone)]
pub struct KmeansResult {
	/// Sum of the squared distances between each pixel and its centroid
	///
	/// A lower compactness indicates a tighter clustering.
	pub compactness: f64,
	/// Final centroid colors, excluding centroids that ended up with no pixels
	pub centroids: Vec<Rgb>,
	/// Number of pixels in each centroid
	pub counts: Vec<u64>,
	/// Number of elapsed iterations
	pub iterations: u32,
}

impl KmeansResult {
	/// Create an empty result, representing that no k-means trials were able to be run
	const fn empty() -> Self {
		Self {
			compactness: 0.0,
			centroids: Vec::new(),
			counts: Vec::new(),
			iterations: 0,
		}
	}

	/// Returns the centroid with the most pixels rounded to an sRGB color,
	/// or `None` if there are no centroids.
	///
	/// If several centroids have the same number of pixels, the first one is returned.
	#[must_use]
	pub fn dominant_color(&self) -> Option<Srgb<u8>> {
		let mut dominant: Option<(Rgb, u64)> = None;
		for (&centroid, &count) in self.centroids.iter().zip(&self.counts) {
			if dominant.map_or(true, |(_, max)| count > max) {
				dominant = Some((centroid, count));
			}
		}

		dominant.map(|(centroid, _)| round_to_srgb(centroid))
	}
}

/// Choose `k` starting centroids by randomly selecting distinct colors, weighted by their pixel counts.
///
/// If there are fewer than `k` distinct colors, the remaining centroids repeat the chosen ones.
fn random_centroids(k: u8, rng: &mut impl Rng, data: &RgbCounts, centroids: &mut Vec<Rgb>) {
	use rand::{
		distributions::{WeightedError::*, WeightedIndex},
		prelude::Distribution,
	};

	let mut sampler = match WeightedIndex::new(&data.counts) {
		Ok(sampler) => sampler,
		Err(InvalidWeight | NoItem | TooMany | AllWeightsZero) => {
			unreachable!("counts are > 0 and colors.len() is in 1..=2.pow(24)")
		},
	};

	for _ in 0..k {
		let i = sampler.sample(rng);
		centroids.push(data.colors[i]);

		match sampler.update_weights(&[(i, &0)]) {
			Ok(()) => {},
			Err(AllWeightsZero) => break, // every color is already a centroid
			Err(InvalidWeight | NoItem | TooMany) => unreachable!("index is in bounds and the new weight is 0"),
		}
	}

	let chosen = centroids.len();
	for i in chosen..usize::from(k) {
		centroids.push(centroids[i % chosen]);
	}
}

/// Initializes the center sums and counts based off the initial centroids
fn compute_initial_sums(data: &RgbCounts, centers: &mut CenterData, assignment: &[u8]) {
	for ((color, n), &center) in data.pairs().zip(assignment) {
		let i = usize::from(center);
		let nf = f64::from(n);
		let sum = &mut centers.sum[i];
		for (s, &c) in sum.iter_mut().zip(&color) {
			*s += nf * f64::from(c);
		}
		centers.count[i] += u64::from(n);
	}
}

/// For each pair of centers, update their distances and sort each center's row by increasing distance
// i and j are < centroids.len() <= u8::MAX
#[allow(clippy::cast_possible_truncation)]
fn update_distances(centroids: &[Rgb], distances: &mut [(u8, f32)]) {
	let k = centroids.len();
	for i in 0..k {
		let ci = centroids[i];
		distances[i * k + i] = (i as u8, 0.0);
		for j in (i + 1)..k {
			let cj = centroids[j];
			let dist = squared_distance(ci, cj) / 4.0;
			distances[j * k + i] = (i as u8, dist);
			distances[i * k + j] = (j as u8, dist);
		}
	}

	for row in distances.chunks_exact_mut(k) {
		row.sort_by(|(_, x), (_, y)| f32::total_cmp(x, y));
	}
}

/// For each data point, update its assigned center
fn update_assignments(data: &RgbCounts, centers: &mut CenterData, distances: &[(u8, f32)], points: &mut PointData) {
	let k = centers.centroid.len();
	for ((color, n), center) in data.pairs().zip(&mut points.assignment) {
		let ci = usize::from(*center);
		let dist = squared_distance(color, centers.centroid[ci]);

		// Find the closest center
		let mut min_dist = dist;
		let mut min_center = *center;
		for &(other_center, quarter_dist) in &distances[(ci * k + 1)..((ci + 1) * k)] {
			// No remaining center can be closer than the current one
			if dist < quarter_dist {
				break;
			}

			let other_dist = squared_distance(color, centers.centroid[usize::from(other_center)]);
			if other_dist < min_dist {
				min_dist = other_dist;
				min_center = other_center;
			}
		}

		// Move this point to its new center
		if min_center != *center {
			let nf = f64::from(n);
			let delta = color.map(|c| nf * f64::from(c));

			let old_sum = &mut centers.sum[ci];
			for (s, d) in old_sum.iter_mut().zip(delta) {
				*s -= d;
			}
			centers.count[ci] -= u64::from(n);

			let cj = usize::from(min_center);

			let new_sum = &mut centers.sum[cj];
			for (s, d) in new_sum.iter_mut().zip(delta) {
				*s += d;
			}
			centers.count[cj] += u64::from(n);

			*center = min_center;
		}
	}
}

/// For each center, update its centroid using the vector sums and return the largest centroid movement
///
/// Centers without any pixels keep their previous centroid.
fn update_centroids(centers: &mut CenterData) -> f32 {
	let mut max_shift = 0.0_f32;
	for ((centroid, &n), sum) in centers.centroid.iter_mut().zip(&centers.count).zip(&centers.sum) {
		if n == 0 {
			continue;
		}

		// (u64 as f64) is only inexact for pixel counts far beyond any decodable image
		#[allow(clippy::cast_precision_loss)]
		let n = n as f64;
		// Sums may need greater precision, but the average can fall back down to a reduced precision
		#[allow(clippy::cast_possible_truncation)]
		let new_centroid = sum.map(|s| (s / n) as f32);

		max_shift = f32::max(max_shift, squared_distance(*centroid, new_centroid).sqrt());
		*centroid = new_centroid;
	}

	max_shift
}

/// Run a trial of sort k-means
fn kmeans(
	data: &RgbCounts,
	KmeansState { centers, distances, points }: &mut KmeansState,
	k: u8,
	max_iter: u32,
	convergence: f32,
	seed: u64,
) -> KmeansResult {
	let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
	random_centroids(k, &mut rng, data, &mut centers.centroid);
	compute_initial_sums(data, centers, &points.assignment);

	let mut iterations = 0;
	let mut max_shift = f32::INFINITY;
	while iterations < max_iter && max_shift >= convergence {
		update_distances(&centers.centroid, distances);
		update_assignments(data, centers, distances, points);
		max_shift = update_centroids(centers);
		iterations += 1;
	}

	let compactness = data
		.pairs()
		.zip(&points.assignment)
		.map(|((color, n), &center)| {
			f64::from(n) * f64::from(squared_distance(color, centers.centroid[usize::from(center)]))
		})
		.sum();

	let (centroids, counts) = centers
		.centroid
		.iter()
		.zip(&centers.count)
		.filter(|&(_, &count)| count > 0)
		.map(|(&color, &count)| (color, count))
		.unzip();

	// assignments are corrected every iteration, so only the centers need to be reset
	centers.reset();

	KmeansResult { compactness, centroids, counts, iterations }
}

/// Run multiple trials of k-means, taking the trial with the lowest compactness
///
/// An empty result with no centroids is returned if `data` is empty, `trials` = 0, or `k` = 0.
pub fn run(data: &RgbCounts, trials: u32, k: u8, convergence_threshold: f32, max_iter: u32, seed: u64) -> KmeansResult {
	if k == 0 || data.colors.is_empty() {
		return KmeansResult::empty();
	}

	let mut state = KmeansState::new(k, data.num_colors());

	(0..trials)
		.map(|i| kmeans(data, &mut state, k, max_iter, convergence_threshold, seed ^ u64::from(i)))
		.min_by(|x, y| f64::total_cmp(&x.compactness, &y.compactness))
		.unwrap_or(KmeansResult::empty())
}
