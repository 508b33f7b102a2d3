use criterion::{
	black_box, criterion_group, criterion_main, measurement::WallTime, BenchmarkGroup, BenchmarkId, Criterion,
	SamplingMode,
};
use image::RgbImage;
use phym::RgbCounts;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::time::Duration;

const SIZES: [(u32, u32); 3] = [(64, 64), (480, 270), (1920, 1080)];

/// A smooth gradient over red and green with a fixed blue channel
#[allow(clippy::cast_possible_truncation)]
fn gradient(width: u32, height: u32) -> RgbImage {
	RgbImage::from_fn(width, height, |x, y| {
		image::Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 96])
	})
}

/// A mostly red sample with a blue patch and random per-pixel noise, like a photo of a test strip
fn noisy_sample(width: u32, height: u32) -> RgbImage {
	let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
	RgbImage::from_fn(width, height, |x, _| {
		let base = if x < width / 5 { [30, 50, 210] } else { [210, 40, 35] };
		image::Rgb(base.map(|c: u8| c.saturating_add(rng.gen_range(0..24))))
	})
}

fn images() -> Vec<(String, RgbImage)> {
	SIZES
		.iter()
		.flat_map(|&(width, height)| {
			[
				(format!("gradient {width}x{height}"), gradient(width, height)),
				(format!("noisy {width}x{height}"), noisy_sample(width, height)),
			]
		})
		.collect()
}

fn create_group<'a>(c: &'a mut Criterion, name: &'a str) -> BenchmarkGroup<'a, WallTime> {
	let mut group = c.benchmark_group(name);
	group
		.sample_size(30)
		.noise_threshold(0.05)
		.sampling_mode(SamplingMode::Flat)
		.warm_up_time(Duration::from_millis(500));
	group
}

fn preprocessing(c: &mut Criterion) {
	let mut group = create_group(c, "preprocessing");

	for (name, image) in images() {
		group.bench_with_input(BenchmarkId::from_parameter(&name), &image, |b, image| {
			b.iter(|| RgbCounts::from_image(black_box(image)));
		});
	}
}

fn kmeans(c: &mut Criterion) {
	let mut group = create_group(c, "kmeans");
	group.measurement_time(Duration::from_secs(4));

	let counts = images()
		.into_iter()
		.map(|(name, image)| (name, RgbCounts::from_image(&image)))
		.collect::<Vec<_>>();

	for k in [phym::DEFAULT_K, 12] {
		for (name, counts) in &counts {
			group.bench_with_input(BenchmarkId::new(format!("k={k}"), name), counts, |b, counts| {
				b.iter(|| phym::cluster_colors(counts, black_box(k), black_box(0)));
			});
		}
	}
}

fn classify(c: &mut Criterion) {
	c.bench_function("classify", |b| {
		b.iter(|| phym::classify(black_box(palette::Srgb::new(128, 128, 128))));
	});
}

criterion_group!(benches, preprocessing, kmeans, classify);
criterion_main!(benches);
