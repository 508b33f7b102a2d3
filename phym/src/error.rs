//! Error cases for loading an image and extracting its dominant color

use std::fmt::{self, Display};

/// Errors returned by the dominant color pipeline
#[derive(Debug)]
pub enum Error {
	/// The image file is missing, unreadable, or could not be decoded
	ImageLoad(image::ImageError),
	/// The number of clusters is zero or larger than the number of pixels
	InvalidParameter {
		/// The requested number of clusters
		k: u8,
		/// The number of pixels available for clustering
		pixels: u64,
	},
}

impl Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::ImageLoad(e) => write!(f, "Failed to load the image file: {e}"),
			Error::InvalidParameter { k: 0, .. } => write!(f, "Invalid number of clusters: k must be at least 1"),
			Error::InvalidParameter { k, pixels } => {
				write!(f, "Invalid number of clusters: k = {k} exceeds the {pixels} pixels in the image")
			},
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::ImageLoad(e) => Some(e),
			Error::InvalidParameter { .. } => None,
		}
	}
}

impl From<image::ImageError> for Error {
	fn from(e: image::ImageError) -> Self {
		Error::ImageLoad(e)
	}
}
