//! Palette reduction and error-diffusion dithering.
//!
//! A palette of at most 256 colors is derived by splitting the image's
//! pixels into clusters ([`Method::MedianCut`] or [`Method::MeanCut`]),
//! then the image is re-rendered against it with a [`Ditherer`], looking
//! colors up through a [`ColorIndex`].
//!
//! ```
//! use image::{Rgb, RgbImage};
//! use rsquant::{DitherOptions, IndexKind, Quantizer};
//!
//! let img = RgbImage::from_fn(16, 16, |x, y| Rgb([x as u8 * 16, y as u8 * 16, 128]));
//! let indexed = Quantizer::new(8)
//!     .dither(&img, IndexKind::Tree, DitherOptions::new())
//!     .unwrap();
//! assert!(indexed.palette().len() <= 8);
//! ```

pub mod cluster;
pub mod dither;
mod error;
mod indexed;
pub mod palette;
pub mod pixel;
mod quantizer;
mod sixel;
mod source;

pub use cluster::{cluster, Clusters, Method};
pub use dither::{DiffusionStats, DitherOptions, Ditherer, Kernel};
pub use error::{Error, Result};
pub use indexed::IndexedImage;
pub use palette::{ColorIndex, IndexKind, LinearPalette, Palette, TreeBuilder, TreePalette};
pub use quantizer::Quantizer;
pub use sixel::SixelEncoder;
pub use source::{widen, ImageSource, Rgb16Image, Rgba16Image};
