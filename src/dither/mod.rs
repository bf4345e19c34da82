//! Error diffusion dithering against a fixed palette.
//!
//! The image is processed once in raster order. Each pixel's color plus the
//! error diffused into it is matched to the nearest palette entry, and the
//! signed difference is spread over not yet visited neighbors with a
//! [`Kernel`].

mod kernel;

pub use kernel::{Kernel, FLOYD_STEINBERG, RIGHT_DOWN, SIERRA_LITE};

use crate::error::Result;
use crate::indexed::IndexedImage;
use crate::palette::{wide_color, Color, ColorIndex};
use crate::source::ImageSource;
use std::mem;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DitherOptions {
    kernel: Kernel,
    clamp: bool,
}

impl DitherOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = kernel;
        self
    }

    /// Saturate the error-adjusted color to `0..=0xffff` before the palette
    /// lookup. Error pushed past the channel range is then dropped instead
    /// of carried forward. Off by default.
    pub fn clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }
}

/// Per-channel error totals of one dithering pass.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffusionStats {
    /// Sum of `adjusted - chosen` over all pixels.
    pub residual: [i64; 3],
    /// Sum of all shares handed to neighbors, on or off the image.
    pub diffused: [i64; 3],
    /// Shares that landed past the image border.
    pub discarded: [i64; 3],
    /// Error removed by clamping.
    pub clipped: [i64; 3],
}

/// Error diffusion buffers for one pass.
///
/// Rows are `width + 2` cells wide; pixel `x` lives in cell `x + 1` so the
/// left and right neighbors of the edge pixels are sentinels.
struct DiffusionState {
    carry: Color,
    current: Vec<Color>,
    next: Vec<Color>,
}

impl DiffusionState {
    fn new(width: usize) -> Self {
        Self {
            carry: [0; 3],
            current: vec![[0; 3]; width + 2],
            next: vec![[0; 3]; width + 2],
        }
    }

    fn next_row(&mut self) {
        mem::swap(&mut self.current, &mut self.next);
        self.next.fill([0; 3]);
        self.carry = [0; 3];
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct Ditherer {
    options: DitherOptions,
}

impl Ditherer {
    pub fn new(options: DitherOptions) -> Self {
        Self { options }
    }

    pub fn dither<I>(&self, image: &I, index: &ColorIndex) -> Result<IndexedImage>
    where
        I: ImageSource + ?Sized,
    {
        self.dither_with_stats(image, index).map(|(indexed, _)| indexed)
    }

    /// Like [`dither`](Self::dither), also returning the error bookkeeping.
    pub fn dither_with_stats<I>(
        &self,
        image: &I,
        index: &ColorIndex,
    ) -> Result<(IndexedImage, DiffusionStats)>
    where
        I: ImageSource + ?Sized,
    {
        let (width, height) = image.dimensions();
        let mut indexed = IndexedImage::new(width, height, index.palette().clone())?;
        let mut stats = DiffusionStats::default();
        if width == 0 || height == 0 {
            return Ok((indexed, stats));
        }
        tracing::debug!(
            width,
            height,
            colors = index.palette().len(),
            clamp = self.options.clamp,
            "dithering"
        );

        let palette: Vec<Color> = index
            .palette()
            .colors()
            .iter()
            .copied()
            .map(wide_color)
            .collect();
        let kernel = self.options.kernel;
        let w = width as usize;
        let mut state = DiffusionState::new(w);

        for y in 0..height {
            let last_row = y + 1 == height;
            for x in 0..width {
                let cell = x as usize + 1;
                let [r, g, b, _] = image.channels(x, y);
                let source = [r as i32, g as i32, b as i32];
                let mut adjusted: Color =
                    std::array::from_fn(|c| source[c] + state.carry[c] + state.current[cell][c]);
                if self.options.clamp {
                    for c in 0..3 {
                        let clamped = adjusted[c].clamp(0, u16::MAX as i32);
                        stats.clipped[c] += (adjusted[c] - clamped) as i64;
                        adjusted[c] = clamped;
                    }
                }

                let i = index.nearest(adjusted);
                indexed.set_index(x, y, i as u8);

                state.carry = [0; 3];
                for c in 0..3 {
                    let residual = adjusted[c] - palette[i][c];
                    stats.residual[c] += residual as i64;
                    for (dx, dy, share) in kernel.shares(residual) {
                        stats.diffused[c] += share as i64;
                        if dy == 0 {
                            if x + 1 == width {
                                stats.discarded[c] += share as i64;
                            }
                            state.carry[c] += share;
                        } else {
                            let target = (cell as i32 + dx) as usize;
                            if last_row || target == 0 || target == w + 1 {
                                stats.discarded[c] += share as i64;
                            }
                            state.next[target][c] += share;
                        }
                    }
                }
            }
            state.next_row();
        }

        tracing::trace!(?stats, "dithered");
        Ok((indexed, stats))
    }
}
