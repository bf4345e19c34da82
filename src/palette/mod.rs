//! Palettes and nearest-color lookup.
//!
//! Queries are colors on the 16-bit channel scale as signed integers, so the
//! ditherer can look up colors pushed outside `0..=0xffff` by diffused error.
//! Palette entries are widened with [`widen`](crate::source::widen) before
//! comparing.

mod linear;
mod tree;

pub use linear::LinearPalette;
pub use tree::{Node, TreeBuilder, TreePalette};

use crate::error::{Error, Result};
use crate::source::widen;
use image::Rgb;

pub const MAX_PALETTE_COLORS: usize = 256;

/// A query or palette color on the 16-bit scale.
pub type Color = [i32; 3];

#[inline(always)]
pub fn wide_color(rgb: Rgb<u8>) -> Color {
    rgb.0.map(|c| widen(c) as i32)
}

/// Squared euclidean distance over r, g and b.
#[inline(always)]
pub fn distance(a: Color, b: Color) -> u64 {
    (0..3)
        .map(|i| {
            let d = a[i] as i64 - b[i] as i64;
            (d * d) as u64
        })
        .sum()
}

/// Ordered output colors. The position of a color is its index in an
/// indexed raster.
#[derive(Default, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Palette {
    colors: Vec<Rgb<u8>>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb<u8>>) -> Self {
        Self { colors }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[inline]
    pub fn colors(&self) -> &[Rgb<u8>] {
        &self.colors
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Rgb<u8>> {
        self.colors.get(index).copied()
    }

    /// Fails if the palette cannot be addressed by `u8` indices.
    pub fn check_capacity(&self) -> Result<()> {
        if self.len() > MAX_PALETTE_COLORS {
            return Err(Error::CapacityExceeded {
                requested: self.len(),
                max: MAX_PALETTE_COLORS,
            });
        }
        Ok(())
    }
}

impl FromIterator<Rgb<u8>> for Palette {
    fn from_iter<T: IntoIterator<Item = Rgb<u8>>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// Scan every palette entry.
    #[default]
    Linear,
    /// Search a space-partitioning tree built over the palette.
    Tree,
}

/// Answers "which palette entry is nearest to this color".
#[derive(Clone, Debug)]
pub enum ColorIndex {
    Linear(LinearPalette),
    Tree(TreePalette),
}

impl ColorIndex {
    /// Fails with [`Error::NoColors`] for an empty palette.
    pub fn new(palette: Palette, kind: IndexKind) -> Result<Self> {
        let linear = LinearPalette::new(palette)?;
        Ok(match kind {
            IndexKind::Linear => ColorIndex::Linear(linear),
            IndexKind::Tree => ColorIndex::Tree(TreeBuilder::new(&linear).build()),
        })
    }

    #[inline]
    pub fn nearest(&self, color: Color) -> usize {
        match self {
            ColorIndex::Linear(p) => p.nearest(color),
            ColorIndex::Tree(p) => p.nearest(color),
        }
    }

    #[inline]
    pub fn nearest_rgb(&self, rgb: Rgb<u8>) -> usize {
        self.nearest(wide_color(rgb))
    }

    pub fn color_near(&self, color: Color) -> Rgb<u8> {
        self.palette().colors()[self.nearest(color)]
    }

    pub fn palette(&self) -> &Palette {
        match self {
            ColorIndex::Linear(p) => p.palette(),
            ColorIndex::Tree(p) => p.palette(),
        }
    }
}
