use crate::cluster::{cluster, Method};
use crate::dither::{DitherOptions, Ditherer};
use crate::error::{Error, Result};
use crate::indexed::IndexedImage;
use crate::palette::{ColorIndex, IndexKind, Palette, MAX_PALETTE_COLORS};
use crate::source::ImageSource;

/// Clustering-based palette reduction to at most `colors` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantizer {
    colors: usize,
    method: Method,
}

impl Default for Quantizer {
    fn default() -> Self {
        Self::new(MAX_PALETTE_COLORS)
    }
}

impl Quantizer {
    pub fn new(colors: usize) -> Self {
        Self {
            colors,
            method: Method::default(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    #[inline]
    pub fn colors(&self) -> usize {
        self.colors
    }

    fn check(&self) -> Result<()> {
        match self.colors {
            0 => Err(Error::NoColors),
            n if n > MAX_PALETTE_COLORS => Err(Error::CapacityExceeded {
                requested: n,
                max: MAX_PALETTE_COLORS,
            }),
            _ => Ok(()),
        }
    }

    /// The palette alone. May hold fewer colors than requested, and none for
    /// an empty image.
    pub fn palette<I: ImageSource + ?Sized>(&self, image: &I) -> Result<Palette> {
        self.check()?;
        Ok(cluster(image, self.colors, self.method)?.palette())
    }

    /// Each pixel mapped to the palette color of its own cluster, no dithering.
    pub fn quantize<I: ImageSource + ?Sized>(&self, image: &I) -> Result<IndexedImage> {
        self.check()?;
        cluster(image, self.colors, self.method)?.indexed()
    }

    /// Builds the palette, then error-diffuses the image against it.
    pub fn dither<I: ImageSource + ?Sized>(
        &self,
        image: &I,
        kind: IndexKind,
        options: DitherOptions,
    ) -> Result<IndexedImage> {
        let palette = self.palette(image)?;
        if palette.is_empty() {
            let (width, height) = image.dimensions();
            return IndexedImage::new(width, height, palette);
        }
        let index = ColorIndex::new(palette, kind)?;
        Ditherer::new(options).dither(image, &index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn rejects_palette_sizes_out_of_range() {
        let img = RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]));
        assert!(matches!(
            Quantizer::new(0).palette(&img),
            Err(Error::NoColors)
        ));
        assert!(matches!(
            Quantizer::new(257).quantize(&img),
            Err(Error::CapacityExceeded {
                requested: 257,
                max: 256
            })
        ));
        assert!(Quantizer::new(256).quantize(&img).is_ok());
    }

    #[test]
    fn empty_image_dithers_to_empty_raster() {
        let img = RgbImage::new(0, 0);
        let out = Quantizer::default()
            .dither(&img, IndexKind::Tree, DitherOptions::new())
            .unwrap();
        assert!(out.palette().is_empty());
        assert!(out.indices().is_empty());
    }
}
