//! The image abstraction consumed by the clustering engines and the ditherer.

use image::{DynamicImage, GenericImageView, ImageBuffer, Rgb, RgbImage, Rgba, RgbaImage};

pub type Rgb16Image = ImageBuffer<Rgb<u16>, Vec<u16>>;
pub type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

/// A readable raster of 16-bit RGBA channels.
///
/// Alpha is part of the contract so any image can be plugged in, but nothing
/// in this crate looks at it.
pub trait ImageSource {
    /// Width and height in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Channel values `[r, g, b, a]` of the pixel at `(x, y)`, each in `0..=0xffff`.
    fn channels(&self, x: u32, y: u32) -> [u16; 4];

    #[inline]
    fn pixel_count(&self) -> usize {
        let (width, height) = self.dimensions();
        width as usize * height as usize
    }
}

/// Widens an 8-bit channel so that `0xff` maps to `0xffff`.
#[inline(always)]
pub fn widen(c: u8) -> u16 {
    c as u16 * 257
}

impl ImageSource for RgbImage {
    #[inline]
    fn dimensions(&self) -> (u32, u32) {
        ImageBuffer::dimensions(self)
    }

    #[inline]
    fn channels(&self, x: u32, y: u32) -> [u16; 4] {
        let Rgb([r, g, b]) = *self.get_pixel(x, y);
        [widen(r), widen(g), widen(b), u16::MAX]
    }
}

impl ImageSource for RgbaImage {
    #[inline]
    fn dimensions(&self) -> (u32, u32) {
        ImageBuffer::dimensions(self)
    }

    #[inline]
    fn channels(&self, x: u32, y: u32) -> [u16; 4] {
        self.get_pixel(x, y).0.map(widen)
    }
}

impl ImageSource for Rgb16Image {
    #[inline]
    fn dimensions(&self) -> (u32, u32) {
        ImageBuffer::dimensions(self)
    }

    #[inline]
    fn channels(&self, x: u32, y: u32) -> [u16; 4] {
        let Rgb([r, g, b]) = *self.get_pixel(x, y);
        [r, g, b, u16::MAX]
    }
}

impl ImageSource for Rgba16Image {
    #[inline]
    fn dimensions(&self) -> (u32, u32) {
        ImageBuffer::dimensions(self)
    }

    #[inline]
    fn channels(&self, x: u32, y: u32) -> [u16; 4] {
        self.get_pixel(x, y).0
    }
}

impl ImageSource for DynamicImage {
    #[inline]
    fn dimensions(&self) -> (u32, u32) {
        GenericImageView::dimensions(self)
    }

    fn channels(&self, x: u32, y: u32) -> [u16; 4] {
        match self {
            DynamicImage::ImageRgb8(img) => img.channels(x, y),
            DynamicImage::ImageRgba8(img) => img.channels(x, y),
            DynamicImage::ImageRgb16(img) => img.channels(x, y),
            DynamicImage::ImageRgba16(img) => img.channels(x, y),
            // Luma and float variants go through the 8-bit view.
            _ => self.get_pixel(x, y).0.map(widen),
        }
    }
}

impl<T: ImageSource + ?Sized> ImageSource for &T {
    #[inline]
    fn dimensions(&self) -> (u32, u32) {
        (**self).dimensions()
    }

    #[inline]
    fn channels(&self, x: u32, y: u32) -> [u16; 4] {
        (**self).channels(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widen_covers_full_range() {
        assert_eq!(widen(0), 0);
        assert_eq!(widen(0x80), 0x8080);
        assert_eq!(widen(0xff), 0xffff);
    }

    #[test]
    fn rgb8_channels_are_widened() {
        let img = RgbImage::from_pixel(2, 1, Rgb([255, 1, 0]));
        assert_eq!(ImageSource::dimensions(&img), (2, 1));
        assert_eq!(img.channels(1, 0), [0xffff, 0x0101, 0, 0xffff]);
        assert_eq!(img.pixel_count(), 2);
    }

    #[test]
    fn dynamic_image_keeps_16_bit_precision() {
        let img = Rgb16Image::from_pixel(1, 1, Rgb([1, 2, 3]));
        let img = DynamicImage::ImageRgb16(img);
        assert_eq!(img.channels(0, 0), [1, 2, 3, 0xffff]);
    }

    #[test]
    fn dynamic_luma_goes_through_rgba8() {
        let img = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(1, 1, image::Luma([10])));
        assert_eq!(img.channels(0, 0), [2570, 2570, 2570, 0xffff]);
    }
}
