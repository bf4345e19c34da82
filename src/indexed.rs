use crate::error::Result;
use crate::palette::Palette;
use image::{Rgb, RgbImage};

/// A raster of palette indices together with the palette they refer to.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct IndexedImage {
    width: u32,
    height: u32,
    palette: Palette,
    indices: Vec<u8>,
}

impl IndexedImage {
    /// All pixels start at index 0. Fails when `palette` has more entries
    /// than a `u8` can address.
    pub fn new(width: u32, height: u32, palette: Palette) -> Result<Self> {
        palette.check_capacity()?;
        Ok(Self {
            width,
            height,
            palette,
            indices: vec![0; width as usize * height as usize],
        })
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Indices in raster order.
    #[inline]
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> u8 {
        self.indices[y as usize * self.width as usize + x as usize]
    }

    #[inline]
    pub fn set_index(&mut self, x: u32, y: u32, index: u8) {
        debug_assert!((index as usize) < self.palette.len());
        self.indices[y as usize * self.width as usize + x as usize] = index;
    }

    #[inline]
    pub fn color(&self, x: u32, y: u32) -> Rgb<u8> {
        self.palette.colors()[self.index(x, y) as usize]
    }

    /// Renders the raster back to RGB through the palette.
    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| self.color(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn indices_are_row_major() {
        let palette = Palette::new(vec![Rgb([0, 0, 0]), Rgb([1, 2, 3])]);
        let mut img = IndexedImage::new(3, 2, palette).unwrap();
        img.set_index(2, 1, 1);
        assert_eq!(img.indices(), &[0, 0, 0, 0, 0, 1]);
        assert_eq!(img.color(2, 1), Rgb([1, 2, 3]));
        let rgb = img.to_rgb_image();
        assert_eq!(*rgb.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*rgb.get_pixel(2, 1), Rgb([1, 2, 3]));
    }

    #[test]
    fn rejects_oversized_palette() {
        let palette: Palette = (0..300).map(|v| Rgb([(v % 256) as u8, (v / 256) as u8, 0])).collect();
        assert!(matches!(
            IndexedImage::new(1, 1, palette),
            Err(Error::CapacityExceeded { requested: 300, .. })
        ));
    }

    #[test]
    fn empty_image() {
        let img = IndexedImage::new(0, 0, Palette::default()).unwrap();
        assert!(img.indices().is_empty());
        assert_eq!(img.to_rgb_image().dimensions(), (0, 0));
    }
}
