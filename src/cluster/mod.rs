//! Palette derivation by recursive splitting of the image's pixel population.
//!
//! All pixels start in one cluster. A cluster is split on its widest color
//! channel at a cut value chosen so both halves are non-empty, until the
//! requested number of clusters exists or no cluster has any spread left.
//! [`Method`] selects how the cut value and the next cluster to split are
//! chosen.

mod mean;
mod median;

pub(crate) use median::median_boundary;

use crate::error::{Error, Result};
use crate::indexed::IndexedImage;
use crate::palette::Palette;
use crate::pixel::{pixel_set, Channel, Extents, Pixel};
use crate::source::ImageSource;
use image::Rgb;
use std::ops::Range;

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// Split at the mean of the widest channel, favouring clusters that are
    /// both populous and large in color space.
    MeanCut,
    /// Split the most populous cluster at the median of its widest channel.
    #[default]
    MedianCut,
}

#[derive(Default, Clone, Debug)]
struct Cluster {
    range: Range<usize>,
    widest: Channel,
    min: u32,
    max: u32,
    volume: u64,
    priority: u64,
}

impl Cluster {
    #[inline]
    fn len(&self) -> usize {
        self.range.len()
    }

    #[inline]
    fn is_splittable(&self) -> bool {
        self.max > self.min
    }
}

/// Working state of one clustering run: the shared pixel list and the
/// clusters, each owning a disjoint sub-range of it.
struct Splitter<'a, I: ?Sized> {
    image: &'a I,
    pixels: Vec<Pixel>,
    clusters: Vec<Cluster>,
}

impl<'a, I: ImageSource + ?Sized> Splitter<'a, I> {
    fn new(image: &'a I) -> Self {
        let pixels = pixel_set(image);
        let clusters = if pixels.is_empty() {
            Vec::new()
        } else {
            vec![Cluster {
                range: 0..pixels.len(),
                ..Default::default()
            }]
        };
        Self {
            image,
            pixels,
            clusters,
        }
    }

    #[inline(always)]
    fn color(&self, p: Pixel) -> [u32; 3] {
        let [r, g, b, _] = self.image.channels(p.x, p.y);
        [r as u32, g as u32, b as u32]
    }

    #[inline(always)]
    fn value(&self, p: Pixel, channel: Channel) -> u32 {
        self.image.channels(p.x, p.y)[channel.index()] as u32
    }

    fn members(&self, cx: usize) -> &[Pixel] {
        &self.pixels[self.clusters[cx].range.clone()]
    }

    /// Recomputes widest channel, its extrema and the volume of cluster `cx`.
    /// Returns whether the cluster can still be split.
    fn analyze(&mut self, cx: usize) -> bool {
        let extents = Extents::from_colors(self.members(cx).iter().map(|&p| self.color(p)));
        let widest = extents.widest();
        let c = &mut self.clusters[cx];
        c.widest = widest;
        c.min = extents.min[widest.index()];
        c.max = extents.max[widest.index()];
        c.volume = extents.volume();
        c.is_splittable()
    }

    /// Partitions cluster `sx` in place: pixels whose widest-channel value
    /// satisfies `low` stay in `sx`, the rest move to a new cluster whose
    /// index is returned.
    fn split<F>(&mut self, sx: usize, low: F) -> usize
    where
        F: Fn(u32) -> bool,
    {
        let Range { start, end } = self.clusters[sx].range.clone();
        let channel = self.clusters[sx].widest;
        let mut i = start;
        let mut last = end;
        while i < last {
            if low(self.value(self.pixels[i], channel)) {
                i += 1;
            } else {
                last -= 1;
                self.pixels.swap(i, last);
            }
        }
        debug_assert!(start < i && i < end, "degenerate split of cluster {sx}");
        self.clusters[sx].range = start..i;
        self.clusters.push(Cluster {
            range: i..end,
            ..Default::default()
        });
        self.clusters.len() - 1
    }

    fn finish(self) -> Clusters<'a, I> {
        let ranges = self.clusters.into_iter().map(|c| c.range).collect();
        Clusters {
            image: self.image,
            pixels: self.pixels,
            ranges,
        }
    }
}

/// The outcome of a clustering run over one image.
///
/// Cluster `i` becomes palette entry `i`.
#[derive(Debug)]
pub struct Clusters<'a, I: ?Sized> {
    image: &'a I,
    pixels: Vec<Pixel>,
    ranges: Vec<Range<usize>>,
}

impl<'a, I: ImageSource + ?Sized> Clusters<'a, I> {
    #[inline]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&[Pixel]> {
        self.ranges.get(index).map(|r| &self.pixels[r.clone()])
    }

    pub fn iter(&self) -> impl Iterator<Item = &[Pixel]> + '_ {
        self.ranges.iter().map(|r| &self.pixels[r.clone()])
    }

    /// One color per cluster: the truncated channel-wise mean of its
    /// members, reduced to 8 bits.
    ///
    /// The reduction drops the low byte, so a 16-bit source color that is
    /// not a multiple of 257 is never reproduced exactly. Even a solid 16-bit
    /// image leaves a nonzero dithering residual.
    pub fn palette(&self) -> Palette {
        self.iter()
            .map(|pixels| {
                let mut sum = [0u64; 3];
                for p in pixels {
                    let [r, g, b, _] = self.image.channels(p.x, p.y);
                    sum[0] += r as u64;
                    sum[1] += g as u64;
                    sum[2] += b as u64;
                }
                let n = (pixels.len() as u64) << 8;
                Rgb(sum.map(|s| (s / n) as u8))
            })
            .collect()
    }

    /// An undithered indexed raster: every pixel of cluster `i` gets index `i`.
    pub fn indexed(&self) -> Result<IndexedImage> {
        let (width, height) = self.image.dimensions();
        let mut indexed = IndexedImage::new(width, height, self.palette())?;
        for (i, pixels) in self.iter().enumerate() {
            for p in pixels {
                indexed.set_index(p.x, p.y, i as u8);
            }
        }
        Ok(indexed)
    }
}

/// Splits the pixels of `image` into at most `colors` clusters.
///
/// Fewer clusters come back only when every cluster is a single solid color.
/// A zero-area image yields no clusters.
pub fn cluster<I>(image: &I, colors: usize, method: Method) -> Result<Clusters<'_, I>>
where
    I: ImageSource + ?Sized,
{
    if colors == 0 {
        return Err(Error::NoColors);
    }
    let mut splitter = Splitter::new(image);
    if !splitter.clusters.is_empty() {
        match method {
            Method::MeanCut => mean::split_all(&mut splitter, colors),
            Method::MedianCut => median::split_all(&mut splitter, colors),
        }
    }
    tracing::debug!(
        ?method,
        requested = colors,
        clusters = splitter.clusters.len(),
        pixels = splitter.pixels.len(),
        "clustered image"
    );
    Ok(splitter.finish())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::RgbImage;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    /// Random image with a bounded number of distinct colors so that both
    /// full and underfilled runs get exercised.
    pub(crate) fn random_image(seed: u64, width: u32, height: u32, distinct: usize) -> RgbImage {
        let mut rng = StdRng::seed_from_u64(seed);
        let colors: Vec<Rgb<u8>> = (0..distinct).map(|_| Rgb(rng.gen())).collect();
        RgbImage::from_fn(width, height, |_, _| colors[rng.gen_range(0..colors.len())])
    }

    pub(crate) fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                ((x + y) * 127 / (width + height).max(1)) as u8,
            ])
        })
    }

    fn distinct_colors(img: &RgbImage) -> usize {
        img.pixels().collect::<HashSet<_>>().len()
    }

    fn assert_partition<I: ImageSource>(image: &I, clusters: &Clusters<'_, I>) {
        let mut seen = HashSet::new();
        for pixels in clusters.iter() {
            assert!(!pixels.is_empty(), "empty cluster");
            for &p in pixels {
                assert!(seen.insert(p), "pixel {p:?} in two clusters");
            }
        }
        assert_eq!(seen.len(), image.pixel_count());
    }

    #[test]
    fn partition_invariant_for_all_palette_sizes() {
        let img = random_image(7, 23, 17, 300);
        let distinct = distinct_colors(&img);
        for method in [Method::MeanCut, Method::MedianCut] {
            for k in 1..=256 {
                let clusters = cluster(&img, k, method).unwrap();
                assert_partition(&img, &clusters);
                assert!(!clusters.is_empty() && clusters.len() <= k);
                if clusters.len() < k {
                    assert!(distinct < k, "{method:?} stopped at {} of {k}", clusters.len());
                }
            }
        }
    }

    #[test]
    fn underfilled_when_few_colors() {
        let img = RgbImage::from_fn(8, 8, |x, _| {
            if x % 2 == 0 {
                Rgb([10, 200, 30])
            } else {
                Rgb([250, 0, 90])
            }
        });
        for method in [Method::MeanCut, Method::MedianCut] {
            let clusters = cluster(&img, 10, method).unwrap();
            assert_eq!(clusters.len(), 2);
            let mut palette: Vec<_> = clusters.palette().colors().to_vec();
            palette.sort_by_key(|c| c.0);
            assert_eq!(palette, vec![Rgb([10, 200, 30]), Rgb([250, 0, 90])]);
        }
    }

    #[test]
    fn each_cluster_is_one_color_when_k_matches_distinct() {
        let img = random_image(3, 16, 16, 12);
        let k = distinct_colors(&img);
        for method in [Method::MeanCut, Method::MedianCut] {
            let clusters = cluster(&img, k, method).unwrap();
            assert_eq!(clusters.len(), k);
            for pixels in clusters.iter() {
                let first = img.get_pixel(pixels[0].x, pixels[0].y);
                assert!(pixels.iter().all(|p| img.get_pixel(p.x, p.y) == first));
            }
        }
    }

    #[test]
    fn single_cluster_covers_everything() {
        let img = gradient(9, 4);
        for method in [Method::MeanCut, Method::MedianCut] {
            let clusters = cluster(&img, 1, method).unwrap();
            assert_eq!(clusters.len(), 1);
            assert_eq!(clusters.get(0).unwrap().len(), 36);
        }
    }

    #[test]
    fn zero_colors_is_an_error() {
        let img = gradient(2, 2);
        assert!(matches!(
            cluster(&img, 0, Method::MedianCut),
            Err(Error::NoColors)
        ));
    }

    #[test]
    fn empty_image_has_no_clusters() {
        let img = RgbImage::new(0, 0);
        for method in [Method::MeanCut, Method::MedianCut] {
            let clusters = cluster(&img, 16, method).unwrap();
            assert!(clusters.is_empty());
            assert!(clusters.palette().is_empty());
            let indexed = clusters.indexed().unwrap();
            assert_eq!(indexed.dimensions(), (0, 0));
        }
    }

    #[test]
    fn clustering_is_deterministic() {
        let img = random_image(11, 31, 29, 1000);
        for method in [Method::MeanCut, Method::MedianCut] {
            let a = cluster(&img, 64, method).unwrap().indexed().unwrap();
            let b = cluster(&img, 64, method).unwrap().indexed().unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn palette_is_truncated_mean() {
        let img = RgbImage::from_fn(3, 1, |x, _| Rgb([x as u8 * 2 + 1, 255, 0]));
        let clusters = cluster(&img, 1, Method::MedianCut).unwrap();
        // (257 + 771 + 1285) / (3 << 8) = 3.01..
        assert_eq!(clusters.palette().colors(), &[Rgb([3, 255, 0])]);
    }

    #[test]
    fn indexed_stamps_cluster_indices() {
        let img = random_image(5, 10, 10, 40);
        let clusters = cluster(&img, 8, Method::MeanCut).unwrap();
        let indexed = clusters.indexed().unwrap();
        for (i, pixels) in clusters.iter().enumerate() {
            for p in pixels {
                assert_eq!(indexed.index(p.x, p.y), i as u8);
            }
        }
    }
}
