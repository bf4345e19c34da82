use super::Splitter;
use crate::source::ImageSource;

/// Fixed-point scaling of the late-phase priority
/// `population * (volume >> VOLUME_SHIFT) >> PRIORITY_SHIFT`.
const VOLUME_SHIFT: u32 = 16;
const PRIORITY_SHIFT: u32 = 29;

#[inline]
fn late_priority(population: u64, volume: u64) -> u64 {
    let p = (population as u128 * (volume >> VOLUME_SHIFT) as u128) >> PRIORITY_SHIFT;
    p.min(u64::MAX as u128) as u64
}

/// Two-phase mean cut.
///
/// Until half of the clusters exist, the most populous cluster is split
/// halfway into the longer tail of its widest channel. After that, clusters
/// are ranked by population times color volume and split at the mean.
pub(super) fn split_all<I: ImageSource + ?Sized>(splitter: &mut Splitter<'_, I>, colors: usize) {
    let half = colors / 2;
    set_priority(splitter, 0, 0 < half);
    while splitter.clusters.len() < colors {
        let Some(sx) = select(splitter) else {
            break;
        };
        let early = splitter.clusters.len() - 1 < half;
        let m = cut_value(splitter, sx, early);
        let min = splitter.clusters[sx].min;
        // A cut landing on the minimum keeps the minimum low.
        let cx = splitter.split(sx, |v| v < m || (m == min && v == m));
        if splitter.clusters.len() == colors {
            break;
        }
        if cx == half {
            for c in &mut splitter.clusters[..cx] {
                c.priority = late_priority(c.priority, c.volume);
            }
        }
        set_priority(splitter, cx, cx < half);
        set_priority(splitter, sx, cx < half);
    }
}

fn set_priority<I: ImageSource + ?Sized>(splitter: &mut Splitter<'_, I>, cx: usize, early: bool) {
    splitter.analyze(cx);
    let c = &mut splitter.clusters[cx];
    c.priority = c.len() as u64;
    if !early {
        c.priority = late_priority(c.priority, c.volume);
    }
}

/// Highest-priority splittable cluster, the oldest one on ties.
///
/// Zero-priority clusters are still eligible, so flat clusters (zero volume)
/// with spread left on some channel keep splitting.
fn select<I: ImageSource + ?Sized>(splitter: &Splitter<'_, I>) -> Option<usize> {
    let mut best: Option<(usize, u64)> = None;
    for (x, c) in splitter.clusters.iter().enumerate() {
        if c.is_splittable() && best.map_or(true, |(_, p)| c.priority > p) {
            best = Some((x, c.priority));
        }
    }
    best.map(|(x, _)| x)
}

fn cut_value<I: ImageSource + ?Sized>(splitter: &Splitter<'_, I>, sx: usize, early: bool) -> u32 {
    let c = &splitter.clusters[sx];
    let sum: u64 = splitter
        .members(sx)
        .iter()
        .map(|&p| splitter.value(p, c.widest) as u64)
        .sum();
    let mean = (sum / c.len() as u64) as u32;
    if !early {
        return mean;
    }
    // Cut into the middle of the longer tail rather than at the mean.
    if c.max - mean > mean - c.min {
        (mean + c.max) / 2
    } else {
        (mean + c.min) / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{cluster, Method};
    use image::{Rgb, RgbImage};

    #[test]
    fn late_priority_scaling() {
        assert_eq!(late_priority(4, 0), 0);
        assert_eq!(late_priority(1, 1 << 16), 0);
        assert_eq!(late_priority(1 << 29, 1 << 16), 1);
        assert_eq!(late_priority(1 << 20, 1 << 30), 1 << 5);
        assert_eq!(late_priority(u64::MAX, u64::MAX), u64::MAX);
    }

    #[test]
    fn red_green_blue_scenario() {
        let img = RgbImage::from_fn(2, 2, |x, y| match (x, y) {
            (_, 0) => Rgb([255, 0, 0]),
            (0, 1) => Rgb([0, 255, 0]),
            _ => Rgb([0, 0, 255]),
        });
        let clusters = cluster(&img, 3, Method::MeanCut).unwrap();
        assert_eq!(clusters.len(), 3);
        let palette = clusters.palette();
        for color in [Rgb([255, 0, 0]), Rgb([0, 255, 0]), Rgb([0, 0, 255])] {
            assert!(palette.colors().contains(&color), "{color:?} missing");
        }
        let indexed = clusters.indexed().unwrap();
        assert_eq!(indexed.index(0, 0), indexed.index(1, 0));
    }

    fn red_line(values: &[u8]) -> RgbImage {
        RgbImage::from_fn(values.len() as u32, 1, |x, _| Rgb([values[x as usize], 0, 0]))
    }

    #[test]
    fn early_cut_is_the_longer_tail_midpoint() {
        let img = red_line(&[0, 0, 0, 0, 100]);
        let mut splitter = Splitter::new(&img);
        assert!(splitter.analyze(0));
        // mean 20, the upper tail is longer
        assert_eq!(cut_value(&splitter, 0, true), 60 * 257);
        assert_eq!(cut_value(&splitter, 0, false), 20 * 257);

        let img = red_line(&[100, 100, 100, 100, 0]);
        let mut splitter = Splitter::new(&img);
        assert!(splitter.analyze(0));
        // mean 80, the lower tail is longer
        assert_eq!(cut_value(&splitter, 0, true), 40 * 257);
        assert_eq!(cut_value(&splitter, 0, false), 80 * 257);
    }

    #[test]
    fn first_split_uses_the_early_cut() {
        // A cut at the mean (23) would leave 40 with 100.
        let img = red_line(&[0, 0, 0, 0, 40, 100]);
        let clusters = cluster(&img, 2, Method::MeanCut).unwrap();
        let sizes: Vec<_> = clusters.iter().map(<[_]>::len).collect();
        assert_eq!(sizes, vec![5, 1]);
        assert_eq!(
            clusters.palette().colors(),
            &[Rgb([8, 0, 0]), Rgb([100, 0, 0])]
        );
    }

    #[test]
    fn priorities_are_rescaled_at_half() {
        // 32 dark pixels on the corners of a small cube, 4 bright outliers.
        let img = RgbImage::from_fn(36, 1, |x, _| {
            let bright = [[150, 150, 150], [255, 255, 255], [150, 255, 150], [255, 150, 255]];
            match x {
                0..=31 => Rgb([0, 1, 2].map(|bit| 10 + ((x as u8 >> bit) & 1) * 48)),
                _ => Rgb(bright[x as usize - 32]),
            }
        });
        let clusters = cluster(&img, 4, Method::MeanCut).unwrap();
        // After two early splits the dark block has late priority 1. The
        // two-pixel cluster left from the first split drops from population
        // priority 2 to late priority 0, so the block is split next.
        let sizes: Vec<_> = clusters.iter().map(<[_]>::len).collect();
        assert_eq!(sizes, vec![16, 2, 2, 16]);
        assert_eq!(
            clusters.palette().colors(),
            &[
                Rgb([34, 10, 34]),
                Rgb([203, 255, 203]),
                Rgb([203, 150, 203]),
                Rgb([34, 58, 34]),
            ]
        );
    }

    #[test]
    fn flat_cluster_is_still_split() {
        // Blue is constant, so every cluster has zero volume.
        let img = RgbImage::from_fn(6, 1, |x, _| Rgb([x as u8 * 40, 255 - x as u8 * 40, 9]));
        let clusters = cluster(&img, 6, Method::MeanCut).unwrap();
        assert_eq!(clusters.len(), 6);
    }

    #[test]
    fn two_valued_channel_splits_at_min() {
        let img = RgbImage::from_fn(5, 1, |x, _| {
            if x == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([1, 0, 0])
            }
        });
        let clusters = cluster(&img, 4, Method::MeanCut).unwrap();
        assert_eq!(clusters.len(), 2);
        let sizes: Vec<_> = clusters.iter().map(<[_]>::len).collect();
        assert_eq!(sizes, vec![1, 4]);
    }
}
