use super::Splitter;
use crate::source::ImageSource;
use priority_queue::PriorityQueue;
use std::cmp::Reverse;

/// Repeatedly splits the most populous splittable cluster at the median of
/// its widest channel.
pub(super) fn split_all<I: ImageSource + ?Sized>(splitter: &mut Splitter<'_, I>, colors: usize) {
    // Keyed by population, ties go to the older cluster.
    let mut queue = PriorityQueue::new();
    let mut values = Vec::with_capacity(splitter.pixels.len());
    if splitter.analyze(0) {
        queue.push(0, (splitter.clusters[0].len(), Reverse(0)));
    }
    while splitter.clusters.len() < colors {
        let Some((sx, _)) = queue.pop() else {
            break;
        };
        let m = cut_value(splitter, sx, &mut values);
        let cx = splitter.split(sx, |v| v < m);
        if splitter.clusters.len() == colors {
            break;
        }
        for x in [sx, cx] {
            if splitter.analyze(x) {
                queue.push(x, (splitter.clusters[x].len(), Reverse(x)));
            }
        }
    }
}

/// Median of the widest channel, moved to the nearest run boundary when the
/// median sits inside a run of equal values. Splitting at `v < m` with the
/// returned value always leaves both halves non-empty.
fn cut_value<I: ImageSource + ?Sized>(
    splitter: &Splitter<'_, I>,
    sx: usize,
    values: &mut Vec<u32>,
) -> u32 {
    let channel = splitter.clusters[sx].widest;
    values.clear();
    values.extend(
        splitter
            .members(sx)
            .iter()
            .map(|&p| splitter.value(p, channel)),
    );
    values.sort_unstable();
    median_boundary(values)
}

/// `values` must be sorted and contain at least two distinct values.
pub(crate) fn median_boundary(values: &[u32]) -> u32 {
    let len = values.len();
    let mut m1 = len / 2;
    if values[m1] != values[m1 - 1] {
        return values[m1];
    }
    let mut m2 = m1;
    // Walk left until the element before differs.
    m1 -= 1;
    while m1 > 0 && values[m1] == values[m1 - 1] {
        m1 -= 1;
    }
    // Walk right likewise.
    m2 += 1;
    while m2 < len && values[m2] == values[m2 - 1] {
        m2 += 1;
    }
    if m1 > len - m2 {
        values[m1]
    } else {
        values[m2]
    }
}
