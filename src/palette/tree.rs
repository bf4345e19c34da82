use super::{distance, Color, LinearPalette, Palette};
use crate::cluster::median_boundary;
use crate::pixel::{Channel, Extents};
use std::ops::Range;

const ROOT: u32 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Node {
    Leaf {
        index: u32,
        color: Color,
    },
    /// Colors with `color[axis] < threshold` live under `low`, the rest under `high`.
    Split {
        axis: Channel,
        threshold: i32,
        low: u32,
        high: u32,
    },
}

impl Default for Node {
    fn default() -> Self {
        Node::Leaf {
            index: 0,
            color: [0; 3],
        }
    }
}

/// A palette organized as a binary space partition of its colors.
///
/// Nodes live in a flat arena with the root at index 0; children are arena
/// indices.
#[derive(Clone, Debug)]
pub struct TreePalette {
    palette: Palette,
    nodes: Vec<Node>,
}

impl TreePalette {
    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Longest root-to-leaf path, counted in edges.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut stack = vec![(ROOT, 0)];
        while let Some((id, d)) = stack.pop() {
            match self.nodes[id as usize] {
                Node::Leaf { .. } => depth = depth.max(d),
                Node::Split { low, high, .. } => {
                    stack.push((low, d + 1));
                    stack.push((high, d + 1));
                }
            }
        }
        depth
    }

    /// Palette index of the leaf whose cell contains `color`, found by plain
    /// descent without backtracking.
    pub fn locate(&self, color: Color) -> usize {
        let mut id = ROOT;
        loop {
            match self.nodes[id as usize] {
                Node::Leaf { index, .. } => return index as usize,
                Node::Split {
                    axis,
                    threshold,
                    low,
                    high,
                } => {
                    id = if color[axis.index()] < threshold {
                        low
                    } else {
                        high
                    };
                }
            }
        }
    }

    /// Index of the closest palette entry, the lowest index on ties, exactly
    /// as a linear scan would answer.
    ///
    /// The search starts down the query's own cell and only enters a sibling
    /// subtree when its splitting plane is no farther than the best match.
    pub fn nearest(&self, color: Color) -> usize {
        let mut best = (u64::MAX, u32::MAX);
        // (node, lower bound on the distance to anything below it)
        let mut stack = vec![(ROOT, 0u64)];
        while let Some((mut id, bound)) = stack.pop() {
            if bound > best.0 {
                continue;
            }
            loop {
                match self.nodes[id as usize] {
                    Node::Leaf { index, color: c } => {
                        let candidate = (distance(color, c), index);
                        if candidate < best {
                            best = candidate;
                        }
                        break;
                    }
                    Node::Split {
                        axis,
                        threshold,
                        low,
                        high,
                    } => {
                        let v = color[axis.index()] as i64;
                        let t = threshold as i64;
                        let (near, far, gap) = if v < t {
                            (low, high, t - v)
                        } else {
                            // low holds values <= t - 1
                            (high, low, v - t + 1)
                        };
                        stack.push((far, bound.max((gap * gap) as u64)));
                        id = near;
                    }
                }
            }
        }
        best.1 as usize
    }
}

/// Builds a [`TreePalette`] by median cut over the palette's own colors.
///
/// Each group is split on its widest channel at a value that leaves both
/// children non-empty, so depth stays around `log2(len)`. Identical colors
/// collapse into one leaf carrying the lowest index.
pub struct TreeBuilder<'a> {
    palette: &'a LinearPalette,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(palette: &'a LinearPalette) -> Self {
        Self { palette }
    }

    fn create(nodes: &mut Vec<Node>) -> u32 {
        let id = nodes.len();
        nodes.push(Node::default());
        id as u32
    }

    pub fn build(self) -> TreePalette {
        let mut entries: Vec<(u32, Color)> = self
            .palette
            .wide_colors()
            .iter()
            .enumerate()
            .map(|(i, &c)| (i as u32, c))
            .collect();
        let mut nodes = Vec::with_capacity(entries.len() * 2);
        let mut values = Vec::with_capacity(entries.len());
        let root = Self::create(&mut nodes);
        let mut pending: Vec<(u32, Range<usize>)> = vec![(root, 0..entries.len())];

        while let Some((id, range)) = pending.pop() {
            let group = &mut entries[range.clone()];
            // Widened u8 colors are never negative.
            let extents = Extents::from_colors(group.iter().map(|&(_, c)| c.map(|v| v as u32)));
            let axis = extents.widest();
            if extents.range(axis) == 0 {
                let (index, color) = group
                    .iter()
                    .copied()
                    .min_by_key(|(i, _)| *i)
                    .unwrap_or_default();
                nodes[id as usize] = Node::Leaf { index, color };
                continue;
            }

            let a = axis.index();
            group.sort_unstable_by_key(|(i, c)| (c[a], *i));
            values.clear();
            values.extend(group.iter().map(|(_, c)| c[a] as u32));
            let threshold = median_boundary(&values) as i32;
            let mid = range.start + group.partition_point(|(_, c)| c[a] < threshold);

            let low = Self::create(&mut nodes);
            let high = Self::create(&mut nodes);
            nodes[id as usize] = Node::Split {
                axis,
                threshold,
                low,
                high,
            };
            pending.push((high, mid..range.end));
            pending.push((low, range.start..mid));
        }

        let tree = TreePalette {
            palette: self.palette.palette().clone(),
            nodes,
        };
        tracing::debug!(
            colors = tree.palette.len(),
            nodes = tree.nodes.len(),
            depth = tree.depth(),
            "built palette tree"
        );
        tree
    }
}
