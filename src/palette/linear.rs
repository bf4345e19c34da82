use super::{distance, wide_color, Color, Palette};
use crate::error::{Error, Result};

/// A palette searched exhaustively.
#[derive(Clone, Debug)]
pub struct LinearPalette {
    palette: Palette,
    wide: Vec<Color>,
}

impl LinearPalette {
    pub fn new(palette: Palette) -> Result<Self> {
        if palette.is_empty() {
            return Err(Error::NoColors);
        }
        let wide = palette.colors().iter().copied().map(wide_color).collect();
        Ok(Self { palette, wide })
    }

    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub(crate) fn wide_colors(&self) -> &[Color] {
        &self.wide
    }

    /// Index of the closest entry; the first one wins on ties.
    pub fn nearest(&self, color: Color) -> usize {
        let mut best = 0;
        let mut best_distance = u64::MAX;
        for (i, &c) in self.wide.iter().enumerate() {
            let d = distance(color, c);
            if d < best_distance {
                best = i;
                best_distance = d;
                if d == 0 {
                    break;
                }
            }
        }
        best
    }
}
