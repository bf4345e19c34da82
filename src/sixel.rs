//! DEC sixel output for indexed rasters.
//!
//! The image is written in bands of six rows. Within a band every palette
//! color that occurs gets one pass over the columns, each column encoded as
//! one sixel character whose bits mark the rows painted with that color.

use crate::indexed::IndexedImage;
use std::io::{Result, Write};

const SIXEL_HEIGHT: u32 = 6;
const EMPTY_SIXEL: u8 = b'?';

/// Run-length encoder for one color pass.
#[derive(Default, Debug)]
struct SixelBuf {
    sixel: u8,
    count: usize,
}

impl SixelBuf {
    fn add<W: Write>(&mut self, sixel: u8, w: &mut W) -> Result<()> {
        if self.count > 0 && sixel != self.sixel {
            self.write(w)?;
            self.count = 0;
        }
        self.sixel = sixel;
        self.count += 1;
        Ok(())
    }

    fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        match self.count {
            0 => Ok(()),
            1 => w.write_all(&[self.sixel]),
            2 | 3 => w.write_all(&vec![self.sixel; self.count]),
            n => write!(w, "!{}{}", n, self.sixel as char),
        }
    }

    /// Ends the pass. Trailing empty columns are not written.
    fn flush<W: Write>(&mut self, w: &mut W) -> Result<()> {
        if self.sixel != EMPTY_SIXEL {
            self.write(w)?;
        }
        self.count = 0;
        Ok(())
    }
}

pub struct SixelEncoder<'a> {
    image: &'a IndexedImage,
}

impl<'a> SixelEncoder<'a> {
    pub fn new(image: &'a IndexedImage) -> Self {
        Self { image }
    }

    pub fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        let (width, height) = self.image.dimensions();
        let palette = self.image.palette();

        write!(w, "\x1bPq\"1;1;{};{}", width, height)?;
        for (i, rgb) in palette.colors().iter().enumerate() {
            let [r, g, b] = rgb.0.map(|c| c as u16 * 100 / 255);
            write!(w, "#{};2;{};{};{}", i, r, g, b)?;
        }

        let mut used = vec![false; palette.len()];
        let mut sixel_buf = SixelBuf::default();
        for band in (0..height).step_by(SIXEL_HEIGHT as usize) {
            let rows = SIXEL_HEIGHT.min(height - band);
            used.fill(false);
            for y in band..band + rows {
                for x in 0..width {
                    used[self.image.index(x, y) as usize] = true;
                }
            }

            let mut first = true;
            for (color, _) in used.iter().enumerate().filter(|&(_, &u)| u) {
                if !first {
                    w.write_all(b"$")?;
                }
                first = false;
                write!(w, "#{}", color)?;
                for x in 0..width {
                    let bits = (0..rows)
                        .filter(|&dy| self.image.index(x, band + dy) as usize == color)
                        .fold(0u8, |bits, dy| bits | 1 << dy);
                    sixel_buf.add(EMPTY_SIXEL + bits, w)?;
                }
                sixel_buf.flush(w)?;
            }
            if band + rows < height {
                w.write_all(b"-")?;
            }
        }

        w.write_all(b"\x1b\\")?;
        Ok(())
    }
}
