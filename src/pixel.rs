use crate::source::ImageSource;

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pixel {
    pub x: u32,
    pub y: u32,
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    #[default]
    Green,
    Blue,
}

impl Channel {
    #[inline(always)]
    pub fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

/// Every pixel of `image` in raster order.
pub fn pixel_set<I: ImageSource + ?Sized>(image: &I) -> Vec<Pixel> {
    let (width, height) = image.dimensions();
    let mut pixels = Vec::with_capacity(image.pixel_count());
    for y in 0..height {
        for x in 0..width {
            pixels.push(Pixel { x, y });
        }
    }
    pixels
}

/// Per-channel value range of a set of colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Extents {
    pub min: [u32; 3],
    pub max: [u32; 3],
}

impl Default for Extents {
    fn default() -> Self {
        Self {
            min: [u32::MAX; 3],
            max: [0; 3],
        }
    }
}

impl Extents {
    pub fn from_colors<It>(colors: It) -> Self
    where
        It: IntoIterator<Item = [u32; 3]>,
    {
        let mut extents = Self::default();
        for color in colors {
            extents.add(color);
        }
        extents
    }

    #[inline]
    pub fn add(&mut self, color: [u32; 3]) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(color[i]);
            self.max[i] = self.max[i].max(color[i]);
        }
    }

    #[inline]
    pub fn range(&self, channel: Channel) -> u32 {
        let i = channel.index();
        self.max[i].saturating_sub(self.min[i])
    }

    /// Green unless red is strictly wider, then blue if strictly wider still.
    pub fn widest(&self) -> Channel {
        let mut widest = Channel::Green;
        if self.range(Channel::Red) > self.range(widest) {
            widest = Channel::Red;
        }
        if self.range(Channel::Blue) > self.range(widest) {
            widest = Channel::Blue;
        }
        widest
    }

    /// Product of the three channel ranges; zero if any channel is constant.
    pub fn volume(&self) -> u64 {
        [Channel::Red, Channel::Green, Channel::Blue]
            .into_iter()
            .map(|c| self.range(c) as u64)
            .product()
    }
}
