//! Error diffusion kernels.
//!
//! A kernel lists the neighbors that receive a share of the quantization
//! error as `(dx, dy, weight)` over a common divisor. Only the pixel to the
//! right (`dx = 1, dy = 0`) and the three pixels of the next row
//! (`dx ∈ -1..=1, dy = 1`) can be targeted, matching the one-pixel carry and
//! single next-row buffer of the ditherer.
//!
//! Shares are computed in integers, truncating toward zero, and the last
//! entry receives whatever the other entries left over. The weights of a
//! kernel therefore always move the entire error.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kernel {
    entries: &'static [(i32, i32, i32)],
    divisor: i32,
}

/// Sierra Lite ("Sierra-2-4A").
///
/// ```text
///        X   2
///    1   1
/// ```
pub const SIERRA_LITE: Kernel = Kernel {
    entries: &[
        (1, 0, 2),  // right
        (0, 1, 1),  // bottom
        (-1, 1, 1), // bottom-left
    ],
    divisor: 4,
};

/// Floyd-Steinberg.
///
/// ```text
///        X   7
///    3   5   1
/// ```
pub const FLOYD_STEINBERG: Kernel = Kernel {
    entries: &[
        (1, 0, 7),  // right
        (-1, 1, 3), // bottom-left
        (0, 1, 5),  // bottom
        (1, 1, 1),  // bottom-right
    ],
    divisor: 16,
};

/// Half of the error to the right, the rest straight down.
///
/// ```text
///    X   1
///    1
/// ```
pub const RIGHT_DOWN: Kernel = Kernel {
    entries: &[
        (1, 0, 1), // right
        (0, 1, 1), // bottom
    ],
    divisor: 2,
};

impl Default for Kernel {
    fn default() -> Self {
        SIERRA_LITE
    }
}

impl Kernel {
    #[inline]
    pub fn entries(&self) -> &'static [(i32, i32, i32)] {
        self.entries
    }

    #[inline]
    pub fn divisor(&self) -> i32 {
        self.divisor
    }

    /// Splits `error` into one share per entry; the shares sum to `error`.
    #[inline]
    pub fn shares(&self, error: i32) -> impl Iterator<Item = (i32, i32, i32)> + '_ {
        let last = self.entries.len() - 1;
        let mut sent = 0;
        self.entries
            .iter()
            .enumerate()
            .map(move |(k, &(dx, dy, weight))| {
                let share = if k == last {
                    error - sent
                } else {
                    error * weight / self.divisor
                };
                sent += share;
                (dx, dy, share)
            })
    }
}
