//! Circular neighbourhood footprints.
//!
//! Erosion, feathering and smoothing all visit the pixels whose Euclidean
//! distance from the centre is within a (possibly fractional) radius. The
//! footprint precomputes those offsets once per stage.

use itertools::iproduct;

/// One neighbour offset inside a footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tap {
    pub dx: i32,
    pub dy: i32,
    /// Squared Euclidean distance from the centre
    pub distance_sq: f32,
}

/// Set of neighbour offsets with `distance <= radius`, centre included.
#[derive(Debug, Clone)]
pub struct Footprint {
    taps: Vec<Tap>,
}

impl Footprint {
    /// Builds the circular footprint for `radius`.
    ///
    /// A radius of 1.2 yields the centre plus the four orthogonal
    /// neighbours; 1.5 adds the diagonals.
    pub fn circular(radius: f32) -> Self {
        let reach = radius.max(0.0).floor() as i32;
        let radius_sq = radius * radius;

        let taps = iproduct!(-reach..=reach, -reach..=reach)
            .filter_map(|(dy, dx)| {
                let distance_sq = (dx * dx + dy * dy) as f32;
                (distance_sq <= radius_sq).then_some(Tap {
                    dx,
                    dy,
                    distance_sq,
                })
            })
            .collect();

        Self { taps }
    }

    #[inline]
    pub fn taps(&self) -> &[Tap] {
        &self.taps
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.taps.len()
    }

    /// Iterates the in-bounds neighbours of `(x, y)` in an image of the given size.
    ///
    /// Yields `(nx, ny, tap_index)`, where `tap_index` indexes [`Footprint::taps`].
    /// Out-of-bounds offsets are skipped; there is no padding or wraparound.
    #[inline]
    pub fn neighbours(
        &self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> impl Iterator<Item = (u32, u32, usize)> + '_ {
        let (x, y) = (i64::from(x), i64::from(y));
        let (width, height) = (i64::from(width), i64::from(height));

        self.taps.iter().enumerate().filter_map(move |(index, tap)| {
            let nx = x + i64::from(tap.dx);
            let ny = y + i64::from(tap.dy);
            ((0..width).contains(&nx) && (0..height).contains(&ny))
                .then_some((nx as u32, ny as u32, index))
        })
    }
}
