use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Identifier of a well within one analysis run.
///
/// Ids follow reading order of the well centroids and are re-derived on
/// every run; they are not stable across runs with different parameters.
pub type WellId = usize;

/// Axis-aligned bounding box in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl BoundingBox {
    /// Exclusive right edge.
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    /// Whether the box lies entirely inside a `width` x `height` frame.
    pub fn fits_within(&self, width: usize, height: usize) -> bool {
        self.right() <= width && self.bottom() <= height
    }
}

/// One detected well.
#[derive(Clone, Debug, PartialEq)]
pub struct WellRegion {
    pub id: WellId,
    pub bbox: BoundingBox,
    /// Membership mask with the bounding box's shape (height, width).
    pub mask: Array2<bool>,
    /// Centroid `(x, y)`: mean coordinates of the member pixels.
    pub centroid: (f64, f64),
    /// Number of member pixels.
    pub area: usize,
}

impl WellRegion {
    /// Absolute `(x, y)` coordinates of every member pixel in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.mask
            .indexed_iter()
            .filter(|(_, &inside)| inside)
            .map(|((r, c), _)| (self.bbox.x + c, self.bbox.y + r))
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.bbox.x
            && y >= self.bbox.y
            && x < self.bbox.right()
            && y < self.bbox.bottom()
            && self.mask[[y - self.bbox.y, x - self.bbox.x]]
    }

    /// Mask as horizontal runs `[row, start_col, length]` in absolute
    /// coordinates, a compact form for exports.
    pub fn mask_runs(&self) -> Vec<[usize; 3]> {
        let mut runs = Vec::new();
        for (r, row) in self.mask.outer_iter().enumerate() {
            let mut start: Option<usize> = None;
            for (c, &inside) in row.iter().enumerate() {
                match (inside, start) {
                    (true, None) => start = Some(c),
                    (false, Some(s)) => {
                        runs.push([self.bbox.y + r, self.bbox.x + s, c - s]);
                        start = None;
                    }
                    _ => {}
                }
            }
            if let Some(s) = start {
                runs.push([self.bbox.y + r, self.bbox.x + s, row.len() - s]);
            }
        }
        runs
    }
}
