use std::collections::HashMap;

use ndarray::Array2;

use super::config::Connectivity;

/// Statistics for a single connected component.
#[derive(Clone, Debug)]
pub struct ComponentStats {
    /// Label of this component in `Labeling::labels`.
    pub label: u32,
    /// Number of pixels in the component.
    pub area: usize,
    /// Bounding box: (min_row, max_row, min_col, max_col).
    pub bbox: (usize, usize, usize, usize),
    /// Sum of member row indices, for the centroid.
    pub sum_row: u64,
    /// Sum of member column indices, for the centroid.
    pub sum_col: u64,
}

impl ComponentStats {
    /// Unweighted centroid as `(row, col)`.
    pub fn centroid(&self) -> (f64, f64) {
        let n = self.area as f64;
        (self.sum_row as f64 / n, self.sum_col as f64 / n)
    }
}

/// Label image plus per-component statistics.
#[derive(Clone, Debug)]
pub struct Labeling {
    /// Resolved label per pixel, 0 for background.
    pub labels: Array2<u32>,
    /// Components in ascending label order.
    pub components: Vec<ComponentStats>,
}

/// Perform connected component analysis on a binary mask using two-pass
/// labeling with union-find.
///
/// With `Connectivity::Eight` the upper-left and upper-right neighbours are
/// joined as well as the upper and left ones, so diagonally touching pixels
/// belong to one component.
pub fn connected_components(mask: &Array2<bool>, connectivity: Connectivity) -> Labeling {
    let (h, w) = mask.dim();
    let mut labels = Array2::<u32>::zeros((h, w));
    if h == 0 || w == 0 {
        return Labeling {
            labels,
            components: Vec::new(),
        };
    }

    let mut next_label: u32 = 1;
    // Union-find parent array. Index 0 unused; labels start at 1.
    let mut parent: Vec<u32> = vec![0; h * w / 2 + 2];

    // Pass 1: assign provisional labels.
    for row in 0..h {
        for col in 0..w {
            if !mask[[row, col]] {
                continue;
            }

            let mut neighbours = [0u32; 4];
            neighbours[0] = if row > 0 { labels[[row - 1, col]] } else { 0 };
            neighbours[1] = if col > 0 { labels[[row, col - 1]] } else { 0 };
            if connectivity == Connectivity::Eight && row > 0 {
                neighbours[2] = if col > 0 { labels[[row - 1, col - 1]] } else { 0 };
                neighbours[3] = if col + 1 < w { labels[[row - 1, col + 1]] } else { 0 };
            }

            let smallest = neighbours.iter().copied().filter(|&l| l > 0).min();
            match smallest {
                None => {
                    // New label.
                    if next_label as usize >= parent.len() {
                        parent.resize(parent.len() * 2, 0);
                    }
                    parent[next_label as usize] = next_label;
                    labels[[row, col]] = next_label;
                    next_label += 1;
                }
                Some(smallest) => {
                    labels[[row, col]] = smallest;
                    for &other in neighbours.iter().filter(|&&l| l > 0 && l != smallest) {
                        union(&mut parent, smallest, other);
                    }
                }
            }
        }
    }

    // Flatten parent references.
    for i in 1..next_label as usize {
        parent[i] = find(&parent, i as u32);
    }

    // Pass 2: resolve labels and collect stats.
    let mut stats_map = HashMap::<u32, ComponentStats>::new();

    for row in 0..h {
        for col in 0..w {
            let lbl = labels[[row, col]];
            if lbl == 0 {
                continue;
            }
            let root = parent[lbl as usize];
            labels[[row, col]] = root;

            let entry = stats_map.entry(root).or_insert(ComponentStats {
                label: root,
                area: 0,
                bbox: (row, row, col, col),
                sum_row: 0,
                sum_col: 0,
            });

            entry.area += 1;
            entry.sum_row += row as u64;
            entry.sum_col += col as u64;
            entry.bbox.0 = entry.bbox.0.min(row);
            entry.bbox.1 = entry.bbox.1.max(row);
            entry.bbox.2 = entry.bbox.2.min(col);
            entry.bbox.3 = entry.bbox.3.max(col);
        }
    }

    let mut components: Vec<ComponentStats> = stats_map.into_values().collect();
    components.sort_unstable_by_key(|c| c.label);
    Labeling { labels, components }
}

fn find(parent: &[u32], mut x: u32) -> u32 {
    while parent[x as usize] != x {
        x = parent[x as usize];
    }
    x
}

fn union(parent: &mut [u32], a: u32, b: u32) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        // Merge larger root into smaller root to keep labels consistent.
        let (small, big) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[big as usize] = small;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagonal_pair() -> Array2<bool> {
        let mut mask = Array2::from_elem((4, 4), false);
        mask[[1, 1]] = true;
        mask[[2, 2]] = true;
        mask
    }

    #[test]
    fn test_diagonal_contact_joins_with_eight_connectivity() {
        let labeling = connected_components(&diagonal_pair(), Connectivity::Eight);
        assert_eq!(labeling.components.len(), 1);
        assert_eq!(labeling.components[0].area, 2);
        assert_eq!(labeling.components[0].bbox, (1, 2, 1, 2));
    }

    #[test]
    fn test_diagonal_contact_splits_with_four_connectivity() {
        let labeling = connected_components(&diagonal_pair(), Connectivity::Four);
        assert_eq!(labeling.components.len(), 2);
    }

    #[test]
    fn test_u_shape_merges_into_single_label() {
        // Two arms that only meet at the bottom row force a union.
        let mut mask = Array2::from_elem((4, 5), false);
        for row in 0..4 {
            mask[[row, 0]] = true;
            mask[[row, 4]] = true;
        }
        for col in 0..5 {
            mask[[3, col]] = true;
        }
        let labeling = connected_components(&mask, Connectivity::Four);
        assert_eq!(labeling.components.len(), 1);
        let label = labeling.components[0].label;
        assert_eq!(labeling.labels[[0, 0]], label);
        assert_eq!(labeling.labels[[0, 4]], label);
        assert_eq!(labeling.components[0].area, 11);
    }

    #[test]
    fn test_centroid_of_square() {
        let mut mask = Array2::from_elem((6, 6), false);
        for row in 1..4 {
            for col in 2..5 {
                mask[[row, col]] = true;
            }
        }
        let labeling = connected_components(&mask, Connectivity::Eight);
        assert_eq!(labeling.components[0].centroid(), (2.0, 3.0));
    }
}
