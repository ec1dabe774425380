use ndarray::Array2;

/// Morphological opening with a 3x3 square kernel: `iterations` erosions
/// followed by `iterations` dilations.
///
/// Breaks thin bridges between touching wells and drops specks smaller than
/// the kernel. Zero iterations returns the mask unchanged.
pub fn morphological_opening(mask: &Array2<bool>, iterations: usize) -> Array2<bool> {
    let mut result = mask.clone();
    for _ in 0..iterations {
        result = erode(&result);
    }
    for _ in 0..iterations {
        result = dilate(&result);
    }
    result
}

/// Iterate the in-bounds 3x3 neighbourhood of `(row, col)`.
fn neighbourhood(
    row: usize,
    col: usize,
    h: usize,
    w: usize,
) -> impl Iterator<Item = Option<(usize, usize)>> {
    (-1..=1_i64).flat_map(move |dr| {
        (-1..=1_i64).map(move |dc| {
            let nr = row as i64 + dr;
            let nc = col as i64 + dc;
            if nr < 0 || nr >= h as i64 || nc < 0 || nc >= w as i64 {
                None
            } else {
                Some((nr as usize, nc as usize))
            }
        })
    })
}

/// Binary erosion: a pixel stays true only if ALL pixels in its 3x3
/// neighborhood are true. Out-of-bounds neighbours count as false.
fn erode(mask: &Array2<bool>) -> Array2<bool> {
    let (h, w) = mask.dim();
    Array2::from_shape_fn((h, w), |(row, col)| {
        mask[[row, col]]
            && neighbourhood(row, col, h, w).all(|n| n.is_some_and(|p| mask[[p.0, p.1]]))
    })
}

/// Binary dilation: a pixel becomes true if ANY pixel in its 3x3 neighborhood is true.
fn dilate(mask: &Array2<bool>) -> Array2<bool> {
    let (h, w) = mask.dim();
    Array2::from_shape_fn((h, w), |(row, col)| {
        neighbourhood(row, col, h, w).any(|n| n.is_some_and(|p| mask[[p.0, p.1]]))
    })
}
