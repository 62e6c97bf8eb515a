//! Finder pattern ("bullseye") membership.

/// Side of a finder pattern, in modules.
pub const FINDER_SIZE: usize = 7;

/// Returns `true` if module `(x, y)` is a dark cell of one of the three finder patterns.
///
/// A finder pattern is a 7×7 block at the top-left, top-right or bottom-left corner of the
/// matrix. Inside the block, only the outer ring and the 3×3 inner square count; the light
/// ring between them does not.
///
/// # Example
///
/// ```rust
/// use qrstyle::finder::is_finder;
///
/// assert!(is_finder(0, 0, 21));
/// assert!(!is_finder(1, 1, 21));
/// assert!(is_finder(3, 3, 21));
/// assert!(is_finder(20, 6, 21));
/// assert!(!is_finder(20, 20, 21));
/// ```
pub fn is_finder(x: usize, y: usize, matrix_size: usize) -> bool {
    if matrix_size < FINDER_SIZE {
        return false;
    }
    let far = matrix_size - FINDER_SIZE;
    let local = |v: usize| -> Option<usize> {
        if v < FINDER_SIZE {
            Some(v)
        } else if (far..matrix_size).contains(&v) {
            Some(v - far)
        } else {
            None
        }
    };
    let (Some(lx), Some(ly)) = (local(x), local(y)) else {
        return false;
    };
    // The bottom-right corner has no finder pattern.
    if x >= FINDER_SIZE && y >= FINDER_SIZE {
        return false;
    }
    bullseye_cell(lx, ly)
}

fn bullseye_cell(lx: usize, ly: usize) -> bool {
    let ring = lx == 0 || lx == FINDER_SIZE - 1 || ly == 0 || ly == FINDER_SIZE - 1;
    let core = (2..=4).contains(&lx) && (2..=4).contains(&ly);
    ring || core
}
