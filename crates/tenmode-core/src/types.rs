//! Extent and stride vocabulary shared by every kernel.
//!
//! This module defines the fundamental metadata types used to describe a dense
//! array without owning it:
//!
//! - Type aliases for per-axis metadata ([`Extents`], [`Strides`], [`Mode`])
//! - Storage orders ([`Layout`]) and the strides they induce
//! - The offset formula ([`offset_of`]) every kernel relies on, and the span
//!   of offsets a view reaches ([`addressed_span`])
//!
//! # Examples
//!
//! ```
//! use tenmode_core::{offset_of, Layout};
//!
//! let extents = [2, 3, 4];
//! let row = Layout::RowMajor.strides(&extents);
//! let col = Layout::ColumnMajor.strides(&extents);
//!
//! assert_eq!(&row[..], &[12, 4, 1]);
//! assert_eq!(&col[..], &[1, 2, 6]);
//! assert_eq!(offset_of(&[1, 2, 3], &row), 23);
//! ```

use smallvec::SmallVec;

/// Per-axis sizes of a tensor.
///
/// Backed by a `SmallVec` so that tensors of rank six or lower never touch the
/// heap for their metadata.
pub type Extents = SmallVec<[usize; 6]>;

/// Per-axis memory steps, in elements.
///
/// Signed, since views produced by reversing an axis step backwards.
pub type Strides = SmallVec<[isize; 6]>;

/// One-based contraction mode, `1 <= m <= rank`.
pub type Mode = usize;

/// Storage order of a dense buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Layout {
    /// Last index varies fastest (C order).
    #[default]
    RowMajor,
    /// First index varies fastest (Fortran order).
    ColumnMajor,
}

impl Layout {
    /// Compute the contiguous strides for `extents` in this storage order.
    ///
    /// Axes of extent one still receive the stride they would have in a
    /// packed buffer, so the result is always usable for offset arithmetic.
    ///
    /// # Examples
    ///
    /// ```
    /// use tenmode_core::Layout;
    ///
    /// assert_eq!(&Layout::RowMajor.strides(&[4, 2, 3])[..], &[6, 3, 1]);
    /// assert_eq!(&Layout::ColumnMajor.strides(&[4, 2, 3])[..], &[1, 4, 8]);
    /// assert!(Layout::RowMajor.strides(&[]).is_empty());
    /// ```
    pub fn strides(self, extents: &[usize]) -> Strides {
        let mut strides: Strides = SmallVec::from_elem(0, extents.len());
        let mut step = 1isize;
        match self {
            Layout::RowMajor => {
                for (w, &n) in strides.iter_mut().zip(extents).rev() {
                    *w = step;
                    step *= n.max(1) as isize;
                }
            }
            Layout::ColumnMajor => {
                for (w, &n) in strides.iter_mut().zip(extents) {
                    *w = step;
                    step *= n.max(1) as isize;
                }
            }
        }
        strides
    }
}

/// Number of elements described by `extents`.
///
/// A rank-0 extent vector describes a single scalar.
#[inline]
pub fn element_count(extents: &[usize]) -> usize {
    extents.iter().product()
}

/// Linear offset of a multi-index: `Σ strides[i] * index[i]`.
#[inline]
pub fn offset_of(index: &[usize], strides: &[isize]) -> isize {
    debug_assert_eq!(index.len(), strides.len());
    index
        .iter()
        .zip(strides)
        .map(|(&i, &w)| i as isize * w)
        .sum()
}

/// Distance from the lowest addressed element to element `[0, ..., 0]`.
///
/// Zero unless some stride is negative.
pub(crate) fn low_offset(extents: &[usize], strides: &[isize]) -> usize {
    extents
        .iter()
        .zip(strides)
        .filter(|&(&n, &w)| n > 0 && w < 0)
        .map(|(&n, &w)| (n - 1) * w.unsigned_abs())
        .sum()
}

/// Lowest and highest offsets addressed by a non-empty view, relative to
/// element `[0, ..., 0]`.
///
/// Returns `None` when the span does not fit in `isize`. Extents and strides
/// are paired axis by axis; callers check that their lengths agree.
///
/// # Examples
///
/// ```
/// use tenmode_core::addressed_span;
///
/// assert_eq!(addressed_span(&[2, 3], &[3, 1]), Some((0, 5)));
/// assert_eq!(addressed_span(&[2, 3], &[-3, 1]), Some((-3, 2)));
/// assert_eq!(addressed_span(&[], &[]), Some((0, 0)));
/// ```
pub fn addressed_span(extents: &[usize], strides: &[isize]) -> Option<(isize, isize)> {
    extents
        .iter()
        .zip(strides)
        .try_fold((0isize, 0isize), |(low, high), (&n, &w)| {
            let reach = isize::try_from(n.saturating_sub(1)).ok()?.checked_mul(w)?;
            if reach < 0 {
                Some((low.checked_add(reach)?, high))
            } else {
                Some((low, high.checked_add(reach)?))
            }
        })
}
