//! Non-owning strided views over dense buffers
//!
//! A view is the normalized calling convention of every kernel: a borrowed
//! slice, the position of element `[0, ..., 0]` inside it, and one extent and
//! one stride per axis. The element at multi-index `i` lives at
//! `offset + Σ strides[k] * i[k]`.
//!
//! Views never own their data, and constructing one never fails. Whether the
//! metadata actually fits the buffer is answered by `in_bounds`, which every
//! kernel consults before touching memory.
//!
//! # Examples
//!
//! ```
//! use tenmode_core::{Layout, StridedView};
//!
//! let data: Vec<f64> = (0..6).map(|x| x as f64).collect();
//! let view = StridedView::contiguous(&data, &[2, 3], Layout::ColumnMajor);
//!
//! assert_eq!(view.rank(), 2);
//! assert_eq!(view.get(&[1, 2]), Some(&5.0));
//! ```

use crate::types::{addressed_span, element_count, low_offset, offset_of, Extents, Layout, Strides};
use scirs2_core::ndarray_ext::{Array, ArrayView, Dimension};

/// Read-only strided view
#[derive(Debug, Clone)]
pub struct StridedView<'a, T> {
    data: &'a [T],
    offset: usize,
    extents: Extents,
    strides: Strides,
}

impl<'a, T> StridedView<'a, T> {
    /// Create a view from raw parts with element `[0, ..., 0]` at `data[0]`.
    ///
    /// The metadata is taken as given; see [`in_bounds`](Self::in_bounds).
    pub fn new(data: &'a [T], extents: &[usize], strides: &[isize]) -> Self {
        Self {
            data,
            offset: 0,
            extents: Extents::from_slice(extents),
            strides: Strides::from_slice(strides),
        }
    }

    /// View a packed buffer stored in the given order.
    pub fn contiguous(data: &'a [T], extents: &[usize], layout: Layout) -> Self {
        let strides = layout.strides(extents);
        Self::new(data, extents, &strides)
    }

    /// Move element `[0, ..., 0]` to `data[offset]`.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Borrow the memory of an array view without copying.
    ///
    /// Succeeds whenever the view's elements occupy one contiguous block,
    /// in any axis order and with any stride signs. Returns `None` for views
    /// with gaps (e.g. stepped slices).
    pub fn from_array<D: Dimension>(array: ArrayView<'a, T, D>) -> Option<Self> {
        let extents = Extents::from_slice(array.shape());
        let strides = Strides::from_slice(array.strides());
        let offset = low_offset(&extents, &strides);
        let data = array.to_slice_memory_order()?;
        Some(Self {
            data,
            offset,
            extents,
            strides,
        })
    }

    /// The underlying buffer.
    #[inline]
    pub fn data(&self) -> &'a [T] {
        self.data
    }

    /// Position of element `[0, ..., 0]` in [`data`](Self::data).
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Size of each axis.
    #[inline]
    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    /// Memory step of each axis, in elements.
    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Number of axes.
    #[inline]
    pub fn rank(&self) -> usize {
        self.extents.len()
    }

    /// Number of logical elements.
    #[inline]
    pub fn len(&self) -> usize {
        element_count(&self.extents)
    }

    /// True when some axis has extent zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the view has no backing storage at all.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.data.is_empty()
    }

    /// True when extents and strides pair up and every element they address
    /// lies inside the buffer.
    ///
    /// An empty view addresses nothing and is always in bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use tenmode_core::StridedView;
    ///
    /// let data = [0.0; 5];
    /// assert!(StridedView::new(&data, &[2, 2], &[3, 1]).in_bounds());
    /// assert!(!StridedView::new(&data, &[2, 3], &[3, 1]).in_bounds());
    /// assert!(!StridedView::new(&data, &[2, 2], &[3]).in_bounds());
    /// ```
    pub fn in_bounds(&self) -> bool {
        fits(self.data.len(), self.offset, &self.extents, &self.strides)
    }

    /// Element at a multi-index, or `None` when out of range.
    pub fn get(&self, index: &[usize]) -> Option<&'a T> {
        if index.len() != self.rank() || index.iter().zip(&self.extents).any(|(&i, &n)| i >= n) {
            return None;
        }
        let pos = self.offset as isize + offset_of(index, &self.strides);
        usize::try_from(pos).ok().and_then(|p| self.data.get(p))
    }
}

/// Mutable strided view, the output side of every kernel
#[derive(Debug)]
pub struct StridedViewMut<'a, T> {
    data: &'a mut [T],
    offset: usize,
    extents: Extents,
    strides: Strides,
}

impl<'a, T> StridedViewMut<'a, T> {
    /// Create a mutable view from raw parts with element `[0, ..., 0]` at `data[0]`.
    ///
    /// The metadata is taken as given; see [`in_bounds`](Self::in_bounds).
    pub fn new(data: &'a mut [T], extents: &[usize], strides: &[isize]) -> Self {
        Self {
            data,
            offset: 0,
            extents: Extents::from_slice(extents),
            strides: Strides::from_slice(strides),
        }
    }

    /// Mutable view of a packed buffer stored in the given order.
    pub fn contiguous(data: &'a mut [T], extents: &[usize], layout: Layout) -> Self {
        let strides = layout.strides(extents);
        Self::new(data, extents, &strides)
    }

    /// Move element `[0, ..., 0]` to `data[offset]`.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Borrow the memory of an owned array.
    ///
    /// Returns `None` if the array is not contiguous in memory.
    pub fn from_array<D: Dimension>(array: &'a mut Array<T, D>) -> Option<Self> {
        let extents = Extents::from_slice(array.shape());
        let strides = Strides::from_slice(array.strides());
        let offset = low_offset(&extents, &strides);
        let data = array.as_slice_memory_order_mut()?;
        Some(Self {
            data,
            offset,
            extents,
            strides,
        })
    }

    /// Position of element `[0, ..., 0]` in the buffer.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Size of each axis.
    #[inline]
    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    /// Memory step of each axis, in elements.
    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Number of axes.
    #[inline]
    pub fn rank(&self) -> usize {
        self.extents.len()
    }

    /// Number of logical elements.
    #[inline]
    pub fn len(&self) -> usize {
        element_count(&self.extents)
    }

    /// True when some axis has extent zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the view has no backing storage at all.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.data.is_empty()
    }

    /// True when every element the view addresses lies inside its buffer.
    pub fn in_bounds(&self) -> bool {
        fits(self.data.len(), self.offset, &self.extents, &self.strides)
    }

    /// Split the view into its buffer and its read-only metadata.
    ///
    /// Kernels take the buffer mutably while still reading extents and
    /// strides, which a single `&mut self` borrow would not allow.
    #[inline]
    pub fn parts_mut(&mut self) -> (&mut [T], &[usize], &[isize], usize) {
        (&mut *self.data, &self.extents, &self.strides, self.offset)
    }

    /// Reborrow as a read-only view.
    pub fn as_view(&self) -> StridedView<'_, T> {
        StridedView {
            data: &*self.data,
            offset: self.offset,
            extents: self.extents.clone(),
            strides: self.strides.clone(),
        }
    }
}

/// Shared bounds test of both view kinds.
fn fits(len: usize, offset: usize, extents: &[usize], strides: &[isize]) -> bool {
    if extents.len() != strides.len() {
        return false;
    }
    if element_count(extents) == 0 {
        return true;
    }
    let (Ok(offset), Some((low, high))) = (isize::try_from(offset), addressed_span(extents, strides)) else {
        return false;
    };
    let first = offset.checked_add(low);
    let last = offset.checked_add(high);
    matches!((first, last), (Some(first), Some(last)) if first >= 0 && (last as usize) < len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::ndarray_ext::{s, Array, Axis, IxDyn};

    #[test]
    fn test_contiguous_row_major() {
        let data: Vec<i32> = (0..24).collect();
        let view = StridedView::contiguous(&data, &[2, 3, 4], Layout::RowMajor);

        assert_eq!(view.len(), 24);
        assert_eq!(view.get(&[0, 0, 0]), Some(&0));
        assert_eq!(view.get(&[1, 2, 3]), Some(&23));
        assert_eq!(view.get(&[0, 1, 0]), Some(&4));
        assert_eq!(view.get(&[2, 0, 0]), None);
        assert_eq!(view.get(&[0, 0]), None);
    }

    #[test]
    fn test_padded_strides_with_offset() {
        // 2x2 matrix embedded in a 3x4 buffer, starting at row 1, column 1
        let data: Vec<i32> = (0..12).collect();
        let view = StridedView::new(&data, &[2, 2], &[4, 1]).with_offset(5);

        assert_eq!(view.get(&[0, 0]), Some(&5));
        assert_eq!(view.get(&[0, 1]), Some(&6));
        assert_eq!(view.get(&[1, 0]), Some(&9));
        assert_eq!(view.get(&[1, 1]), Some(&10));
    }

    #[test]
    fn test_from_array_standard() {
        let array = Array::from_shape_vec(IxDyn(&[2, 3]), (0..6).collect::<Vec<i32>>()).unwrap();
        let view = StridedView::from_array(array.view()).unwrap();

        assert_eq!(view.extents(), &[2, 3]);
        assert_eq!(view.strides(), &[3, 1]);
        assert_eq!(view.offset(), 0);
        assert_eq!(view.get(&[1, 2]), Some(&5));
    }

    #[test]
    fn test_from_array_reversed_axis() {
        let array = Array::from_shape_vec(IxDyn(&[2, 3]), (0..6).collect::<Vec<i32>>()).unwrap();
        let mut reversed = array.view();
        reversed.invert_axis(Axis(0));

        let view = StridedView::from_array(reversed.clone()).unwrap();
        assert_eq!(view.strides(), &[-3, 1]);
        assert_eq!(view.offset(), 3);
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(view.get(&[i, j]), Some(&reversed[[i, j]]));
            }
        }
    }

    #[test]
    fn test_from_array_transposed() {
        let array = Array::from_shape_vec(IxDyn(&[2, 3]), (0..6).collect::<Vec<i32>>()).unwrap();
        let transposed = array.t();

        let view = StridedView::from_array(transposed.clone()).unwrap();
        assert_eq!(view.extents(), &[3, 2]);
        assert_eq!(view.get(&[2, 1]), Some(&transposed[[2, 1]]));
    }

    #[test]
    fn test_from_array_rejects_gaps() {
        let array = Array::from_shape_vec((4, 3), (0..12).collect::<Vec<i32>>()).unwrap();
        let stepped = array.slice(s![0..4;2, ..]);
        assert!(StridedView::from_array(stepped).is_none());
    }

    #[test]
    fn test_mut_view_from_array() {
        let mut array = Array::<f64, IxDyn>::zeros(IxDyn(&[2, 2]));
        {
            let mut view = StridedViewMut::from_array(&mut array).unwrap();
            let (data, _, strides, offset) = view.parts_mut();
            data[offset + strides[0] as usize] = 7.0;
        }
        assert_eq!(array[[1, 0]], 7.0);
    }

    #[test]
    fn test_in_bounds_short_buffer() {
        let data = vec![0.0f64; 5];
        assert!(!StridedView::new(&data, &[2, 3], &[3, 1]).in_bounds());
        assert!(StridedView::new(&data, &[2, 3], &[3, 1]).with_offset(0).get(&[1, 2]).is_none());

        let data = vec![0.0f64; 6];
        assert!(StridedView::new(&data, &[2, 3], &[3, 1]).in_bounds());
        assert!(!StridedView::new(&data, &[2, 3], &[3, 1]).with_offset(1).in_bounds());
    }

    #[test]
    fn test_in_bounds_negative_strides() {
        let data: Vec<i32> = (0..6).collect();
        // reversed rows need element [0, 0] at offset 3
        assert!(!StridedView::new(&data, &[2, 3], &[-3, 1]).in_bounds());
        assert!(StridedView::new(&data, &[2, 3], &[-3, 1]).with_offset(3).in_bounds());
        assert!(!StridedView::new(&data, &[2, 3], &[-3, 1]).with_offset(4).in_bounds());
    }

    #[test]
    fn test_in_bounds_metadata_mismatch_and_empty() {
        let mut data = vec![0.0f64; 4];
        assert!(!StridedView::new(&data, &[2, 2], &[2]).in_bounds());
        assert!(StridedView::new(&data, &[0, 9], &[100, 1]).with_offset(50).in_bounds());
        assert!(!StridedViewMut::new(&mut data, &[2, 2], &[2, 2]).in_bounds());
        assert!(StridedViewMut::new(&mut data, &[2, 2], &[1, 2]).in_bounds());
    }

    #[test]
    fn test_from_array_views_are_in_bounds() {
        let array = Array::from_shape_vec(IxDyn(&[2, 3]), (0..6).collect::<Vec<i32>>()).unwrap();
        let mut reversed = array.view();
        reversed.invert_axis(Axis(1));
        assert!(StridedView::from_array(reversed).unwrap().in_bounds());
        assert!(StridedView::from_array(array.t()).unwrap().in_bounds());
    }

    #[test]
    fn test_null_view() {
        let data: Vec<f64> = Vec::new();
        let view = StridedView::new(&data, &[2], &[1]);
        assert!(view.is_null());
        assert!(!view.is_empty());
        assert_eq!(view.get(&[0]), None);
    }
}
