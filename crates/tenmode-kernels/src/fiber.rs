//! Slice-level operands shared by the recursive kernels
//!
//! Kernels unpack their views once per call into these plain borrows and then
//! walk them with `isize` positions; nothing here allocates.

use scirs2_core::numeric::NumAssign;
use tenmode_core::{StridedView, StridedViewMut};

/// Read-only operand: buffer, position of element zero, extents, strides
pub(crate) struct Operand<'a, T> {
    pub data: &'a [T],
    pub origin: isize,
    pub extents: &'a [usize],
    pub strides: &'a [isize],
}

impl<'a, T> Operand<'a, T> {
    pub fn new(view: &'a StridedView<'_, T>) -> Self {
        Self {
            data: view.data(),
            origin: view.offset() as isize,
            extents: view.extents(),
            strides: view.strides(),
        }
    }

    #[inline(always)]
    pub fn at(&self, pos: isize) -> T
    where
        T: Copy,
    {
        self.data[pos as usize]
    }
}

/// Output operand; extents are always taken from an input
pub(crate) struct Target<'a, T> {
    pub data: &'a mut [T],
    pub origin: isize,
    pub strides: &'a [isize],
}

impl<'a, T> Target<'a, T> {
    pub fn new(view: &'a mut StridedViewMut<'_, T>) -> Self {
        let (data, _, strides, offset) = view.parts_mut();
        Self {
            data,
            origin: offset as isize,
            strides,
        }
    }

    #[inline(always)]
    pub fn get(&self, pos: isize) -> T
    where
        T: Copy,
    {
        self.data[pos as usize]
    }

    #[inline(always)]
    pub fn store(&mut self, pos: isize, value: T) {
        self.data[pos as usize] = value;
    }
}

/// Strided dot product of two fibers of length `n`, summed from index 0 upward.
#[allow(clippy::too_many_arguments)]
#[inline(always)]
pub(crate) fn dot<T>(
    mut acc: T,
    a: &[T],
    mut ia: isize,
    wa: isize,
    b: &[T],
    mut ib: isize,
    wb: isize,
    n: usize,
) -> T
where
    T: Copy + NumAssign,
{
    for _ in 0..n {
        acc += a[ia as usize] * b[ib as usize];
        ia += wa;
        ib += wb;
    }
    acc
}
