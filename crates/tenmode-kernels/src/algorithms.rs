//! Peer kernels sharing the strided calling convention
//!
//! - [`inner_strided`]: full contraction of two equally shaped tensors
//! - [`outer_strided`]: C = A ∘ B with the axes of A followed by those of B
//! - [`copy_strided`]: element-wise copy between arbitrary layouts
//! - [`trans_strided`]: axis permutation, a copy whose destination strides are
//!   reordered by the permutation
//!
//! Each kernel recurses over axes from the last one down, keyed by the number
//! of axes still to walk, and keeps the innermost loop free of branches.

use crate::error::{KernelError, KernelResult};
use crate::fiber::{dot, Operand, Target};
use scirs2_core::numeric::NumAssign;
use tenmode_core::{StridedView, StridedViewMut, Strides};

fn require_storage(operation: &'static str, operands: &[(&'static str, bool)]) -> KernelResult<()> {
    match operands.iter().find(|(_, null)| *null) {
        Some(&(operand, _)) => Err(KernelError::NullBuffer { operation, operand }),
        None => Ok(()),
    }
}

fn require_in_bounds(operation: &'static str, operands: &[(&'static str, bool)]) -> KernelResult<()> {
    match operands.iter().find(|(_, fits)| !*fits) {
        Some(&(operand, _)) => Err(KernelError::OutOfBounds { operation, operand }),
        None => Ok(()),
    }
}

fn require_same_shape(operation: &'static str, na: &[usize], nb: &[usize]) -> KernelResult<()> {
    if na.len() != nb.len() {
        return Err(KernelError::RankMismatch {
            operation,
            rank_a: na.len(),
            rank_b: nb.len(),
        });
    }
    if na != nb {
        return Err(KernelError::ShapeMismatch {
            operation,
            a: na.to_vec(),
            b: nb.to_vec(),
        });
    }
    Ok(())
}

/// Inner product `init + Σ_i A[i] · B[i]` over all multi-indices.
///
/// Both tensors are walked through their own strides, so they need not share a
/// layout. A rank-0 pair contributes the product of its two scalars.
///
/// # Errors
///
/// Returns an error if either buffer is null or overrun by its view, or the
/// ranks or extents differ.
///
/// # Examples
///
/// ```
/// use tenmode_core::{Layout, StridedView};
/// use tenmode_kernels::inner_strided;
///
/// let a = vec![1, 2, 3, 4];
/// let b = vec![1, 2, 3, 4];
///
/// // same logical shape, opposite storage orders
/// let a_view = StridedView::contiguous(&a, &[2, 2], Layout::RowMajor);
/// let b_view = StridedView::contiguous(&b, &[2, 2], Layout::ColumnMajor);
///
/// // 1·1 + 2·3 + 3·2 + 4·4
/// assert_eq!(inner_strided(&a_view, &b_view, 0).unwrap(), 29);
/// ```
pub fn inner_strided<T>(a: &StridedView<'_, T>, b: &StridedView<'_, T>, init: T) -> KernelResult<T>
where
    T: Copy + NumAssign,
{
    const OPERATION: &str = "inner";
    require_storage(OPERATION, &[("A", a.is_null()), ("B", b.is_null())])?;
    require_in_bounds(OPERATION, &[("A", a.in_bounds()), ("B", b.in_bounds())])?;
    require_same_shape(OPERATION, a.extents(), b.extents())?;

    let (a, b) = (Operand::new(a), Operand::new(b));
    Ok(inner_axes(a.extents.len(), &a, a.origin, &b, b.origin, init))
}

fn inner_axes<T>(k: usize, a: &Operand<'_, T>, mut ia: isize, b: &Operand<'_, T>, mut ib: isize, mut acc: T) -> T
where
    T: Copy + NumAssign,
{
    match k {
        0 => acc + a.at(ia) * b.at(ib),
        1 => dot(acc, a.data, ia, a.strides[0], b.data, ib, b.strides[0], a.extents[0]),
        _ => {
            let r = k - 1;
            for _ in 0..a.extents[r] {
                acc = inner_axes(r, a, ia, b, ib, acc);
                ia += a.strides[r];
                ib += b.strides[r];
            }
            acc
        }
    }
}

/// Outer product `C[i, j] = A[i] · B[j]` where C carries A's axes followed by B's.
///
/// C is overwritten, not accumulated.
///
/// # Errors
///
/// Returns an error if any buffer is null or overrun by its view, or C's
/// extents are not the concatenation of A's and B's.
pub fn outer_strided<T>(
    c: &mut StridedViewMut<'_, T>,
    a: &StridedView<'_, T>,
    b: &StridedView<'_, T>,
) -> KernelResult<()>
where
    T: Copy + NumAssign,
{
    const OPERATION: &str = "outer";
    require_storage(
        OPERATION,
        &[("C", c.is_null()), ("A", a.is_null()), ("B", b.is_null())],
    )?;
    require_in_bounds(
        OPERATION,
        &[("C", c.in_bounds()), ("A", a.in_bounds()), ("B", b.in_bounds())],
    )?;

    let expected: Vec<usize> = a.extents().iter().chain(b.extents()).copied().collect();
    require_same_shape(OPERATION, &expected, c.extents())?;

    let outer = Outer {
        p: a.rank(),
        a: Operand::new(a),
        b: Operand::new(b),
    };
    let mut target = Target::new(c);
    let (ic, ia) = (target.origin, outer.a.origin);
    outer.over_a(outer.p, &mut target, ic, ia);
    Ok(())
}

struct Outer<'a, T> {
    p: usize,
    a: Operand<'a, T>,
    b: Operand<'a, T>,
}

impl<T> Outer<'_, T>
where
    T: Copy + NumAssign,
{
    /// Walk the first `k` axes of A (axes `0..k` of C).
    fn over_a(&self, k: usize, c: &mut Target<'_, T>, mut ic: isize, mut ia: isize) {
        if k == 0 {
            let value = self.a.at(ia);
            self.over_b(self.b.extents.len(), c, ic, value, self.b.origin);
            return;
        }
        let r = k - 1;
        for _ in 0..self.a.extents[r] {
            self.over_a(r, c, ic, ia);
            ic += c.strides[r];
            ia += self.a.strides[r];
        }
    }

    /// Walk the first `k` axes of B (axes `p..p+k` of C), scaling by `value`.
    fn over_b(&self, k: usize, c: &mut Target<'_, T>, mut ic: isize, value: T, mut ib: isize) {
        let b = &self.b;
        match k {
            0 => c.store(ic, value * b.at(ib)),
            1 => {
                let (wc, wb) = (c.strides[self.p], b.strides[0]);
                for _ in 0..b.extents[0] {
                    c.store(ic, value * b.at(ib));
                    ic += wc;
                    ib += wb;
                }
            }
            _ => {
                let r = k - 1;
                for _ in 0..b.extents[r] {
                    self.over_b(r, c, ic, value, ib);
                    ic += c.strides[self.p + r];
                    ib += b.strides[r];
                }
            }
        }
    }
}

/// Copy A into C element by element; the two may use different strides.
///
/// # Errors
///
/// Returns an error if either buffer is null or overrun by its view, or the
/// shapes differ.
pub fn copy_strided<T: Copy>(c: &mut StridedViewMut<'_, T>, a: &StridedView<'_, T>) -> KernelResult<()> {
    const OPERATION: &str = "copy";
    require_storage(OPERATION, &[("C", c.is_null()), ("A", a.is_null())])?;
    require_in_bounds(OPERATION, &[("C", c.in_bounds()), ("A", a.in_bounds())])?;
    require_same_shape(OPERATION, a.extents(), c.extents())?;

    let a = Operand::new(a);
    let mut target = Target::new(c);
    let ic = target.origin;
    copy_axes(a.extents.len(), &mut target, ic, &a, a.origin);
    Ok(())
}

fn copy_axes<T: Copy>(k: usize, c: &mut Target<'_, T>, mut ic: isize, a: &Operand<'_, T>, mut ia: isize) {
    match k {
        0 => c.store(ic, a.at(ia)),
        1 => {
            let (wc, wa) = (c.strides[0], a.strides[0]);
            for _ in 0..a.extents[0] {
                c.store(ic, a.at(ia));
                ic += wc;
                ia += wa;
            }
        }
        _ => {
            let r = k - 1;
            for _ in 0..a.extents[r] {
                copy_axes(r, c, ic, a, ia);
                ic += c.strides[r];
                ia += a.strides[r];
            }
        }
    }
}

/// Check that `tau` is a one-based permutation of `1..=rank`.
pub(crate) fn validate_permutation(operation: &'static str, tau: &[usize], rank: usize) -> KernelResult<()> {
    let mut seen = vec![false; rank];
    let bijective = tau.len() == rank
        && tau.iter().all(|&t| {
            (1..=rank).contains(&t) && !std::mem::replace(&mut seen[t - 1], true)
        });
    if bijective {
        Ok(())
    } else {
        Err(KernelError::InvalidPermutation {
            operation,
            tau: tau.to_vec(),
            rank,
        })
    }
}

/// Extents of `trans(A, tau)`: `nc[tau[i] - 1] = na[i]`.
///
/// `tau` must already be a valid permutation of `1..=na.len()`.
pub(crate) fn permuted_extents(na: &[usize], tau: &[usize]) -> Vec<usize> {
    let mut nc = vec![0; na.len()];
    for (&n, &t) in na.iter().zip(tau) {
        nc[t - 1] = n;
    }
    nc
}

/// Axis permutation: axis `i` of A becomes axis `tau[i]` of C (one-based).
///
/// Equivalent to copying A into C with C's strides reordered as
/// `wc'[i] = wc[tau[i] - 1]`.
///
/// # Errors
///
/// Returns an error if `tau` is not a permutation of `1..=rank(A)`, a buffer is
/// null or overrun by its view, or `nc[tau[i] - 1] != na[i]` for some axis.
///
/// # Examples
///
/// ```
/// use tenmode_core::{Layout, StridedView, StridedViewMut};
/// use tenmode_kernels::trans_strided;
///
/// let a = vec![1, 2, 3, 4, 5, 6];
/// let mut c = vec![0; 6];
///
/// let a_view = StridedView::contiguous(&a, &[2, 3], Layout::RowMajor);
/// let mut c_view = StridedViewMut::contiguous(&mut c, &[3, 2], Layout::RowMajor);
///
/// trans_strided(&mut c_view, &a_view, &[2, 1]).unwrap();
/// assert_eq!(c, vec![1, 4, 2, 5, 3, 6]);
/// ```
pub fn trans_strided<T: Copy>(
    c: &mut StridedViewMut<'_, T>,
    a: &StridedView<'_, T>,
    tau: &[usize],
) -> KernelResult<()> {
    const OPERATION: &str = "trans";
    validate_permutation(OPERATION, tau, a.rank())?;
    require_storage(OPERATION, &[("C", c.is_null()), ("A", a.is_null())])?;
    require_in_bounds(OPERATION, &[("C", c.in_bounds()), ("A", a.in_bounds())])?;
    require_same_shape(OPERATION, &permuted_extents(a.extents(), tau), c.extents())?;

    let a = Operand::new(a);
    let (data, _, wc, offset) = c.parts_mut();
    let wc_pi: Strides = tau.iter().map(|&t| wc[t - 1]).collect();
    let mut target = Target {
        data,
        origin: offset as isize,
        strides: &wc_pi,
    };
    let ic = target.origin;
    copy_axes(a.extents.len(), &mut target, ic, &a, a.origin);
    Ok(())
}
