//! Mode-m tensor-times-matrix product (TTM)
//!
//! For a tensor A of rank p and a matrix B of shape J×I with `I = A.extents[m-1]`,
//! computes the rank-p tensor whose axis m has extent J:
//!
//! `C[i1, ..., j, ..., ip] = Σ_k A[i1, ..., k, ..., ip] · B[j, k]`
//!
//! Two traversals exist. For an interior mode the recursion skips axis m and
//! bottoms out in a triple loop over (axis 0, j, k). For the first mode the
//! contracted axis is axis 0 itself, so the recursion stops at axis 1 and the
//! triple loop runs over (axis 1, j, k). Rank 1 and rank 2 tensors need no
//! separate routine.

use crate::error::{KernelError, KernelResult};
use crate::fiber::{dot, Operand, Target};
use scirs2_core::numeric::NumAssign;
use tenmode_core::{Mode, StridedView, StridedViewMut};

const OPERATION: &str = "ttm";

/// Traversal selected for a contraction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TtmVariant {
    Interior,
    FirstMode,
}

impl TtmVariant {
    pub(crate) fn select(m: Mode) -> Self {
        if m != 1 {
            TtmVariant::Interior
        } else {
            TtmVariant::FirstMode
        }
    }
}

/// Compute the mode-m tensor-times-matrix product into a caller-provided output.
///
/// Like [`ttv_strided`](crate::ttv_strided), the product is accumulated into
/// `c`, which should be zero-filled beforehand.
///
/// # Arguments
///
/// * `m` - One-based contraction mode, `1 <= m <= rank(A)`
/// * `c` - Output of rank `p`; axis `m` has extent `B.extents[0]`, all others match A
/// * `a` - Input tensor of rank `p`
/// * `b` - Matrix of shape `(J, A.extents[m-1])`, any strides
///
/// # Errors
///
/// Returns an error if:
/// - `m` is zero, `p` is zero, or `p < m`
/// - any operand has no backing storage, or its extents and strides reach
///   outside its buffer
/// - A and C differ in rank or on any axis other than `m`
/// - `b` is not rank 2, its column count differs from `A.extents[m-1]` or
///   its row count differs from `C.extents[m-1]`
///
/// # Complexity
///
/// Time: O(J · ∏ᵢ Iᵢ)
/// Space: O(p) recursion depth
///
/// # Examples
///
/// ```
/// use tenmode_core::{Layout, StridedView, StridedViewMut};
/// use tenmode_kernels::ttm_strided;
///
/// // A is 2×2, B swaps the two rows: C = B · A
/// let a = vec![1.0, 2.0, 3.0, 4.0];
/// let b = vec![0.0, 1.0, 1.0, 0.0];
/// let mut c = vec![0.0; 4];
///
/// let a_view = StridedView::contiguous(&a, &[2, 2], Layout::RowMajor);
/// let b_view = StridedView::contiguous(&b, &[2, 2], Layout::RowMajor);
/// let mut c_view = StridedViewMut::contiguous(&mut c, &[2, 2], Layout::RowMajor);
///
/// ttm_strided(1, &mut c_view, &a_view, &b_view).unwrap();
/// assert_eq!(c, vec![3.0, 4.0, 1.0, 2.0]);
/// ```
pub fn ttm_strided<T>(
    m: Mode,
    c: &mut StridedViewMut<'_, T>,
    a: &StridedView<'_, T>,
    b: &StridedView<'_, T>,
) -> KernelResult<()>
where
    T: Copy + NumAssign,
{
    let p = a.rank();

    if m == 0 {
        return Err(KernelError::ZeroMode {
            operation: OPERATION,
        });
    }
    if p == 0 {
        return Err(KernelError::ZeroRank {
            operation: OPERATION,
            operand: "A",
        });
    }
    if p < m {
        return Err(KernelError::ModeExceedsRank {
            operation: OPERATION,
            mode: m,
            rank: p,
        });
    }
    for (operand, null) in [("C", c.is_null()), ("A", a.is_null()), ("B", b.is_null())] {
        if null {
            return Err(KernelError::NullBuffer {
                operation: OPERATION,
                operand,
            });
        }
    }
    for (operand, fits) in [("C", c.in_bounds()), ("A", a.in_bounds()), ("B", b.in_bounds())] {
        if !fits {
            return Err(KernelError::OutOfBounds {
                operation: OPERATION,
                operand,
            });
        }
    }

    let (na, nc) = (a.extents(), c.extents());
    let free_axes_match = nc.len() == p
        && na
            .iter()
            .zip(nc)
            .enumerate()
            .all(|(i, (x, y))| i == m - 1 || x == y);
    if !free_axes_match {
        return Err(KernelError::ExtentMismatch {
            operation: OPERATION,
            mode: m,
            a: na.to_vec(),
            c: nc.to_vec(),
        });
    }
    if b.rank() != 2 {
        return Err(KernelError::OperandRank {
            operation: OPERATION,
            operand: "matrix B",
            expected: 2,
            actual: b.rank(),
        });
    }
    let nb = b.extents();
    if na[m - 1] != nb[1] {
        return Err(KernelError::OperandExtentMismatch {
            operation: OPERATION,
            mode: m,
            tensor: "A",
            operand: "column count of B",
            expected: na[m - 1],
            actual: nb[1],
        });
    }
    if nc[m - 1] != nb[0] {
        return Err(KernelError::OperandExtentMismatch {
            operation: OPERATION,
            mode: m,
            tensor: "C",
            operand: "row count of B",
            expected: nc[m - 1],
            actual: nb[0],
        });
    }

    let variant = TtmVariant::select(m);
    tracing::trace!(mode = m, rank = p, ?variant, "ttm dispatch");

    let ttm = Ttm {
        m: m - 1,
        a: Operand::new(a),
        b: Operand::new(b),
    };
    let mut target = Target::new(c);
    let (ic, ia) = (target.origin, ttm.a.origin);

    match variant {
        TtmVariant::Interior => ttm.interior(p - 1, &mut target, ic, ia),
        TtmVariant::FirstMode => ttm.first_mode(p - 1, &mut target, ic, ia),
    }

    Ok(())
}

/// Recursion state: zero-based contraction axis and the two read-only operands
struct Ttm<'a, T> {
    m: usize,
    a: Operand<'a, T>,
    b: Operand<'a, T>,
}

impl<T> Ttm<'_, T>
where
    T: Copy + NumAssign,
{
    /// One matrix-fiber product: for every row j of B,
    /// `C[ic + j·wc[m]] += Σ_k A[ia + k·wa[m]] · B[j, k]`.
    #[inline(always)]
    fn fiber(&self, c: &mut Target<'_, T>, ic: isize, ia: isize) {
        let (m, a, b) = (self.m, &self.a, &self.b);
        let (wam, wcm) = (a.strides[m], c.strides[m]);
        let (wb0, wb1, nk) = (b.strides[0], b.strides[1], b.extents[1]);

        let (mut icm, mut ib) = (ic, b.origin);
        for _ in 0..b.extents[0] {
            let acc = c.get(icm);
            c.store(icm, dot(acc, a.data, ia, wam, b.data, ib, wb1, nk));
            icm += wcm;
            ib += wb0;
        }
    }

    /// Contraction axis `0 < m`. A and C share every axis index; axis `m` is
    /// left to the innermost block.
    fn interior(&self, r: usize, c: &mut Target<'_, T>, mut ic: isize, mut ia: isize) {
        let a = &self.a;

        if r == self.m {
            self.interior(r - 1, c, ic, ia);
        } else if r == 0 {
            let (wa0, wc0) = (a.strides[0], c.strides[0]);
            for _ in 0..a.extents[0] {
                self.fiber(c, ic, ia);
                ic += wc0;
                ia += wa0;
            }
        } else {
            for _ in 0..a.extents[r] {
                self.interior(r - 1, c, ic, ia);
                ic += c.strides[r];
                ia += a.strides[r];
            }
        }
    }

    /// Contraction axis 0. Rank 1 runs a single fiber product.
    fn first_mode(&self, r: usize, c: &mut Target<'_, T>, mut ic: isize, mut ia: isize) {
        let a = &self.a;

        if r > 1 {
            for _ in 0..a.extents[r] {
                self.first_mode(r - 1, c, ic, ia);
                ic += c.strides[r];
                ia += a.strides[r];
            }
        } else {
            let (n1, wa1, wc1) = if a.extents.len() > 1 {
                (a.extents[1], a.strides[1], c.strides[1])
            } else {
                (1, 0, 0)
            };
            for _ in 0..n1 {
                self.fiber(c, ic, ia);
                ic += wc1;
                ia += wa1;
            }
        }
    }
}
