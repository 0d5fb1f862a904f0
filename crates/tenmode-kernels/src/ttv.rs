//! Mode-m tensor-times-vector product (TTV)
//!
//! For a tensor A of rank p and a vector b of length `A.extents[m-1]`, computes
//! the rank p-1 tensor
//!
//! `C[i1, ..., im-1, im+1, ..., ip] = Σ_k A[i1, ..., k, ..., ip] · b[k]`
//!
//! The kernel walks A and C purely through their strides. One of three
//! traversals is chosen once per call:
//!
//! | Variant        | Condition         | Innermost block                         |
//! |----------------|-------------------|-----------------------------------------|
//! | interior mode  | `m != 1`, `p > 2` | axis 0 of A/C × contracted axis         |
//! | first mode     | `m == 1`, `p > 2` | axis 1 of A (axis 0 of C) × axis 0 of A |
//! | matrix-vector  | `p <= 2`          | the free axis × the contracted axis     |
//!
//! None of the variants branches on axis identity inside its innermost loop.

use crate::error::{KernelError, KernelResult};
use crate::fiber::{dot, Operand, Target};
use scirs2_core::numeric::NumAssign;
use tenmode_core::{Mode, StridedView, StridedViewMut};

const OPERATION: &str = "ttv";

/// Traversal selected for a (mode, rank) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TtvVariant {
    Interior,
    FirstMode,
    MatrixVector,
}

impl TtvVariant {
    pub(crate) fn select(m: Mode, p: usize) -> Self {
        if m != 1 && p > 2 {
            TtvVariant::Interior
        } else if m == 1 && p > 2 {
            TtvVariant::FirstMode
        } else {
            TtvVariant::MatrixVector
        }
    }
}

/// Compute the mode-m tensor-times-vector product into a caller-provided output.
///
/// The product is **accumulated** into `c`: pass a zero-filled output to obtain
/// `A ×ₘ b` itself.
///
/// # Arguments
///
/// * `m` - One-based contraction mode, `1 <= m <= rank(A)`
/// * `c` - Output of rank `p-1` whose extents are A's with axis `m` removed
/// * `a` - Input tensor of rank `p`
/// * `b` - Vector of length `A.extents[m-1]`, any stride
///
/// # Errors
///
/// Returns an error if:
/// - `m` is zero, `p` is zero, or `p < m`
/// - any operand has no backing storage, or its extents and strides reach
///   outside its buffer
/// - the free extents of A and C differ
/// - `b` is not rank 1 or its length differs from the contracted extent
///
/// # Complexity
///
/// Time: O(∏ᵢ Iᵢ), one multiply-add per element of A
/// Space: O(p) recursion depth, no allocation
///
/// # Examples
///
/// ```
/// use tenmode_core::{Layout, StridedView, StridedViewMut};
/// use tenmode_kernels::ttv_strided;
///
/// // A is 2×3 (row-major), contract mode 2 with b = [1, 1, 1]
/// let a = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
/// let b = vec![1.0; 3];
/// let mut c = vec![0.0; 2];
///
/// let a_view = StridedView::contiguous(&a, &[2, 3], Layout::RowMajor);
/// let b_view = StridedView::contiguous(&b, &[3], Layout::RowMajor);
/// let mut c_view = StridedViewMut::contiguous(&mut c, &[2], Layout::RowMajor);
///
/// ttv_strided(2, &mut c_view, &a_view, &b_view).unwrap();
/// assert_eq!(c, vec![6.0, 15.0]);
/// ```
pub fn ttv_strided<T>(
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
    for (operand, null) in [("C", c.is_null()), ("A", a.is_null()), ("b", b.is_null())] {
        if null {
            return Err(KernelError::NullBuffer {
                operation: OPERATION,
                operand,
            });
        }
    }
    for (operand, fits) in [("C", c.in_bounds()), ("A", a.in_bounds()), ("b", b.in_bounds())] {
        if !fits {
            return Err(KernelError::OutOfBounds {
                operation: OPERATION,
                operand,
            });
        }
    }

    let (na, nc) = (a.extents(), c.extents());
    let free_axes_match =
        nc.len() + 1 == p && na[..m - 1] == nc[..m - 1] && na[m..] == nc[m - 1..];
    if !free_axes_match {
        return Err(KernelError::ExtentMismatch {
            operation: OPERATION,
            mode: m,
            a: na.to_vec(),
            c: nc.to_vec(),
        });
    }
    if b.rank() != 1 {
        return Err(KernelError::OperandRank {
            operation: OPERATION,
            operand: "vector b",
            expected: 1,
            actual: b.rank(),
        });
    }
    if na[m - 1] != b.extents()[0] {
        return Err(KernelError::OperandExtentMismatch {
            operation: OPERATION,
            mode: m,
            tensor: "A",
            operand: "vector length",
            expected: na[m - 1],
            actual: b.extents()[0],
        });
    }

    let variant = TtvVariant::select(m, p);
    tracing::trace!(mode = m, rank = p, ?variant, "ttv dispatch");

    let ttv = Ttv {
        m: m - 1,
        a: Operand::new(a),
        b: Operand::new(b),
    };
    let mut target = Target::new(c);
    let (ic, ia) = (target.origin, ttv.a.origin);

    match variant {
        TtvVariant::Interior => ttv.interior(p - 1, p - 2, &mut target, ic, ia),
        TtvVariant::FirstMode => ttv.first_mode(p - 1, &mut target, ic, ia),
        TtvVariant::MatrixVector => ttv.matrix_vector(&mut target, ic, ia),
    }

    Ok(())
}

/// Recursion state: zero-based contraction axis and the two read-only operands
struct Ttv<'a, T> {
    m: usize,
    a: Operand<'a, T>,
    b: Operand<'a, T>,
}

impl<T> Ttv<'_, T>
where
    T: Copy + NumAssign,
{
    /// Contraction axis `0 < m`, rank > 2.
    ///
    /// `r` indexes the axes of A, `q` those of C. Axis `m` exists only in A, so
    /// on reaching it the recursion moves to `r-1` without consuming a C axis.
    fn interior(&self, r: usize, q: usize, c: &mut Target<'_, T>, mut ic: isize, mut ia: isize) {
        let (m, a, b) = (self.m, &self.a, &self.b);

        if r == m {
            self.interior(r - 1, q, c, ic, ia);
        } else if r == 0 {
            let (nm, wam, wb) = (a.extents[m], a.strides[m], b.strides[0]);
            let (wa0, wc0) = (a.strides[0], c.strides[0]);
            for _ in 0..a.extents[0] {
                let acc = c.get(ic);
                c.store(ic, dot(acc, a.data, ia, wam, b.data, b.origin, wb, nm));
                ic += wc0;
                ia += wa0;
            }
        } else {
            for _ in 0..a.extents[r] {
                self.interior(r - 1, q - 1, c, ic, ia);
                ic += c.strides[q];
                ia += a.strides[r];
            }
        }
    }

    /// Contraction axis 0, rank > 2. Axis `r` of A is axis `r-1` of C.
    fn first_mode(&self, r: usize, c: &mut Target<'_, T>, mut ic: isize, mut ia: isize) {
        let (a, b) = (&self.a, &self.b);

        if r > 1 {
            for _ in 0..a.extents[r] {
                self.first_mode(r - 1, c, ic, ia);
                ic += c.strides[r - 1];
                ia += a.strides[r];
            }
        } else {
            let (n0, wa0, wb) = (a.extents[0], a.strides[0], b.strides[0]);
            let (wa1, wc0) = (a.strides[1], c.strides[0]);
            for _ in 0..a.extents[1] {
                let acc = c.get(ic);
                c.store(ic, dot(acc, a.data, ia, wa0, b.data, b.origin, wb, n0));
                ic += wc0;
                ia += wa1;
            }
        }
    }

    /// Rank 1 or 2: one loop over the free axis (if any) around the dot product.
    fn matrix_vector(&self, c: &mut Target<'_, T>, mut ic: isize, mut ia: isize) {
        let (m, a, b) = (self.m, &self.a, &self.b);
        let (nm, wam, wb) = (a.extents[m], a.strides[m], b.strides[0]);

        let (n_free, wa_free, wc_free) = if a.extents.len() == 2 {
            let o = 1 - m;
            (a.extents[o], a.strides[o], c.strides[0])
        } else {
            (1, 0, 0)
        };

        for _ in 0..n_free {
            let acc = c.get(ic);
            c.store(ic, dot(acc, a.data, ia, wam, b.data, b.origin, wb, nm));
            ic += wc_free;
            ia += wa_free;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::ndarray_ext::{Array, Dimension, IxDyn};
    use tenmode_core::Layout;

    /// Reference contraction by explicit index enumeration (row-major output)
    fn naive_ttv(a: &Array<f64, IxDyn>, b: &[f64], m: usize) -> Array<f64, IxDyn> {
        let mut shape = a.shape().to_vec();
        shape.remove(m - 1);
        let mut c = Array::<f64, IxDyn>::zeros(IxDyn(&shape));
        for (idx, &value) in a.indexed_iter() {
            let mut out = idx.slice().to_vec();
            let k = out.remove(m - 1);
            c[&out[..]] += value * b[k];
        }
        c
    }

    fn iota(extents: &[usize]) -> Array<f64, IxDyn> {
        let len: usize = extents.iter().product();
        Array::from_shape_vec(IxDyn(extents), (1..=len).map(|x| x as f64).collect()).unwrap()
    }

    fn run(m: usize, a: &Array<f64, IxDyn>, b: &[f64], layout: Layout) -> Vec<f64> {
        // repack A into the requested layout
        let a_data: Vec<f64> = match layout {
            Layout::RowMajor => a.iter().copied().collect(),
            Layout::ColumnMajor => a.t().iter().copied().collect(),
        };
        let mut nc = a.shape().to_vec();
        nc.remove(m - 1);
        let mut c = vec![0.0; nc.iter().product()];

        let a_view = StridedView::contiguous(&a_data, a.shape(), layout);
        let b_view = StridedView::contiguous(b, &[b.len()], layout);
        let mut c_view = StridedViewMut::contiguous(&mut c, &nc, layout);
        ttv_strided(m, &mut c_view, &a_view, &b_view).unwrap();

        match layout {
            Layout::RowMajor => c,
            Layout::ColumnMajor => {
                // back to row-major for comparison
                let c_col = StridedView::contiguous(&c, &nc, Layout::ColumnMajor);
                let reference = Array::<f64, IxDyn>::zeros(IxDyn(&nc));
                reference
                    .indexed_iter()
                    .map(|(idx, _)| *c_col.get(idx.slice()).unwrap())
                    .collect()
            }
        }
    }

    #[test]
    fn test_variant_selection() {
        assert_eq!(TtvVariant::select(2, 3), TtvVariant::Interior);
        assert_eq!(TtvVariant::select(3, 3), TtvVariant::Interior);
        assert_eq!(TtvVariant::select(1, 3), TtvVariant::FirstMode);
        assert_eq!(TtvVariant::select(1, 4), TtvVariant::FirstMode);
        assert_eq!(TtvVariant::select(1, 2), TtvVariant::MatrixVector);
        assert_eq!(TtvVariant::select(2, 2), TtvVariant::MatrixVector);
        assert_eq!(TtvVariant::select(1, 1), TtvVariant::MatrixVector);
    }

    #[test]
    fn test_ttv_constant_fill() {
        // 2×3 filled with 2, vector of ones, mode 2 -> [6, 6]
        let a = vec![2.0; 6];
        let b = vec![1.0; 3];
        let mut c = vec![0.0; 2];

        let a_view = StridedView::contiguous(&a, &[2, 3], Layout::RowMajor);
        let b_view = StridedView::contiguous(&b, &[3], Layout::RowMajor);
        let mut c_view = StridedViewMut::contiguous(&mut c, &[2], Layout::RowMajor);

        ttv_strided(2, &mut c_view, &a_view, &b_view).unwrap();
        assert_eq!(c, vec![6.0, 6.0]);
    }

    #[test]
    fn test_ttv_all_modes_both_layouts() {
        for extents in [vec![2, 3, 4], vec![4, 2, 3, 5], vec![3, 1, 2]] {
            let a = iota(&extents);
            for m in 1..=extents.len() {
                let b: Vec<f64> = (0..extents[m - 1]).map(|k| 0.5 + k as f64).collect();
                let expected: Vec<f64> = naive_ttv(&a, &b, m).iter().copied().collect();
                for layout in [Layout::RowMajor, Layout::ColumnMajor] {
                    let got = run(m, &a, &b, layout);
                    assert_eq!(got, expected, "extents {:?} mode {} {:?}", extents, m, layout);
                }
            }
        }
    }

    #[test]
    fn test_ttv_matrix_both_modes() {
        // A = [[1, 2, 3], [4, 5, 6]]
        let a = iota(&[2, 3]);
        assert_eq!(run(2, &a, &[1.0, 0.0, 1.0], Layout::RowMajor), vec![4.0, 10.0]);
        assert_eq!(run(1, &a, &[1.0, 1.0], Layout::RowMajor), vec![5.0, 7.0, 9.0]);
        assert_eq!(run(1, &a, &[1.0, 1.0], Layout::ColumnMajor), vec![5.0, 7.0, 9.0]);
    }

    #[test]
    fn test_ttv_rank_one_gives_scalar() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![4.0, 5.0, 6.0];
        let mut c = vec![0.0];

        let a_view = StridedView::contiguous(&a, &[3], Layout::RowMajor);
        let b_view = StridedView::contiguous(&b, &[3], Layout::RowMajor);
        let mut c_view = StridedViewMut::contiguous(&mut c, &[], Layout::RowMajor);

        ttv_strided(1, &mut c_view, &a_view, &b_view).unwrap();
        assert_eq!(c, vec![32.0]);
    }

    #[test]
    fn test_ttv_accumulates_into_output() {
        let a = vec![1.0; 4];
        let b = vec![1.0; 2];
        let mut c = vec![10.0, 20.0];

        let a_view = StridedView::contiguous(&a, &[2, 2], Layout::RowMajor);
        let b_view = StridedView::contiguous(&b, &[2], Layout::RowMajor);
        let mut c_view = StridedViewMut::contiguous(&mut c, &[2], Layout::RowMajor);

        ttv_strided(2, &mut c_view, &a_view, &b_view).unwrap();
        assert_eq!(c, vec![12.0, 22.0]);
    }

    #[test]
    fn test_ttv_padded_and_reversed_operands() {
        // A: 2×2×2 row-major tensor embedded with a padding of one element per row
        //    (strides [6, 3, 1]) starting at offset 1
        let mut buffer = vec![-1.0; 13];
        let logical = iota(&[2, 2, 2]);
        for (idx, &value) in logical.indexed_iter() {
            let i = idx.slice();
            buffer[1 + i[0] * 6 + i[1] * 3 + i[2]] = value;
        }
        let a_view = StridedView::new(&buffer, &[2, 2, 2], &[6, 3, 1]).with_offset(1);

        // b stored backwards: logical [1, 10] read from [10, 1] with stride -1
        let b_store = vec![10.0, 1.0];
        let b_view = StridedView::new(&b_store, &[2], &[-1]).with_offset(1);

        let mut c = vec![0.0; 4];
        let mut c_view = StridedViewMut::contiguous(&mut c, &[2, 2], Layout::RowMajor);
        ttv_strided(2, &mut c_view, &a_view, &b_view).unwrap();

        let expected: Vec<f64> = naive_ttv(&logical, &[1.0, 10.0], 2).iter().copied().collect();
        assert_eq!(c, expected);
    }

    #[test]
    fn test_ttv_rejects_zero_mode() {
        let a = vec![1.0; 6];
        let b = vec![1.0; 3];
        let mut c = vec![0.0; 2];
        let a_view = StridedView::contiguous(&a, &[2, 3], Layout::RowMajor);
        let b_view = StridedView::contiguous(&b, &[3], Layout::RowMajor);
        let mut c_view = StridedViewMut::contiguous(&mut c, &[2], Layout::RowMajor);

        let err = ttv_strided(0, &mut c_view, &a_view, &b_view).unwrap_err();
        assert!(matches!(err, KernelError::ZeroMode { .. }));
        assert_eq!(c, vec![0.0; 2]);
    }

    #[test]
    fn test_ttv_rejects_zero_rank_and_large_mode() {
        let a = vec![1.0];
        let b = vec![1.0];
        let mut c = vec![0.0];
        let b_view = StridedView::contiguous(&b, &[1], Layout::RowMajor);
        let mut c_view = StridedViewMut::contiguous(&mut c, &[], Layout::RowMajor);

        let scalar = StridedView::contiguous(&a, &[], Layout::RowMajor);
        let err = ttv_strided(1, &mut c_view, &scalar, &b_view).unwrap_err();
        assert!(matches!(err, KernelError::ZeroRank { .. }));

        let vector = StridedView::contiguous(&a, &[1], Layout::RowMajor);
        let err = ttv_strided(2, &mut c_view, &vector, &b_view).unwrap_err();
        assert!(matches!(err, KernelError::ModeExceedsRank { mode: 2, rank: 1, .. }));
    }

    #[test]
    fn test_ttv_rejects_null_buffer() {
        let a: Vec<f64> = Vec::new();
        let b = vec![1.0; 3];
        let mut c = vec![0.0; 2];
        let a_view = StridedView::contiguous(&a, &[2, 3], Layout::RowMajor);
        let b_view = StridedView::contiguous(&b, &[3], Layout::RowMajor);
        let mut c_view = StridedViewMut::contiguous(&mut c, &[2], Layout::RowMajor);

        let err = ttv_strided(2, &mut c_view, &a_view, &b_view).unwrap_err();
        assert_eq!(
            err,
            KernelError::NullBuffer {
                operation: "ttv",
                operand: "A"
            }
        );
    }

    #[test]
    fn test_ttv_rejects_view_outside_buffer() {
        // 2×3 row-major needs six elements
        let a = vec![1.0; 5];
        let b = vec![1.0; 3];
        let mut c = vec![0.0; 2];
        let a_view = StridedView::contiguous(&a, &[2, 3], Layout::RowMajor);
        let b_view = StridedView::contiguous(&b, &[3], Layout::RowMajor);
        {
            let mut c_view = StridedViewMut::contiguous(&mut c, &[2], Layout::RowMajor);
            let err = ttv_strided(2, &mut c_view, &a_view, &b_view).unwrap_err();
            assert_eq!(
                err,
                KernelError::OutOfBounds {
                    operation: "ttv",
                    operand: "A"
                }
            );
        }
        assert_eq!(c, vec![0.0, 0.0]);

        // vector stride steps past the end
        let a = vec![1.0; 6];
        let a_view = StridedView::contiguous(&a, &[2, 3], Layout::RowMajor);
        let b_view = StridedView::new(&b, &[3], &[2]);
        let mut c_view = StridedViewMut::contiguous(&mut c, &[2], Layout::RowMajor);
        let err = ttv_strided(2, &mut c_view, &a_view, &b_view).unwrap_err();
        assert!(matches!(err, KernelError::OutOfBounds { operand: "b", .. }));
    }

    #[test]
    fn test_ttv_rejects_output_metadata_mismatch() {
        let a = vec![1.0; 6];
        let b = vec![1.0; 3];
        let mut c = vec![0.0; 2];
        let a_view = StridedView::contiguous(&a, &[2, 3], Layout::RowMajor);
        let b_view = StridedView::contiguous(&b, &[3], Layout::RowMajor);

        // one extent, two strides
        let mut c_view = StridedViewMut::new(&mut c, &[2], &[1, 1]);
        let err = ttv_strided(2, &mut c_view, &a_view, &b_view).unwrap_err();
        assert!(matches!(err, KernelError::OutOfBounds { operand: "C", .. }));

        // offset pushes the last element past the end
        let mut c_view = StridedViewMut::new(&mut c, &[2], &[1]).with_offset(1);
        let err = ttv_strided(2, &mut c_view, &a_view, &b_view).unwrap_err();
        assert!(matches!(err, KernelError::OutOfBounds { operand: "C", .. }));
        assert_eq!(c, vec![0.0, 0.0]);
    }

    #[test]
    fn test_ttv_rejects_vector_length_mismatch() {
        let a = vec![1.0; 6];
        let b = vec![1.0; 4];
        let mut c = vec![0.0; 2];
        let a_view = StridedView::contiguous(&a, &[2, 3], Layout::RowMajor);
        let b_view = StridedView::contiguous(&b, &[4], Layout::RowMajor);
        let mut c_view = StridedViewMut::contiguous(&mut c, &[2], Layout::RowMajor);

        let err = ttv_strided(2, &mut c_view, &a_view, &b_view).unwrap_err();
        assert!(matches!(
            err,
            KernelError::OperandExtentMismatch {
                expected: 3,
                actual: 4,
                ..
            }
        ));
    }

    #[test]
    fn test_ttv_rejects_output_extent_mismatch() {
        let a = vec![1.0; 24];
        let b = vec![1.0; 3];
        let mut c = vec![0.0; 10];
        let a_view = StridedView::contiguous(&a, &[2, 3, 4], Layout::RowMajor);
        let b_view = StridedView::contiguous(&b, &[3], Layout::RowMajor);

        // wrong free extent
        let mut c_view = StridedViewMut::contiguous(&mut c, &[2, 5], Layout::RowMajor);
        let err = ttv_strided(2, &mut c_view, &a_view, &b_view).unwrap_err();
        assert!(matches!(err, KernelError::ExtentMismatch { .. }));

        // wrong output rank
        let mut c_view = StridedViewMut::contiguous(&mut c, &[2, 4, 1], Layout::RowMajor);
        let err = ttv_strided(2, &mut c_view, &a_view, &b_view).unwrap_err();
        assert!(matches!(err, KernelError::ExtentMismatch { .. }));
    }
}
