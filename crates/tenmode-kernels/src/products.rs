//! Validating, allocating wrappers over the strided kernels
//!
//! These functions accept `scirs2_core::ndarray_ext` arrays, check every
//! precondition up front, allocate a zero-filled result, and hand raw strided
//! views to the kernels. Nothing is computed unless all checks pass.
//!
//! | Wrapper                 | Kernel                                     | Result rank |
//! |-------------------------|--------------------------------------------|-------------|
//! | [`tensor_times_vector`] | [`ttv_strided`](crate::ttv_strided)        | p - 1       |
//! | [`tensor_times_matrix`] | [`ttm_strided`](crate::ttm_strided)        | p           |
//! | [`prod`]                | either of the above, by operand type       |             |
//! | [`prod_seq`]            | repeated [`ttm_strided`](crate::ttm_strided) | p         |
//! | [`inner_prod`]          | [`inner_strided`](crate::inner_strided)    | scalar      |
//! | [`outer_prod`]          | [`outer_strided`](crate::outer_strided)    | p + q       |
//! | [`trans`]               | [`trans_strided`](crate::trans_strided)    | p           |
//!
//! Inputs whose memory is not one contiguous block (for example stepped
//! slices) are copied into a packed temporary before the kernel runs. Any other
//! layout, including transposed and reversed views, is used in place.
//!
//! Results are allocated in the storage order of the primary input unless a
//! [`ProductConfig`] says otherwise.

use crate::algorithms::{
    inner_strided, outer_strided, permuted_extents, trans_strided, validate_permutation,
};
use crate::config::{zeros, ProductConfig};
use crate::error::{KernelError, KernelResult};
use crate::ttm::ttm_strided;
use crate::ttv::ttv_strided;
use scirs2_core::ndarray_ext::{Array, Array1, Array2, ArrayView, ArrayView1, ArrayView2, Dimension, IxDyn};
use scirs2_core::numeric::{NumAssign, Zero};
use tenmode_core::{Mode, StridedView, StridedViewMut};

/// Log a rejected call and pass the error through.
fn rejected(err: KernelError) -> KernelError {
    tracing::debug!(operation = err.operation(), error = %err, "precondition violated");
    err
}

fn check_mode(operation: &'static str, m: Mode, p: usize) -> KernelResult<()> {
    if m == 0 {
        return Err(KernelError::ZeroMode { operation });
    }
    check_rank(operation, "tensor A", p)?;
    if p < m {
        return Err(KernelError::ModeExceedsRank {
            operation,
            mode: m,
            rank: p,
        });
    }
    Ok(())
}

fn check_rank(operation: &'static str, operand: &'static str, p: usize) -> KernelResult<()> {
    if p == 0 {
        return Err(KernelError::ZeroRank { operation, operand });
    }
    Ok(())
}

fn check_operand_extent(
    operation: &'static str,
    mode: Mode,
    operand: &'static str,
    expected: usize,
    actual: usize,
) -> KernelResult<()> {
    if expected != actual {
        return Err(KernelError::OperandExtentMismatch {
            operation,
            mode,
            tensor: "A",
            operand,
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_not_empty(operation: &'static str, operand: &'static str, len: usize) -> KernelResult<()> {
    if len == 0 {
        return Err(KernelError::EmptyOperand { operation, operand });
    }
    Ok(())
}

/// Packed copy of `array` if its memory has gaps, `None` if it can be used directly.
fn staged<T: Clone, D: Dimension>(array: &ArrayView<'_, T, D>) -> Option<Array<T, D>> {
    match array.to_slice_memory_order() {
        Some(_) => None,
        None => Some(array.to_owned()),
    }
}

/// Strided view of `array`, or of its packed copy when one was staged.
fn strided_input<'a, T, D: Dimension>(
    array: &'a ArrayView<'_, T, D>,
    staged: &'a Option<Array<T, D>>,
    operation: &'static str,
    operand: &'static str,
) -> KernelResult<StridedView<'a, T>> {
    let view = match staged {
        Some(owned) => owned.view(),
        None => array.view(),
    };
    StridedView::from_array(view).ok_or(KernelError::NullBuffer { operation, operand })
}

/// Run `kernel` against a freshly allocated zero-filled output.
fn with_output<T, F>(
    extents: &[usize],
    config: &ProductConfig,
    input: &ArrayView<'_, T, IxDyn>,
    operation: &'static str,
    kernel: F,
) -> KernelResult<Array<T, IxDyn>>
where
    T: Clone + Zero,
    F: FnOnce(&mut StridedViewMut<'_, T>) -> KernelResult<()>,
{
    let layout = config.output_layout.resolve(input);
    let mut c = zeros(extents, layout);
    {
        let mut c_view = StridedViewMut::from_array(&mut c).ok_or(KernelError::NullBuffer {
            operation,
            operand: "C",
        })?;
        kernel(&mut c_view)?;
    }
    Ok(c)
}

/// Mode-m tensor-times-vector product `A ×ₘ b`.
///
/// Removes axis `m` (one-based) of A; the result has rank `p - 1`. A rank-1
/// tensor contracts to a rank-0 array holding the dot product.
///
/// # Errors
///
/// Returns an error if `m` is zero, A has rank zero or rank below `m`, A or b
/// is empty, or `b.len() != A.shape()[m - 1]`.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::{Array, Array1, IxDyn};
/// use tenmode_kernels::tensor_times_vector;
///
/// let a = Array::<f64, IxDyn>::from_elem(IxDyn(&[2, 3]), 2.0);
/// let b = Array1::<f64>::ones(3);
///
/// let c = tensor_times_vector(&a.view(), &b.view(), 2).unwrap();
/// assert_eq!(c.shape(), &[2]);
/// assert!(c.iter().all(|&x| x == 6.0));
/// ```
pub fn tensor_times_vector<T>(
    a: &ArrayView<'_, T, IxDyn>,
    b: &ArrayView1<'_, T>,
    m: Mode,
) -> KernelResult<Array<T, IxDyn>>
where
    T: Copy + NumAssign,
{
    tensor_times_vector_with(a, b, m, &ProductConfig::default())
}

/// [`tensor_times_vector`] with explicit options.
#[tracing::instrument(level = "debug", skip_all, fields(mode = m, rank = a.ndim()))]
pub fn tensor_times_vector_with<T>(
    a: &ArrayView<'_, T, IxDyn>,
    b: &ArrayView1<'_, T>,
    m: Mode,
    config: &ProductConfig,
) -> KernelResult<Array<T, IxDyn>>
where
    T: Copy + NumAssign,
{
    const OPERATION: &str = "tensor_times_vector";

    let run = || -> KernelResult<Array<T, IxDyn>> {
        check_mode(OPERATION, m, a.ndim())?;
        check_not_empty(OPERATION, "tensor A", a.len())?;
        check_not_empty(OPERATION, "vector b", b.len())?;
        check_operand_extent(OPERATION, m, "vector length", a.shape()[m - 1], b.len())?;

        let mut nc = a.shape().to_vec();
        nc.remove(m - 1);

        let (a_staged, b_staged) = (staged(a), staged(b));
        let a_view = strided_input(a, &a_staged, OPERATION, "A")?;
        let b_view = strided_input(b, &b_staged, OPERATION, "b")?;

        with_output(&nc, config, a, OPERATION, |c| {
            ttv_strided(m, c, &a_view, &b_view)
        })
    };
    run().map_err(rejected)
}

/// Mode-m tensor-times-matrix product `A ×ₘ B`.
///
/// Axis `m` (one-based) of A, of extent `B.ncols()`, is replaced by an axis of
/// extent `B.nrows()`.
///
/// # Errors
///
/// Returns an error if `m` is zero, A has rank zero or rank below `m`, A or B
/// is empty, or `B.ncols() != A.shape()[m - 1]`.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::{Array, Array2, IxDyn};
/// use tenmode_kernels::tensor_times_matrix;
///
/// let a = Array::<f64, IxDyn>::ones(IxDyn(&[4, 2, 3]));
/// let b = Array2::<f64>::ones((5, 2));
///
/// let c = tensor_times_matrix(&a.view(), &b.view(), 2).unwrap();
/// assert_eq!(c.shape(), &[4, 5, 3]);
/// assert!(c.iter().all(|&x| x == 2.0));
/// ```
pub fn tensor_times_matrix<T>(
    a: &ArrayView<'_, T, IxDyn>,
    b: &ArrayView2<'_, T>,
    m: Mode,
) -> KernelResult<Array<T, IxDyn>>
where
    T: Copy + NumAssign,
{
    tensor_times_matrix_with(a, b, m, &ProductConfig::default())
}

/// [`tensor_times_matrix`] with explicit options.
#[tracing::instrument(level = "debug", skip_all, fields(mode = m, rank = a.ndim()))]
pub fn tensor_times_matrix_with<T>(
    a: &ArrayView<'_, T, IxDyn>,
    b: &ArrayView2<'_, T>,
    m: Mode,
    config: &ProductConfig,
) -> KernelResult<Array<T, IxDyn>>
where
    T: Copy + NumAssign,
{
    const OPERATION: &str = "tensor_times_matrix";

    let run = || -> KernelResult<Array<T, IxDyn>> {
        check_mode(OPERATION, m, a.ndim())?;
        check_not_empty(OPERATION, "tensor A", a.len())?;
        check_not_empty(OPERATION, "matrix B", b.len())?;
        check_operand_extent(OPERATION, m, "column count of B", a.shape()[m - 1], b.ncols())?;

        let mut nc = a.shape().to_vec();
        nc[m - 1] = b.nrows();

        let (a_staged, b_staged) = (staged(a), staged(b));
        let a_view = strided_input(a, &a_staged, OPERATION, "A")?;
        let b_view = strided_input(b, &b_staged, OPERATION, "B")?;

        with_output(&nc, config, a, OPERATION, |c| {
            ttm_strided(m, c, &a_view, &b_view)
        })
    };
    run().map_err(rejected)
}

/// Second operand of a mode-m product: a vector (TTV) or a matrix (TTM)
pub trait ModeOperand<T> {
    /// Contract axis `m` of `a` against `self`.
    fn mode_product(
        &self,
        a: &ArrayView<'_, T, IxDyn>,
        m: Mode,
        config: &ProductConfig,
    ) -> KernelResult<Array<T, IxDyn>>;
}

impl<T: Copy + NumAssign> ModeOperand<T> for ArrayView1<'_, T> {
    fn mode_product(
        &self,
        a: &ArrayView<'_, T, IxDyn>,
        m: Mode,
        config: &ProductConfig,
    ) -> KernelResult<Array<T, IxDyn>> {
        tensor_times_vector_with(a, self, m, config)
    }
}

impl<T: Copy + NumAssign> ModeOperand<T> for Array1<T> {
    fn mode_product(
        &self,
        a: &ArrayView<'_, T, IxDyn>,
        m: Mode,
        config: &ProductConfig,
    ) -> KernelResult<Array<T, IxDyn>> {
        tensor_times_vector_with(a, &self.view(), m, config)
    }
}

impl<T: Copy + NumAssign> ModeOperand<T> for ArrayView2<'_, T> {
    fn mode_product(
        &self,
        a: &ArrayView<'_, T, IxDyn>,
        m: Mode,
        config: &ProductConfig,
    ) -> KernelResult<Array<T, IxDyn>> {
        tensor_times_matrix_with(a, self, m, config)
    }
}

impl<T: Copy + NumAssign> ModeOperand<T> for Array2<T> {
    fn mode_product(
        &self,
        a: &ArrayView<'_, T, IxDyn>,
        m: Mode,
        config: &ProductConfig,
    ) -> KernelResult<Array<T, IxDyn>> {
        tensor_times_matrix_with(a, &self.view(), m, config)
    }
}

/// Mode-m product with a vector or a matrix.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::{array, Array, IxDyn};
/// use tenmode_kernels::prod;
///
/// let a = Array::from_shape_vec(IxDyn(&[2, 2]), vec![1, 2, 3, 4]).unwrap();
///
/// let v = prod(&a.view(), &array![1, 1], 1).unwrap();
/// assert_eq!(v.as_slice().unwrap(), &[4, 6]);
///
/// let m = prod(&a.view(), &array![[1, 0], [0, 2]], 2).unwrap();
/// assert_eq!(m.as_slice().unwrap(), &[1, 4, 3, 8]);
/// ```
pub fn prod<T, B>(a: &ArrayView<'_, T, IxDyn>, b: &B, m: Mode) -> KernelResult<Array<T, IxDyn>>
where
    B: ModeOperand<T> + ?Sized,
{
    b.mode_product(a, m, &ProductConfig::default())
}

/// [`prod`] with explicit options.
pub fn prod_with<T, B>(
    a: &ArrayView<'_, T, IxDyn>,
    b: &B,
    m: Mode,
    config: &ProductConfig,
) -> KernelResult<Array<T, IxDyn>>
where
    B: ModeOperand<T> + ?Sized,
{
    b.mode_product(a, m, config)
}

/// Successive mode products `A ×ₘ₁ B₁ ×ₘ₂ B₂ ...`, applied left to right.
///
/// With an empty factor list the result is a copy of A.
///
/// # Errors
///
/// Returns the first error reported by any step; A itself must be non-empty
/// and of positive rank.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::{Array, Array2, IxDyn};
/// use tenmode_kernels::prod_seq;
///
/// let core = Array::<f64, IxDyn>::ones(IxDyn(&[2, 2, 2]));
/// let u1 = Array2::<f64>::ones((4, 2));
/// let u3 = Array2::<f64>::ones((3, 2));
///
/// let x = prod_seq(&core.view(), &[(u1.view(), 1), (u3.view(), 3)]).unwrap();
/// assert_eq!(x.shape(), &[4, 2, 3]);
/// assert!(x.iter().all(|&v| v == 4.0));
/// ```
pub fn prod_seq<T>(
    a: &ArrayView<'_, T, IxDyn>,
    factors: &[(ArrayView2<'_, T>, Mode)],
) -> KernelResult<Array<T, IxDyn>>
where
    T: Copy + NumAssign,
{
    prod_seq_with(a, factors, &ProductConfig::default())
}

/// [`prod_seq`] with explicit options, applied to every intermediate result.
#[tracing::instrument(level = "debug", skip_all, fields(rank = a.ndim(), steps = factors.len()))]
pub fn prod_seq_with<T>(
    a: &ArrayView<'_, T, IxDyn>,
    factors: &[(ArrayView2<'_, T>, Mode)],
    config: &ProductConfig,
) -> KernelResult<Array<T, IxDyn>>
where
    T: Copy + NumAssign,
{
    const OPERATION: &str = "prod_seq";

    check_rank(OPERATION, "tensor A", a.ndim())
        .and_then(|_| check_not_empty(OPERATION, "tensor A", a.len()))
        .map_err(rejected)?;

    let mut current = a.to_owned();
    for (b, m) in factors {
        let next = tensor_times_matrix_with(&current.view(), b, *m, config)?;
        current = next;
    }
    Ok(current)
}

/// Inner product `Σᵢ A[i] · B[i]` of two tensors of identical shape.
///
/// No conjugation is applied to complex elements.
///
/// # Errors
///
/// Returns an error if the ranks differ, either rank is zero, either tensor is
/// empty, or the extents differ.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::{Array, IxDyn};
/// use tenmode_kernels::inner_prod;
///
/// let a = Array::from_shape_vec(IxDyn(&[2, 2]), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
/// let b = Array::<f64, IxDyn>::ones(IxDyn(&[2, 2]));
///
/// assert_eq!(inner_prod(&a.view(), &b.view()).unwrap(), 10.0);
/// ```
#[tracing::instrument(level = "debug", skip_all, fields(rank = a.ndim()))]
pub fn inner_prod<T>(a: &ArrayView<'_, T, IxDyn>, b: &ArrayView<'_, T, IxDyn>) -> KernelResult<T>
where
    T: Copy + NumAssign,
{
    const OPERATION: &str = "inner_prod";

    let run = || -> KernelResult<T> {
        if a.ndim() != b.ndim() {
            return Err(KernelError::RankMismatch {
                operation: OPERATION,
                rank_a: a.ndim(),
                rank_b: b.ndim(),
            });
        }
        check_rank(OPERATION, "tensor A", a.ndim())?;
        check_not_empty(OPERATION, "tensor A", a.len())?;
        check_not_empty(OPERATION, "tensor B", b.len())?;
        if a.shape() != b.shape() {
            return Err(KernelError::ShapeMismatch {
                operation: OPERATION,
                a: a.shape().to_vec(),
                b: b.shape().to_vec(),
            });
        }

        let (a_staged, b_staged) = (staged(a), staged(b));
        let a_view = strided_input(a, &a_staged, OPERATION, "A")?;
        let b_view = strided_input(b, &b_staged, OPERATION, "B")?;
        inner_strided(&a_view, &b_view, T::zero())
    };
    run().map_err(rejected)
}

/// Outer product: `C[i, j] = A[i] · B[j]`, with C's extents A's followed by B's.
///
/// # Errors
///
/// Returns an error if either tensor has rank zero or is empty.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::{Array, IxDyn};
/// use tenmode_kernels::outer_prod;
///
/// let a = Array::<f64, IxDyn>::from_elem(IxDyn(&[2, 3]), 2.0);
/// let b = Array::<f64, IxDyn>::ones(IxDyn(&[4]));
///
/// let c = outer_prod(&a.view(), &b.view()).unwrap();
/// assert_eq!(c.shape(), &[2, 3, 4]);
/// assert!(c.iter().all(|&x| x == 2.0));
/// ```
pub fn outer_prod<T>(
    a: &ArrayView<'_, T, IxDyn>,
    b: &ArrayView<'_, T, IxDyn>,
) -> KernelResult<Array<T, IxDyn>>
where
    T: Copy + NumAssign,
{
    outer_prod_with(a, b, &ProductConfig::default())
}

/// [`outer_prod`] with explicit options.
#[tracing::instrument(level = "debug", skip_all, fields(rank_a = a.ndim(), rank_b = b.ndim()))]
pub fn outer_prod_with<T>(
    a: &ArrayView<'_, T, IxDyn>,
    b: &ArrayView<'_, T, IxDyn>,
    config: &ProductConfig,
) -> KernelResult<Array<T, IxDyn>>
where
    T: Copy + NumAssign,
{
    const OPERATION: &str = "outer_prod";

    let run = || -> KernelResult<Array<T, IxDyn>> {
        check_rank(OPERATION, "tensor A", a.ndim())?;
        check_rank(OPERATION, "tensor B", b.ndim())?;
        check_not_empty(OPERATION, "tensor A", a.len())?;
        check_not_empty(OPERATION, "tensor B", b.len())?;

        let nc: Vec<usize> = a.shape().iter().chain(b.shape()).copied().collect();

        let (a_staged, b_staged) = (staged(a), staged(b));
        let a_view = strided_input(a, &a_staged, OPERATION, "A")?;
        let b_view = strided_input(b, &b_staged, OPERATION, "B")?;

        with_output(&nc, config, a, OPERATION, |c| {
            outer_strided(c, &a_view, &b_view)
        })
    };
    run().map_err(rejected)
}

/// Permute the axes of A: axis `i` of A becomes axis `tau[i]` of the result
/// (one-based), so that `C.shape()[tau[i] - 1] == A.shape()[i]`.
///
/// # Errors
///
/// Returns an error if A has rank zero or is empty, or `tau` is not a
/// permutation of `1..=rank(A)`.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::{Array, IxDyn};
/// use tenmode_kernels::trans;
///
/// let a = Array::<i32, IxDyn>::zeros(IxDyn(&[4, 2, 3]));
/// let c = trans(&a.view(), &[3, 1, 2]).unwrap();
/// assert_eq!(c.shape(), &[2, 3, 4]);
///
/// assert!(trans(&a.view(), &[1, 1, 2]).is_err());
/// ```
pub fn trans<T>(a: &ArrayView<'_, T, IxDyn>, tau: &[usize]) -> KernelResult<Array<T, IxDyn>>
where
    T: Copy + Zero,
{
    trans_with(a, tau, &ProductConfig::default())
}

/// [`trans`] with explicit options.
#[tracing::instrument(level = "debug", skip_all, fields(rank = a.ndim(), tau = ?tau))]
pub fn trans_with<T>(
    a: &ArrayView<'_, T, IxDyn>,
    tau: &[usize],
    config: &ProductConfig,
) -> KernelResult<Array<T, IxDyn>>
where
    T: Copy + Zero,
{
    const OPERATION: &str = "trans";

    let run = || -> KernelResult<Array<T, IxDyn>> {
        check_rank(OPERATION, "tensor A", a.ndim())?;
        check_not_empty(OPERATION, "tensor A", a.len())?;
        validate_permutation(OPERATION, tau, a.ndim())?;

        let nc = permuted_extents(a.shape(), tau);

        let a_staged = staged(a);
        let a_view = strided_input(a, &a_staged, OPERATION, "A")?;

        with_output(&nc, config, a, OPERATION, |c| trans_strided(c, &a_view, tau))
    };
    run().map_err(rejected)
}
