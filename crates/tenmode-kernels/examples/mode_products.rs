//! Example demonstrating mode-m products, permutation and the raw kernels
//!
//! Walks through tensor-times-vector, tensor-times-matrix, a Tucker-style
//! sequence of products, inner/outer products, axis permutation, and calling
//! a strided kernel directly on a padded buffer.
//!
//! Run with: RUST_LOG=trace cargo run --example mode_products

use anyhow::Result;
use scirs2_core::ndarray_ext::{Array, Array1, Array2, IxDyn};
use tenmode_core::{Layout, StridedView, StridedViewMut};
use tenmode_kernels::{
    inner_prod, outer_prod, prod, prod_seq, prod_with, trans, ttv_strided, OutputLayout,
    ProductConfig,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Mode-m Products Example ===\n");

    // 1. Tensor-times-vector
    println!("1. Tensor-Times-Vector");
    println!("----------------------");
    let a = Array::from_shape_fn(IxDyn(&[2, 3, 4]), |idx| {
        (idx[0] * 12 + idx[1] * 4 + idx[2]) as f64 + 1.0
    });
    println!("A shape: {:?}", a.shape());

    for m in 1..=3 {
        let b = Array1::<f64>::ones(a.shape()[m - 1]);
        let c = prod(&a.view(), &b, m)?;
        println!("A ×{} ones -> shape {:?}", m, c.shape());
    }
    println!();

    // 2. Tensor-times-matrix
    println!("2. Tensor-Times-Matrix");
    println!("----------------------");
    let u = Array2::<f64>::from_shape_fn((5, 3), |(i, j)| (i + j) as f64);
    let c = prod(&a.view(), &u, 2)?;
    println!("A ×2 U (U is 5×3) -> shape {:?}", c.shape());

    let config = ProductConfig::new().output_layout(OutputLayout::ColumnMajor);
    let c_col = prod_with(&a.view(), &u, 2, &config)?;
    println!("column-major result strides: {:?}", c_col.strides());
    println!("same values: {}\n", c == c_col);

    // 3. Tucker-style reconstruction from a small core
    println!("3. Sequence of Mode Products");
    println!("----------------------------");
    let core = Array::<f64, IxDyn>::ones(IxDyn(&[2, 2, 2]));
    let factors = [
        Array2::<f64>::ones((4, 2)),
        Array2::<f64>::ones((3, 2)),
        Array2::<f64>::ones((5, 2)),
    ];
    let steps: Vec<_> = factors
        .iter()
        .enumerate()
        .map(|(i, f)| (f.view(), i + 1))
        .collect();
    let x = prod_seq(&core.view(), &steps)?;
    println!("core {:?} -> reconstruction {:?}", core.shape(), x.shape());
    println!("every entry = 2·2·2 = {}\n", x[[0, 0, 0]]);

    // 4. Inner and outer products
    println!("4. Inner and Outer Products");
    println!("---------------------------");
    let norm_sq = inner_prod(&a.view(), &a.view())?;
    println!("<A, A> = {}", norm_sq);

    let v = Array::from_shape_vec(IxDyn(&[2]), vec![1.0, 2.0])?;
    let w = Array::from_shape_vec(IxDyn(&[3]), vec![1.0, 10.0, 100.0])?;
    let vw = outer_prod(&v.view(), &w.view())?;
    println!("v ∘ w = {:?}\n", vw.iter().collect::<Vec<_>>());

    // 5. Permutation
    println!("5. Axis Permutation");
    println!("-------------------");
    let t = trans(&a.view(), &[3, 1, 2])?;
    println!("trans(A, [3, 1, 2]) -> shape {:?}", t.shape());
    let back = trans(&t.view(), &[2, 3, 1])?;
    println!("inverse permutation restores A: {}", back == a);

    match trans(&a.view(), &[1, 1, 2]) {
        Ok(_) => println!("unexpected success"),
        Err(err) => println!("malformed permutation rejected: {}", err),
    }
    println!();

    // 6. Raw strided kernel on a padded buffer
    println!("6. Strided Kernel on a Padded Buffer");
    println!("------------------------------------");
    // 3×2 matrix stored with a row pitch of 4
    let buffer = vec![1.0, 2.0, -1.0, -1.0, 3.0, 4.0, -1.0, -1.0, 5.0, 6.0];
    let m = StridedView::new(&buffer, &[3, 2], &[4, 1]);
    let ones = vec![1.0; 2];
    let ones = StridedView::contiguous(&ones, &[2], Layout::RowMajor);
    let mut row_sums = vec![0.0; 3];
    {
        let mut out = StridedViewMut::contiguous(&mut row_sums, &[3], Layout::RowMajor);
        ttv_strided(2, &mut out, &m, &ones)?;
    }
    println!("row sums: {:?}", row_sums);

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
