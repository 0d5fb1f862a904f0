//! Strided views over dense buffers.
//!
//! This example demonstrates:
//! - Packed strides for row-major and column-major storage
//! - Padded buffers with an explicit offset
//! - Borrowing transposed and reversed arrays without copying
//!
//! Run with:
//! ```bash
//! cargo run --example strided_views
//! ```

use scirs2_core::ndarray_ext::{Array, Axis, IxDyn};
use tenmode_core::{offset_of, Layout, StridedView, StridedViewMut};

fn main() {
    println!("=== TenMode Core: Strided Views ===\n");

    example_layouts();
    example_padded();
    example_from_array();
    example_mutable();

    println!("\n=== All examples completed successfully! ===");
}

fn example_layouts() {
    println!("--- Example 1: Storage Orders ---");

    let extents = [4, 2, 3];
    for layout in [Layout::RowMajor, Layout::ColumnMajor] {
        let strides = layout.strides(&extents);
        println!(
            "  {:?}: strides {:?}, offset of [1, 1, 2] = {}",
            layout,
            &strides[..],
            offset_of(&[1, 1, 2], &strides)
        );
    }
    println!();
}

fn example_padded() {
    println!("--- Example 2: Padded Buffer ---");

    // 2x3 matrix in a 3x5 buffer, starting at row 1, column 1
    let buffer: Vec<i32> = (0..15).collect();
    let view = StridedView::new(&buffer, &[2, 3], &[5, 1]).with_offset(6);

    for i in 0..2 {
        let row: Vec<i32> = (0..3).filter_map(|j| view.get(&[i, j]).copied()).collect();
        println!("  row {}: {:?}", i, row);
    }
    println!();
}

fn example_from_array() {
    println!("--- Example 3: Borrowing Arrays ---");

    let array = Array::from_shape_vec(IxDyn(&[2, 3]), (1..=6).collect::<Vec<i32>>())
        .expect("shape matches data");

    let transposed = array.t();
    if let Some(view) = StridedView::from_array(transposed) {
        println!(
            "  transposed: extents {:?}, strides {:?}",
            view.extents(),
            view.strides()
        );
    }

    let mut reversed = array.view();
    reversed.invert_axis(Axis(1));
    if let Some(view) = StridedView::from_array(reversed) {
        println!(
            "  reversed columns: strides {:?}, offset {}, first element {:?}",
            view.strides(),
            view.offset(),
            view.get(&[0, 0])
        );
    }
    println!();
}

fn example_mutable() {
    println!("--- Example 4: Writing Through a View ---");

    let mut data = vec![0.0; 6];
    {
        let mut view = StridedViewMut::contiguous(&mut data, &[2, 3], Layout::ColumnMajor);
        let (buffer, _, strides, offset) = view.parts_mut();
        for i in 0..2 {
            for j in 0..3 {
                let pos = offset as isize + offset_of(&[i, j], strides);
                buffer[pos as usize] = (10 * i + j) as f64;
            }
        }
    }
    println!("  column-major buffer: {:?}", data);
}
