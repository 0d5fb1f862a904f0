//! # tenmode-core
//!
//! Extents, strides and non-owning strided views for the TenMode kernels.
//!
//! **Version:** 0.1.0-alpha.1
//!
//! Every kernel in `tenmode-kernels` consumes its operands through the same
//! normalized calling convention: a borrowed buffer plus one extent and one
//! stride per axis. This crate provides that vocabulary:
//!
//! - **Metadata types** ([`Extents`], [`Strides`], [`Mode`]) backed by `SmallVec`
//! - **Storage orders** ([`Layout`]) and the packed strides they induce
//! - **Strided views** ([`StridedView`], [`StridedViewMut`]) over slices, built from
//!   raw parts or borrowed from `scirs2_core` arrays without copying
//!
//! ## Quick Start
//!
//! ```
//! use tenmode_core::{Layout, StridedView};
//!
//! // A 2x3 tensor stored column-major
//! let data = vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0];
//! let view = StridedView::contiguous(&data, &[2, 3], Layout::ColumnMajor);
//!
//! assert_eq!(view.strides(), &[1, 2]);
//! assert_eq!(view.get(&[0, 2]), Some(&3.0));
//! assert_eq!(view.get(&[1, 0]), Some(&4.0));
//! ```
//!
//! ## Memory Layout
//!
//! Views are layout-agnostic: the element at multi-index `i` sits at
//! `offset + Σ strides[k] * i[k]`. Row-major, column-major, permuted, padded and
//! reversed buffers are all described the same way.
//!
//! ## Safety
//!
//! No unsafe code. All element access is bounds-checked through the borrowed
//! slice; inconsistent extent/stride lengths are caught by debug assertions.
//!
//! ## SciRS2 Integration
//!
//! Array interop goes through `scirs2_core::ndarray_ext`.

pub mod types;
pub mod view;


pub use types::{addressed_span, element_count, offset_of, Extents, Layout, Mode, Strides};
pub use view::{StridedView, StridedViewMut};
