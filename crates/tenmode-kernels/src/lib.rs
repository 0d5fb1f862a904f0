//! # tenmode-kernels
//!
//! Mode-m contraction and permutation kernels over arbitrary strided layouts.
//!
//! **Version:** 0.1.0-alpha.1
//!
//! ## Overview
//!
//! The kernels in this crate walk dense tensors of any rank using only their
//! extents and strides. They never materialize index tuples and never allocate
//! inside a traversal; the contraction axis is handled by choosing one of a few
//! specialized recursions once per call.
//!
//! **Kernels** (raw strided views from [`tenmode_core`]):
//! - [`ttv_strided`] - Tensor-times-vector along mode m (interior, first-mode and
//!   matrix-vector traversals)
//! - [`ttm_strided`] - Tensor-times-matrix along mode m
//! - [`inner_strided`] - Full contraction of two equally shaped tensors
//! - [`outer_strided`] - Outer product
//! - [`trans_strided`] / [`copy_strided`] - Axis permutation and layout conversion
//!
//! **Wrappers** (`scirs2_core::ndarray_ext` arrays, validated and allocating):
//! - [`tensor_times_vector`], [`tensor_times_matrix`], [`prod`], [`prod_seq`]
//! - [`inner_prod`], [`outer_prod`], [`trans`]
//!
//! Modes are **one-based** throughout: `m = 1` contracts the first axis.
//!
//! ## Quick Start
//!
//! ```rust
//! use scirs2_core::ndarray_ext::{Array, Array1, Array2, IxDyn};
//! use tenmode_kernels::{inner_prod, prod, trans};
//!
//! let a = Array::<f64, IxDyn>::from_elem(IxDyn(&[4, 2, 3]), 2.0);
//!
//! // Tensor-times-vector: removes mode 2
//! let b = Array1::<f64>::ones(2);
//! let c = prod(&a.view(), &b, 2).unwrap();
//! assert_eq!(c.shape(), &[4, 3]);
//! assert!(c.iter().all(|&x| x == 4.0));
//!
//! // Tensor-times-matrix: mode 3 goes from 3 to 5
//! let m = Array2::<f64>::ones((5, 3));
//! let d = prod(&a.view(), &m, 3).unwrap();
//! assert_eq!(d.shape(), &[4, 2, 5]);
//!
//! // Permutation: axis i moves to position tau[i]
//! let t = trans(&a.view(), &[2, 3, 1]).unwrap();
//! assert_eq!(t.shape(), &[3, 4, 2]);
//!
//! assert_eq!(inner_prod(&a.view(), &a.view()).unwrap(), 96.0);
//! ```
//!
//! ## Errors
//!
//! Every precondition is checked before any kernel runs and reported as a
//! [`KernelError`]. Kernels trust validated input completely; the wrappers and
//! the `*_strided` entry points are the only places shapes are checked.
//!
//! ## Logging
//!
//! Wrappers open `debug` spans through `tracing`, the chosen traversal is
//! logged at `trace`, and rejected calls at `debug`. Install any subscriber to
//! see them.
//!
//! ## SciRS2 Integration
//!
//! This crate uses `scirs2-core` for all array containers and numeric traits.

pub mod algorithms;
pub mod config;
pub mod error;
mod fiber;
pub mod products;
pub mod ttm;
pub mod ttv;


// Re-exports
pub use algorithms::{copy_strided, inner_strided, outer_strided, trans_strided};
pub use config::{OutputLayout, ProductConfig};
pub use error::{KernelError, KernelResult};
pub use products::*;
pub use ttm::ttm_strided;
pub use ttv::ttv_strided;
