//! Configuration for the allocating product wrappers

use scirs2_core::ndarray_ext::{Array, ArrayView, Dimension, IxDyn};
use scirs2_core::numeric::Zero;
use tenmode_core::Layout;

/// Storage order of a freshly allocated result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputLayout {
    /// Same order as the primary input; row-major if the input is neither
    #[default]
    MatchInput,
    /// Last index fastest
    RowMajor,
    /// First index fastest
    ColumnMajor,
}

impl OutputLayout {
    /// Resolve to a concrete layout for a result derived from `input`.
    pub fn resolve<T, D: Dimension>(self, input: &ArrayView<'_, T, D>) -> Layout {
        match self {
            OutputLayout::RowMajor => Layout::RowMajor,
            OutputLayout::ColumnMajor => Layout::ColumnMajor,
            OutputLayout::MatchInput => {
                if input.is_standard_layout() {
                    Layout::RowMajor
                } else if input.t().is_standard_layout() {
                    Layout::ColumnMajor
                } else {
                    Layout::RowMajor
                }
            }
        }
    }
}

/// Options shared by [`prod_with`](crate::prod_with), [`trans_with`](crate::trans_with)
/// and the other `*_with` wrappers
#[derive(Debug, Clone, Default)]
pub struct ProductConfig {
    /// Storage order of the result
    pub output_layout: OutputLayout,
}

impl ProductConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the storage order of the result
    pub fn output_layout(mut self, layout: OutputLayout) -> Self {
        self.output_layout = layout;
        self
    }
}

/// Zero-filled array with the given extents in the given storage order.
pub(crate) fn zeros<T: Clone + Zero>(extents: &[usize], layout: Layout) -> Array<T, IxDyn> {
    match layout {
        Layout::RowMajor => Array::zeros(IxDyn(extents)),
        Layout::ColumnMajor => {
            let reversed: Vec<usize> = extents.iter().rev().copied().collect();
            Array::zeros(IxDyn(&reversed)).reversed_axes()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::ndarray_ext::Array2;

    #[test]
    fn test_default_matches_input() {
        let config = ProductConfig::default();
        assert_eq!(config.output_layout, OutputLayout::MatchInput);

        let config = ProductConfig::new().output_layout(OutputLayout::ColumnMajor);
        assert_eq!(config.output_layout, OutputLayout::ColumnMajor);
    }

    #[test]
    fn test_resolve_from_input_order() {
        let row = Array2::<f64>::zeros((2, 3));
        let col = Array2::<f64>::zeros((3, 2)).reversed_axes();

        assert_eq!(OutputLayout::MatchInput.resolve(&row.view()), Layout::RowMajor);
        assert_eq!(OutputLayout::MatchInput.resolve(&col.view()), Layout::ColumnMajor);
        assert_eq!(OutputLayout::RowMajor.resolve(&col.view()), Layout::RowMajor);
    }

    #[test]
    fn test_column_major_zeros() {
        let c = zeros::<f64>(&[2, 3, 4], Layout::ColumnMajor);
        assert_eq!(c.shape(), &[2, 3, 4]);
        assert_eq!(c.strides(), &[1, 2, 6]);

        let r = zeros::<f64>(&[2, 3, 4], Layout::RowMajor);
        assert_eq!(r.strides(), &[12, 4, 1]);
    }
}
