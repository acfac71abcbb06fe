//! Minimal tensor type for the interpretability pipeline
//!
//! Row-major `f32` N-dimensional array with shape validation. The pipeline
//! only ever manipulates `f32` activations and attention weights, so the
//! element type is fixed rather than generic.

use serde::{Deserialize, Serialize};

use crate::error::{EntenderError, Result};

/// Row-major `f32` tensor
///
/// # Examples
///
/// ```
/// use entender::Tensor;
///
/// let t = Tensor::from_vec(vec![2, 3], vec![
///     1.0, 2.0, 3.0,
///     4.0, 5.0, 6.0,
/// ]).unwrap();
///
/// assert_eq!(t.shape(), &[2, 3]);
/// assert_eq!(t.ndim(), 2);
/// assert_eq!(t.size(), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    /// Flattened data in row-major order
    data: Vec<f32>,
    /// Shape of the tensor
    shape: Vec<usize>,
}

impl Tensor {
    /// Create a new tensor from a vector and shape
    ///
    /// # Errors
    ///
    /// Returns `Err` if the shape is empty, contains a zero dimension, or
    /// its product does not match the data length.
    pub fn from_vec(shape: Vec<usize>, data: Vec<f32>) -> Result<Self> {
        if shape.is_empty() {
            return Err(EntenderError::InvalidShape {
                reason: "Shape cannot be empty".to_string(),
            });
        }

        if shape.contains(&0) {
            return Err(EntenderError::InvalidShape {
                reason: "Shape dimensions cannot be zero".to_string(),
            });
        }

        let expected_size: usize = shape.iter().product();
        if data.len() != expected_size {
            return Err(EntenderError::InvalidShape {
                reason: format!(
                    "Data size {} does not match shape {:?} (expected {})",
                    data.len(),
                    shape,
                    expected_size
                ),
            });
        }

        Ok(Self { data, shape })
    }

    /// Create a zero-filled tensor
    ///
    /// # Errors
    ///
    /// Returns `Err` if the shape is invalid.
    pub fn zeros(shape: Vec<usize>) -> Result<Self> {
        let size: usize = shape.iter().product();
        Self::from_vec(shape, vec![0.0; size])
    }

    /// Get the shape of the tensor
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the number of dimensions
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Get the total number of elements
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Get the flattened data in row-major order
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Get mutable access to the flattened data
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Check whether the tensor is a square 2-D matrix
    #[must_use]
    pub fn is_square_matrix(&self) -> bool {
        self.shape.len() == 2 && self.shape[0] == self.shape[1]
    }
}
