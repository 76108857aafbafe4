//! The [Tensor] struct, [Cpu] device, and [Error].
//!
//! At its core a tensor is a shape plus a flat row-major [Buffer] of
//! dtype-tagged scalars. Tensors are immutable: every op produces a new
//! tensor, and cloning one only bumps the reference count of its buffer.
//!
//! # Creating tensors
//!
//! Tensors are allocated with a device:
//!
//! ```rust
//! # use gradmap_core::prelude::*;
//! let dev: Cpu = Default::default();
//! let a = dev.tensor([[1.0, 2.0], [3.0, 4.0]]);
//! let b = dev.zeros([2, 3], DType::Int32);
//! let c = dev.try_tensor_from_vec(vec![true, false], [2]).unwrap();
//! assert_eq!(a.shape().dims(), &[2, 2]);
//! assert_eq!(b.dtype(), DType::Int32);
//! assert_eq!(c.dtype(), DType::Bool);
//! ```
//!
//! # Reading values back
//!
//! ```rust
//! # use gradmap_core::prelude::*;
//! let dev: Cpu = Default::default();
//! let a = dev.tensor([[1, 2], [3, 4]]);
//! let arr: [[i32; 2]; 2] = a.array();
//! assert_eq!(arr, [[1, 2], [3, 4]]);
//! assert_eq!(a.to_vec::<f32>(), vec![1.0, 2.0, 3.0, 4.0]);
//! ```

mod arrays;
pub(crate) mod cpu;
mod display;
mod error;
mod storage;

pub use arrays::{NdArray, TensorFrom};
pub use cpu::Cpu;
pub use error::Error;
pub use storage::Buffer;

use crate::{
    dtypes::{DType, Unit},
    shapes::Shape,
};
use std::sync::Arc;

/// An n-dimensional array with a runtime [Shape] and [DType].
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    pub(crate) shape: Shape,
    pub(crate) data: Arc<Buffer>,
}

impl Tensor {
    /// Wraps `data` with `shape`, checking that the element counts agree.
    pub fn try_new(shape: impl Into<Shape>, data: Buffer) -> Result<Self, Error> {
        let shape = shape.into();
        if data.len() != shape.num_elements() {
            return Err(Error::shape_mismatch(
                "tensor",
                format!(
                    "shape {shape} needs {} elements, found {}",
                    shape.num_elements(),
                    data.len()
                ),
            ));
        }
        Ok(Self {
            shape,
            data: Arc::new(data),
        })
    }

    pub fn try_from_vec<E: Unit>(shape: impl Into<Shape>, data: Vec<E>) -> Result<Self, Error> {
        Self::try_new(shape, E::into_buffer(data))
    }

    /// A rank 0 tensor holding `value`.
    pub fn scalar<E: Unit>(value: E) -> Self {
        Self {
            shape: Shape::scalar(),
            data: Arc::new(E::into_buffer(vec![value])),
        }
    }

    pub(crate) fn from_parts(shape: Shape, data: Buffer) -> Self {
        debug_assert_eq!(shape.num_elements(), data.len());
        Self {
            shape,
            data: Arc::new(data),
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    pub fn buffer(&self) -> &Buffer {
        &self.data
    }

    pub fn num_elements(&self) -> usize {
        self.shape.num_elements()
    }

    /// Borrows the elements if the tensor's dtype is exactly `E`.
    pub fn as_slice<E: Unit>(&self) -> Option<&[E]> {
        self.data.as_slice()
    }

    /// Copies the elements out, casting to `E` if needed.
    pub fn to_vec<E: Unit>(&self) -> Vec<E> {
        match self.as_slice::<E>() {
            Some(s) => s.to_vec(),
            None => {
                let cast = self.data.cast(E::DTYPE);
                E::slice_of(&cast).map(|s| s.to_vec()).unwrap_or_default()
            }
        }
    }

    /// A tensor sharing this buffer under a different shape with the same
    /// number of elements.
    pub fn try_reshape(&self, shape: impl Into<Shape>) -> Result<Self, Error> {
        let shape = shape.into();
        if shape.num_elements() != self.num_elements() {
            return Err(Error::shape_mismatch(
                "reshape",
                format!("cannot reshape {} into {shape}", self.shape),
            ));
        }
        Ok(Self {
            shape,
            data: self.data.clone(),
        })
    }

    /// Converts to `dtype`, sharing the buffer when it already matches.
    pub fn to_dtype(&self, dtype: DType) -> Self {
        if self.dtype() == dtype {
            return self.clone();
        }
        Self {
            shape: self.shape.clone(),
            data: Arc::new(self.data.cast(dtype)),
        }
    }

    /// Reads the tensor into a nested rust array, casting elements if needed.
    pub fn try_array<A: NdArray>(&self) -> Result<A, Error> {
        let dims = A::dims();
        if dims.as_slice() != self.shape.dims() {
            return Err(Error::shape_mismatch(
                "array",
                format!("tensor has shape {}, array has {:?}", self.shape, dims),
            ));
        }
        Ok(A::from_flat(&self.to_vec::<A::Elem>()))
    }

    /// **Panics** if the array's shape differs from the tensor's. See [Tensor::try_array].
    pub fn array<A: NdArray>(&self) -> A {
        self.try_array().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::TestDevice;

    #[test]
    fn test_wrong_num_elements() {
        let r = Tensor::try_from_vec([2, 2], vec![1.0f32, 2.0, 3.0]);
        assert!(matches!(r, Err(Error::ShapeMismatch { .. })));
        let r = Tensor::try_from_vec([], vec![1i32, 2]);
        assert!(matches!(r, Err(Error::ShapeMismatch { .. })));
        assert!(Tensor::try_from_vec([], vec![1i32]).is_ok());
    }

    #[test]
    fn test_reshape_shares_data() {
        let dev: TestDevice = Default::default();
        let a = dev.tensor([[1, 2, 3], [4, 5, 6]]);
        let b = a.try_reshape([3, 2]).unwrap();
        assert!(Arc::ptr_eq(&a.data, &b.data));
        assert_eq!(b.array::<[[i32; 2]; 3]>(), [[1, 2], [3, 4], [5, 6]]);
        assert!(a.try_reshape([4]).is_err());
    }

    #[test]
    fn test_to_dtype() {
        let dev: TestDevice = Default::default();
        let a = dev.tensor([1.9, -0.5]);
        assert_eq!(a.to_dtype(DType::Int32).to_vec::<i32>(), vec![1, 0]);
        assert_eq!(a.to_vec::<bool>(), vec![true, true]);
    }

    #[test]
    fn test_array_shape_check() {
        let dev: TestDevice = Default::default();
        let a = dev.tensor([1, 2, 3]);
        assert!(a.try_array::<[i32; 2]>().is_err());
        assert!(a.try_array::<[[i32; 3]; 1]>().is_err());
        assert_eq!(a.try_array::<[i32; 3]>().unwrap(), [1, 2, 3]);
    }
}
