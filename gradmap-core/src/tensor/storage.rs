use crate::dtypes::{DType, Unit};

/// A flat, row-major buffer of dtype-tagged scalars.
#[derive(Clone, Debug, PartialEq)]
pub enum Buffer {
    Bool(Vec<bool>),
    Int32(Vec<i32>),
    Float32(Vec<f32>),
}

impl Buffer {
    pub fn len(&self) -> usize {
        match self {
            Buffer::Bool(v) => v.len(),
            Buffer::Int32(v) => v.len(),
            Buffer::Float32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> DType {
        match self {
            Buffer::Bool(_) => DType::Bool,
            Buffer::Int32(_) => DType::Int32,
            Buffer::Float32(_) => DType::Float32,
        }
    }

    /// `numel` copies of the dtype's `0`.
    pub fn zeros(dtype: DType, numel: usize) -> Self {
        match dtype {
            DType::Bool => Buffer::Bool(vec![false; numel]),
            DType::Int32 => Buffer::Int32(vec![0; numel]),
            DType::Float32 => Buffer::Float32(vec![0.0; numel]),
        }
    }

    /// `numel` copies of the dtype's `1`.
    pub fn ones(dtype: DType, numel: usize) -> Self {
        match dtype {
            DType::Bool => Buffer::Bool(vec![bool::ONE; numel]),
            DType::Int32 => Buffer::Int32(vec![i32::ONE; numel]),
            DType::Float32 => Buffer::Float32(vec![f32::ONE; numel]),
        }
    }

    /// Converts every element to `dtype`. Floats truncate towards zero when
    /// cast to integers; anything non-zero is `true`.
    pub fn cast(&self, dtype: DType) -> Self {
        if self.dtype() == dtype {
            return self.clone();
        }
        match (self, dtype) {
            (Buffer::Bool(v), DType::Int32) => Buffer::Int32(v.iter().map(|&x| x as i32).collect()),
            (Buffer::Bool(v), DType::Float32) => {
                Buffer::Float32(v.iter().map(|&x| x as i32 as f32).collect())
            }
            (Buffer::Int32(v), DType::Bool) => Buffer::Bool(v.iter().map(|&x| x != 0).collect()),
            (Buffer::Int32(v), DType::Float32) => {
                Buffer::Float32(v.iter().map(|&x| x as f32).collect())
            }
            (Buffer::Float32(v), DType::Bool) => {
                Buffer::Bool(v.iter().map(|&x| x != 0.0).collect())
            }
            (Buffer::Float32(v), DType::Int32) => {
                Buffer::Int32(v.iter().map(|&x| x as i32).collect())
            }
            _ => unreachable!("same-dtype casts return early"),
        }
    }

    /// A new buffer made of the elements at `offsets`, in order.
    pub(crate) fn gather(&self, offsets: &[usize]) -> Self {
        match self {
            Buffer::Bool(v) => Buffer::Bool(offsets.iter().map(|&i| v[i]).collect()),
            Buffer::Int32(v) => Buffer::Int32(offsets.iter().map(|&i| v[i]).collect()),
            Buffer::Float32(v) => Buffer::Float32(offsets.iter().map(|&i| v[i]).collect()),
        }
    }

    pub fn as_slice<E: Unit>(&self) -> Option<&[E]> {
        E::slice_of(self)
    }
}
