//! Runtime element types and the scalar traits backing them.
//!
//! Every [crate::tensor::Tensor] carries one of the [DType]s below. Kernels
//! are written generically over [Unit] (anything storable) and [Dtype]
//! (anything you can do arithmetic on), then dispatched on the runtime tag.

use crate::tensor::Buffer;

/// The element type of a tensor.
///
/// The variants are ordered by the promotion lattice:
/// `Bool < Int32 < Float32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DType {
    Bool,
    Int32,
    Float32,
}

impl DType {
    /// The common type two operands are converted to before a comparison.
    pub fn promote(self, other: Self) -> Self {
        self.max(other)
    }

    /// The common type of two arithmetic operands. Booleans have no
    /// arithmetic, so they promote to [DType::Int32].
    pub fn promote_arith(self, other: Self) -> Self {
        match self.promote(other) {
            DType::Bool => DType::Int32,
            d => d,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, DType::Float32)
    }

    pub fn name(&self) -> &'static str {
        match self {
            DType::Bool => "Bool",
            DType::Int32 => "Int32",
            DType::Float32 => "Float32",
        }
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Represents a unit type, but no arithmetic.
pub trait Unit:
    'static + Copy + Clone + Default + std::fmt::Debug + PartialOrd + Send + Sync
{
    const DTYPE: DType;
    const ONE: Self;

    fn into_buffer(data: Vec<Self>) -> Buffer;
    fn slice_of(buf: &Buffer) -> Option<&[Self]>;
}

impl Unit for bool {
    const DTYPE: DType = DType::Bool;
    const ONE: Self = true;
    fn into_buffer(data: Vec<Self>) -> Buffer {
        Buffer::Bool(data)
    }
    fn slice_of(buf: &Buffer) -> Option<&[Self]> {
        match buf {
            Buffer::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl Unit for i32 {
    const DTYPE: DType = DType::Int32;
    const ONE: Self = 1;
    fn into_buffer(data: Vec<Self>) -> Buffer {
        Buffer::Int32(data)
    }
    fn slice_of(buf: &Buffer) -> Option<&[Self]> {
        match buf {
            Buffer::Int32(v) => Some(v),
            _ => None,
        }
    }
}

impl Unit for f32 {
    const DTYPE: DType = DType::Float32;
    const ONE: Self = 1.0;
    fn into_buffer(data: Vec<Self>) -> Buffer {
        Buffer::Float32(data)
    }
    fn slice_of(buf: &Buffer) -> Option<&[Self]> {
        match buf {
            Buffer::Float32(v) => Some(v),
            _ => None,
        }
    }
}

/// Represents a data type or element of an array you can do arithmetic with.
pub trait Dtype:
    Unit
    + num_traits::Num
    + num_traits::NumCast
    + std::ops::Neg<Output = Self>
    + std::ops::AddAssign
    + std::iter::Sum
{
    /// Largest integral value not greater than `self`. Identity for integers.
    fn floor(self) -> Self;

    // Integers wrap around on overflow, floats use the plain operators.
    fn wrapping_add(self, rhs: Self) -> Self;
    fn wrapping_sub(self, rhs: Self) -> Self;
    fn wrapping_mul(self, rhs: Self) -> Self;
    fn wrapping_neg(self) -> Self;
}

impl Dtype for i32 {
    fn floor(self) -> Self {
        self
    }
    fn wrapping_add(self, rhs: Self) -> Self {
        num_traits::WrappingAdd::wrapping_add(&self, &rhs)
    }
    fn wrapping_sub(self, rhs: Self) -> Self {
        num_traits::WrappingSub::wrapping_sub(&self, &rhs)
    }
    fn wrapping_mul(self, rhs: Self) -> Self {
        num_traits::WrappingMul::wrapping_mul(&self, &rhs)
    }
    fn wrapping_neg(self) -> Self {
        num_traits::WrappingNeg::wrapping_neg(&self)
    }
}

impl Dtype for f32 {
    fn floor(self) -> Self {
        num_traits::Float::floor(self)
    }
    fn wrapping_add(self, rhs: Self) -> Self {
        self + rhs
    }
    fn wrapping_sub(self, rhs: Self) -> Self {
        self - rhs
    }
    fn wrapping_mul(self, rhs: Self) -> Self {
        self * rhs
    }
    fn wrapping_neg(self) -> Self {
        -self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promotion_table() {
        assert_eq!(DType::Int32.promote_arith(DType::Int32), DType::Int32);
        assert_eq!(DType::Int32.promote_arith(DType::Float32), DType::Float32);
        assert_eq!(DType::Float32.promote_arith(DType::Bool), DType::Float32);
        assert_eq!(DType::Bool.promote_arith(DType::Bool), DType::Int32);
        assert_eq!(DType::Bool.promote(DType::Bool), DType::Bool);
    }

    #[test]
    fn test_floor_of_integers_is_identity() {
        assert_eq!(Dtype::floor(-3i32), -3);
        assert_eq!(Dtype::floor(-1.5f32), -2.0);
        assert_eq!(Dtype::floor(2.0f32), 2.0);
    }

    #[test]
    fn test_integer_overflow_wraps() {
        assert_eq!(Dtype::wrapping_add(i32::MAX, 1), i32::MIN);
        assert_eq!(Dtype::wrapping_sub(i32::MIN, 1), i32::MAX);
        assert_eq!(Dtype::wrapping_mul(i32::MAX, 2), -2);
        assert_eq!(Dtype::wrapping_neg(i32::MIN), i32::MIN);
        assert_eq!(Dtype::wrapping_add(1.5f32, 2.0), 3.5);
        assert_eq!(Dtype::wrapping_neg(2.0f32), -2.0);
    }
}
