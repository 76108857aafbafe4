use super::{Error, Tensor};
use crate::dtypes::Unit;

/// A rust scalar or (nested) fixed-size array that can be converted to and
/// from a tensor's flat buffer.
pub trait NdArray: Sized {
    type Elem: Unit;
    const NUM_ELEMENTS: usize;

    fn dims() -> Vec<usize>;
    fn flatten_into(&self, out: &mut Vec<Self::Elem>);
    /// `flat` must hold at least [NdArray::NUM_ELEMENTS] elements.
    fn from_flat(flat: &[Self::Elem]) -> Self;
}

macro_rules! scalar_ndarray {
    ($($t:ty),*) => {$(
        impl NdArray for $t {
            type Elem = $t;
            const NUM_ELEMENTS: usize = 1;
            fn dims() -> Vec<usize> {
                Vec::new()
            }
            fn flatten_into(&self, out: &mut Vec<Self::Elem>) {
                out.push(*self);
            }
            fn from_flat(flat: &[Self::Elem]) -> Self {
                flat[0]
            }
        }
    )*};
}

scalar_ndarray!(bool, i32, f32);

/// Float literals default to `f64`; they are stored as [f32].
impl NdArray for f64 {
    type Elem = f32;
    const NUM_ELEMENTS: usize = 1;
    fn dims() -> Vec<usize> {
        Vec::new()
    }
    fn flatten_into(&self, out: &mut Vec<Self::Elem>) {
        out.push(*self as f32);
    }
    fn from_flat(flat: &[Self::Elem]) -> Self {
        flat[0] as f64
    }
}

impl<T: NdArray, const M: usize> NdArray for [T; M] {
    type Elem = T::Elem;
    const NUM_ELEMENTS: usize = M * T::NUM_ELEMENTS;
    fn dims() -> Vec<usize> {
        let mut dims = vec![M];
        dims.extend(T::dims());
        dims
    }
    fn flatten_into(&self, out: &mut Vec<Self::Elem>) {
        for t in self.iter() {
            t.flatten_into(out);
        }
    }
    fn from_flat(flat: &[Self::Elem]) -> Self {
        std::array::from_fn(|i| T::from_flat(&flat[i * T::NUM_ELEMENTS..]))
    }
}

/// Construct tensors from rust data
pub trait TensorFrom<Src> {
    /// Create a tensor from rust data
    /// ```rust
    /// # use gradmap_core::prelude::*;
    /// # let dev: Cpu = Default::default();
    /// let _ = dev.tensor(2.0);
    /// let _ = dev.tensor([1, 2, 3]);
    /// let _ = dev.tensor([[true, false], [false, true]]);
    /// ```
    fn tensor(&self, src: Src) -> Tensor {
        self.try_tensor(src).unwrap()
    }
    /// Fallible version of [TensorFrom::tensor]
    fn try_tensor(&self, src: Src) -> Result<Tensor, Error>;
}

impl<A: NdArray> TensorFrom<A> for super::Cpu {
    fn try_tensor(&self, src: A) -> Result<Tensor, Error> {
        let mut flat = Vec::with_capacity(A::NUM_ELEMENTS);
        src.flatten_into(&mut flat);
        Tensor::try_from_vec(A::dims(), flat)
    }
}
