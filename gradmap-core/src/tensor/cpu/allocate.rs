use super::Cpu;
use crate::{
    dtypes::{DType, Unit},
    shapes::Shape,
    tensor::{Buffer, Error, Tensor},
};
use rand::{distributions::Distribution, Rng};

impl Cpu {
    /// Creates a tensor filled with zeros.
    pub fn zeros(&self, shape: impl Into<Shape>, dtype: DType) -> Tensor {
        let shape = shape.into();
        let numel = shape.num_elements();
        Tensor::from_parts(shape, Buffer::zeros(dtype, numel))
    }

    /// Creates a tensor filled with ones.
    pub fn ones(&self, shape: impl Into<Shape>, dtype: DType) -> Tensor {
        let shape = shape.into();
        let numel = shape.num_elements();
        Tensor::from_parts(shape, Buffer::ones(dtype, numel))
    }

    pub fn zeros_like(&self, src: &Tensor) -> Tensor {
        self.zeros(src.shape(), src.dtype())
    }

    pub fn ones_like(&self, src: &Tensor) -> Tensor {
        self.ones(src.shape(), src.dtype())
    }

    /// Creates a tensor with every element set to `value`.
    pub fn full<E: Unit>(&self, shape: impl Into<Shape>, value: E) -> Tensor {
        let shape = shape.into();
        let numel = shape.num_elements();
        Tensor::from_parts(shape, E::into_buffer(vec![value; numel]))
    }

    /// Creates a tensor from a flat row-major vec.
    pub fn try_tensor_from_vec<E: Unit>(
        &self,
        data: Vec<E>,
        shape: impl Into<Shape>,
    ) -> Result<Tensor, Error> {
        Tensor::try_from_vec(shape, data)
    }

    /// Samples a [DType::Float32] tensor from `distr`.
    pub fn sample<D: Distribution<f32>>(&self, shape: impl Into<Shape>, distr: D) -> Tensor {
        let shape = shape.into();
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let data: Vec<f32> = (0..shape.num_elements())
            .map(|_| distr.sample(&mut *rng))
            .collect();
        Tensor::from_parts(shape, Buffer::Float32(data))
    }

    /// Samples uniformly from `[0, 1)`.
    pub fn sample_uniform(&self, shape: impl Into<Shape>) -> Tensor {
        self.sample(shape, rand_distr::Standard)
    }

    /// Samples from the standard normal distribution.
    pub fn sample_normal(&self, shape: impl Into<Shape>) -> Tensor {
        self.sample(shape, rand_distr::StandardNormal)
    }

    /// Samples [DType::Int32] values uniformly from `low..high`.
    pub fn sample_int(&self, shape: impl Into<Shape>, low: i32, high: i32) -> Tensor {
        let shape = shape.into();
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let data: Vec<i32> = (0..shape.num_elements())
            .map(|_| rng.gen_range(low..high))
            .collect();
        Tensor::from_parts(shape, Buffer::Int32(data))
    }
}
