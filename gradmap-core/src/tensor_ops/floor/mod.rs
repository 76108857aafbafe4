mod cpu_kernel;

use super::utilities::{try_unary_map, zero_vjp};
use crate::{
    registry::{Arity, Op, OpRegistry, Params},
    tensor::{Cpu, Error, Tensor},
    trace::{Tracer, Var},
    vmap,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct FloorKernelOp;

fn floor_forward(_: &Cpu, inputs: &[&Tensor], _: &Params) -> Result<Tensor, Error> {
    try_unary_map(FloorKernelOp, inputs[0])
}

pub(crate) fn register(registry: &mut OpRegistry) -> Result<(), Error> {
    registry.register(Op {
        name: "floor",
        arity: Arity::Fixed(1),
        differentiable: false,
        forward: floor_forward,
        vjp: zero_vjp,
        batch: vmap::unary_in_place,
    })
}

impl Tracer {
    /// Largest integral value not greater than each element. Integer tensors
    /// pass through unchanged.
    ///
    /// The gradient is zero everywhere, including at integral inputs.
    pub fn floor(&mut self, x: Var) -> Result<Var, Error> {
        self.apply("floor", &[x], Params::None)
    }
}

#[cfg(test)]
mod tests {
    use crate::{autodiff::grad, dtypes::DType, tensor::*, tests::*, trace::*, vmap::vmap};

    fn floor(t: &mut Tracer, xs: &[Var]) -> Result<Vec<Var>, Error> {
        Ok(vec![t.floor(xs[0])?])
    }

    #[test]
    fn test_floor() {
        let dev: TestDevice = Default::default();
        let out = forward(&dev, &floor, &[dev.tensor([1.1, 2.5, -1.5])]).unwrap();
        assert_close_to_literal!(out[0], [1.0, 2.0, -2.0]);

        let out = forward(&dev, &floor, &[dev.tensor([-3, 4])]).unwrap();
        assert_eq!(out[0].dtype(), DType::Int32);
        assert_eq!(out[0].array::<[i32; 2]>(), [-3, 4]);
    }

    #[test]
    fn test_floor_grad_is_zero() {
        let dev: TestDevice = Default::default();
        let g = grad(&dev, &floor, &[dev.tensor([1.1, -1.5])], &[0], None).unwrap();
        assert_close_to_literal!(g[0], [0.0, 0.0]);

        let g = grad(&dev, &floor, &[dev.tensor([[1.0, -2.0], [3.0, 0.0]])], &[0], None).unwrap();
        assert_close_to_literal!(g[0], [[0.0; 2]; 2]);
    }

    #[test]
    fn test_nested_vmap_floor() {
        let dev: TestDevice = Default::default();
        let x = dev.tensor([[[1.1, 2.5], [-1.5, 1.1]]]);
        let f = vmap(vmap(floor, 0, 0), 0, 0);
        let out = forward(&dev, &f, &[x]).unwrap();
        assert_close_to_literal!(out[0], [[[1.0, 2.0], [-2.0, 1.0]]]);
    }

    #[test]
    fn test_floor_of_bool_fails() {
        let dev: TestDevice = Default::default();
        let r = forward(&dev, &floor, &[dev.tensor([true])]);
        assert!(matches!(r, Err(Error::DTypeMismatch { op, .. }) if op == "floor"));
    }
}
