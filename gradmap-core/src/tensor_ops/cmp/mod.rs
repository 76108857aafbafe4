mod cpu_kernels;

use super::utilities::{try_cmp_map, zero_vjp, CmpKernelOp};
use crate::{
    registry::{Arity, Op, OpRegistry, Params},
    tensor::{Cpu, Error, Tensor},
    trace::{Tracer, Var},
    vmap,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct EqKernelOp;

#[derive(Debug, Default, Clone, Copy)]
pub struct NeKernelOp;

#[derive(Debug, Default, Clone, Copy)]
pub struct GtKernelOp;

#[derive(Debug, Default, Clone, Copy)]
pub struct GeKernelOp;

#[derive(Debug, Default, Clone, Copy)]
pub struct LtKernelOp;

#[derive(Debug, Default, Clone, Copy)]
pub struct LeKernelOp;

fn cmp_forward<K: CmpKernelOp>(_: &Cpu, inputs: &[&Tensor], _: &Params) -> Result<Tensor, Error> {
    try_cmp_map(K::default(), inputs[0], inputs[1])
}

/// Comparisons are piecewise constant, so their gradient is zero wrt both
/// operands.
fn cmp_op<K: CmpKernelOp>() -> Op {
    Op {
        name: K::NAME,
        arity: Arity::Fixed(2),
        differentiable: false,
        forward: cmp_forward::<K>,
        vjp: zero_vjp,
        batch: vmap::elementwise,
    }
}

pub(crate) fn register(registry: &mut OpRegistry) -> Result<(), Error> {
    registry.register(cmp_op::<EqKernelOp>())?;
    registry.register(cmp_op::<NeKernelOp>())?;
    registry.register(cmp_op::<GtKernelOp>())?;
    registry.register(cmp_op::<GeKernelOp>())?;
    registry.register(cmp_op::<LtKernelOp>())?;
    registry.register(cmp_op::<LeKernelOp>())?;
    Ok(())
}

macro_rules! cmp_methods {
    ($($method:ident, $name:literal, $opstr:literal;)*) => {
        impl Tracer {$(
            #[doc = concat!("Elementwise `lhs ", $opstr, " rhs` with broadcasting, as a [crate::dtypes::DType::Bool] tensor.")]
            ///
            /// Operands of different dtypes are promoted to the larger one first.
            pub fn $method(&mut self, lhs: Var, rhs: Var) -> Result<Var, Error> {
                self.apply($name, &[lhs, rhs], Params::None)
            }
        )*}
    };
}

cmp_methods! {
    equal, "equal", "==";
    not_equal, "not_equal", "!=";
    greater, "greater", ">";
    greater_equal, "greater_equal", ">=";
    less, "less", "<";
    less_equal, "less_equal", "<=";
}

#[cfg(test)]
mod tests {
    use crate::{autodiff::grad, dtypes::DType, tensor::*, tests::*, trace::*};
    use rstest::rstest;

    fn ge(t: &mut Tracer, xs: &[Var]) -> Result<Vec<Var>, Error> {
        Ok(vec![t.greater_equal(xs[0], xs[1])?])
    }

    #[test]
    fn test_greater_equal() {
        let dev: TestDevice = Default::default();
        let x = dev.tensor([1, 2, 3]);
        let y = dev.tensor([1, 1, 4]);
        let out = forward(&dev, &ge, &[x, y]).unwrap();
        assert_eq!(out[0].dtype(), DType::Bool);
        assert_eq!(out[0].array::<[bool; 3]>(), [true, true, false]);
    }

    #[test]
    fn test_greater_equal_grad_is_zero() {
        let dev: TestDevice = Default::default();
        let x = dev.tensor([[1, 2, 3], [4, 5, 6]]);
        let y = dev.tensor([3, 3, 3]);
        let g = grad(&dev, &ge, &[x, y], &[0, 1], None).unwrap();
        assert_eq!(g[0].dtype(), DType::Int32);
        assert_eq!(g[0].array::<[[i32; 3]; 2]>(), [[0; 3]; 2]);
        assert_eq!(g[1].array::<[i32; 3]>(), [0; 3]);
    }

    #[rstest]
    #[case("equal", [false, true, false])]
    #[case("not_equal", [true, false, true])]
    #[case("greater", [false, false, true])]
    #[case("greater_equal", [false, true, true])]
    #[case("less", [true, false, false])]
    #[case("less_equal", [true, true, false])]
    fn test_cmp_table(#[case] name: &str, #[case] expected: [bool; 3]) {
        let dev: TestDevice = Default::default();
        let mut t = Tracer::new(&dev);
        let x = t.constant(dev.tensor([-1.0, 0.5, 2.0]));
        let y = t.constant(dev.tensor(0.5));
        let out = t.apply(name, &[x, y], Default::default()).unwrap();
        assert_eq!(t.value(out).unwrap().array::<[bool; 3]>(), expected);
    }

    #[test]
    fn test_mixed_dtypes_promote() {
        let dev: TestDevice = Default::default();
        let out = forward(&dev, &ge, &[dev.tensor([1, 2]), dev.tensor([1.5, 1.5])]).unwrap();
        assert_eq!(out[0].array::<[bool; 2]>(), [false, true]);
        let out = forward(&dev, &ge, &[dev.tensor([true, false]), dev.tensor(true)]).unwrap();
        assert_eq!(out[0].array::<[bool; 2]>(), [true, false]);
    }

    #[test]
    fn test_broadcast_error_names_op() {
        let dev: TestDevice = Default::default();
        let r = forward(&dev, &ge, &[dev.tensor([1, 2, 3]), dev.tensor([1, 2])]);
        match r {
            Err(e @ Error::Broadcast { .. }) => {
                assert_eq!(
                    e.to_string(),
                    "`greater_equal`: shapes [3] and [2] are not broadcast-compatible"
                );
            }
            other => panic!("expected a broadcast error, found {other:?}"),
        }
    }
}
