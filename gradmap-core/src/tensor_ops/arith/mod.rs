mod cpu_kernels;

use super::utilities::{
    try_binary_map, try_unary_map, unbroadcast, BinaryKernelOp, UnaryKernelOp,
};
use crate::{
    dtypes::DType,
    registry::{Arity, Op, OpRegistry, Params, VjpArgs},
    tensor::{Cpu, Error, Tensor},
    trace::{Tracer, Var},
    vmap,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct AddKernelOp;

#[derive(Debug, Default, Clone, Copy)]
pub struct SubKernelOp;

#[derive(Debug, Default, Clone, Copy)]
pub struct MulKernelOp;

#[derive(Debug, Default, Clone, Copy)]
pub struct DivKernelOp;

#[derive(Debug, Default, Clone, Copy)]
pub struct NegateKernelOp;

#[derive(Debug, Default, Clone, Copy)]
pub struct ReLUKernelOp;

fn binary_forward<K: BinaryKernelOp>(
    _: &Cpu,
    inputs: &[&Tensor],
    _: &Params,
) -> Result<Tensor, Error> {
    let dtype = inputs[0].dtype().promote_arith(inputs[1].dtype());
    try_binary_map(K::default(), inputs[0], inputs[1], dtype)
}

/// Integer operands are divided as floats.
fn div_forward(_: &Cpu, inputs: &[&Tensor], _: &Params) -> Result<Tensor, Error> {
    try_binary_map(DivKernelOp, inputs[0], inputs[1], DType::Float32)
}

fn unary_forward<K: UnaryKernelOp>(
    _: &Cpu,
    inputs: &[&Tensor],
    _: &Params,
) -> Result<Tensor, Error> {
    try_unary_map(K::default(), inputs[0])
}

fn add_vjp(t: &mut Tracer, args: &VjpArgs<'_>) -> Result<Vec<Option<Var>>, Error> {
    let g = args.grad_out;
    Ok(vec![
        Some(unbroadcast(t, g, args.inputs[0])?),
        Some(unbroadcast(t, g, args.inputs[1])?),
    ])
}

fn sub_vjp(t: &mut Tracer, args: &VjpArgs<'_>) -> Result<Vec<Option<Var>>, Error> {
    let g = args.grad_out;
    let neg_g = t.neg(g)?;
    Ok(vec![
        Some(unbroadcast(t, g, args.inputs[0])?),
        Some(unbroadcast(t, neg_g, args.inputs[1])?),
    ])
}

fn mul_vjp(t: &mut Tracer, args: &VjpArgs<'_>) -> Result<Vec<Option<Var>>, Error> {
    let (x, y) = (args.inputs[0], args.inputs[1]);
    let dx = t.mul(args.grad_out, y)?;
    let dy = t.mul(args.grad_out, x)?;
    Ok(vec![Some(unbroadcast(t, dx, x)?), Some(unbroadcast(t, dy, y)?)])
}

// d/dy (x / y) = -(x / y) / y
fn div_vjp(t: &mut Tracer, args: &VjpArgs<'_>) -> Result<Vec<Option<Var>>, Error> {
    let (x, y) = (args.inputs[0], args.inputs[1]);
    let dx = t.div(args.grad_out, y)?;
    let out_g = t.mul(args.grad_out, args.output)?;
    let dy = t.div(out_g, y)?;
    let dy = t.neg(dy)?;
    Ok(vec![Some(unbroadcast(t, dx, x)?), Some(unbroadcast(t, dy, y)?)])
}

fn neg_vjp(t: &mut Tracer, args: &VjpArgs<'_>) -> Result<Vec<Option<Var>>, Error> {
    Ok(vec![Some(t.neg(args.grad_out)?)])
}

fn relu_vjp(t: &mut Tracer, args: &VjpArgs<'_>) -> Result<Vec<Option<Var>>, Error> {
    let x = args.inputs[0];
    let zero = t.scalar(0i32);
    let mask = t.greater(x, zero)?;
    let dtype = t.dtype(args.grad_out)?;
    let mask = t.cast(mask, dtype)?;
    Ok(vec![Some(t.mul(args.grad_out, mask)?)])
}

fn binary_op<K: BinaryKernelOp>(vjp: crate::registry::VjpFn) -> Op {
    Op {
        name: K::NAME,
        arity: Arity::Fixed(2),
        differentiable: true,
        forward: binary_forward::<K>,
        vjp,
        batch: vmap::elementwise,
    }
}

fn unary_op<K: UnaryKernelOp>(vjp: crate::registry::VjpFn) -> Op {
    Op {
        name: K::NAME,
        arity: Arity::Fixed(1),
        differentiable: true,
        forward: unary_forward::<K>,
        vjp,
        batch: vmap::unary_in_place,
    }
}

pub(crate) fn register(registry: &mut OpRegistry) -> Result<(), Error> {
    registry.register(binary_op::<AddKernelOp>(add_vjp))?;
    registry.register(binary_op::<SubKernelOp>(sub_vjp))?;
    registry.register(binary_op::<MulKernelOp>(mul_vjp))?;
    registry.register(Op {
        forward: div_forward,
        ..binary_op::<DivKernelOp>(div_vjp)
    })?;
    registry.register(unary_op::<NegateKernelOp>(neg_vjp))?;
    registry.register(unary_op::<ReLUKernelOp>(relu_vjp))?;
    Ok(())
}

impl Tracer {
    /// Elementwise `lhs + rhs` with broadcasting.
    ///
    /// Operands of different dtypes are promoted first; two booleans add
    /// as [DType::Int32].
    pub fn add(&mut self, lhs: Var, rhs: Var) -> Result<Var, Error> {
        self.apply("add", &[lhs, rhs], Params::None)
    }

    /// Elementwise `lhs - rhs` with broadcasting.
    pub fn sub(&mut self, lhs: Var, rhs: Var) -> Result<Var, Error> {
        self.apply("sub", &[lhs, rhs], Params::None)
    }

    /// Elementwise `lhs * rhs` with broadcasting.
    pub fn mul(&mut self, lhs: Var, rhs: Var) -> Result<Var, Error> {
        self.apply("mul", &[lhs, rhs], Params::None)
    }

    /// Elementwise `lhs / rhs` with broadcasting. The result is always
    /// [DType::Float32].
    pub fn div(&mut self, lhs: Var, rhs: Var) -> Result<Var, Error> {
        self.apply("div", &[lhs, rhs], Params::None)
    }

    pub fn neg(&mut self, x: Var) -> Result<Var, Error> {
        self.apply("neg", &[x], Params::None)
    }

    /// [Rectified Linear Unit (ReLU)](https://en.wikipedia.org/wiki/Rectifier_(neural_networks)). `max(0, x)`
    ///
    /// The derivative is the Heaviside function: `x > 0 ? 1 : 0`.
    pub fn relu(&mut self, x: Var) -> Result<Var, Error> {
        self.apply("relu", &[x], Params::None)
    }

    /// `x * scalar`, recorded as a `mul` against a rank 0 constant.
    pub fn mul_scalar(&mut self, x: Var, scalar: f32) -> Result<Var, Error> {
        let s = self.scalar(scalar);
        self.mul(x, s)
    }
}
