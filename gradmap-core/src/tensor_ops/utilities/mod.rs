pub(crate) mod cpu_kernels;

pub(crate) use cpu_kernels::{
    try_binary_map, try_cmp_map, try_unary_map, BinaryKernelOp, CmpKernelOp, UnaryKernelOp,
};

use crate::{
    registry::VjpArgs,
    shapes::Shape,
    tensor::Error,
    trace::{Tracer, Var},
};

/// Vjp rule of ops whose gradient is zero everywhere.
pub(crate) fn zero_vjp(t: &mut Tracer, args: &VjpArgs<'_>) -> Result<Vec<Option<Var>>, Error> {
    args.inputs
        .iter()
        .map(|&x| t.zeros_like(x).map(Some))
        .collect()
}

/// Sums `grad` down to the shape of `x`, undoing any broadcast the forward
/// pass did.
pub(crate) fn unbroadcast(t: &mut Tracer, grad: Var, x: Var) -> Result<Var, Error> {
    let shape: Shape = t.shape(x)?;
    if t.shape(grad)? == shape {
        Ok(grad)
    } else {
        t.sum_to(grad, shape)
    }
}
