use crate::{
    dtypes::Dtype,
    registry::{Arity, BatchArgs, Op, OpRegistry, Params, VjpArgs},
    shapes::{broadcast_shapes, broadcast_strides, strided_offsets, Shape},
    tensor::{Buffer, Cpu, Error, Tensor},
    trace::{Tracer, Var},
    vmap::prepend,
};

fn accumulate<E: Dtype>(src: &[E], offsets: &[usize], numel: usize) -> Vec<E> {
    let mut out = vec![E::zero(); numel];
    for (&x, &o) in src.iter().zip(offsets) {
        out[o] = out[o].wrapping_add(x);
    }
    out
}

/// Booleans are summed as [crate::dtypes::DType::Int32].
fn sum_to_forward(_: &Cpu, inputs: &[&Tensor], params: &Params) -> Result<Tensor, Error> {
    let inp = inputs[0];
    let target = params.shape("sum_to")?;
    if broadcast_shapes(target, inp.shape()).as_ref() != Some(inp.shape()) {
        return Err(Error::Broadcast {
            op: "sum_to".to_string(),
            lhs: inp.shape().clone(),
            rhs: target.clone(),
        });
    }
    let offsets = strided_offsets(inp.shape().dims(), &broadcast_strides(target, inp.shape()));
    let numel = target.num_elements();
    let data = match inp.buffer() {
        Buffer::Bool(_) => Buffer::Int32(accumulate(&inp.to_vec::<i32>(), &offsets, numel)),
        Buffer::Int32(v) => Buffer::Int32(accumulate(v, &offsets, numel)),
        Buffer::Float32(v) => Buffer::Float32(accumulate(v, &offsets, numel)),
    };
    Ok(Tensor::from_parts(target.clone(), data))
}

fn sum_to_vjp(t: &mut Tracer, args: &VjpArgs<'_>) -> Result<Vec<Option<Var>>, Error> {
    let shape = t.shape(args.inputs[0])?;
    Ok(vec![Some(t.broadcast_to(args.grad_out, shape)?)])
}

/// Sums into `[B, 1, .., target]` so the batch dim is never reduced, then
/// drops the padding.
fn sum_to_batch(t: &mut Tracer, args: &BatchArgs<'_>) -> Result<(Var, Option<usize>), Error> {
    let target = args.params.shape("sum_to")?;
    let x = t.batch_to_front(args.inputs[0], args.axes[0])?;
    let example = t.shape(x)?.remove(0);
    if target.rank() > example.rank() {
        return Err(Error::Broadcast {
            op: "sum_to".to_string(),
            lhs: example,
            rhs: target.clone(),
        });
    }
    let pad = example.rank() - target.rank();
    let mut padded = vec![args.size];
    padded.extend(std::iter::repeat(1).take(pad));
    padded.extend_from_slice(target.dims());
    let summed = t.sum_to(x, padded)?;
    let out = if pad == 0 {
        summed
    } else {
        t.reshape(summed, prepend(args.size, target))?
    };
    Ok((out, Some(0)))
}

pub(crate) fn register(registry: &mut OpRegistry) -> Result<(), Error> {
    registry.register(Op {
        name: "sum_to",
        arity: Arity::Fixed(1),
        differentiable: true,
        forward: sum_to_forward,
        vjp: sum_to_vjp,
        batch: sum_to_batch,
    })
}

impl Tracer {
    /// Sums `x` down to `shape`, the reverse of [Tracer::broadcast_to].
    /// `shape` must broadcast to the shape of `x`.
    ///
    /// Leading dims missing from `shape` and dims where `shape` has size 1
    /// are reduced.
    pub fn sum_to(&mut self, x: Var, shape: impl Into<Shape>) -> Result<Var, Error> {
        self.apply("sum_to", &[x], Params::Shape(shape.into()))
    }
}
