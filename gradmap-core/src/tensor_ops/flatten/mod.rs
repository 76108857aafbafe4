use crate::{
    registry::{Arity, BatchArgs, Op, OpRegistry, Params, VjpArgs},
    shapes::Shape,
    tensor::{Cpu, Error, Tensor},
    trace::{Tracer, Var},
    vmap::prepend,
};

/// The shape `flatten` produces: the leading dim followed by the product of
/// the rest. Rank 1 `[n]` becomes `[n, 1]` and rank 0 becomes `[1, 1]`.
pub fn flatten_shape(shape: &Shape) -> Shape {
    match shape.dims() {
        [] => Shape::new([1, 1]),
        [n] => Shape::new([*n, 1]),
        [n, rest @ ..] => Shape::new([*n, rest.iter().product()]),
    }
}

fn flatten_forward(_: &Cpu, inputs: &[&Tensor], _: &Params) -> Result<Tensor, Error> {
    inputs[0].try_reshape(flatten_shape(inputs[0].shape()))
}

fn flatten_vjp(t: &mut Tracer, args: &VjpArgs<'_>) -> Result<Vec<Option<Var>>, Error> {
    let shape = t.shape(args.inputs[0])?;
    Ok(vec![Some(t.reshape(args.grad_out, shape)?)])
}

/// The batch dim stays in front and each example is flattened on its own.
fn flatten_batch(t: &mut Tracer, args: &BatchArgs<'_>) -> Result<(Var, Option<usize>), Error> {
    let x = t.batch_to_front(args.inputs[0], args.axes[0])?;
    let example = t.shape(x)?.remove(0);
    let out = t.reshape(x, prepend(args.size, &flatten_shape(&example)))?;
    Ok((out, Some(0)))
}

pub(crate) fn register(registry: &mut OpRegistry) -> Result<(), Error> {
    registry.register(Op {
        name: "flatten",
        arity: Arity::Fixed(1),
        differentiable: true,
        forward: flatten_forward,
        vjp: flatten_vjp,
        batch: flatten_batch,
    })
}

impl Tracer {
    /// Flattens every dim after the first into one. See [flatten_shape].
    ///
    /// The output shares its buffer with the input; the gradient is the
    /// output gradient reshaped back.
    pub fn flatten(&mut self, x: Var) -> Result<Var, Error> {
        self.apply("flatten", &[x], Params::None)
    }
}
