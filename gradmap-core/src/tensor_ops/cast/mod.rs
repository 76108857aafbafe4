use crate::{
    dtypes::DType,
    registry::{Arity, Op, OpRegistry, Params, VjpArgs},
    tensor::{Cpu, Error, Tensor},
    trace::{Tracer, Var},
    vmap,
};

fn cast_forward(_: &Cpu, inputs: &[&Tensor], params: &Params) -> Result<Tensor, Error> {
    Ok(inputs[0].to_dtype(params.dtype("cast")?))
}

fn cast_vjp(t: &mut Tracer, args: &VjpArgs<'_>) -> Result<Vec<Option<Var>>, Error> {
    let dtype = t.dtype(args.inputs[0])?;
    Ok(vec![Some(t.cast(args.grad_out, dtype)?)])
}

pub(crate) fn register(registry: &mut OpRegistry) -> Result<(), Error> {
    registry.register(Op {
        name: "cast",
        arity: Arity::Fixed(1),
        differentiable: true,
        forward: cast_forward,
        vjp: cast_vjp,
        batch: vmap::unary_in_place,
    })
}

impl Tracer {
    /// Converts the elements of `x` to `dtype`. Floats truncate towards zero
    /// when cast to [DType::Int32].
    pub fn cast(&mut self, x: Var, dtype: DType) -> Result<Var, Error> {
        self.apply("cast", &[x], Params::DType(dtype))
    }
}
