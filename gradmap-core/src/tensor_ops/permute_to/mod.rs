use crate::{
    registry::{Arity, BatchArgs, Op, OpRegistry, Params, VjpArgs},
    shapes::{inverse_permutation, is_permutation, strided_offsets},
    tensor::{Cpu, Error, Tensor},
    trace::{Tracer, Var},
};

fn permute_forward(_: &Cpu, inputs: &[&Tensor], params: &Params) -> Result<Tensor, Error> {
    let inp = inputs[0];
    let perm = params.permutation("permute")?;
    if !is_permutation(perm, inp.shape().rank()) {
        return Err(Error::invalid_params(
            "permute",
            format!("{perm:?} is not a permutation of the axes of {}", inp.shape()),
        ));
    }
    let shape = inp.shape().permuted(perm);
    let strides = inp.shape().strides();
    let strides: Vec<usize> = perm.iter().map(|&i| strides[i]).collect();
    let offsets = strided_offsets(shape.dims(), &strides);
    Ok(Tensor::from_parts(shape, inp.buffer().gather(&offsets)))
}

fn permute_vjp(t: &mut Tracer, args: &VjpArgs<'_>) -> Result<Vec<Option<Var>>, Error> {
    let perm = args.params.permutation("permute")?;
    Ok(vec![Some(t.permute(args.grad_out, inverse_permutation(perm))?)])
}

/// Lifts the permutation over the batch dim, which ends up in front.
fn permute_batch(t: &mut Tracer, args: &BatchArgs<'_>) -> Result<(Var, Option<usize>), Error> {
    let perm = args.params.permutation("permute")?;
    let Some(b) = args.axes[0] else {
        return Err(Error::batch_axis("permute", "input is not batched"));
    };
    let lift = |i: usize| if i < b { i } else { i + 1 };
    let mut lifted = Vec::with_capacity(perm.len() + 1);
    lifted.push(b);
    lifted.extend(perm.iter().map(|&i| lift(i)));
    Ok((t.permute(args.inputs[0], lifted)?, Some(0)))
}

pub(crate) fn register(registry: &mut OpRegistry) -> Result<(), Error> {
    registry.register(Op {
        name: "permute",
        arity: Arity::Fixed(1),
        differentiable: true,
        forward: permute_forward,
        vjp: permute_vjp,
        batch: permute_batch,
    })
}

impl Tracer {
    /// Reorders the dims of `x`: dim `i` of the output is dim `perm[i]` of
    /// the input.
    pub fn permute(&mut self, x: Var, perm: Vec<usize>) -> Result<Var, Error> {
        self.apply("permute", &[x], Params::Permutation(perm))
    }
}
