use crate::{
    registry::BatchArgs,
    tensor::Error,
    trace::{Tracer, Var},
};

/// Batch rule for broadcasting elementwise ops.
///
/// Every batched input has its batch dim moved to the front and gets size-1
/// dims inserted after it, so that its per-example dims line up with the
/// highest-rank input under right-aligned broadcasting. Unbatched inputs are
/// used as they are. The output is batched along dim 0.
pub fn elementwise(t: &mut Tracer, args: &BatchArgs<'_>) -> Result<(Var, Option<usize>), Error> {
    let mut ranks = Vec::with_capacity(args.inputs.len());
    for (&x, axis) in args.inputs.iter().zip(args.axes) {
        let rank = t.shape(x)?.rank();
        ranks.push(if axis.is_some() { rank - 1 } else { rank });
    }
    let max_rank = ranks.iter().copied().max().unwrap_or(0);

    let mut aligned = Vec::with_capacity(args.inputs.len());
    for ((&x, &axis), &rank) in args.inputs.iter().zip(args.axes).zip(&ranks) {
        let Some(axis) = axis else {
            aligned.push(x);
            continue;
        };
        let mut x = t.move_to_front(x, axis)?;
        if rank < max_rank {
            let shape = t.shape(x)?;
            let mut dims = vec![args.size];
            dims.extend(std::iter::repeat(1).take(max_rank - rank));
            dims.extend_from_slice(&shape.dims()[1..]);
            x = t.reshape(x, dims)?;
        }
        aligned.push(x);
    }
    let out = t.apply_op(args.op, &aligned, args.params.clone())?;
    Ok((out, Some(0)))
}

/// Batch rule for single-input ops that act on every element independently:
/// the op runs on the batched value directly and the batch dim stays put.
pub fn unary_in_place(
    t: &mut Tracer,
    args: &BatchArgs<'_>,
) -> Result<(Var, Option<usize>), Error> {
    let out = t.apply_op(args.op, args.inputs, args.params.clone())?;
    Ok((out, args.axes[0]))
}
