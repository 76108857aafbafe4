use crate::{
    registry::{Arity, BatchArgs, Op, OpRegistry, Params, VjpArgs},
    shapes::{broadcast_shapes, broadcast_strides, strided_offsets, Shape},
    tensor::{Cpu, Error, Tensor},
    trace::{Tracer, Var},
    vmap::prepend,
};

fn broadcast_forward(_: &Cpu, inputs: &[&Tensor], params: &Params) -> Result<Tensor, Error> {
    let inp = inputs[0];
    let target = params.shape("broadcast_to")?;
    if broadcast_shapes(inp.shape(), target).as_ref() != Some(target) {
        return Err(Error::Broadcast {
            op: "broadcast_to".to_string(),
            lhs: inp.shape().clone(),
            rhs: target.clone(),
        });
    }
    let strides = broadcast_strides(inp.shape(), target);
    let offsets = strided_offsets(target.dims(), &strides);
    Ok(Tensor::from_parts(target.clone(), inp.buffer().gather(&offsets)))
}

fn broadcast_vjp(t: &mut Tracer, args: &VjpArgs<'_>) -> Result<Vec<Option<Var>>, Error> {
    let shape = t.shape(args.inputs[0])?;
    Ok(vec![Some(t.sum_to(args.grad_out, shape)?)])
}

/// Pads the example dims with leading 1s so they align with the target
/// behind the batch dim.
fn broadcast_batch(t: &mut Tracer, args: &BatchArgs<'_>) -> Result<(Var, Option<usize>), Error> {
    let target = args.params.shape("broadcast_to")?;
    let x = t.batch_to_front(args.inputs[0], args.axes[0])?;
    let example = t.shape(x)?.remove(0);
    if example.rank() > target.rank() {
        return Err(Error::Broadcast {
            op: "broadcast_to".to_string(),
            lhs: example,
            rhs: target.clone(),
        });
    }
    let mut padded = vec![args.size];
    padded.extend(std::iter::repeat(1).take(target.rank() - example.rank()));
    padded.extend_from_slice(example.dims());
    let x = t.reshape(x, padded)?;
    Ok((t.broadcast_to(x, prepend(args.size, target))?, Some(0)))
}

pub(crate) fn register(registry: &mut OpRegistry) -> Result<(), Error> {
    registry.register(Op {
        name: "broadcast_to",
        arity: Arity::Fixed(1),
        differentiable: true,
        forward: broadcast_forward,
        vjp: broadcast_vjp,
        batch: broadcast_batch,
    })
}

impl Tracer {
    /// Broadcasts `x` to `shape`, aligning trailing dims and stretching the
    /// size 1 ones. The reverse of [Tracer::sum_to].
    pub fn broadcast_to(&mut self, x: Var, shape: impl Into<Shape>) -> Result<Var, Error> {
        self.apply("broadcast_to", &[x], Params::Shape(shape.into()))
    }
}

#[cfg(test)]
mod tests {
    use crate::{autodiff::grad, tensor::*, tests::*, trace::*, vmap::vmap};

    fn to_2x3(t: &mut Tracer, xs: &[Var]) -> Result<Vec<Var>, Error> {
        Ok(vec![t.broadcast_to(xs[0], [2, 3])?])
    }

    #[test]
    fn test_broadcast_to() {
        let dev: TestDevice = Default::default();
        let out = forward(&dev, &to_2x3, &[dev.tensor([1, 2, 3])]).unwrap();
        assert_eq!(out[0].array::<[[i32; 3]; 2]>(), [[1, 2, 3], [1, 2, 3]]);
        let out = forward(&dev, &to_2x3, &[dev.tensor([[1], [2]])]).unwrap();
        assert_eq!(out[0].array::<[[i32; 3]; 2]>(), [[1, 1, 1], [2, 2, 2]]);
        let out = forward(&dev, &to_2x3, &[dev.tensor(true)]).unwrap();
        assert_eq!(out[0].array::<[[bool; 3]; 2]>(), [[true; 3]; 2]);
    }

    #[test]
    fn test_broadcast_to_incompatible() {
        let dev: TestDevice = Default::default();
        let r = forward(&dev, &to_2x3, &[dev.tensor([1, 2])]);
        assert!(matches!(r, Err(Error::Broadcast { .. })));
        // the target must already be the broadcast shape
        let f = |t: &mut Tracer, xs: &[Var]| -> Result<Vec<Var>, Error> {
            Ok(vec![t.broadcast_to(xs[0], [3])?])
        };
        let r = forward(&dev, &f, &[dev.tensor([[1, 2, 3], [4, 5, 6]])]);
        assert!(matches!(r, Err(Error::Broadcast { .. })));
    }

    #[test]
    fn test_broadcast_to_backward() {
        let dev: TestDevice = Default::default();
        let s = [dev.tensor([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])];
        let g = grad(&dev, &to_2x3, &[dev.tensor([[1.0], [2.0]])], &[0], Some(&s)).unwrap();
        assert_close_to_literal!(g[0], [[6.0], [15.0]]);
        let g = grad(&dev, &to_2x3, &[dev.tensor(1.0)], &[0], Some(&s)).unwrap();
        assert_close_to_literal!(g[0], 21.0);
    }

    #[test]
    fn test_vmap_broadcast_to() {
        let dev: TestDevice = Default::default();
        let x = dev.tensor([[1, 2], [3, 4], [5, 6]]);
        let out = forward(&dev, &vmap(to_2x3, 1, 0), &[x.clone()]).unwrap();
        assert_eq!(out[0].shape().dims(), &[2, 2, 3]);
        assert_eq!(
            out[0].array::<[[[i32; 3]; 2]; 2]>(),
            [[[1, 3, 5]; 2], [[2, 4, 6]; 2]]
        );

        // each example is a scalar
        let f = |t: &mut Tracer, xs: &[Var]| -> Result<Vec<Var>, Error> {
            Ok(vec![t.broadcast_to(xs[0], [2])?])
        };
        let out = forward(&dev, &vmap(vmap(f, 0, 0), 0, 0), &[x]).unwrap();
        assert_eq!(out[0].shape().dims(), &[3, 2, 2]);
        assert_eq!(
            out[0].array::<[[[i32; 2]; 2]; 3]>(),
            [[[1, 1], [2, 2]], [[3, 3], [4, 4]], [[5, 5], [6, 6]]]
        );
    }
}
