use crate::{
    registry::{Arity, BatchArgs, Op, OpRegistry, Params, VjpArgs},
    shapes::Shape,
    tensor::{Cpu, Error, Tensor},
    trace::{Tracer, Var},
    vmap::prepend,
};

fn reshape_forward(_: &Cpu, inputs: &[&Tensor], params: &Params) -> Result<Tensor, Error> {
    inputs[0].try_reshape(params.shape("reshape")?)
}

fn reshape_vjp(t: &mut Tracer, args: &VjpArgs<'_>) -> Result<Vec<Option<Var>>, Error> {
    let shape = t.shape(args.inputs[0])?;
    Ok(vec![Some(t.reshape(args.grad_out, shape)?)])
}

fn reshape_batch(t: &mut Tracer, args: &BatchArgs<'_>) -> Result<(Var, Option<usize>), Error> {
    let target = args.params.shape("reshape")?;
    let x = t.batch_to_front(args.inputs[0], args.axes[0])?;
    Ok((t.reshape(x, prepend(args.size, target))?, Some(0)))
}

pub(crate) fn register(registry: &mut OpRegistry) -> Result<(), Error> {
    registry.register(Op {
        name: "reshape",
        arity: Arity::Fixed(1),
        differentiable: true,
        forward: reshape_forward,
        vjp: reshape_vjp,
        batch: reshape_batch,
    })
}

impl Tracer {
    /// Changes the shape of `x` without changing its elements or their
    /// row-major order. Fails with [Error::ShapeMismatch] if the number of
    /// elements differs.
    pub fn reshape(&mut self, x: Var, shape: impl Into<Shape>) -> Result<Var, Error> {
        self.apply("reshape", &[x], Params::Shape(shape.into()))
    }
}

#[cfg(test)]
mod tests {
    use crate::{autodiff::grad, tensor::*, tests::*, trace::*, vmap::vmap};

    #[test]
    fn test_reshape() {
        let dev: TestDevice = Default::default();
        let f = |t: &mut Tracer, xs: &[Var]| -> Result<Vec<Var>, Error> {
            Ok(vec![t.reshape(xs[0], [3, 2])?])
        };
        let x = dev.tensor([[1, 2, 3], [4, 5, 6]]);
        let out = forward(&dev, &f, &[x.clone()]).unwrap();
        assert_eq!(out[0].array::<[[i32; 2]; 3]>(), [[1, 2], [3, 4], [5, 6]]);

        let s = [dev.tensor([[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]])];
        let g = grad(&dev, &f, &[x.to_dtype(crate::dtypes::DType::Float32)], &[0], Some(&s)).unwrap();
        assert_close_to_literal!(g[0], [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    }

    #[test]
    fn test_reshape_wrong_size() {
        let dev: TestDevice = Default::default();
        let f = |t: &mut Tracer, xs: &[Var]| -> Result<Vec<Var>, Error> {
            Ok(vec![t.reshape(xs[0], [4])?])
        };
        let r = forward(&dev, &f, &[dev.tensor([1, 2, 3])]);
        assert!(matches!(r, Err(Error::ShapeMismatch { op, .. }) if op == "reshape"));
    }

    #[test]
    fn test_reshape_params_are_checked() {
        let dev: TestDevice = Default::default();
        let mut t = Tracer::new(&dev);
        let x = t.constant(dev.tensor([1, 2]));
        let r = t.apply("reshape", &[x], Default::default());
        assert!(matches!(r, Err(Error::InvalidParams { .. })));
    }

    #[test]
    fn test_vmap_reshape() {
        let dev: TestDevice = Default::default();
        let f = |t: &mut Tracer, xs: &[Var]| -> Result<Vec<Var>, Error> {
            Ok(vec![t.reshape(xs[0], [2, 1])?])
        };
        let x = dev.tensor([[1, 2, 3], [4, 5, 6]]);
        let out = forward(&dev, &vmap(f, 1, 0), &[x]).unwrap();
        assert_eq!(
            out[0].array::<[[[i32; 1]; 2]; 3]>(),
            [[[1], [4]], [[2], [5]], [[3], [6]]]
        );
    }
}
