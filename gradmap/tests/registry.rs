use gradmap::prelude::*;
use std::sync::Arc;

/// `x * x` for float tensors.
fn square_forward(_: &Cpu, inputs: &[&Tensor], _: &Params) -> Result<Tensor, Error> {
    let x = inputs[0];
    let Some(data) = x.as_slice::<f32>() else {
        return Err(Error::DTypeMismatch {
            op: "square".to_string(),
            dtype: x.dtype(),
        });
    };
    Tensor::try_from_vec(x.shape().clone(), data.iter().map(|v| v * v).collect())
}

fn square_vjp(t: &mut Tracer, args: &VjpArgs<'_>) -> Result<Vec<Option<Var>>, Error> {
    let two_x = t.mul_scalar(args.inputs[0], 2.0)?;
    Ok(vec![Some(t.mul(args.grad_out, two_x)?)])
}

fn square_op() -> Op {
    Op {
        name: "square",
        arity: Arity::Fixed(1),
        differentiable: true,
        forward: square_forward,
        vjp: square_vjp,
        batch: unary_in_place,
    }
}

fn registry() -> Arc<OpRegistry> {
    let mut registry = OpRegistry::with_builtins().unwrap();
    registry.register(square_op()).unwrap();
    Arc::new(registry)
}

fn square(t: &mut Tracer, xs: &[Var]) -> Result<Vec<Var>, Error> {
    Ok(vec![t.apply("square", &[xs[0]], Params::None)?])
}

#[test]
fn builtins_are_registered_once() {
    let global = OpRegistry::global();
    for name in ["greater_equal", "flatten", "floor", "print", "sum_to", "broadcast_to"] {
        assert!(global.contains(name), "missing {name}");
    }
    assert!(!global.contains("square"));

    let mut registry = OpRegistry::with_builtins().unwrap();
    let r = registry.register(Op {
        name: "floor",
        ..square_op()
    });
    assert!(matches!(r, Err(Error::DuplicateOp(name)) if name == "floor"));
    assert!(matches!(registry.lookup("nope"), Err(Error::UnknownOp(_))));
}

#[test]
fn custom_op_forward_grad_and_vmap() {
    let dev: Cpu = Default::default();
    let registry = registry();
    let x = dev.tensor([[1.0, -2.0], [3.0, 0.5]]);

    let out = Tracer::with_registry(registry.clone(), &dev)
        .forward(&square, &[x.clone()])
        .unwrap();
    assert_eq!(out[0].array::<[[f32; 2]; 2]>(), [[1.0, 4.0], [9.0, 0.25]]);

    let g = Tracer::with_registry(registry.clone(), &dev)
        .grad(&square, &[x.clone()], &[0], None)
        .unwrap();
    assert_eq!(g[0].array::<[[f32; 2]; 2]>(), [[2.0, -4.0], [6.0, 1.0]]);

    let batched = vmap(square, 1, 1);
    let out = Tracer::with_registry(registry, &dev)
        .forward(&batched, &[x])
        .unwrap();
    assert_eq!(out[0].array::<[[f32; 2]; 2]>(), [[1.0, 4.0], [9.0, 0.25]]);
}

#[test]
fn custom_op_is_not_global() {
    let dev: Cpu = Default::default();
    let r = forward(&dev, &square, &[dev.tensor([1.0])]);
    assert!(matches!(r, Err(Error::UnknownOp(name)) if name == "square"));

    let r = Tracer::with_registry(registry(), &dev).forward(&square, &[dev.tensor([1])]);
    assert!(matches!(r, Err(Error::DTypeMismatch { .. })));
}

#[test]
fn traces_name_every_op_in_order() {
    let dev: Cpu = Default::default();
    let f = |t: &mut Tracer, xs: &[Var]| -> Result<Vec<Var>, Error> {
        let y = t.flatten(xs[0])?;
        let y = t.floor(y)?;
        let z = t.greater_equal(y, xs[1])?;
        Ok(vec![z])
    };
    let (out, trace) =
        forward_traced(&dev, &f, &[dev.tensor([[[1.5, 2.5]]]), dev.tensor(2.0)]).unwrap();
    assert_eq!(out[0].array::<[[bool; 2]; 1]>(), [[false, true]]);
    assert_eq!(trace.names(), ["flatten", "floor", "greater_equal"]);
}
