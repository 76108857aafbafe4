use gradmap::prelude::*;

fn init() -> Cpu {
    let _ = env_logger::builder().is_test(true).try_init();
    Cpu::seed_from_u64(0)
}

#[test]
fn greater_equal_forward_and_grad() {
    let dev = init();
    let net = function(GreaterEqual);
    let x = dev.tensor([1, 2, 3]);
    let y = dev.tensor([1, 1, 4]);
    let out = forward(&dev, &net, &[x.clone(), y.clone()]).unwrap();
    assert_eq!(out[0].dtype(), DType::Bool);
    assert_eq!(out[0].array::<[bool; 3]>(), [true, true, false]);

    let grads = GradOperation::new()
        .get_all(true)
        .try_call(&dev, &net, &[x, y])
        .unwrap();
    assert_eq!(grads.len(), 2);
    for g in grads {
        assert_eq!(g.shape().dims(), &[3]);
        assert_eq!(g.array::<[i32; 3]>(), [0, 0, 0]);
    }
}

#[test]
fn greater_equal_broadcasts() {
    let dev = init();
    let x = dev.tensor([[1, 5], [3, 2]]);
    let y = dev.tensor([2, 2]);
    let out = forward(&dev, &function(GreaterEqual), &[x, y]).unwrap();
    assert_eq!(out[0].array::<[[bool; 2]; 2]>(), [[false, true], [true, true]]);
}

#[test]
fn flatten_forward_and_grad() {
    let dev = init();
    let net = function(Flatten);
    let x = dev.tensor([[[-1, 0], [1, 2], [3, 4]]]);
    let out = forward(&dev, &net, &[x]).unwrap();
    assert_eq!(out[0].shape().dims(), &[1, 6]);
    assert_eq!(out[0].array::<[[i32; 6]; 1]>(), [[-1, 0, 1, 2, 3, 4]]);

    let x = dev.tensor([[-1.0, 0.0], [1.0, 2.0], [3.0, 4.0]]);
    let sens = dev.ones([3, 2], DType::Float32);
    let g = GradOperation::new()
        .get_all(true)
        .sens_param(true)
        .try_call(&dev, &net, &[x, sens])
        .unwrap();
    assert_eq!(g[0].shape().dims(), &[3, 2]);
    assert_eq!(g[0].array::<[[f32; 2]; 3]>(), [[1.0; 2]; 3]);
}

#[test]
fn floor_forward_and_grad() {
    let dev = init();
    let net = function(Floor);
    let out = forward(&dev, &net, &[dev.tensor([1.1, 2.5, -1.5])]).unwrap();
    assert_eq!(out[0].array::<[f32; 3]>(), [1.0, 2.0, -2.0]);

    let g = GradOperation::new()
        .try_call(&dev, &net, &[dev.tensor([1.1, -1.5])])
        .unwrap();
    assert_eq!(g[0].array::<[f32; 2]>(), [0.0, 0.0]);

    // integral inputs too
    let g = GradOperation::new()
        .try_call(&dev, &net, &[dev.tensor([2.0, -3.0])])
        .unwrap();
    assert_eq!(g[0].array::<[f32; 2]>(), [0.0, 0.0]);
}

#[test]
fn chained_modules_differentiate_through_every_layer() {
    let dev = init();
    let net = function((ReLU, Flatten));
    let x = dev.tensor([[[-1.0, 2.0], [3.0, -4.0]]]);
    let sens = dev.tensor([[1.0, 2.0, 3.0, 4.0]]);
    let g = GradOperation::new()
        .sens_param(true)
        .try_call(&dev, &net, &[x, sens])
        .unwrap();
    assert_eq!(g[0].array::<[[[f32; 2]; 2]; 1]>(), [[[0.0, 2.0], [3.0, 0.0]]]);
}

#[test]
fn errors_name_the_op() {
    let dev = init();
    let r = forward(
        &dev,
        &function(GreaterEqual),
        &[dev.tensor([1, 2, 3]), dev.tensor([1, 2])],
    );
    let err = r.unwrap_err();
    assert!(matches!(err, Error::Broadcast { .. }));
    assert!(err.to_string().contains("greater_equal"));

    let r = GradOperation::new().try_call(&dev, &function(Floor), &[]);
    assert!(matches!(
        r,
        Err(Error::InvalidGradInput {
            position: 0,
            num_inputs: 0
        })
    ));
}
