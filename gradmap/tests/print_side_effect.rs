use gradmap::prelude::*;
use std::{
    io::Write,
    sync::{Arc, Mutex},
};

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Capture {
    fn output(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

fn capturing_device() -> (Cpu, Capture) {
    let _ = env_logger::builder().is_test(true).try_init();
    let cap = Capture::default();
    (Cpu::default().with_sink(cap.clone()), cap)
}

/// Forward is a relu; the backward recomputes, scales, squares and prints
/// along the way.
fn side_effect_bprop() -> Cell {
    Cell::new(|t, xs| t.relu(xs[0])).with_bprop(|t, xs, _out, _dout| {
        let x = t.relu(xs[0])?;
        let x = t.mul_scalar(x, 5.0)?;
        t.print(vec!["x1: ".into(), x.into()])?;
        let x = t.mul(x, x)?;
        t.print(vec!["x2: ".into(), x.into()])?;
        Ok(vec![t.mul_scalar(x, 5.0)?])
    })
}

#[test]
fn print_text_and_scalars() {
    let (dev, cap) = capturing_device();
    let net = function(Print::new().text("input_x:").input(0).text("input_y:").input(1));
    let x = dev.tensor(3);
    let out = forward(&dev, &net, &[x.clone(), dev.tensor(4)]).unwrap();
    assert_eq!(out[0], x);
    assert_eq!(
        cap.output(),
        "input_x:\n\
         Tensor(shape=[], dtype=Int32, value=3)\n\
         input_y:\n\
         Tensor(shape=[], dtype=Int32, value=4)\n"
    );
}

#[test]
fn bprop_prints_in_order_on_the_reverse_pass() {
    let (dev, cap) = capturing_device();
    let net = function(side_effect_bprop());
    let x = dev.ones([2, 2], DType::Float32);
    let sens = dev.ones([2, 2], DType::Float32);

    let out = forward(&dev, &net, &[x.clone()]).unwrap();
    assert_eq!(out[0], x);
    assert_eq!(cap.output(), "", "the forward pass does not print");

    let grads = GradOperation::new()
        .get_all(true)
        .sens_param(true)
        .try_call(&dev, &net, &[x, sens])
        .unwrap();
    assert_eq!(grads.len(), 1);
    assert_eq!(grads[0].shape().dims(), &[2, 2]);
    assert_eq!(grads[0].array::<[[f32; 2]; 2]>(), [[125.0; 2]; 2]);

    assert_eq!(
        cap.output(),
        "x1: \n\
         Tensor(shape=[2, 2], dtype=Float32, value=\n\
         [[ 5.00000000e+00  5.00000000e+00]\n \
         [ 5.00000000e+00  5.00000000e+00]])\n\
         x2: \n\
         Tensor(shape=[2, 2], dtype=Float32, value=\n\
         [[ 2.50000000e+01  2.50000000e+01]\n \
         [ 2.50000000e+01  2.50000000e+01]])\n"
    );
}

#[test]
fn bprop_runs_once_per_call() {
    let (dev, cap) = capturing_device();
    let cell = side_effect_bprop();
    // the cell is used twice, so its bprop runs twice
    let net = move |t: &mut Tracer, xs: &[Var]| -> Result<Vec<Var>, Error> {
        let a = cell.try_forward(t, vec![xs[0]])?;
        let b = cell.try_forward(t, vec![xs[0]])?;
        Ok(vec![t.add(a, b)?])
    };
    let x = dev.tensor([1.0, -1.0]);
    let g = grad(&dev, &net, &[x], &[0], None).unwrap();
    assert_eq!(g[0].array::<[f32; 2]>(), [250.0, 0.0]);
    assert_eq!(cap.output().matches("x1: ").count(), 2);
    assert_eq!(cap.output().matches("x2: ").count(), 2);
}

#[test]
fn print_under_vmap_prints_the_whole_batch() {
    let (dev, cap) = capturing_device();
    let net = vmap(function(Print::new().text("row:").input(0)), 0, 0);
    let x = dev.tensor([[1, 2], [3, 4]]);
    let out = forward(&dev, &net, &[x.clone()]).unwrap();
    assert_eq!(out[0], x);
    assert_eq!(
        cap.output(),
        "row:\nTensor(shape=[2, 2], dtype=Int32, value=\n[[1 2]\n [3 4]])\n"
    );
}
