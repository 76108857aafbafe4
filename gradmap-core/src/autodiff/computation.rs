use crate::{
    tensor::Error,
    trace::{Record, Tracer, Var},
};
use std::rc::Rc;

/// Computes one output from the given inputs.
pub type ForwardRule = Rc<dyn Fn(&mut Tracer, &[Var]) -> Result<Var, Error>>;

/// Called as `backward(tracer, inputs, output, grad_out)` on the reverse pass.
/// Returns one gradient per input.
pub type BackwardRule = Rc<dyn Fn(&mut Tracer, &[Var], Var, Var) -> Result<Vec<Var>, Error>>;

/// A unit of computation that can be called from inside a traced function.
///
/// A [Computation::Plain] is differentiated through the ops its forward
/// rule issues. A [Computation::Custom] replaces that with its own backward
/// rule: the ops of its forward are not recorded, and on the reverse pass
/// the backward runs exactly once, in trace order, with recording off. Any
/// op it issues (including `print`) executes at that point.
///
/// ```rust
/// # use gradmap_core::prelude::*;
/// let double_grad = Computation::custom(
///     |t, xs| t.relu(xs[0]),
///     |t, _xs, _out, dout| Ok(vec![t.mul_scalar(dout, 2.0)?]),
/// );
/// let f = move |t: &mut Tracer, xs: &[Var]| -> Result<Vec<Var>, Error> {
///     Ok(vec![t.call(&double_grad, xs)?])
/// };
///
/// let dev: Cpu = Default::default();
/// let g = grad(&dev, &f, &[dev.tensor([-1.0, 3.0])], &[0], None).unwrap();
/// assert_eq!(g[0].array::<[f32; 2]>(), [2.0, 2.0]);
/// ```
#[derive(Clone)]
pub enum Computation {
    Plain(ForwardRule),
    Custom {
        forward: ForwardRule,
        backward: BackwardRule,
    },
}

impl Computation {
    pub fn plain<F>(forward: F) -> Self
    where
        F: Fn(&mut Tracer, &[Var]) -> Result<Var, Error> + 'static,
    {
        Self::Plain(Rc::new(forward))
    }

    pub fn custom<F, B>(forward: F, backward: B) -> Self
    where
        F: Fn(&mut Tracer, &[Var]) -> Result<Var, Error> + 'static,
        B: Fn(&mut Tracer, &[Var], Var, Var) -> Result<Vec<Var>, Error> + 'static,
    {
        Self::Custom {
            forward: Rc::new(forward),
            backward: Rc::new(backward),
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom { .. })
    }
}

impl std::fmt::Debug for Computation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain(_) => f.write_str("Computation::Plain"),
            Self::Custom { .. } => f.write_str("Computation::Custom"),
        }
    }
}

impl Tracer {
    /// Calls `c` on `inputs`.
    ///
    /// Under vmap the custom backward is not applied: the forward rule runs
    /// through the batch rules of its ops like any other code.
    pub fn call(&mut self, c: &Computation, inputs: &[Var]) -> Result<Var, Error> {
        match c {
            Computation::Plain(forward) => forward(self, inputs),
            Computation::Custom { forward, backward } => {
                if !self.is_recording() {
                    return forward(self, inputs);
                }
                self.suspend_recording();
                let output = forward(self, inputs);
                self.resume_recording();
                let output = output?;
                log::trace!("custom computation on {inputs:?} -> {output:?}");
                self.record(Record::Custom {
                    backward: backward.clone(),
                    inputs: inputs.to_vec(),
                    output,
                });
                Ok(output)
            }
        }
    }
}
