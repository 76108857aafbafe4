//! Reverse-mode differentiation of traced functions.
//!
//! [grad] runs the function once with recording on, seeds every output
//! with a sensitivity, and walks the [ComputationTrace] backwards calling
//! each record's vjp rule. Gradients are themselves values in the tracer,
//! so they are computed with the same registered ops as the forward pass.
//!
//! ```rust
//! # use gradmap_core::prelude::*;
//! fn square_plus(t: &mut Tracer, xs: &[Var]) -> Result<Vec<Var>, Error> {
//!     let sq = t.mul(xs[0], xs[0])?;
//!     Ok(vec![t.add(sq, xs[1])?])
//! }
//!
//! let dev: Cpu = Default::default();
//! let x = dev.tensor([1.0, -2.0]);
//! let y = dev.tensor([0.5, 0.5]);
//! let g = grad(&dev, &square_plus, &[x, y], &[1, 0], None).unwrap();
//! assert_eq!(g[0].array::<[f32; 2]>(), [1.0, 1.0]);
//! assert_eq!(g[1].array::<[f32; 2]>(), [2.0, -4.0]);
//! ```
//!
//! Non-differentiable ops (comparisons, `floor`) contribute zeros, and an
//! input the outputs do not depend on gets zeros of its own shape and dtype.

mod computation;
mod gradients;

pub use computation::{BackwardRule, Computation, ForwardRule};
pub use gradients::Gradients;

use crate::{
    registry::VjpArgs,
    tensor::{Cpu, Error, Tensor},
    trace::{ComputationTrace, Record, Tracer, Var},
};

impl Tracer {
    /// Gradients of `f`'s outputs with respect to the inputs at `positions`,
    /// in request order.
    ///
    /// `sensitivity` holds one tensor per output, each matching that output's
    /// shape. When `None`, every output is seeded with ones.
    ///
    /// Each gradient has the dtype of its input. For an Int32 input the
    /// gradient is computed in whatever dtype the ops promote to and then
    /// cast back, which truncates toward zero: a gradient of `1.5` reaches
    /// the caller as `1`. Pass Float32 inputs to keep fractional gradients.
    pub fn grad<F>(
        self,
        f: &F,
        inputs: &[Tensor],
        positions: &[usize],
        sensitivity: Option<&[Tensor]>,
    ) -> Result<Vec<Tensor>, Error>
    where
        F: Fn(&mut Tracer, &[Var]) -> Result<Vec<Var>, Error>,
    {
        self.value_and_grad(f, inputs, positions, sensitivity)
            .map(|(_, grads)| grads)
    }

    /// Like [Tracer::grad], also returning the outputs of `f`.
    pub fn value_and_grad<F>(
        mut self,
        f: &F,
        inputs: &[Tensor],
        positions: &[usize],
        sensitivity: Option<&[Tensor]>,
    ) -> Result<(Vec<Tensor>, Vec<Tensor>), Error>
    where
        F: Fn(&mut Tracer, &[Var]) -> Result<Vec<Var>, Error>,
    {
        if let Some(&position) = positions.iter().find(|&&p| p >= inputs.len()) {
            return Err(Error::InvalidGradInput {
                position,
                num_inputs: inputs.len(),
            });
        }

        self.start_recording();
        let (args, outs) = self.run(f, inputs)?;
        let trace = self.take_trace();
        log::debug!(
            "backward over {} records for {} outputs",
            trace.len(),
            outs.len()
        );

        let seeds = self.seed(&outs, sensitivity)?;
        let mut grads = Gradients::default();
        for (&out, seed) in outs.iter().zip(seeds) {
            grads.accumulate(&mut self, out, seed)?;
        }
        self.backward(&trace, &mut grads)?;

        let mut result = Vec::with_capacity(positions.len());
        for &p in positions {
            let x = args[p];
            let g = match grads.get(x) {
                Some(g) => {
                    let dtype = self.dtype(x)?;
                    self.cast(g, dtype)?
                }
                None => self.zeros_like(x)?,
            };
            result.push(self.value(g)?.clone());
        }
        Ok((self.values_of(&outs)?, result))
    }

    fn seed(&mut self, outs: &[Var], sensitivity: Option<&[Tensor]>) -> Result<Vec<Var>, Error> {
        let Some(sens) = sensitivity else {
            return outs.iter().map(|&o| self.ones_like(o)).collect();
        };
        if sens.len() != outs.len() {
            return Err(Error::shape_mismatch(
                "grad",
                format!(
                    "{} sensitivities for {} outputs",
                    sens.len(),
                    outs.len()
                ),
            ));
        }
        let mut seeds = Vec::with_capacity(outs.len());
        for (&o, s) in outs.iter().zip(sens) {
            let shape = self.shape(o)?;
            if s.shape() != &shape {
                return Err(Error::shape_mismatch(
                    "grad",
                    format!("sensitivity of shape {} for output of shape {shape}", s.shape()),
                ));
            }
            seeds.push(self.constant(s.clone()));
        }
        Ok(seeds)
    }

    /// Walks `trace` in reverse, accumulating input gradients into `grads`.
    pub(crate) fn backward(
        &mut self,
        trace: &ComputationTrace,
        grads: &mut Gradients,
    ) -> Result<(), Error> {
        for record in trace.iter().rev() {
            let Some(grad_out) = grads.get(record.output()) else {
                continue;
            };
            log::trace!("backward through `{}`", record.name());
            let in_grads: Vec<Option<Var>> = match record {
                Record::Op {
                    op,
                    inputs,
                    output,
                    params,
                } => {
                    let args = VjpArgs {
                        inputs,
                        output: *output,
                        grad_out,
                        params,
                    };
                    (op.vjp)(self, &args)?
                }
                Record::Custom {
                    backward,
                    inputs,
                    output,
                } => {
                    let g = backward(self, inputs, *output, grad_out)?;
                    if g.len() != inputs.len() {
                        return Err(Error::ArityMismatch {
                            op: "custom backward".to_string(),
                            expected: inputs.len().to_string(),
                            found: g.len(),
                        });
                    }
                    for (&x, &gx) in inputs.iter().zip(&g) {
                        let (expected, found) = (self.shape(x)?, self.shape(gx)?);
                        if expected != found {
                            return Err(Error::shape_mismatch(
                                "custom backward",
                                format!("gradient of shape {found} for an input of shape {expected}"),
                            ));
                        }
                    }
                    g.into_iter().map(Some).collect()
                }
            };
            for (&x, g) in record.inputs().iter().zip(in_grads) {
                if let Some(g) = g {
                    grads.accumulate(self, x, g)?;
                }
            }
        }
        Ok(())
    }
}

/// Gradients of `f`'s outputs with respect to the inputs at `positions`,
/// using the global registry. See [Tracer::grad].
pub fn grad<F>(
    dev: &Cpu,
    f: &F,
    inputs: &[Tensor],
    positions: &[usize],
    sensitivity: Option<&[Tensor]>,
) -> Result<Vec<Tensor>, Error>
where
    F: Fn(&mut Tracer, &[Var]) -> Result<Vec<Var>, Error>,
{
    Tracer::new(dev).grad(f, inputs, positions, sensitivity)
}

/// The outputs of `f` together with their gradients. See [Tracer::value_and_grad].
pub fn value_and_grad<F>(
    dev: &Cpu,
    f: &F,
    inputs: &[Tensor],
    positions: &[usize],
    sensitivity: Option<&[Tensor]>,
) -> Result<(Vec<Tensor>, Vec<Tensor>), Error>
where
    F: Fn(&mut Tracer, &[Var]) -> Result<Vec<Var>, Error>,
{
    Tracer::new(dev).value_and_grad(f, inputs, positions, sensitivity)
}
