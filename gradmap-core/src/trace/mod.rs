//! The forward evaluator.
//!
//! Functions are ordinary rust closures (or fns) that receive a [Tracer] and
//! a [Var] per argument, and build their result out of registered ops:
//!
//! ```rust
//! # use gradmap_core::prelude::*;
//! fn relu_floor(t: &mut Tracer, xs: &[Var]) -> Result<Vec<Var>, Error> {
//!     let y = t.relu(xs[0])?;
//!     Ok(vec![t.floor(y)?])
//! }
//!
//! let dev: Cpu = Default::default();
//! let x = dev.tensor([-1.5, 2.5]);
//! let (out, trace) = forward_traced(&dev, &relu_floor, &[x]).unwrap();
//! assert_eq!(out[0].array::<[f32; 2]>(), [0.0, 2.0]);
//! assert_eq!(trace.names(), ["relu", "floor"]);
//! ```
//!
//! Every value the function touches lives in the tracer's arena and is
//! addressed by a small integer handle, the [Var]. The same function can be
//! evaluated eagerly, traced for [crate::autodiff], or lifted with
//! [crate::vmap], because all three go through [Tracer::apply].

mod record;

pub use record::{ComputationTrace, Record};

use crate::{
    dtypes::{DType, Unit},
    registry::{Op, OpRegistry, Params},
    shapes::Shape,
    tensor::{Cpu, Error, Tensor},
    vmap::{BatchLevel, BatchedValue},
};
use std::sync::Arc;

/// Handle of a value in a [Tracer]'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var(pub(crate) usize);

impl Var {
    pub fn index(&self) -> usize {
        self.0
    }
}

pub(crate) enum Slot {
    Concrete(Tensor),
    Batched(BatchedValue),
}

/// Evaluates functions built from registered ops.
///
/// A tracer is created per call and dropped at the end of it. It owns the
/// value arena, the optional [ComputationTrace], and the stack of active
/// vmap levels.
pub struct Tracer {
    registry: Arc<OpRegistry>,
    dev: Cpu,
    slots: Vec<Slot>,
    pub(crate) levels: Vec<BatchLevel>,
    /// The level ops are currently applied at. Lowered while a batch rule runs.
    pub(crate) depth: usize,
    pub(crate) next_level_id: usize,
    recording: bool,
    suspended: usize,
    trace: ComputationTrace,
}

impl Tracer {
    /// A tracer over the global registry.
    pub fn new(dev: &Cpu) -> Self {
        Self::with_registry(OpRegistry::global(), dev)
    }

    pub fn with_registry(registry: Arc<OpRegistry>, dev: &Cpu) -> Self {
        Self {
            registry,
            dev: dev.clone(),
            slots: Vec::new(),
            levels: Vec::new(),
            depth: 0,
            next_level_id: 0,
            recording: false,
            suspended: 0,
            trace: Default::default(),
        }
    }

    pub fn device(&self) -> &Cpu {
        &self.dev
    }

    pub fn registry(&self) -> &OpRegistry {
        &self.registry
    }

    /// How many vmap levels ops are currently applied under.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of values created so far.
    pub fn num_values(&self) -> usize {
        self.slots.len()
    }

    /// Adds a concrete tensor to the arena. Constants never receive gradients
    /// and are unbatched at every vmap level.
    pub fn constant(&mut self, t: Tensor) -> Var {
        self.push(Slot::Concrete(t))
    }

    /// Adds a rank 0 constant.
    pub fn scalar<E: Unit>(&mut self, value: E) -> Var {
        self.constant(Tensor::scalar(value))
    }

    pub(crate) fn push(&mut self, slot: Slot) -> Var {
        self.slots.push(slot);
        Var(self.slots.len() - 1)
    }

    pub(crate) fn slot(&self, v: Var) -> Result<&Slot, Error> {
        self.slots.get(v.0).ok_or(Error::UnknownValue(v.0))
    }

    /// The shape of `v` as seen at the vmap level it was created in.
    pub fn shape(&self, v: Var) -> Result<Shape, Error> {
        match self.slot(v)? {
            Slot::Concrete(t) => Ok(t.shape().clone()),
            Slot::Batched(b) => Ok(self.shape(b.inner)?.remove(b.axis)),
        }
    }

    pub fn dtype(&self, v: Var) -> Result<DType, Error> {
        match self.slot(v)? {
            Slot::Concrete(t) => Ok(t.dtype()),
            Slot::Batched(b) => self.dtype(b.inner),
        }
    }

    /// The concrete tensor behind `v`. Fails for values that are batched at
    /// some vmap level.
    pub fn value(&self, v: Var) -> Result<&Tensor, Error> {
        match self.slot(v)? {
            Slot::Concrete(t) => Ok(t),
            Slot::Batched(_) => Err(Error::UnknownValue(v.0)),
        }
    }

    /// An unbatched constant of zeros with the shape and dtype of `v`.
    pub fn zeros_like(&mut self, v: Var) -> Result<Var, Error> {
        let t = self.dev.zeros(self.shape(v)?, self.dtype(v)?);
        Ok(self.constant(t))
    }

    /// An unbatched constant of ones with the shape and dtype of `v`.
    pub fn ones_like(&mut self, v: Var) -> Result<Var, Error> {
        let t = self.dev.ones(self.shape(v)?, self.dtype(v)?);
        Ok(self.constant(t))
    }

    /// Applies the registered op `name`.
    pub fn apply(&mut self, name: &str, inputs: &[Var], params: Params) -> Result<Var, Error> {
        let op = *self.registry.lookup(name)?;
        self.apply_op(op, inputs, params)
    }

    /// Applies `op` at the current vmap level.
    pub fn apply_op(&mut self, op: Op, inputs: &[Var], params: Params) -> Result<Var, Error> {
        if !op.arity.accepts(inputs.len()) {
            return Err(Error::ArityMismatch {
                op: op.name.to_string(),
                expected: op.arity.to_string(),
                found: inputs.len(),
            });
        }
        if self.depth == 0 {
            self.apply_concrete(op, inputs, params)
        } else {
            self.apply_batched(op, inputs, params)
        }
    }

    fn apply_concrete(&mut self, op: Op, inputs: &[Var], params: Params) -> Result<Var, Error> {
        let out = {
            let tensors = inputs
                .iter()
                .map(|&v| self.value(v))
                .collect::<Result<Vec<_>, _>>()?;
            (op.forward)(&self.dev, &tensors, &params)?
        };
        log::trace!("{}{:?} -> {}", op.name, inputs, out.shape());
        let output = self.push(Slot::Concrete(out));
        if self.is_recording() {
            self.trace.push(Record::Op {
                op,
                inputs: inputs.to_vec(),
                output,
                params,
            });
        }
        Ok(output)
    }

    pub(crate) fn is_recording(&self) -> bool {
        self.recording && self.suspended == 0 && self.depth == 0
    }

    pub(crate) fn start_recording(&mut self) {
        self.recording = true;
    }

    /// Stops recording and hands back everything recorded so far.
    pub(crate) fn take_trace(&mut self) -> ComputationTrace {
        self.recording = false;
        std::mem::take(&mut self.trace)
    }

    pub(crate) fn record(&mut self, record: Record) {
        self.trace.push(record);
    }

    pub(crate) fn suspend_recording(&mut self) {
        self.suspended += 1;
    }

    pub(crate) fn resume_recording(&mut self) {
        self.suspended = self.suspended.saturating_sub(1);
    }

    /// Adds `inputs` to the arena and calls `f` on them.
    pub(crate) fn run<F>(&mut self, f: &F, inputs: &[Tensor]) -> Result<(Vec<Var>, Vec<Var>), Error>
    where
        F: Fn(&mut Tracer, &[Var]) -> Result<Vec<Var>, Error>,
    {
        let args: Vec<Var> = inputs.iter().map(|x| self.constant(x.clone())).collect();
        let outs = f(self, &args)?;
        Ok((args, outs))
    }

    pub(crate) fn values_of(&self, vars: &[Var]) -> Result<Vec<Tensor>, Error> {
        vars.iter().map(|&v| self.value(v).cloned()).collect()
    }

    /// Evaluates `f` on `inputs`.
    pub fn forward<F>(mut self, f: &F, inputs: &[Tensor]) -> Result<Vec<Tensor>, Error>
    where
        F: Fn(&mut Tracer, &[Var]) -> Result<Vec<Var>, Error>,
    {
        let (_, outs) = self.run(f, inputs)?;
        self.values_of(&outs)
    }

    /// Evaluates `f` on `inputs`, also returning every op it ran.
    pub fn forward_traced<F>(
        mut self,
        f: &F,
        inputs: &[Tensor],
    ) -> Result<(Vec<Tensor>, ComputationTrace), Error>
    where
        F: Fn(&mut Tracer, &[Var]) -> Result<Vec<Var>, Error>,
    {
        self.start_recording();
        let (_, outs) = self.run(f, inputs)?;
        let trace = self.take_trace();
        log::debug!("traced {} ops", trace.len());
        Ok((self.values_of(&outs)?, trace))
    }
}

/// Evaluates `f` on `inputs` with the global registry.
pub fn forward<F>(dev: &Cpu, f: &F, inputs: &[Tensor]) -> Result<Vec<Tensor>, Error>
where
    F: Fn(&mut Tracer, &[Var]) -> Result<Vec<Var>, Error>,
{
    Tracer::new(dev).forward(f, inputs)
}

/// Evaluates `f` on `inputs` with the global registry, recording a
/// [ComputationTrace].
pub fn forward_traced<F>(
    dev: &Cpu,
    f: &F,
    inputs: &[Tensor],
) -> Result<(Vec<Tensor>, ComputationTrace), Error>
where
    F: Fn(&mut Tracer, &[Var]) -> Result<Vec<Var>, Error>,
{
    Tracer::new(dev).forward_traced(f, inputs)
}
