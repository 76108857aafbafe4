//! Name-indexed table of operators.
//!
//! An [Op] bundles the three rules every other part of the crate needs:
//! a forward kernel on concrete tensors, a vjp rule for reverse mode, and a
//! batch rule for vmap. The forward evaluator, the autodiff engine and the
//! batching engine only ever go through this table, so a new op is
//! supported by all three once it is registered.
//!
//! ```rust
//! # use gradmap_core::prelude::*;
//! let registry = OpRegistry::global();
//! assert!(registry.lookup("greater_equal").is_ok());
//! assert!(matches!(registry.lookup("nope"), Err(Error::UnknownOp(_))));
//! ```

mod params;

pub use params::{Params, PrintItem};

use crate::{
    tensor::{Cpu, Error, Tensor},
    trace::{Tracer, Var},
};
use once_cell::sync::Lazy;
use std::{collections::BTreeMap, sync::Arc};

/// Arity description for ops that accept a fixed or variadic input count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    Variadic { min: usize },
}

impl Arity {
    pub fn accepts(&self, n: usize) -> bool {
        match self {
            Arity::Fixed(k) => n == *k,
            Arity::Variadic { min } => n >= *min,
        }
    }
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arity::Fixed(k) => write!(f, "{k}"),
            Arity::Variadic { min } => write!(f, "at least {min}"),
        }
    }
}

/// What a vjp rule receives for one recorded invocation.
pub struct VjpArgs<'a> {
    pub inputs: &'a [Var],
    pub output: Var,
    /// Gradient of the final output(s) with respect to `output`.
    pub grad_out: Var,
    pub params: &'a Params,
}

/// What a batch rule receives for one invocation under vmap.
///
/// `inputs` live one level below the vmap level being resolved, and
/// `axes[i]` is where that level's batch dim sits in `inputs[i]`, or
/// `None` if the input is not batched at that level.
pub struct BatchArgs<'a> {
    pub op: Op,
    pub inputs: &'a [Var],
    pub axes: &'a [Option<usize>],
    pub params: &'a Params,
    /// The size of the batch dim.
    pub size: usize,
}

/// Computes the output of an op from concrete inputs.
pub type ForwardFn = fn(&Cpu, &[&Tensor], &Params) -> Result<Tensor, Error>;

/// Maps the output gradient to one gradient per input, `None` where the
/// input receives nothing.
pub type VjpFn = fn(&mut Tracer, &VjpArgs<'_>) -> Result<Vec<Option<Var>>, Error>;

/// Rewrites an invocation on batched inputs into invocations one level
/// down, returning the output and where its batch dim ended up.
pub type BatchFn = fn(&mut Tracer, &BatchArgs<'_>) -> Result<(Var, Option<usize>), Error>;

/// A registered operator.
#[derive(Clone, Copy)]
pub struct Op {
    pub name: &'static str,
    pub arity: Arity,
    /// Whether the vjp rule produces a non-zero gradient in general.
    pub differentiable: bool,
    pub forward: ForwardFn,
    pub vjp: VjpFn,
    pub batch: BatchFn,
}

impl std::fmt::Debug for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Op")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("differentiable", &self.differentiable)
            .finish_non_exhaustive()
    }
}

/// Maps op names to their rules. Read-only once built.
#[derive(Clone, Debug, Default)]
pub struct OpRegistry {
    ops: BTreeMap<&'static str, Op>,
}

static GLOBAL: Lazy<Arc<OpRegistry>> = Lazy::new(|| {
    let registry = OpRegistry::with_builtins().expect("built-in op names are unique");
    log::debug!("registered {} built-in ops", registry.len());
    Arc::new(registry)
});

impl OpRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every op in [crate::tensor_ops].
    pub fn with_builtins() -> Result<Self, Error> {
        let mut registry = Self::new();
        crate::tensor_ops::register_builtins(&mut registry)?;
        Ok(registry)
    }

    /// The process-wide registry of built-in ops, created on first use.
    pub fn global() -> Arc<OpRegistry> {
        GLOBAL.clone()
    }

    pub fn register(&mut self, op: Op) -> Result<(), Error> {
        if self.ops.contains_key(op.name) {
            return Err(Error::DuplicateOp(op.name.to_string()));
        }
        self.ops.insert(op.name, op);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&Op, Error> {
        self.ops
            .get(name)
            .ok_or_else(|| Error::UnknownOp(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ops.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.ops.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
