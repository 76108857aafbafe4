//! Lifting functions over a batch dim.
//!
//! [vmap] turns a function of per-example values into a function of batched
//! values. Under the hood the [Tracer] keeps a stack of batch levels: each
//! argument batched at a level is wrapped in a [BatchedValue] that records
//! where its batch dim is, and every op applied at that level is rewritten
//! by the op's batch rule into ops one level down.
//!
//! ```rust
//! # use gradmap_core::prelude::*;
//! fn ge(t: &mut Tracer, xs: &[Var]) -> Result<Vec<Var>, Error> {
//!     Ok(vec![t.greater_equal(xs[0], xs[1])?])
//! }
//!
//! let dev: Cpu = Default::default();
//! let x = dev.tensor([[[1, 2, 3]]]);
//! let y = dev.tensor([[[1, 1, 4]]]);
//! let f = vmap(vmap(ge, -1, 0), -1, 0);
//! let out = forward(&dev, &f, &[x, y]).unwrap();
//! assert_eq!(out[0].shape().dims(), &[3, 1, 1]);
//! assert_eq!(out[0].array::<[[[bool; 1]; 1]; 3]>(), [[[true]], [[true]], [[false]]]);
//! ```
//!
//! Axes may be negative, counting from the end of the batched value's rank.

mod rules;

pub use rules::{elementwise, unary_in_place};

use crate::{
    registry::{BatchArgs, Op, Params},
    shapes::{normalize_axis, Shape},
    tensor::Error,
    trace::{Slot, Tracer, Var},
};

/// One active vmap level. `id` is unique within a [Tracer], so values
/// from a finished level are never mistaken for values of a later one.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BatchLevel {
    pub(crate) id: usize,
    pub(crate) size: usize,
}

/// A value batched at the level with id `level_id`: `inner` lives one
/// level down and carries the batch dim at `axis`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BatchedValue {
    pub(crate) level_id: usize,
    pub(crate) inner: Var,
    pub(crate) axis: usize,
}

/// Where the batch dim of each argument (or output) is.
///
/// `None` means not batched. A single entry applies to every argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchAxes {
    All(Option<isize>),
    Each(Vec<Option<isize>>),
}

pub type InAxes = BatchAxes;
pub type OutAxes = BatchAxes;

impl BatchAxes {
    fn resolve(&self, n: usize, what: &str) -> Result<Vec<Option<isize>>, Error> {
        match self {
            Self::All(a) => Ok(vec![*a; n]),
            Self::Each(axes) if axes.len() == n => Ok(axes.clone()),
            Self::Each(axes) => Err(Error::batch_axis(
                "vmap",
                format!("{} {what} axes given for {n} {what}s", axes.len()),
            )),
        }
    }
}

impl From<i32> for BatchAxes {
    fn from(axis: i32) -> Self {
        Self::All(Some(axis as isize))
    }
}

impl From<isize> for BatchAxes {
    fn from(axis: isize) -> Self {
        Self::All(Some(axis))
    }
}

impl From<Option<isize>> for BatchAxes {
    fn from(axis: Option<isize>) -> Self {
        Self::All(axis)
    }
}

impl From<Vec<Option<isize>>> for BatchAxes {
    fn from(axes: Vec<Option<isize>>) -> Self {
        Self::Each(axes)
    }
}

impl<const N: usize> From<[Option<isize>; N]> for BatchAxes {
    fn from(axes: [Option<isize>; N]) -> Self {
        Self::Each(axes.to_vec())
    }
}

/// Vectorizes `f` over the axes `in_axes` of its arguments, placing the
/// batch dim of each output at `out_axes`.
///
/// The result is again a function of the same kind, so it can be nested,
/// differentiated, or passed to [crate::trace::forward].
pub fn vmap<F>(
    f: F,
    in_axes: impl Into<InAxes>,
    out_axes: impl Into<OutAxes>,
) -> impl Fn(&mut Tracer, &[Var]) -> Result<Vec<Var>, Error>
where
    F: Fn(&mut Tracer, &[Var]) -> Result<Vec<Var>, Error>,
{
    let in_axes = in_axes.into();
    let out_axes = out_axes.into();
    move |t: &mut Tracer, args: &[Var]| t.batched_call(&f, args, &in_axes, &out_axes)
}

impl Tracer {
    /// Runs `f` on `args` under a new batch level.
    pub fn batched_call<F>(
        &mut self,
        f: &F,
        args: &[Var],
        in_axes: &InAxes,
        out_axes: &OutAxes,
    ) -> Result<Vec<Var>, Error>
    where
        F: Fn(&mut Tracer, &[Var]) -> Result<Vec<Var>, Error>,
    {
        let mut axes = Vec::with_capacity(args.len());
        let mut size: Option<usize> = None;
        for (&x, axis) in args.iter().zip(in_axes.resolve(args.len(), "argument")?) {
            let Some(axis) = axis else {
                axes.push(None);
                continue;
            };
            let shape = self.shape(x)?;
            let a = normalize_axis(axis, shape.rank()).ok_or_else(|| {
                Error::batch_axis(
                    "vmap",
                    format!("in axis {axis} is out of range for an argument of shape {shape}"),
                )
            })?;
            let n = shape.dims()[a];
            match size {
                Some(s) if s != n => {
                    return Err(Error::batch_axis(
                        "vmap",
                        format!("batch sizes {s} and {n} disagree"),
                    ))
                }
                _ => size = Some(n),
            }
            axes.push(Some(a));
        }
        let size = size.ok_or_else(|| Error::batch_axis("vmap", "no argument is batched"))?;

        let outer = self.depth;
        let id = self.next_level_id;
        self.next_level_id += 1;
        self.levels.push(BatchLevel { id, size });
        self.depth = self.levels.len();
        let level = self.depth;
        log::debug!("entering vmap level {level} with batch size {size}");

        let wrapped: Vec<Var> = args
            .iter()
            .zip(axes)
            .map(|(&x, axis)| self.wrap(x, axis, level))
            .collect();
        let result = f(self, &wrapped).and_then(|outs| {
            self.depth = level - 1;
            self.unwrap_outputs(level, size, &outs, out_axes)
        });

        self.levels.pop();
        self.depth = outer;
        log::debug!("left vmap level {level}");
        result
    }

    fn unwrap_outputs(
        &mut self,
        level: usize,
        size: usize,
        outs: &[Var],
        out_axes: &OutAxes,
    ) -> Result<Vec<Var>, Error> {
        let mut unwrapped = Vec::with_capacity(outs.len());
        for (&out, spec) in outs.iter().zip(out_axes.resolve(outs.len(), "output")?) {
            let (inner, axis) = self.unbatch(out, level)?;
            let v = match (axis, spec) {
                (None, None) => inner,
                (Some(_), None) => {
                    return Err(Error::batch_axis(
                        "vmap",
                        "an output is batched but its out axis is None",
                    ))
                }
                (Some(a), Some(o)) => {
                    let rank = self.shape(inner)?.rank();
                    let o = out_axis(o, rank)?;
                    self.move_axis(inner, a, o)?
                }
                (None, Some(o)) => {
                    let shape = self.shape(inner)?;
                    let o = out_axis(o, shape.rank() + 1)?;
                    let x = self.reshape(inner, shape.insert(o, 1))?;
                    self.broadcast_to(x, shape.insert(o, size))?
                }
            };
            unwrapped.push(v);
        }
        Ok(unwrapped)
    }

    /// Applies `op` at the current level, which is a vmap level.
    pub(crate) fn apply_batched(
        &mut self,
        op: Op,
        inputs: &[Var],
        params: Params,
    ) -> Result<Var, Error> {
        let level = self.depth;
        let mut lowered = Vec::with_capacity(inputs.len());
        let mut axes = Vec::with_capacity(inputs.len());
        for &x in inputs {
            let (inner, axis) = self.unbatch(x, level)?;
            lowered.push(inner);
            axes.push(axis);
        }

        self.depth = level - 1;
        let result = if axes.iter().all(Option::is_none) {
            self.apply_op(op, &lowered, params).map(|v| (v, None))
        } else {
            let args = BatchArgs {
                op,
                inputs: &lowered,
                axes: &axes,
                params: &params,
                size: self.levels[level - 1].size,
            };
            (op.batch)(self, &args)
        };
        self.depth = level;

        let (out, axis) = result?;
        Ok(self.wrap(out, axis, level))
    }

    /// Splits `v` into its value one level below `level` and its batch axis.
    pub(crate) fn unbatch(&self, v: Var, level: usize) -> Result<(Var, Option<usize>), Error> {
        match self.slot(v)? {
            Slot::Concrete(_) => Ok((v, None)),
            Slot::Batched(b) => {
                let active = &self.levels[..level.min(self.levels.len())];
                match active.iter().rposition(|l| l.id == b.level_id) {
                    Some(i) if i + 1 == level => Ok((b.inner, Some(b.axis))),
                    // batched at an enclosing level only
                    Some(_) => Ok((v, None)),
                    None => Err(Error::UnknownValue(v.index())),
                }
            }
        }
    }

    fn wrap(&mut self, inner: Var, axis: Option<usize>, level: usize) -> Var {
        match axis {
            Some(axis) => {
                let level_id = self.levels[level - 1].id;
                self.push(Slot::Batched(BatchedValue {
                    level_id,
                    inner,
                    axis,
                }))
            }
            None => inner,
        }
    }

    /// Moves dim `from` of `x` to position `to` with a `permute`.
    pub(crate) fn move_axis(&mut self, x: Var, from: usize, to: usize) -> Result<Var, Error> {
        if from == to {
            return Ok(x);
        }
        let rank = self.shape(x)?.rank();
        let mut perm: Vec<usize> = (0..rank).filter(|&i| i != from).collect();
        perm.insert(to, from);
        self.permute(x, perm)
    }

    pub(crate) fn move_to_front(&mut self, x: Var, axis: usize) -> Result<Var, Error> {
        self.move_axis(x, axis, 0)
    }

    /// `x` with its batch dim moved to the front, or `x` itself when not batched.
    pub(crate) fn batch_to_front(&mut self, x: Var, axis: Option<usize>) -> Result<Var, Error> {
        match axis {
            Some(a) => self.move_to_front(x, a),
            None => Ok(x),
        }
    }
}

fn out_axis(axis: isize, rank: usize) -> Result<usize, Error> {
    normalize_axis(axis, rank).ok_or_else(|| {
        Error::batch_axis(
            "vmap",
            format!("out axis {axis} is out of range for an output of rank {rank}"),
        )
    })
}

/// `[size]` followed by the dims of `shape`.
pub(crate) fn prepend(size: usize, shape: &Shape) -> Shape {
    shape.insert(0, size)
}
