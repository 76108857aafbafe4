use super::Module;
use gradmap_core::{
    autodiff::{BackwardRule, Computation},
    tensor::Error,
    trace::{Tracer, Var},
};
use std::rc::Rc;

/// A computation that may carry its own backward rule.
///
/// Without one, a cell is differentiated through the ops it issues. Once
/// [Cell::with_bprop] is set, the reverse pass calls the bprop instead with
/// the cell's inputs, its output and the incoming gradient. The bprop is an
/// ordinary traced function: ops it issues, prints included, run when the
/// reverse pass reaches the cell.
///
/// ```rust
/// # use gradmap::prelude::*;
/// let cell = Cell::new(|t, xs| t.relu(xs[0])).with_bprop(|t, _xs, _out, dout| {
///     Ok(vec![t.mul_scalar(dout, 3.0)?])
/// });
/// let dev: Cpu = Default::default();
/// let g = grad(&dev, &function(cell), &[dev.tensor([-1.0, 1.0])], &[0], None).unwrap();
/// assert_eq!(g[0].array::<[f32; 2]>(), [3.0, 3.0]);
/// ```
#[derive(Clone, Debug)]
pub struct Cell {
    computation: Computation,
}

impl Cell {
    pub fn new<F>(forward: F) -> Self
    where
        F: Fn(&mut Tracer, &[Var]) -> Result<Var, Error> + 'static,
    {
        Self {
            computation: Computation::plain(forward),
        }
    }

    /// Replaces the backward of this cell. `bprop(t, inputs, output, dout)`
    /// returns one gradient per input.
    pub fn with_bprop<B>(self, bprop: B) -> Self
    where
        B: Fn(&mut Tracer, &[Var], Var, Var) -> Result<Vec<Var>, Error> + 'static,
    {
        let backward: BackwardRule = Rc::new(bprop);
        let forward = match self.computation {
            Computation::Plain(forward) | Computation::Custom { forward, .. } => forward,
        };
        Self {
            computation: Computation::Custom { forward, backward },
        }
    }

    pub fn has_bprop(&self) -> bool {
        self.computation.is_custom()
    }

    pub fn computation(&self) -> &Computation {
        &self.computation
    }
}

impl Module<Vec<Var>> for Cell {
    type Output = Var;
    fn try_forward(&self, t: &mut Tracer, xs: Vec<Var>) -> Result<Var, Error> {
        t.call(&self.computation, &xs)
    }
}
