use gradmap_core::{
    autodiff,
    tensor::{Cpu, Error, Tensor},
    trace::{Tracer, Var},
};

/// Builds gradient functions out of traced functions.
///
/// By default the gradient is taken with respect to the first argument, and
/// every output is seeded with ones. [GradOperation::get_all] asks for the
/// gradients of all arguments; [GradOperation::sens_param] makes the last
/// argument the sensitivity of the single output instead of an input.
///
/// ```rust
/// # use gradmap::prelude::*;
/// let dev: Cpu = Default::default();
/// let grad_all = GradOperation::new().get_all(true).sens_param(true);
/// let f = function(ReLU);
/// let x = dev.tensor([-1.0, 2.0]);
/// let sens = dev.tensor([3.0, 3.0]);
/// let g = grad_all.try_call(&dev, &f, &[x, sens]).unwrap();
/// assert_eq!(g.len(), 1);
/// assert_eq!(g[0].array::<[f32; 2]>(), [0.0, 3.0]);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GradOperation {
    get_all: bool,
    sens_param: bool,
}

impl GradOperation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_all(mut self, get_all: bool) -> Self {
        self.get_all = get_all;
        self
    }

    pub fn sens_param(mut self, sens_param: bool) -> Self {
        self.sens_param = sens_param;
        self
    }

    /// Gradients of `f` at `args`, one per differentiated argument.
    pub fn try_call<F>(&self, dev: &Cpu, f: &F, args: &[Tensor]) -> Result<Vec<Tensor>, Error>
    where
        F: Fn(&mut Tracer, &[Var]) -> Result<Vec<Var>, Error>,
    {
        let (inputs, sens) = match (self.sens_param, args.split_last()) {
            (true, Some((sens, inputs))) => (inputs, Some(std::slice::from_ref(sens))),
            (true, None) => {
                return Err(Error::ArityMismatch {
                    op: "grad".to_string(),
                    expected: "a sensitivity".to_string(),
                    found: 0,
                })
            }
            (false, _) => (args, None),
        };
        let positions: Vec<usize> = if self.get_all {
            (0..inputs.len()).collect()
        } else {
            vec![0]
        };
        log::debug!(
            "grad wrt {positions:?} of {} inputs, sensitivity given: {}",
            inputs.len(),
            sens.is_some()
        );
        autodiff::grad(dev, f, inputs, &positions, sens)
    }
}
