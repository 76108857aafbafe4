use super::Module;
use gradmap_core::{
    tensor::Error,
    trace::{Tracer, Var},
};

/// Calls [Tracer::relu].
#[derive(Default, Debug, Clone, Copy)]
pub struct ReLU;

impl Module<Var> for ReLU {
    type Output = Var;
    fn try_forward(&self, t: &mut Tracer, x: Var) -> Result<Var, Error> {
        t.relu(x)
    }
}
