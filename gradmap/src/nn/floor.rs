use super::Module;
use gradmap_core::{
    tensor::Error,
    trace::{Tracer, Var},
};

/// Calls [Tracer::floor].
#[derive(Default, Debug, Clone, Copy)]
pub struct Floor;

impl Module<Var> for Floor {
    type Output = Var;
    fn try_forward(&self, t: &mut Tracer, x: Var) -> Result<Var, Error> {
        t.floor(x)
    }
}
