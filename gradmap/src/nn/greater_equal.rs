use super::Module;
use gradmap_core::{
    tensor::Error,
    trace::{Tracer, Var},
};

/// Compares two inputs with [Tracer::greater_equal].
#[derive(Default, Debug, Clone, Copy)]
pub struct GreaterEqual;

impl Module<(Var, Var)> for GreaterEqual {
    type Output = Var;
    fn try_forward(&self, t: &mut Tracer, (x, y): (Var, Var)) -> Result<Var, Error> {
        t.greater_equal(x, y)
    }
}
