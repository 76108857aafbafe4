use super::Module;
use gradmap_core::{
    tensor::Error,
    trace::{Tracer, Var},
};

/// Flattens everything after the leading dim.
///
/// **Examples**
/// - `[2, 3, 4]` becomes `[2, 12]`
/// - `[5]` becomes `[5, 1]`
#[derive(Debug, Default, Clone, Copy)]
pub struct Flatten;

impl Module<Var> for Flatten {
    type Output = Var;
    fn try_forward(&self, t: &mut Tracer, x: Var) -> Result<Var, Error> {
        t.flatten(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::function;
    use gradmap_core::{
        tensor::{Cpu, TensorFrom},
        trace::forward,
    };

    #[test]
    fn test_flatten() {
        let dev: Cpu = Default::default();
        let out = forward(&dev, &function(Flatten), &[dev.sample_normal([2, 3, 4])]).unwrap();
        assert_eq!(out[0].shape().dims(), &[2, 12]);
        let out = forward(&dev, &function(Flatten), &[dev.tensor([1, 2, 3, 4, 5])]).unwrap();
        assert_eq!(out[0].shape().dims(), &[5, 1]);
    }
}
