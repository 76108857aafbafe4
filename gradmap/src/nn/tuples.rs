use super::Module;
use gradmap_core::{tensor::Error, trace::Tracer};

macro_rules! tuple_impls {
    ([$($name:ident),+] [$($idx:tt),+], $last:ident, [$($rev_tail:ident),+]) => {
        impl<
            Input,
            $last:
            $(Module::<$rev_tail ::Output>, $rev_tail: )+
            Module<Input>
        > Module<Input> for ($($name,)+) {
            type Output = $last ::Output;

            /// Calls forward sequentially on each module in the tuple.
            fn try_forward(&self, t: &mut Tracer, x: Input) -> Result<Self::Output, Error> {
                $(let x = self.$idx.try_forward(t, x)?;)+
                Ok(x)
            }
        }
    };
}

tuple_impls!([A, B] [0, 1], B, [A]);
tuple_impls!([A, B, C] [0, 1, 2], C, [B, A]);
tuple_impls!([A, B, C, D] [0, 1, 2, 3], D, [C, B, A]);
tuple_impls!([A, B, C, D, E] [0, 1, 2, 3, 4], E, [D, C, B, A]);
tuple_impls!([A, B, C, D, E, F] [0, 1, 2, 3, 4, 5], F, [E, D, C, B, A]);

#[cfg(test)]
mod tests {
    use crate::nn::*;
    use gradmap_core::{
        autodiff::grad,
        tensor::{Cpu, TensorFrom},
        trace::forward_traced,
    };

    #[test]
    fn test_tuple_runs_in_order() {
        let dev: Cpu = Default::default();
        let model = function((ReLU, Flatten, Floor));
        let x = dev.tensor([[[-1.5, 0.5], [1.5, 2.5]]]);
        let (out, trace) = forward_traced(&dev, &model, &[x.clone()]).unwrap();
        assert_eq!(out[0].array::<[[f32; 4]; 1]>(), [[0.0, 0.0, 1.0, 2.0]]);
        assert_eq!(trace.names(), ["relu", "flatten", "floor"]);

        let g = grad(&dev, &model, &[x], &[0], None).unwrap();
        assert_eq!(g[0].array::<[[[f32; 2]; 2]; 1]>(), [[[0.0; 2]; 2]]);
    }
}
