use super::{AddKernelOp, DivKernelOp, MulKernelOp, NegateKernelOp, ReLUKernelOp, SubKernelOp};
use crate::{
    dtypes::Dtype,
    tensor_ops::utilities::{BinaryKernelOp, UnaryKernelOp},
};

impl BinaryKernelOp for AddKernelOp {
    const NAME: &'static str = "add";
    #[inline(always)]
    fn f<E: Dtype>(&self, x: E, y: E) -> E {
        x.wrapping_add(y)
    }
}

impl BinaryKernelOp for SubKernelOp {
    const NAME: &'static str = "sub";
    #[inline(always)]
    fn f<E: Dtype>(&self, x: E, y: E) -> E {
        x.wrapping_sub(y)
    }
}

impl BinaryKernelOp for MulKernelOp {
    const NAME: &'static str = "mul";
    #[inline(always)]
    fn f<E: Dtype>(&self, x: E, y: E) -> E {
        x.wrapping_mul(y)
    }
}

impl BinaryKernelOp for DivKernelOp {
    const NAME: &'static str = "div";
    #[inline(always)]
    fn f<E: Dtype>(&self, x: E, y: E) -> E {
        x / y
    }
}

impl UnaryKernelOp for NegateKernelOp {
    const NAME: &'static str = "neg";
    #[inline(always)]
    fn f<E: Dtype>(&self, x: E) -> E {
        x.wrapping_neg()
    }
}

impl UnaryKernelOp for ReLUKernelOp {
    const NAME: &'static str = "relu";
    #[inline(always)]
    fn f<E: Dtype>(&self, x: E) -> E {
        if x > E::zero() {
            x
        } else {
            E::zero()
        }
    }
}
