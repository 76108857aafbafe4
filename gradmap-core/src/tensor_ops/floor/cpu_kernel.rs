use crate::{dtypes::Dtype, tensor_ops::utilities::UnaryKernelOp};

impl UnaryKernelOp for super::FloorKernelOp {
    const NAME: &'static str = "floor";
    #[inline(always)]
    fn f<E: Dtype>(&self, x: E) -> E {
        x.floor()
    }
}
