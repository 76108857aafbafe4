use super::{EqKernelOp, GeKernelOp, GtKernelOp, LeKernelOp, LtKernelOp, NeKernelOp};
use crate::{dtypes::Unit, tensor_ops::utilities::CmpKernelOp};

impl CmpKernelOp for EqKernelOp {
    const NAME: &'static str = "equal";
    fn f<E: Unit>(&self, lhs: E, rhs: E) -> bool {
        lhs == rhs
    }
}

impl CmpKernelOp for NeKernelOp {
    const NAME: &'static str = "not_equal";
    fn f<E: Unit>(&self, lhs: E, rhs: E) -> bool {
        lhs != rhs
    }
}

impl CmpKernelOp for GtKernelOp {
    const NAME: &'static str = "greater";
    fn f<E: Unit>(&self, lhs: E, rhs: E) -> bool {
        lhs > rhs
    }
}

impl CmpKernelOp for GeKernelOp {
    const NAME: &'static str = "greater_equal";
    fn f<E: Unit>(&self, lhs: E, rhs: E) -> bool {
        lhs >= rhs
    }
}

impl CmpKernelOp for LtKernelOp {
    const NAME: &'static str = "less";
    fn f<E: Unit>(&self, lhs: E, rhs: E) -> bool {
        lhs < rhs
    }
}

impl CmpKernelOp for LeKernelOp {
    const NAME: &'static str = "less_equal";
    fn f<E: Unit>(&self, lhs: E, rhs: E) -> bool {
        lhs <= rhs
    }
}
