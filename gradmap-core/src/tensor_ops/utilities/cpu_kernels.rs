use crate::{
    dtypes::{DType, Dtype, Unit},
    shapes::{broadcast_shapes, broadcast_strides, strided_offsets, Shape},
    tensor::{Buffer, Error, Tensor},
};

/// An elementwise function of one numeric value.
pub(crate) trait UnaryKernelOp: Default {
    const NAME: &'static str;
    fn f<E: Dtype>(&self, x: E) -> E;
}

/// An elementwise function of two numeric values.
pub(crate) trait BinaryKernelOp: Default {
    const NAME: &'static str;
    fn f<E: Dtype>(&self, x: E, y: E) -> E;
}

/// An elementwise comparison.
pub(crate) trait CmpKernelOp: Default {
    const NAME: &'static str;
    fn f<E: Unit>(&self, x: E, y: E) -> bool;
}

/// Applies `op` to every element. Booleans have no arithmetic and are
/// rejected.
pub(crate) fn try_unary_map<Op: UnaryKernelOp>(op: Op, inp: &Tensor) -> Result<Tensor, Error> {
    let data = match inp.buffer() {
        Buffer::Int32(v) => Buffer::Int32(v.iter().map(|&x| op.f(x)).collect()),
        Buffer::Float32(v) => Buffer::Float32(v.iter().map(|&x| op.f(x)).collect()),
        Buffer::Bool(_) => return Err(Error::dtype(Op::NAME, DType::Bool)),
    };
    Ok(Tensor::from_parts(inp.shape().clone(), data))
}

/// The broadcast output shape of `lhs` and `rhs`, and for every output
/// element the offset it reads in each operand.
fn broadcast_offsets(
    name: &str,
    lhs: &Tensor,
    rhs: &Tensor,
) -> Result<(Shape, Vec<usize>, Vec<usize>), Error> {
    let shape = broadcast_shapes(lhs.shape(), rhs.shape()).ok_or_else(|| Error::Broadcast {
        op: name.to_string(),
        lhs: lhs.shape().clone(),
        rhs: rhs.shape().clone(),
    })?;
    if lhs.shape() == rhs.shape() {
        let offsets: Vec<usize> = (0..shape.num_elements()).collect();
        return Ok((shape, offsets.clone(), offsets));
    }
    let l = strided_offsets(shape.dims(), &broadcast_strides(lhs.shape(), &shape));
    let r = strided_offsets(shape.dims(), &broadcast_strides(rhs.shape(), &shape));
    Ok((shape, l, r))
}

fn zip_map<E: Unit, O>(
    lhs: &[E],
    rhs: &[E],
    l_offsets: &[usize],
    r_offsets: &[usize],
    mut f: impl FnMut(E, E) -> O,
) -> Vec<O> {
    l_offsets
        .iter()
        .zip(r_offsets)
        .map(|(&i, &j)| f(lhs[i], rhs[j]))
        .collect()
}

/// Broadcasts `lhs` against `rhs`, converts both to `dtype`, and applies `op`
/// to every pair of elements.
pub(crate) fn try_binary_map<Op: BinaryKernelOp>(
    op: Op,
    lhs: &Tensor,
    rhs: &Tensor,
    dtype: DType,
) -> Result<Tensor, Error> {
    let (shape, lo, ro) = broadcast_offsets(Op::NAME, lhs, rhs)?;
    let (lhs, rhs) = (lhs.to_dtype(dtype), rhs.to_dtype(dtype));
    let data = match (lhs.buffer(), rhs.buffer()) {
        (Buffer::Int32(l), Buffer::Int32(r)) => {
            Buffer::Int32(zip_map(l, r, &lo, &ro, |x, y| op.f(x, y)))
        }
        (Buffer::Float32(l), Buffer::Float32(r)) => {
            Buffer::Float32(zip_map(l, r, &lo, &ro, |x, y| op.f(x, y)))
        }
        _ => return Err(Error::dtype(Op::NAME, dtype)),
    };
    Ok(Tensor::from_parts(shape, data))
}

/// Broadcasts `lhs` against `rhs`, promotes both to their common dtype, and
/// compares every pair of elements.
pub(crate) fn try_cmp_map<Op: CmpKernelOp>(op: Op, lhs: &Tensor, rhs: &Tensor) -> Result<Tensor, Error> {
    let (shape, lo, ro) = broadcast_offsets(Op::NAME, lhs, rhs)?;
    let dtype = lhs.dtype().promote(rhs.dtype());
    let (lhs, rhs) = (lhs.to_dtype(dtype), rhs.to_dtype(dtype));
    let data = match (lhs.buffer(), rhs.buffer()) {
        (Buffer::Bool(l), Buffer::Bool(r)) => zip_map(l, r, &lo, &ro, |x, y| op.f(x, y)),
        (Buffer::Int32(l), Buffer::Int32(r)) => zip_map(l, r, &lo, &ro, |x, y| op.f(x, y)),
        (Buffer::Float32(l), Buffer::Float32(r)) => zip_map(l, r, &lo, &ro, |x, y| op.f(x, y)),
        _ => unreachable!("both operands were converted to {dtype}"),
    };
    Ok(Tensor::from_parts(shape, Buffer::Bool(data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{tensor::TensorFrom, tests::TestDevice};

    #[derive(Default)]
    struct Max;
    impl BinaryKernelOp for Max {
        const NAME: &'static str = "max";
        fn f<E: Dtype>(&self, x: E, y: E) -> E {
            if x > y {
                x
            } else {
                y
            }
        }
    }

    #[test]
    fn test_binary_map_broadcasts() {
        let dev: TestDevice = Default::default();
        let a = dev.tensor([[1, 5], [3, 2]]);
        let b = dev.tensor([2, 4]);
        let c = try_binary_map(Max, &a, &b, DType::Int32).unwrap();
        assert_eq!(c.array::<[[i32; 2]; 2]>(), [[2, 5], [3, 4]]);

        let c = try_binary_map(Max, &dev.tensor(3), &a, DType::Float32).unwrap();
        assert_eq!(c.array::<[[f32; 2]; 2]>(), [[3.0, 5.0], [3.0, 3.0]]);
    }

    #[test]
    fn test_incompatible_shapes() {
        let dev: TestDevice = Default::default();
        let a = dev.tensor([1, 2, 3]);
        let b = dev.tensor([1, 2]);
        let r = try_binary_map(Max, &a, &b, DType::Int32);
        assert!(matches!(r, Err(Error::Broadcast { op, .. }) if op == "max"));
    }
}
