use super::Shape;

/// The shape two operands broadcast to, aligning trailing dims.
///
/// Size-1 dims stretch. Returns `None` if a pair of dims differ and
/// neither is `1`.
pub fn broadcast_shapes(lhs: &Shape, rhs: &Shape) -> Option<Shape> {
    let rank = lhs.rank().max(rhs.rank());
    let mut dims = vec![0; rank];
    for i in 0..rank {
        let l = dim_from_back(lhs, rank - 1 - i);
        let r = dim_from_back(rhs, rank - 1 - i);
        dims[i] = match (l, r) {
            (a, b) if a == b => a,
            (1, b) => b,
            (a, 1) => a,
            _ => return None,
        };
    }
    Some(Shape::new(dims))
}

fn dim_from_back(shape: &Shape, from_back: usize) -> usize {
    let rank = shape.rank();
    if from_back < rank {
        shape.dims()[rank - 1 - from_back]
    } else {
        1
    }
}

/// Strides of `src` laid over `dst`: `0` on every broadcast dim.
///
/// `src` must already be broadcast-compatible with `dst`.
pub(crate) fn broadcast_strides(src: &Shape, dst: &Shape) -> Vec<usize> {
    let src_strides = src.strides();
    let offset = dst.rank() - src.rank();
    (0..dst.rank())
        .map(|i| {
            if i < offset || src.dims()[i - offset] == 1 {
                0
            } else {
                src_strides[i - offset]
            }
        })
        .collect()
}

/// Buffer offsets of every element of `dims` in row-major order, given the
/// strides of each dim into the source buffer.
pub(crate) fn strided_offsets(dims: &[usize], strides: &[usize]) -> Vec<usize> {
    debug_assert_eq!(dims.len(), strides.len());
    let numel: usize = dims.iter().product();
    let mut offsets = Vec::with_capacity(numel);
    if numel == 0 {
        return offsets;
    }
    let mut index = vec![0usize; dims.len()];
    let mut offset = 0usize;
    for _ in 0..numel {
        offsets.push(offset);
        for d in (0..dims.len()).rev() {
            index[d] += 1;
            offset += strides[d];
            if index[d] < dims[d] {
                break;
            }
            offset -= strides[d] * dims[d];
            index[d] = 0;
        }
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_shapes() {
        let s = |d: &[usize]| Shape::from(d);
        assert_eq!(broadcast_shapes(&s(&[3]), &s(&[3])), Some(s(&[3])));
        assert_eq!(broadcast_shapes(&s(&[2, 1]), &s(&[3])), Some(s(&[2, 3])));
        assert_eq!(broadcast_shapes(&s(&[]), &s(&[4, 2])), Some(s(&[4, 2])));
        assert_eq!(
            broadcast_shapes(&s(&[5, 1, 2]), &s(&[3, 1])),
            Some(s(&[5, 3, 2]))
        );
        assert_eq!(broadcast_shapes(&s(&[2]), &s(&[3])), None);
    }

    #[test]
    fn test_broadcast_offsets() {
        let src = Shape::new([2, 1]);
        let dst = Shape::new([2, 3]);
        let offsets = strided_offsets(dst.dims(), &broadcast_strides(&src, &dst));
        assert_eq!(offsets, vec![0, 0, 0, 1, 1, 1]);

        let src = Shape::new([3]);
        let offsets = strided_offsets(dst.dims(), &broadcast_strides(&src, &dst));
        assert_eq!(offsets, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn test_permuted_offsets() {
        // transpose of a [2, 3] row-major buffer
        let offsets = strided_offsets(&[3, 2], &[1, 3]);
        assert_eq!(offsets, vec![0, 3, 1, 4, 2, 5]);
        assert_eq!(strided_offsets(&[], &[]), vec![0]);
        assert!(strided_offsets(&[0, 2], &[2, 1]).is_empty());
    }
}
