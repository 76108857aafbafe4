//! Runtime shapes, row-major strides, and broadcasting.
//!
//! Unlike compile-time shapes, a [Shape] here is just an ordered list of
//! dimension sizes. The rank is known only at runtime, which is what lets
//! vmap insert and remove batch dimensions on the fly.

mod broadcasts;

pub use broadcasts::broadcast_shapes;
pub(crate) use broadcasts::{broadcast_strides, strided_offsets};

/// An ordered sequence of dimension sizes. The empty shape is a scalar.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Shape(Vec<usize>);

impl Shape {
    pub fn new(dims: impl Into<Vec<usize>>) -> Self {
        Self(dims.into())
    }

    /// The rank 0 shape `[]`.
    pub fn scalar() -> Self {
        Self(Vec::new())
    }

    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Product of all dims; `1` for a scalar.
    pub fn num_elements(&self) -> usize {
        self.0.iter().product()
    }

    /// Row-major strides.
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = vec![1; self.rank()];
        for i in (0..self.rank().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * self.0[i + 1];
        }
        strides
    }

    /// A copy with `size` inserted at `axis`. `axis` may equal the rank.
    pub fn insert(&self, axis: usize, size: usize) -> Self {
        let mut dims = self.0.clone();
        dims.insert(axis, size);
        Self(dims)
    }

    /// A copy with `axis` removed.
    pub fn remove(&self, axis: usize) -> Self {
        let mut dims = self.0.clone();
        dims.remove(axis);
        Self(dims)
    }

    /// The shape obtained by reading dims in `perm` order.
    pub fn permuted(&self, perm: &[usize]) -> Self {
        Self(perm.iter().map(|&i| self.0[i]).collect())
    }
}

/// Resolves a possibly negative axis against `rank`.
///
/// `-1` is the last axis. Returns `None` when out of range.
pub fn normalize_axis(axis: isize, rank: usize) -> Option<usize> {
    let rank = rank as isize;
    let axis = if axis < 0 { axis + rank } else { axis };
    (0..rank).contains(&axis).then_some(axis as usize)
}

/// Returns true if `perm` contains every axis in `0..rank` exactly once.
pub fn is_permutation(perm: &[usize], rank: usize) -> bool {
    let mut seen = vec![false; rank];
    perm.len() == rank
        && perm.iter().all(|&p| {
            if p >= rank || seen[p] {
                return false;
            }
            seen[p] = true;
            true
        })
}

/// The permutation that undoes `perm`.
pub fn inverse_permutation(perm: &[usize]) -> Vec<usize> {
    let mut inv = vec![0; perm.len()];
    for (i, &p) in perm.iter().enumerate() {
        inv[p] = i;
    }
    inv
}

impl std::fmt::Debug for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{d}")?;
        }
        f.write_str("]")
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self(dims.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self(dims.to_vec())
    }
}

impl From<&Shape> for Shape {
    fn from(shape: &Shape) -> Self {
        shape.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strides() {
        assert_eq!(Shape::new([2, 3, 4]).strides(), vec![12, 4, 1]);
        assert_eq!(Shape::scalar().strides(), Vec::<usize>::new());
        assert_eq!(Shape::scalar().num_elements(), 1);
        assert_eq!(Shape::new([3, 0]).num_elements(), 0);
    }

    #[test]
    fn test_normalize_axis() {
        assert_eq!(normalize_axis(-1, 3), Some(2));
        assert_eq!(normalize_axis(-3, 3), Some(0));
        assert_eq!(normalize_axis(-4, 3), None);
        assert_eq!(normalize_axis(3, 3), None);
        assert_eq!(normalize_axis(0, 0), None);
    }

    #[test]
    fn test_permutations() {
        assert!(is_permutation(&[2, 0, 1], 3));
        assert!(!is_permutation(&[0, 0, 1], 3));
        assert!(!is_permutation(&[0, 1], 3));
        assert_eq!(inverse_permutation(&[2, 0, 1]), vec![1, 2, 0]);
        assert_eq!(
            Shape::new([2, 3, 4]).permuted(&[2, 0, 1]),
            Shape::new([4, 2, 3])
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Shape::new([2, 2]).to_string(), "[2, 2]");
        assert_eq!(Shape::scalar().to_string(), "[]");
    }
}
