//! # gradmap-core
//!
//! A small reverse-mode autodiff and batched-execution core for elementwise
//! and shape-manipulating tensor ops, written entirely in rust.
//!
//! The following sections give the high level concepts. There is more
//! detailed documentation in each submodule.
//!
//! # Shapes & Tensors
//!
//! *See [dtypes], [shapes], and [tensor] for more information.*
//!
//! A [`tensor::Tensor`] is an immutable nd-array with two runtime parts:
//! 1. Shape ([shapes]), an ordered list of dims
//! 2. Dtype ([dtypes]), one of `Bool`, `Int32` and `Float32`
//!
//! Tensors are allocated with a [`tensor::Cpu`] device:
//!
//! ```rust
//! # use gradmap_core::prelude::*;
//! let dev: Cpu = Default::default();
//! let a = dev.tensor([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
//! assert_eq!(a.shape().dims(), &[2, 3]);
//! assert_eq!(a.dtype(), DType::Float32);
//! ```
//!
//! # Ops and functions
//!
//! *See [registry], [tensor_ops] and [trace] for more information.*
//!
//! Every op lives in an [`registry::OpRegistry`] as a forward kernel, a vjp
//! rule and a batch rule. A function is any closure
//! `Fn(&mut Tracer, &[Var]) -> Result<Vec<Var>, Error>` that combines ops:
//!
//! ```rust
//! # use gradmap_core::prelude::*;
//! fn ge(t: &mut Tracer, xs: &[Var]) -> Result<Vec<Var>, Error> {
//!     Ok(vec![t.greater_equal(xs[0], xs[1])?])
//! }
//! let dev: Cpu = Default::default();
//! let out = forward(&dev, &ge, &[dev.tensor([1, 2, 3]), dev.tensor([1, 1, 4])]).unwrap();
//! assert_eq!(out[0].array::<[bool; 3]>(), [true, true, false]);
//! ```
//!
//! # Transformations
//!
//! *See [autodiff] and [vmap] for more information.*
//!
//! The same function can be differentiated with [`autodiff::grad`] or lifted
//! over a batch dim with [`vmap::vmap`]. Transformations return plain
//! functions again, so they compose:
//!
//! ```rust
//! # use gradmap_core::prelude::*;
//! fn floor(t: &mut Tracer, xs: &[Var]) -> Result<Vec<Var>, Error> {
//!     Ok(vec![t.floor(xs[0])?])
//! }
//! let dev: Cpu = Default::default();
//! let x = dev.tensor([[[1.1, 2.5], [-1.5, 1.1]]]);
//! let f = vmap(vmap(floor, 0, 0), 0, 0);
//! let out = forward(&dev, &f, &[x]).unwrap();
//! assert_eq!(out[0].array::<[[[f32; 2]; 2]; 1]>(), [[[1.0, 2.0], [-2.0, 1.0]]]);
//! ```

pub mod autodiff;
pub mod dtypes;
pub mod registry;
pub mod shapes;
pub mod tensor;
pub mod tensor_ops;
pub mod trace;
pub mod vmap;

/// Contains subset of all public exports.
pub mod prelude {
    pub use crate::autodiff::*;
    pub use crate::dtypes::DType;
    pub use crate::registry::*;
    pub use crate::shapes::*;
    pub use crate::tensor::*;
    pub use crate::tensor_ops::*;
    pub use crate::trace::*;
    pub use crate::vmap::*;
}
