//! Built-in operations on tensors.
//!
//! Every op is a forward kernel, a vjp rule and a batch rule registered in
//! an [crate::registry::OpRegistry] under a unique name, plus a method on
//! [crate::trace::Tracer] that calls it by that name:
//!
//! | group | ops |
//! |-------|-----|
//! | arithmetic | `add`, `sub`, `mul`, `div`, `neg`, `relu` |
//! | comparison | `equal`, `not_equal`, `greater`, `greater_equal`, `less`, `less_equal` |
//! | rounding | `floor` |
//! | shape | `flatten`, `reshape`, `permute`, `broadcast_to`, `sum_to` |
//! | dtype | `cast` |
//! | side effects | `print` |
//!
//! # Broadcasting
//!
//! Binary elementwise ops broadcast their operands numpy style: trailing
//! dims are aligned and size 1 dims stretch. The vjp of a broadcast
//! operand is summed back down with `sum_to`.
//!
//! # Dtypes
//!
//! Mixed operands are promoted to the larger dtype. Arithmetic on two
//! booleans runs in `Int32`, and `div` always produces `Float32`.
//!
//! ```rust
//! # use gradmap_core::prelude::*;
//! fn f(t: &mut Tracer, xs: &[Var]) -> Result<Vec<Var>, Error> {
//!     let y = t.add(xs[0], xs[1])?;
//!     Ok(vec![t.sum_to(y, Shape::scalar())?])
//! }
//! let dev: Cpu = Default::default();
//! let out = forward(&dev, &f, &[dev.tensor([[1, 2], [3, 4]]), dev.tensor(0.5)]).unwrap();
//! assert_eq!(out[0].dtype(), DType::Float32);
//! assert_eq!(out[0].array::<f32>(), 12.0);
//! ```

mod arith;
mod broadcast_to;
mod cast;
mod cmp;
mod flatten;
mod floor;
mod permute_to;
mod print;
mod reshape_to;
mod sum_to;
pub(crate) mod utilities;

pub use flatten::flatten_shape;
pub use print::PrintArg;

use crate::{registry::OpRegistry, tensor::Error};

pub(crate) fn register_builtins(registry: &mut OpRegistry) -> Result<(), Error> {
    arith::register(registry)?;
    cmp::register(registry)?;
    floor::register(registry)?;
    flatten::register(registry)?;
    reshape_to::register(registry)?;
    permute_to::register(registry)?;
    broadcast_to::register(registry)?;
    sum_to::register(registry)?;
    cast::register(registry)?;
    print::register(registry)?;
    Ok(())
}
