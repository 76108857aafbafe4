//! # gradmap
//!
//! Neural network style building blocks on top of [gradmap_core]: a
//! [nn::Module] trait, a handful of layers, [nn::Cell]s with a custom
//! backward, and [GradOperation] for taking gradients with respect to all
//! inputs.
//!
//! Everything in [gradmap_core] is re-exported here.
//!
//! ```rust
//! # use gradmap::prelude::*;
//! let dev: Cpu = Default::default();
//! let model = function((Flatten, Floor));
//! let out = forward(&dev, &model, &[dev.tensor([[[1.5, -0.5], [2.0, 3.9]]])]).unwrap();
//! assert_eq!(out[0].array::<[[f32; 4]; 1]>(), [[1.0, -1.0, 2.0, 3.0]]);
//! ```

mod grad_operation;
pub mod nn;

pub use gradmap_core::*;
pub use grad_operation::GradOperation;

pub mod prelude {
    pub use crate::nn::*;
    pub use crate::GradOperation;
    pub use gradmap_core::prelude::*;
}
