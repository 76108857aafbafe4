//! Modules are reusable pieces of a traced function.
//!
//! A [Module] maps its input to an output with a [Tracer], issuing ops as
//! it goes. Tuples of modules run in sequence, and [function] turns any
//! module into a plain function that [forward](crate::trace::forward),
//! [grad](crate::autodiff::grad) and [vmap](crate::vmap::vmap) accept.

mod cell;
mod flatten;
mod floor;
mod greater_equal;
mod print;
mod relu;
mod tuples;

pub use cell::Cell;
pub use flatten::Flatten;
pub use floor::Floor;
pub use greater_equal::GreaterEqual;
pub use print::Print;
pub use relu::ReLU;

use gradmap_core::{
    tensor::Error,
    trace::{Tracer, Var},
};

pub trait Module<X> {
    type Output;

    fn try_forward(&self, t: &mut Tracer, x: X) -> Result<Self::Output, Error>;
}

/// Module inputs that can be built from the arguments of a function.
pub trait FromArgs: Sized {
    fn from_args(args: &[Var]) -> Result<Self, Error>;
}

/// Module outputs that can be returned from a function.
pub trait IntoOutputs {
    fn into_outputs(self) -> Vec<Var>;
}

fn expect_args(args: &[Var], n: usize) -> Result<(), Error> {
    if args.len() == n {
        Ok(())
    } else {
        Err(Error::ArityMismatch {
            op: "module".to_string(),
            expected: n.to_string(),
            found: args.len(),
        })
    }
}

impl FromArgs for Var {
    fn from_args(args: &[Var]) -> Result<Self, Error> {
        expect_args(args, 1)?;
        Ok(args[0])
    }
}

impl FromArgs for (Var, Var) {
    fn from_args(args: &[Var]) -> Result<Self, Error> {
        expect_args(args, 2)?;
        Ok((args[0], args[1]))
    }
}

impl FromArgs for Vec<Var> {
    fn from_args(args: &[Var]) -> Result<Self, Error> {
        Ok(args.to_vec())
    }
}

impl IntoOutputs for Var {
    fn into_outputs(self) -> Vec<Var> {
        vec![self]
    }
}

impl IntoOutputs for (Var, Var) {
    fn into_outputs(self) -> Vec<Var> {
        vec![self.0, self.1]
    }
}

impl IntoOutputs for Vec<Var> {
    fn into_outputs(self) -> Vec<Var> {
        self
    }
}

/// Wraps `module` as a function of its arguments.
///
/// Fails with [Error::ArityMismatch] when called with a number of arguments
/// the module's input cannot be built from.
pub fn function<X, M>(module: M) -> impl Fn(&mut Tracer, &[Var]) -> Result<Vec<Var>, Error>
where
    X: FromArgs,
    M: Module<X>,
    M::Output: IntoOutputs,
{
    move |t: &mut Tracer, args: &[Var]| -> Result<Vec<Var>, Error> {
        let x = X::from_args(args)?;
        Ok(module.try_forward(t, x)?.into_outputs())
    }
}
