use crate::{
    tensor::Error,
    trace::{Tracer, Var},
};

/// Gradients of the traced outputs, keyed by the index of the [Var] they
/// belong to.
///
/// Each entry is itself a value in the tracer's arena, so gradients can be
/// fed to further ops (a custom backward rule does exactly that).
#[derive(Clone, Debug, Default)]
pub struct Gradients {
    by_index: Vec<Option<Var>>,
}

impl Gradients {
    pub fn get(&self, v: Var) -> Option<Var> {
        self.by_index.get(v.index()).copied().flatten()
    }

    /// Sets the gradient of `v`, replacing whatever was there.
    pub(crate) fn insert(&mut self, v: Var, grad: Var) {
        if self.by_index.len() <= v.index() {
            self.by_index.resize(v.index() + 1, None);
        }
        self.by_index[v.index()] = Some(grad);
    }

    /// Adds `grad` to the gradient of `v`, so that a value used in several
    /// places receives the sum of every contribution.
    pub(crate) fn accumulate(&mut self, t: &mut Tracer, v: Var, grad: Var) -> Result<(), Error> {
        let summed = match self.get(v) {
            Some(prev) => t.add(prev, grad)?,
            None => grad,
        };
        self.insert(v, summed);
        Ok(())
    }
}
