use super::Module;
use gradmap_core::{
    registry::{Params, PrintItem},
    tensor::Error,
    trace::{Tracer, Var},
};

/// Prints a fixed layout of text and inputs, then returns its first input.
///
/// ```rust
/// # use gradmap::prelude::*;
/// let print = Print::new().text("input_x:").input(0).text("input_y:").input(1);
/// let dev: Cpu = Cpu::default().with_sink(std::io::sink());
/// let out = forward(&dev, &function(print), &[dev.tensor(3), dev.tensor(4)]).unwrap();
/// assert_eq!(out[0].array::<i32>(), 3);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Print {
    layout: Vec<PrintItem>,
}

impl Print {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line of literal text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.layout.push(PrintItem::Text(text.into()));
        self
    }

    /// Appends the module input at `index`.
    pub fn input(mut self, index: usize) -> Self {
        self.layout.push(PrintItem::Input(index));
        self
    }
}

impl Module<Vec<Var>> for Print {
    type Output = Var;
    fn try_forward(&self, t: &mut Tracer, xs: Vec<Var>) -> Result<Var, Error> {
        t.apply("print", &xs, Params::Print(self.layout.clone()))
    }
}
