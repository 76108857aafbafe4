use crate::{
    registry::{Arity, BatchArgs, Op, OpRegistry, Params, PrintItem, VjpArgs},
    tensor::{Cpu, Error, Tensor},
    trace::{Tracer, Var},
};

/// One piece of a [Tracer::print] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintArg {
    Text(String),
    Value(Var),
}

impl From<&str> for PrintArg {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for PrintArg {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Var> for PrintArg {
    fn from(v: Var) -> Self {
        Self::Value(v)
    }
}

fn print_forward(dev: &Cpu, inputs: &[&Tensor], params: &Params) -> Result<Tensor, Error> {
    let items = params.print_items("print")?;
    let mut text = String::new();
    for item in items {
        match item {
            PrintItem::Text(s) => text.push_str(s),
            PrintItem::Input(i) => match inputs.get(*i) {
                Some(t) => text.push_str(&t.to_string()),
                None => {
                    return Err(Error::invalid_params(
                        "print",
                        format!("input {i} requested, {} given", inputs.len()),
                    ))
                }
            },
        }
        text.push('\n');
    }
    dev.emit(&text)?;
    Ok(inputs[0].clone())
}

/// Identity on the first input.
fn print_vjp(_: &mut Tracer, args: &VjpArgs<'_>) -> Result<Vec<Option<Var>>, Error> {
    let mut grads = vec![None; args.inputs.len()];
    grads[0] = Some(args.grad_out);
    Ok(grads)
}

/// Prints the whole batch in one call.
fn print_batch(t: &mut Tracer, args: &BatchArgs<'_>) -> Result<(Var, Option<usize>), Error> {
    let out = t.apply_op(args.op, args.inputs, args.params.clone())?;
    Ok((out, args.axes[0]))
}

pub(crate) fn register(registry: &mut OpRegistry) -> Result<(), Error> {
    registry.register(Op {
        name: "print",
        arity: Arity::Variadic { min: 1 },
        differentiable: true,
        forward: print_forward,
        vjp: print_vjp,
        batch: print_batch,
    })
}

impl Tracer {
    /// Writes every piece to the device's output sink, one per line, and
    /// returns the first value unchanged.
    ///
    /// The write happens when the call is executed: in order with other
    /// ops, and again each time a backward rule containing it runs.
    ///
    /// ```rust
    /// # use gradmap_core::prelude::*;
    /// let dev: Cpu = Cpu::default().with_sink(std::io::sink());
    /// let mut t = Tracer::new(&dev);
    /// let x = t.scalar(3);
    /// let y = t.print(vec!["input_x:".into(), x.into()]).unwrap();
    /// assert_eq!(t.value(y).unwrap(), t.value(x).unwrap());
    /// ```
    pub fn print(&mut self, items: Vec<PrintArg>) -> Result<Var, Error> {
        let mut inputs = Vec::new();
        let mut layout = Vec::new();
        for item in items {
            match item {
                PrintArg::Text(s) => layout.push(PrintItem::Text(s)),
                PrintArg::Value(v) => {
                    layout.push(PrintItem::Input(inputs.len()));
                    inputs.push(v);
                }
            }
        }
        self.apply("print", &inputs, Params::Print(layout))
    }
}
