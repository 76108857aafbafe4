use crate::{dtypes::DType, shapes::Shape, tensor::Error};

/// Static parameters of a single op invocation.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Params {
    #[default]
    None,
    /// Target shape for `reshape`, `broadcast_to` and `sum_to`.
    Shape(Shape),
    /// Axis order for `permute`.
    Permutation(Vec<usize>),
    /// Target dtype for `cast`.
    DType(DType),
    /// Layout of a `print` call.
    Print(Vec<PrintItem>),
}

/// One piece of a `print` call: literal text or the input at that index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrintItem {
    Text(String),
    Input(usize),
}

impl Params {
    pub(crate) fn shape(&self, op: &str) -> Result<&Shape, Error> {
        match self {
            Params::Shape(s) => Ok(s),
            p => Err(Error::invalid_params(op, format!("expected a shape, found {p:?}"))),
        }
    }

    pub(crate) fn permutation(&self, op: &str) -> Result<&[usize], Error> {
        match self {
            Params::Permutation(p) => Ok(p),
            p => Err(Error::invalid_params(
                op,
                format!("expected a permutation, found {p:?}"),
            )),
        }
    }

    pub(crate) fn dtype(&self, op: &str) -> Result<DType, Error> {
        match self {
            Params::DType(d) => Ok(*d),
            p => Err(Error::invalid_params(op, format!("expected a dtype, found {p:?}"))),
        }
    }

    pub(crate) fn print_items(&self, op: &str) -> Result<&[PrintItem], Error> {
        match self {
            Params::Print(items) => Ok(items),
            p => Err(Error::invalid_params(
                op,
                format!("expected a print layout, found {p:?}"),
            )),
        }
    }
}
