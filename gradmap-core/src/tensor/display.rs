//! The textual form written by the `print` op.
//!
//! ```text
//! Tensor(shape=[], dtype=Int32, value=3)
//! Tensor(shape=[2, 2], dtype=Float32, value=
//! [[ 5.00000000e+00  5.00000000e+00]
//!  [ 5.00000000e+00  5.00000000e+00]])
//! ```

use super::{Buffer, Tensor};

/// `%.8e` with a 2 digit signed exponent and a sign column.
fn format_float(x: f32) -> String {
    if x.is_nan() {
        return " nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { " inf" } else { "-inf" }.to_string();
    }
    let s = format!("{:.8e}", x.abs());
    let (mantissa, exp) = s.split_once('e').unwrap_or((s.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let sign = if x.is_sign_negative() && x != 0.0 { '-' } else { ' ' };
    let exp_sign = if exp < 0 { '-' } else { '+' };
    format!("{sign}{mantissa}e{exp_sign}{:02}", exp.abs())
}

fn format_elements(buf: &Buffer) -> Vec<String> {
    match buf {
        Buffer::Float32(v) => v.iter().map(|&x| format_float(x)).collect(),
        Buffer::Int32(v) => pad(v.iter().map(|x| x.to_string()).collect()),
        Buffer::Bool(v) => pad(
            v.iter()
                .map(|&x| if x { "True" } else { "False" }.to_string())
                .collect(),
        ),
    }
}

/// Right-aligns every element to the widest one.
fn pad(elems: Vec<String>) -> Vec<String> {
    let width = elems.iter().map(|e| e.len()).max().unwrap_or(0);
    elems
        .into_iter()
        .map(|e| format!("{e:>width$}"))
        .collect()
}

fn write_nested(
    f: &mut std::fmt::Formatter<'_>,
    dims: &[usize],
    elems: &[String],
    depth: usize,
) -> std::fmt::Result {
    f.write_str("[")?;
    if let Some((&n, rest)) = dims.split_first() {
        let step: usize = rest.iter().product();
        for i in 0..n {
            if i > 0 {
                if rest.is_empty() {
                    f.write_str(" ")?;
                } else {
                    for _ in 0..rest.len() {
                        f.write_str("\n")?;
                    }
                    for _ in 0..=depth {
                        f.write_str(" ")?;
                    }
                }
            }
            if rest.is_empty() {
                f.write_str(&elems[i])?;
            } else {
                write_nested(f, rest, &elems[i * step..(i + 1) * step], depth + 1)?;
            }
        }
    }
    f.write_str("]")
}

impl std::fmt::Display for Tensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tensor(shape={}, dtype={}, value=", self.shape, self.dtype())?;
        let elems = format_elements(&self.data);
        if self.shape.rank() == 0 {
            f.write_str(elems[0].trim_start())?;
        } else {
            f.write_str("\n")?;
            write_nested(f, self.shape.dims(), &elems, 0)?;
        }
        f.write_str(")")
    }
}
