use super::Var;
use crate::{autodiff::BackwardRule, registry::Op, registry::Params};

/// One entry of a [ComputationTrace].
#[derive(Clone)]
pub enum Record {
    /// A registered op, differentiated with its vjp rule.
    Op {
        op: Op,
        inputs: Vec<Var>,
        output: Var,
        params: Params,
    },
    /// A computation with its own backward rule. The ops it issued during
    /// the forward pass are not recorded.
    Custom {
        backward: BackwardRule,
        inputs: Vec<Var>,
        output: Var,
    },
}

impl Record {
    pub fn name(&self) -> &'static str {
        match self {
            Record::Op { op, .. } => op.name,
            Record::Custom { .. } => "custom",
        }
    }

    pub fn inputs(&self) -> &[Var] {
        match self {
            Record::Op { inputs, .. } | Record::Custom { inputs, .. } => inputs,
        }
    }

    pub fn output(&self) -> Var {
        match self {
            Record::Op { output, .. } | Record::Custom { output, .. } => *output,
        }
    }
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("name", &self.name())
            .field("inputs", &self.inputs())
            .field("output", &self.output())
            .finish()
    }
}

/// The ops of one forward evaluation, in execution order.
///
/// Append-only while the function runs; consumed in reverse by the autodiff
/// engine and then dropped.
#[derive(Clone, Debug, Default)]
pub struct ComputationTrace {
    records: Vec<Record>,
}

impl ComputationTrace {
    pub(crate) fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// The op names in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.records.iter().map(Record::name).collect()
    }
}

impl<'a> IntoIterator for &'a ComputationTrace {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;
    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
