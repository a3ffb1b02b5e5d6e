//! The seam between the harness and an inference engine.
//!
//! An [`Engine`] turns serialized bytes into a [`Graph`], a graph hands out
//! [`Session`]s, and a session runs one step. Implementations report failures
//! with the engine's own message; the pipeline decides what kind of failure it
//! is.

use std::fmt;

use serde::Serialize;

use crate::errors::ProbeResult;
use crate::loader::GraphBuffer;
use crate::synth::InputTensor;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementType {
    F16,
    F32,
    F64,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    Bool,
    String,
    Other(String),
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ElementType::Other(s) => write!(f, "{s}"),
            it => write!(f, "{}", format!("{it:?}").to_lowercase()),
        }
    }
}

/// Declared type and shape of an operation output, as the graph knows it
/// before anything runs. `dims` is `None` when the rank itself is unknown, and
/// free dimensions are reported as -1.
#[derive(Clone, Debug, PartialEq, Eq, new)]
pub struct TensorSignature {
    pub element_type: ElementType,
    pub dims: Option<Vec<i64>>,
}

impl fmt::Display for TensorSignature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.dims {
            None => write!(f, "?x{}", self.element_type),
            Some(dims) => {
                for d in dims {
                    if *d < 0 {
                        write!(f, "?x")?;
                    } else {
                        write!(f, "{d}x")?;
                    }
                }
                write!(f, "{}", self.element_type)
            }
        }
    }
}

/// Output handed back by a session, flattened in row-major order.
#[derive(Clone, Debug, PartialEq, Serialize, new)]
pub struct OutputTensor {
    pub shape: Vec<usize>,
    #[serde(rename = "values")]
    pub data: Vec<f32>,
}

impl OutputTensor {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Element count implied by the shape.
    pub fn num_elements(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

pub trait Engine {
    type Graph: Graph;

    /// Short engine name for logs and reports.
    fn name(&self) -> &'static str;

    /// Import a serialized graph, binding every node that does not pin its
    /// own device to `device`.
    fn import(&self, buffer: &GraphBuffer, device: &str) -> ProbeResult<Self::Graph>;
}

pub trait Graph {
    type Session: Session;

    fn has_operation(&self, name: &str) -> bool;

    /// Type and shape of output 0 of `name`.
    fn signature(&self, name: &str) -> ProbeResult<TensorSignature>;

    fn new_session(&self) -> ProbeResult<Self::Session>;
}

/// A session runs against the graph it was created from. Dropping a session
/// releases it, whatever state it is in.
pub trait Session {
    /// Feed one input, fetch one output. No control targets.
    fn run(&mut self, feed: (&str, &InputTensor), fetch: &str) -> ProbeResult<OutputTensor>;

    fn close(&mut self) -> ProbeResult<()>;

    fn delete(self) -> ProbeResult<()>;
}
