use std::sync::Arc;

use tensorflow as tf;
use tensorflow::{
    DataType, Graph, ImportGraphDefOptions, Output, Session, SessionOptions, SessionRunArgs,
};

use tfprobe_core::anyhow::{self, Context, bail, format_err};
use tfprobe_core::engine::{self, ElementType, OutputTensor, TensorSignature};
use tfprobe_core::errors::ProbeResult;
use tfprobe_core::loader::GraphBuffer;
use tfprobe_core::shape::FREE_DIM;
use tfprobe_core::synth::InputTensor;

// tf::Status holds a raw pointer, so it can not travel inside an anyhow::Error.
fn status(s: tf::Status) -> anyhow::Error {
    format_err!("{}", s)
}

pub fn element_type(dt: DataType) -> ElementType {
    match dt {
        DataType::Bool => ElementType::Bool,
        DataType::UInt8 => ElementType::U8,
        DataType::UInt16 => ElementType::U16,
        DataType::Int8 => ElementType::I8,
        DataType::Int16 => ElementType::I16,
        DataType::Int32 => ElementType::I32,
        DataType::Int64 => ElementType::I64,
        DataType::Half => ElementType::F16,
        DataType::Float => ElementType::F32,
        DataType::Double => ElementType::F64,
        DataType::String => ElementType::String,
        other => ElementType::Other(format!("{other:?}")),
    }
}

/// Runs frozen graphs with the TensorFlow C library.
#[derive(Default)]
pub struct NativeEngine;

impl NativeEngine {
    pub fn new() -> NativeEngine {
        NativeEngine
    }
}

impl engine::Engine for NativeEngine {
    type Graph = NativeGraph;

    fn name(&self) -> &'static str {
        "tensorflow"
    }

    fn import(&self, buffer: &GraphBuffer, device: &str) -> ProbeResult<NativeGraph> {
        let mut options = ImportGraphDefOptions::new();
        if !device.is_empty() {
            options.set_default_device(device).context("Invalid device name")?;
        }
        let mut graph = Graph::new();
        graph.import_graph_def(buffer.as_bytes(), &options).map_err(status)?;
        debug!("Imported {} operations", graph.operation_iter().count());
        Ok(NativeGraph { graph: Arc::new(graph) })
    }
}

pub struct NativeGraph {
    graph: Arc<Graph>,
}

impl NativeGraph {
    pub fn graph(&self) -> &Graph {
        &self.graph
    }
}

impl engine::Graph for NativeGraph {
    type Session = NativeSession;

    fn has_operation(&self, name: &str) -> bool {
        matches!(self.graph.operation_by_name(name), Ok(Some(_)))
    }

    fn signature(&self, name: &str) -> ProbeResult<TensorSignature> {
        let operation = self.graph.operation_by_name_required(name).map_err(status)?;
        let element_type = element_type(operation.output_type(0));
        let shape = self.graph.tensor_shape(Output { operation, index: 0 }).map_err(status)?;
        let dims = shape
            .dims()
            .map(|rank| (0..rank).map(|ix| shape[ix].unwrap_or(FREE_DIM)).collect());
        Ok(TensorSignature::new(element_type, dims))
    }

    fn new_session(&self) -> ProbeResult<NativeSession> {
        let session = Session::new(&SessionOptions::new(), &self.graph).map_err(status)?;
        if log_enabled!(log::Level::Debug) {
            for device in session.device_list().map_err(status)? {
                debug!("Session device {} ({})", device.name, device.device_type);
            }
        }
        Ok(NativeSession { graph: Arc::clone(&self.graph), session: Some(session) })
    }
}

/// Closing keeps the handle alive, deleting releases it.
pub struct NativeSession {
    graph: Arc<Graph>,
    session: Option<Session>,
}

impl engine::Session for NativeSession {
    fn run(&mut self, feed: (&str, &InputTensor), fetch: &str) -> ProbeResult<OutputTensor> {
        let (name, input) = feed;
        let session = self.session.as_ref().context("Session is deleted")?;
        let input_op = self.graph.operation_by_name_required(name).map_err(status)?;
        let output_op = self.graph.operation_by_name_required(fetch).map_err(status)?;
        if output_op.output_type(0) != DataType::Float {
            bail!("Output {:?} is {:?}, expected float", fetch, output_op.output_type(0));
        }
        let dims: Vec<u64> = input.shape().dims().iter().map(|&d| d as u64).collect();
        let tensor = tf::Tensor::<f32>::new(&dims).with_values(input.data()).map_err(status)?;

        let mut args = SessionRunArgs::new();
        args.add_feed(&input_op, 0, &tensor);
        let token = args.request_fetch(&output_op, 0);
        session.run(&mut args).map_err(status)?;

        let output: tf::Tensor<f32> = args.fetch(token).map_err(status)?;
        let shape = output.dims().iter().map(|&d| d as usize).collect();
        Ok(OutputTensor::new(shape, output.to_vec()))
    }

    fn close(&mut self) -> ProbeResult<()> {
        let session = self.session.as_mut().context("Session is deleted")?;
        session.close().map_err(status)
    }

    fn delete(mut self) -> ProbeResult<()> {
        let session = self.session.take().context("Session is already deleted")?;
        drop(session);
        Ok(())
    }
}
