//! The one-shot run, as a strictly ordered sequence of stages.
//!
//! `Loaded → Imported → ShapeResolved → InputBuilt → SessionCreated →
//! Executed → SessionClosed → SessionDeleted → Printed`
//!
//! Any failure stops the sequence where it happened. The output is only read
//! once the session has been both closed and deleted.

use std::io::Write;
use std::time::Instant;

use crate::config::RunConfig;
use crate::engine::{Engine, Graph, OutputTensor, Session, TensorSignature};
use crate::errors::{ProbeError, SessionStage};
use crate::loader::GraphBuffer;
use crate::print::print_output;
use crate::shape::ResolvedShape;
use crate::synth::InputTensor;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Loaded,
    Imported,
    ShapeResolved,
    InputBuilt,
    SessionCreated,
    Executed,
    SessionClosed,
    SessionDeleted,
    Printed,
}

#[derive(Clone, Debug)]
pub struct RunReport {
    pub engine: &'static str,
    pub input_signature: TensorSignature,
    pub input_shape: ResolvedShape,
    pub output: OutputTensor,
    pub stages: Vec<Stage>,
}

pub struct Pipeline<'a, E: Engine> {
    engine: &'a E,
    config: &'a RunConfig,
    stages: Vec<Stage>,
}

impl<'a, E: Engine> Pipeline<'a, E> {
    pub fn new(engine: &'a E, config: &'a RunConfig) -> Pipeline<'a, E> {
        Pipeline { engine, config, stages: vec![] }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn last_stage(&self) -> Option<Stage> {
        self.stages.last().copied()
    }

    fn reach(&mut self, stage: Stage) {
        debug!("[{}] {:?} -> {:?}", self.engine.name(), self.last_stage(), stage);
        self.stages.push(stage);
    }

    pub fn load(&mut self) -> Result<GraphBuffer, ProbeError> {
        let buffer = GraphBuffer::for_path(&self.config.model)?;
        info!("Loaded {:?} ({} bytes)", self.config.model, buffer.len());
        self.reach(Stage::Loaded);
        Ok(buffer)
    }

    /// Imports and releases the serialized bytes.
    pub fn import(&mut self, buffer: GraphBuffer) -> Result<E::Graph, ProbeError> {
        let start = Instant::now();
        let graph =
            self.engine.import(&buffer, &self.config.device).map_err(ProbeError::import)?;
        drop(buffer);
        info!(
            "[{}] Graph imported on {:?} in {:?}",
            self.engine.name(),
            self.config.device,
            start.elapsed()
        );
        self.reach(Stage::Imported);
        Ok(graph)
    }

    /// Checks both named operations exist, then binds the input shape.
    pub fn resolve(
        &mut self,
        graph: &E::Graph,
    ) -> Result<(TensorSignature, ResolvedShape), ProbeError> {
        for name in [&self.config.input, &self.config.output] {
            if !graph.has_operation(name) {
                return Err(ProbeError::MissingOperation(name.clone()));
            }
        }
        let signature = graph
            .signature(&self.config.input)
            .map_err(|e| ProbeError::Shape(format!("{e:#}")))?;
        let Some(dims) = &signature.dims else {
            return Err(ProbeError::Shape(format!(
                "rank of {:?} is unknown",
                self.config.input
            )));
        };
        let shape = ResolvedShape::resolve(dims)?;
        info!("Input {:?} declared as {}, resolved to {}", self.config.input, signature, shape);
        self.reach(Stage::ShapeResolved);
        Ok((signature, shape))
    }

    pub fn build_input(
        &mut self,
        signature: &TensorSignature,
        shape: ResolvedShape,
    ) -> Result<InputTensor, ProbeError> {
        let input = InputTensor::synthesize_for(&signature.element_type, shape, self.config.seed)?;
        debug!("Synthesized {} input values with seed {}", input.num_elements(), self.config.seed);
        self.reach(Stage::InputBuilt);
        Ok(input)
    }

    /// Load, import, resolve and synthesize.
    pub fn prepare(&mut self) -> Result<(E::Graph, TensorSignature, InputTensor), ProbeError> {
        let buffer = self.load()?;
        let graph = self.import(buffer)?;
        let (signature, shape) = self.resolve(&graph)?;
        let input = self.build_input(&signature, shape)?;
        Ok((graph, signature, input))
    }

    /// Runs the whole session lifecycle. The output is only returned after
    /// close and delete both succeeded.
    pub fn execute(
        &mut self,
        graph: &E::Graph,
        input: InputTensor,
    ) -> Result<OutputTensor, ProbeError> {
        let mut session =
            graph.new_session().map_err(|e| ProbeError::session(SessionStage::Create, e))?;
        self.reach(Stage::SessionCreated);

        let start = Instant::now();
        let output = session
            .run((self.config.input.as_str(), &input), &self.config.output)
            .map_err(|e| ProbeError::session(SessionStage::Run, e))?;
        drop(input);
        info!("[{}] Step ran in {:?}", self.engine.name(), start.elapsed());
        self.reach(Stage::Executed);

        session.close().map_err(|e| ProbeError::session(SessionStage::Close, e))?;
        self.reach(Stage::SessionClosed);
        session.delete().map_err(|e| ProbeError::session(SessionStage::Delete, e))?;
        self.reach(Stage::SessionDeleted);

        if output.is_empty() {
            return Err(ProbeError::NullResult(format!("{:?} produced no value", self.config.output)));
        }
        if output.len() != output.num_elements() {
            return Err(ProbeError::NullResult(format!(
                "{:?} has shape {:?} but holds {} values",
                self.config.output,
                output.shape,
                output.len()
            )));
        }
        Ok(output)
    }

    pub fn print<W: Write + ?Sized>(
        &mut self,
        out: &mut W,
        output: &OutputTensor,
    ) -> Result<(), ProbeError> {
        print_output(out, output, self.config.format)?;
        self.reach(Stage::Printed);
        Ok(())
    }
}

/// The full run: every stage, in order, output printed to `out`.
pub fn run_once<E: Engine, W: Write + ?Sized>(
    engine: &E,
    config: &RunConfig,
    out: &mut W,
) -> Result<RunReport, ProbeError> {
    let mut pipeline = Pipeline::new(engine, config);
    let (graph, input_signature, input) = pipeline.prepare()?;
    let input_shape = input.shape().clone();
    let output = pipeline.execute(&graph, input)?;
    pipeline.print(out, &output)?;
    Ok(RunReport {
        engine: engine.name(),
        input_signature,
        input_shape,
        output,
        stages: pipeline.stages,
    })
}
