use tfprobe_core::anyhow::{Context, bail};
use tfprobe_core::device::DeviceSpec;
use tfprobe_core::engine::{self, ElementType, OutputTensor, TensorSignature};
use tfprobe_core::errors::ProbeResult;
use tfprobe_core::loader::GraphBuffer;
use tfprobe_core::shape::FREE_DIM;
use tfprobe_core::synth::InputTensor;
use tract_tensorflow::prelude::*;
use tract_tensorflow::tract_hir::internal::*;

/// Runs frozen graphs with tract.
pub struct TractEngine {
    tf: tract_tensorflow::Tensorflow,
}

impl Default for TractEngine {
    fn default() -> TractEngine {
        TractEngine { tf: tract_tensorflow::tensorflow() }
    }
}

impl TractEngine {
    pub fn new() -> TractEngine {
        TractEngine::default()
    }
}

/// tract has nothing but the CPU to place nodes on.
fn check_device(device: &str) -> ProbeResult<()> {
    let spec = DeviceSpec::parse(device)?;
    if !spec.is_cpu() {
        bail!("Device {:?} is not available (tract only runs on CPU)", device);
    }
    Ok(())
}

pub fn element_type(dt: DatumType) -> ElementType {
    match dt {
        DatumType::Bool => ElementType::Bool,
        DatumType::U8 => ElementType::U8,
        DatumType::U16 => ElementType::U16,
        DatumType::I8 => ElementType::I8,
        DatumType::I16 => ElementType::I16,
        DatumType::I32 => ElementType::I32,
        DatumType::I64 => ElementType::I64,
        DatumType::F16 => ElementType::F16,
        DatumType::F32 => ElementType::F32,
        DatumType::F64 => ElementType::F64,
        DatumType::String => ElementType::String,
        other => ElementType::Other(format!("{other:?}")),
    }
}

impl engine::Engine for TractEngine {
    type Graph = TractGraph;

    fn name(&self) -> &'static str {
        "tract"
    }

    fn import(&self, buffer: &GraphBuffer, device: &str) -> ProbeResult<TractGraph> {
        check_device(device)?;
        let mut bytes = buffer.as_bytes();
        let graph = self.tf.proto_model_for_read(&mut bytes).context("Parsing GraphDef")?;
        for node in &graph.node {
            if !node.device.is_empty() {
                check_device(&node.device)
                    .with_context(|| format!("Node {:?} is pinned to {:?}", node.name, node.device))?;
                info!("Node {:?} pinned to {:?}", node.name, node.device);
            }
        }
        let model = self.tf.model_for_proto_model(&graph).context("Translating GraphDef")?;
        debug!("Imported {} nodes", model.nodes().len());
        Ok(TractGraph { model })
    }
}

#[derive(Debug)]
pub struct TractGraph {
    model: InferenceModel,
}

impl TractGraph {
    pub fn model(&self) -> &InferenceModel {
        &self.model
    }
}

impl engine::Graph for TractGraph {
    type Session = TractSession;

    fn has_operation(&self, name: &str) -> bool {
        self.model.node_by_name(name).is_ok()
    }

    fn signature(&self, name: &str) -> ProbeResult<TensorSignature> {
        let id = self.model.node_id_by_name(name)?;
        let fact = self.model.outlet_fact(OutletId::new(id, 0))?;
        let element_type = fact
            .datum_type
            .concretize()
            .map(element_type)
            .unwrap_or_else(|| ElementType::Other("unknown".into()));
        let dims = if fact.shape.is_open() {
            None
        } else {
            Some(
                fact.shape
                    .dims()
                    .map(|d| d.concretize().and_then(|d| d.to_i64().ok()).unwrap_or(FREE_DIM))
                    .collect(),
            )
        };
        Ok(TensorSignature::new(element_type, dims))
    }

    fn new_session(&self) -> ProbeResult<TractSession> {
        Ok(TractSession { model: Some(self.model.clone()) })
    }
}

/// The plan is only built at run time, once the input shape is known.
#[derive(Debug)]
pub struct TractSession {
    model: Option<InferenceModel>,
}

impl engine::Session for TractSession {
    fn run(&mut self, feed: (&str, &InputTensor), fetch: &str) -> ProbeResult<OutputTensor> {
        let (name, input) = feed;
        let mut model = self.model.clone().context("Session is closed")?;
        model.set_input_names([name])?;
        model.set_output_names([fetch])?;
        let shape = input.shape().dims();
        model.set_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), shape.to_vec()))?;
        let plan = model.into_optimized()?.into_runnable()?;
        let tensor = Tensor::from_shape::<f32>(shape, input.data())?;
        let mut outputs = plan.run(tvec!(tensor.into()))?;
        let output = outputs.pop().context("Plan returned no output")?;
        if output.datum_type() != f32::datum_type() {
            warn!("Output {:?} is {:?}, casting to f32", fetch, output.datum_type());
        }
        let output = output.cast_to::<f32>()?;
        Ok(OutputTensor::new(output.shape().to_vec(), output.as_slice::<f32>()?.to_vec()))
    }

    fn close(&mut self) -> ProbeResult<()> {
        if self.model.take().is_none() {
            bail!("Session is already closed");
        }
        Ok(())
    }

    fn delete(self) -> ProbeResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cpu_devices() {
        crate::setup_test_logger();
        assert!(check_device("").is_ok());
        assert!(check_device("/device:CPU:0").is_ok());
        assert!(check_device("/job:localhost/replica:0/task:0/cpu:0").is_ok());
    }

    #[test]
    fn accelerators_are_unavailable() {
        let err = check_device("/device:DML:0").unwrap_err();
        assert!(err.to_string().contains("not available"), "{err}");
        assert!(check_device("/device:GPU:1").is_err());
    }

    #[test]
    fn element_types() {
        assert_eq!(element_type(DatumType::F32), ElementType::F32);
        assert_eq!(element_type(DatumType::I64), ElementType::I64);
        assert!(matches!(element_type(DatumType::TDim), ElementType::Other(_)));
    }
}
