//! Tiny frozen graphs with the same entry points as a real classifier: a
//! float `Placeholder` with a free batch dimension and a `Softmax` at the end.
//! Handy to smoke-test an install without a multi-megabyte model file.

use std::convert::TryFrom;
use std::path::Path;

use tfprobe_core::config::{DEFAULT_INPUT, DEFAULT_OUTPUT};
use tfprobe_core::errors::ProbeResult;
use tract_tensorflow::prelude::*;
use tract_tensorflow::tfpb;
use tract_tensorflow::tfpb::tensorflow::tensor_shape_proto::Dim;
use tract_tensorflow::tfpb::tensorflow::{DataType, GraphDef, TensorProto, TensorShapeProto};

fn shape_proto(dims: &[i64]) -> TensorShapeProto {
    TensorShapeProto {
        dim: dims.iter().map(|&size| Dim { size, name: String::new() }).collect(),
        unknown_rank: false,
    }
}

/// `input_1: f32[-1, classes]` → `+ bias` → `loss/Softmax`.
///
/// Bias is a fixed ramp so the probabilities are not all equal.
pub fn classifier(classes: usize) -> ProbeResult<GraphDef> {
    let bias: Vec<f32> = (0..classes).map(|i| i as f32 / classes as f32).collect();
    let bias = TensorProto::try_from(&tensor1(&bias))?;
    Ok(tfpb::graph()
        .node(
            tfpb::node()
                .name(DEFAULT_INPUT)
                .op("Placeholder")
                .attr("dtype", DataType::DtFloat)
                .attr("shape", shape_proto(&[-1, classes as i64])),
        )
        .node(tfpb::node().name("bias").op("Const").attr("dtype", DataType::DtFloat).attr("value", bias))
        .node(
            tfpb::node()
                .name("logits")
                .op("Add")
                .input(DEFAULT_INPUT)
                .input("bias")
                .attr("T", DataType::DtFloat),
        )
        .node(
            tfpb::node()
                .name(DEFAULT_OUTPUT)
                .op("Softmax")
                .input("logits")
                .attr("T", DataType::DtFloat),
        ))
}

/// Same as [`classifier`], with every node pinned to `device`.
pub fn pinned_classifier(classes: usize, device: &str) -> ProbeResult<GraphDef> {
    let mut graph = classifier(classes)?;
    for node in &mut graph.node {
        node.device = device.to_string();
    }
    Ok(graph)
}

/// A placeholder without any shape attribute: its rank is unknown.
pub fn unranked() -> GraphDef {
    tfpb::graph()
        .node(tfpb::node().name(DEFAULT_INPUT).op("Placeholder").attr("dtype", DataType::DtFloat))
        .node(
            tfpb::node()
                .name(DEFAULT_OUTPUT)
                .op("Softmax")
                .input(DEFAULT_INPUT)
                .attr("T", DataType::DtFloat),
        )
}

pub fn save(graph: &GraphDef, path: impl AsRef<Path>) -> ProbeResult<()> {
    fs_err::write(path, graph.write_to_bytes()?)?;
    Ok(())
}
