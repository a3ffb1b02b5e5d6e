use std::path::Path;

use approx::assert_abs_diff_eq;
use tfprobe_tensorflow::samples;
use tfprobe_tensorflow::tfprobe_core::prelude::*;
use tfprobe_tensorflow::tract_tensorflow::tfpb::tensorflow::GraphDef;
use tfprobe_tensorflow::TractEngine;

mod utils;
use utils::config_for;

fn load(dir: &Path, graph: &GraphDef) -> <TractEngine as Engine>::Graph {
    let config = config_for(dir, graph);
    let buffer = GraphBuffer::for_path(&config.model).unwrap();
    TractEngine::new().import(&buffer, &config.device).unwrap()
}

#[test]
fn declared_signature() {
    let dir = tempfile::tempdir().unwrap();
    let graph = load(dir.path(), &samples::classifier(10).unwrap());
    assert!(graph.has_operation("input_1"));
    assert!(graph.has_operation("loss/Softmax"));
    assert!(!graph.has_operation("nope"));
    let signature = graph.signature("input_1").unwrap();
    assert_eq!(signature, TensorSignature::new(ElementType::F32, Some(vec![-1, 10])));
}

#[test]
fn unranked_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let graph = load(dir.path(), &samples::unranked());
    assert_eq!(graph.signature("input_1").unwrap().dims, None);
}

#[test]
fn run_classifier() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), &samples::classifier(10).unwrap());
    let mut out = vec![];
    let report = run_once(&TractEngine::new(), &config, &mut out).unwrap();
    assert_eq!(report.engine, "tract");
    assert_eq!(report.input_shape.dims(), &[1, 10]);
    assert_eq!(report.output.shape, vec![1, 10]);
    assert_abs_diff_eq!(report.output.as_slice().iter().sum::<f32>(), 1.0, epsilon = 1e-5);
    assert!(report.output.as_slice().iter().all(|p| *p > 0.0 && *p < 1.0));
    assert_eq!(report.stages.last(), Some(&Stage::Printed));

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.starts_with("Output tensor: \n"));
    assert_eq!(printed.matches(", ").count(), 10);
}

#[test]
fn runs_are_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), &samples::classifier(5).unwrap());
    let engine = TractEngine::new();
    let (mut first, mut second) = (vec![], vec![]);
    run_once(&engine, &config, &mut first).unwrap();
    run_once(&engine, &config, &mut second).unwrap();
    assert_eq!(first, second);
}

#[test]
fn accelerator_device_fails_import() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(dir.path(), &samples::classifier(4).unwrap());
    config.device = "/device:DML:0".into();
    let engine = TractEngine::new();
    let mut pipeline = Pipeline::new(&engine, &config);
    let err = pipeline.prepare().unwrap_err();
    assert!(matches!(err, ProbeError::Import(_)), "{err}");
    assert_eq!(pipeline.last_stage(), Some(Stage::Loaded));
}

#[test]
fn pinned_node_fails_import() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), &samples::pinned_classifier(4, "/device:GPU:0").unwrap());
    let err = run_once(&TractEngine::new(), &config, &mut vec![]).unwrap_err();
    match err {
        ProbeError::Import(msg) => assert!(msg.contains("GPU"), "{msg}"),
        other => panic!("unexpected {other}"),
    }
}

#[test]
fn pinned_to_cpu_is_fine() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), &samples::pinned_classifier(4, "/device:CPU:0").unwrap());
    assert!(run_once(&TractEngine::new(), &config, &mut vec![]).is_ok());
}

#[test]
fn garbage_fails_import() {
    let buffer = GraphBuffer::from_bytes(b"definitely not a protobuf \xff\xff\xff".to_vec()).unwrap();
    assert!(TractEngine::new().import(&buffer, "/device:CPU:0").is_err());
}

#[test]
fn missing_output_operation() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(dir.path(), &samples::classifier(4).unwrap());
    config.output = "predictions".into();
    let err = run_once(&TractEngine::new(), &config, &mut vec![]).unwrap_err();
    assert!(matches!(err, ProbeError::MissingOperation(ref name) if name == "predictions"));
}

#[test]
fn unknown_rank_is_a_shape_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), &samples::unranked());
    let err = run_once(&TractEngine::new(), &config, &mut vec![]).unwrap_err();
    assert!(matches!(err, ProbeError::Shape(_)), "{err}");
}

#[test]
fn closed_session_refuses_work() {
    let dir = tempfile::tempdir().unwrap();
    let graph = load(dir.path(), &samples::classifier(3).unwrap());
    let input = InputTensor::synthesize(ResolvedShape::resolve(&[-1, 3]).unwrap(), 42);
    let mut session = graph.new_session().unwrap();
    let output = session.run(("input_1", &input), "loss/Softmax").unwrap();
    assert_eq!(output.len(), 3);
    session.close().unwrap();
    assert!(session.run(("input_1", &input), "loss/Softmax").is_err());
    assert!(session.close().is_err());
    session.delete().unwrap();
}
