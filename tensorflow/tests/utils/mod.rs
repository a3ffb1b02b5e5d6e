use std::path::Path;

use tfprobe_tensorflow::samples;
use tfprobe_tensorflow::tfprobe_core::prelude::*;
use tfprobe_tensorflow::tract_tensorflow::tfpb::tensorflow::GraphDef;

pub fn setup_test_logger() {
    let _ = env_logger::Builder::from_env("TFPROBE_LOG").try_init();
}

/// Saves `graph` under `dir` and points a default config at it.
pub fn config_for(dir: &Path, graph: &GraphDef) -> RunConfig {
    setup_test_logger();
    let model = dir.join("model.pb");
    samples::save(graph, &model).unwrap();
    RunConfig { model, ..RunConfig::default() }
}

#[allow(dead_code)]
pub fn classifier_config(dir: &Path, classes: usize) -> RunConfig {
    config_for(dir, &samples::classifier(classes).unwrap())
}
