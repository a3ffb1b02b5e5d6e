//! # tfprobe core
//!
//! One-shot inference harness for frozen graphs: read the serialized graph,
//! hand it to an [`Engine`], synthesize a seeded random input for the declared
//! input operation, run exactly one step and print the output tensor.
//!
//! Engines live in `tfprobe-tensorflow`. This crate only knows them through the
//! traits in [`engine`].
//!
//! ```no_run
//! # use tfprobe_core::prelude::*;
//! # fn demo<E: Engine>(engine: &E) -> Result<(), ProbeError> {
//! let config = RunConfig::default();
//! let report = run_once(engine, &config, &mut std::io::stdout())?;
//! assert_eq!(report.output.len(), 1000);
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate derive_new;
#[macro_use]
extern crate log;

pub mod config;
pub mod device;
pub mod engine;
pub mod errors;
pub mod loader;
pub mod print;
pub mod runner;
pub mod shape;
pub mod synth;

pub use anyhow;

pub mod prelude {
    pub use crate::config::{OutputFormat, RunConfig};
    pub use crate::device::DeviceSpec;
    pub use crate::engine::{ElementType, Engine, Graph, OutputTensor, Session, TensorSignature};
    pub use crate::errors::{ProbeError, ProbeResult, SessionStage};
    pub use crate::loader::GraphBuffer;
    pub use crate::print::print_output;
    pub use crate::runner::{Pipeline, RunReport, Stage, run_once};
    pub use crate::shape::ResolvedShape;
    pub use crate::synth::InputTensor;
}

#[cfg(test)]
pub fn setup_test_logger() {
    let _ = env_logger::Builder::from_env("TFPROBE_LOG").try_init();
}
