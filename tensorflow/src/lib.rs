//! # tfprobe TensorFlow engines
//!
//! Two ways to execute a frozen TensorFlow graph behind the `tfprobe-core`
//! engine traits:
//!
//! * [`TractEngine`], pure Rust, built on `tract-tensorflow`. CPU only.
//! * `NativeEngine` (feature `native`), the TensorFlow C library through the
//!   `tensorflow` crate. Honours any device TensorFlow knows about.

#[macro_use]
extern crate log;

#[cfg(feature = "native")]
pub mod native;
pub mod samples;
pub mod tract;

#[cfg(feature = "native")]
pub use native::NativeEngine;
pub use tract::TractEngine;

pub use tfprobe_core;
pub use tract_tensorflow;

#[cfg(test)]
pub fn setup_test_logger() {
    let _ = env_logger::Builder::from_env("TFPROBE_LOG").try_init();
}
