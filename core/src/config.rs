use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::errors::ProbeResult;

pub const DEFAULT_MODEL: &str = "squeezenet_model/squeezenet.pb";
pub const DEFAULT_DEVICE: &str = "/device:CPU:0";
pub const DEFAULT_INPUT: &str = "input_1";
pub const DEFAULT_OUTPUT: &str = "loss/Softmax";
pub const DEFAULT_SEED: u64 = 42;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Plain,
    Json,
}

/// Everything a run needs to know. Missing fields in a config file take their
/// default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub model: PathBuf,
    pub device: String,
    pub input: String,
    pub output: String,
    pub seed: u64,
    pub format: OutputFormat,
}

impl Default for RunConfig {
    fn default() -> RunConfig {
        RunConfig {
            model: DEFAULT_MODEL.into(),
            device: DEFAULT_DEVICE.into(),
            input: DEFAULT_INPUT.into(),
            output: DEFAULT_OUTPUT.into(),
            seed: DEFAULT_SEED,
            format: OutputFormat::Plain,
        }
    }
}

impl RunConfig {
    pub fn for_path(p: impl AsRef<Path>) -> ProbeResult<RunConfig> {
        let p = p.as_ref();
        let json = fs_err::read_to_string(p)?;
        Self::for_json(&json).with_context(|| format!("Parsing config file {p:?}"))
    }

    pub fn for_json(json: &str) -> ProbeResult<RunConfig> {
        Ok(serde_json::from_str(json)?)
    }
}
