use std::str::FromStr;

use anyhow::{Context, bail};
use clap::ArgMatches;

use tfprobe_core::config::{OutputFormat, RunConfig};

use crate::CliResult;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EngineKind {
    #[default]
    Tract,
    #[cfg(feature = "native")]
    Native,
}

impl FromStr for EngineKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> CliResult<EngineKind> {
        match s {
            "tract" => Ok(EngineKind::Tract),
            #[cfg(feature = "native")]
            "native" => Ok(EngineKind::Native),
            #[cfg(not(feature = "native"))]
            "native" => bail!("tfprobe was built without the native feature"),
            _ => bail!("Unknown engine {:?}", s),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Parameters {
    pub config: RunConfig,
    pub engine: EngineKind,
}

impl Parameters {
    /// Defaults, then the config file, then explicit flags.
    pub fn from_clap(matches: &ArgMatches) -> CliResult<Parameters> {
        let mut config = match matches.value_of("config") {
            Some(path) => RunConfig::for_path(path)?,
            None => RunConfig::default(),
        };
        if let Some(model) = matches.value_of("model") {
            config.model = model.into();
        }
        if let Some(device) = matches.value_of("device") {
            config.device = device.to_string();
        }
        if let Some(input) = matches.value_of("input") {
            config.input = input.to_string();
        }
        if let Some(output) = matches.value_of("output") {
            config.output = output.to_string();
        }
        if let Some(seed) = matches.value_of("seed") {
            config.seed = seed.parse().with_context(|| format!("Invalid seed {seed:?}"))?;
        }
        if matches.is_present("json") {
            config.format = OutputFormat::Json;
        }
        let engine = matches.value_of("engine").map(EngineKind::from_str).transpose()?;
        Ok(Parameters { config, engine: engine.unwrap_or_default() })
    }
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use super::*;
    use crate::command;

    fn params(args: &[&str]) -> CliResult<Parameters> {
        let matches = command().try_get_matches_from(args)?;
        Parameters::from_clap(&matches)
    }

    #[test]
    fn defaults() {
        let p = params(&["tfprobe"]).unwrap();
        assert_eq!(p.config, RunConfig::default());
        assert_eq!(p.engine, EngineKind::Tract);
    }

    #[test]
    fn flags() {
        let p = params(&[
            "tfprobe",
            "--device",
            "/device:DML:0",
            "--input",
            "x",
            "--output",
            "y",
            "--seed",
            "7",
            "--json",
            "m.pb",
        ])
        .unwrap();
        assert_eq!(p.config.model, Path::new("m.pb"));
        assert_eq!(p.config.device, "/device:DML:0");
        assert_eq!(p.config.input, "x");
        assert_eq!(p.config.output, "y");
        assert_eq!(p.config.seed, 7);
        assert_eq!(p.config.format, OutputFormat::Json);
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.json");
        std::fs::write(&path, r#"{ "model": "from_file.pb", "seed": 3, "output": "probs" }"#)
            .unwrap();
        let p = params(&["tfprobe", "--config", path.to_str().unwrap(), "--seed", "9"]).unwrap();
        assert_eq!(p.config.model, Path::new("from_file.pb"));
        assert_eq!(p.config.output, "probs");
        assert_eq!(p.config.seed, 9);
        assert_eq!(p.config.input, "input_1");
    }

    #[test]
    fn malformed_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.json");
        std::fs::write(&path, r#"{ "modle": "typo.pb" }"#).unwrap();
        assert!(params(&["tfprobe", "--config", path.to_str().unwrap()]).is_err());
    }

    #[test]
    fn bad_seed() {
        assert!(params(&["tfprobe", "--seed", "forty-two"]).is_err());
    }

    #[cfg(not(feature = "native"))]
    #[test]
    fn native_needs_feature() {
        let err = params(&["tfprobe", "--engine", "native"]).unwrap_err();
        assert!(err.to_string().contains("native feature"));
    }
}
