#[macro_use]
extern crate log;

use std::process;

use anyhow::bail;
use clap::{Arg, ArgMatches, Command, crate_version};

use tfprobe_tensorflow::TractEngine;
#[cfg(feature = "native")]
use tfprobe_tensorflow::NativeEngine;

use crate::params::{EngineKind, Parameters};

#[cfg(feature = "native")]
mod compare;
mod inspect;
mod params;
mod run;

pub type CliResult<T> = anyhow::Result<T>;

fn command() -> Command<'static> {
    let app = Command::new("tfprobe")
        .version(crate_version!())
        .about("Run a frozen TensorFlow graph once on a seeded random input")
        .arg(Arg::new("model").takes_value(true).help("Sets the frozen graph (.pb) to use"))
        .arg(
            Arg::new("config")
                .long("config")
                .takes_value(true)
                .help("JSON run configuration, overridden by the flags below"),
        )
        .arg(
            Arg::new("device")
                .long("device")
                .takes_value(true)
                .help("Default device for the graph nodes [default: /device:CPU:0]"),
        )
        .arg(
            Arg::new("input")
                .long("input")
                .takes_value(true)
                .help("Name of the input operation [default: input_1]"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .takes_value(true)
                .help("Name of the output operation [default: loss/Softmax]"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .takes_value(true)
                .help("Seed of the input generator [default: 42]"),
        )
        .arg(
            Arg::new("engine")
                .long("engine")
                .takes_value(true)
                .possible_values(["tract", "native"])
                .help("Inference engine [default: tract]"),
        )
        .arg(Arg::new("json").long("json").help("Print results as JSON"))
        .arg(
            Arg::new("verbosity")
                .short('v')
                .multiple_occurrences(true)
                .help("Sets the level of verbosity."),
        );

    let run = Command::new("run").about("Run the graph once and print the output tensor");
    let inspect = Command::new("inspect")
        .about("Show the input signature and the resolved input shape without running");
    let compare = Command::new("compare")
        .about("Compare the output of tract and tensorflow on the same random input");

    app.subcommand(run).subcommand(inspect).subcommand(compare)
}

/// Entrypoint for the command-line interface.
fn main() {
    let matches = command().get_matches();

    let level = match matches.occurrences_of("verbosity") {
        0 => "tfprobe=warn,tfprobe_core=warn,tfprobe_tensorflow=warn",
        1 => "tfprobe=info,tfprobe_core=info,tfprobe_tensorflow=info",
        2 => "tfprobe=debug,tfprobe_core=debug,tfprobe_tensorflow=debug",
        _ => "tfprobe=trace,tfprobe_core=trace,tfprobe_tensorflow=trace",
    };
    let env = env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, level);
    env_logger::Builder::from_env(env).format_timestamp_nanos().init();

    if let Err(e) = handle(matches) {
        error!("{e:#}");
        eprintln!("Error: {e:#}");
        process::exit(1)
    }
}

/// Handles the command-line input.
fn handle(matches: ArgMatches) -> CliResult<()> {
    let params = Parameters::from_clap(&matches)?;
    debug!("{:?}", params);

    match matches.subcommand() {
        None | Some(("run", _)) => match params.engine {
            EngineKind::Tract => run::handle(&TractEngine::new(), &params.config),
            #[cfg(feature = "native")]
            EngineKind::Native => run::handle(&NativeEngine::new(), &params.config),
        },
        Some(("inspect", _)) => match params.engine {
            EngineKind::Tract => inspect::handle(&TractEngine::new(), &params.config),
            #[cfg(feature = "native")]
            EngineKind::Native => inspect::handle(&NativeEngine::new(), &params.config),
        },
        #[cfg(feature = "native")]
        Some(("compare", _)) => compare::handle(&params.config),
        #[cfg(not(feature = "native"))]
        Some(("compare", _)) => bail!("Need the native feature to be able to run comparison"),
        Some((s, _)) => bail!("Unknown subcommand {}.", s),
    }
}
