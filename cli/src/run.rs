use std::io::Write;

use tfprobe_core::prelude::*;

use crate::CliResult;

pub fn handle<E: Engine>(engine: &E, config: &RunConfig) -> CliResult<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let report = run_once(engine, config, &mut out)?;
    out.flush()?;
    info!(
        "[{}] {} input {} -> output {:?} ({} values)",
        report.engine,
        config.input,
        report.input_shape,
        report.output.shape,
        report.output.len()
    );
    Ok(())
}
