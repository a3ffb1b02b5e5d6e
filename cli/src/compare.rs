use anyhow::bail;
use approx::relative_eq;

use tfprobe_core::prelude::*;
use tfprobe_tensorflow::{NativeEngine, TractEngine};

use crate::CliResult;

fn outputs<E: Engine>(engine: &E, config: &RunConfig) -> CliResult<OutputTensor> {
    let mut pipeline = Pipeline::new(engine, config);
    let (graph, _, input) = pipeline.prepare()?;
    Ok(pipeline.execute(&graph, input)?)
}

/// Same graph, same seed, two engines.
pub fn handle(config: &RunConfig) -> CliResult<()> {
    let expected = outputs(&NativeEngine::new(), config)?;
    let found = outputs(&TractEngine::new(), config)?;

    if expected.shape != found.shape {
        bail!("Shape mismatch: tensorflow gives {:?}, tract {:?}", expected.shape, found.shape);
    }
    let mut max_diff = 0f32;
    let mut mismatches = 0;
    for (ix, (&e, &f)) in expected.as_slice().iter().zip(found.as_slice()).enumerate() {
        max_diff = max_diff.max((e - f).abs());
        if !relative_eq!(e, f, epsilon = 1e-5, max_relative = 1e-4) {
            if mismatches < 10 {
                warn!("Value #{ix}: tensorflow {e}, tract {f}");
            }
            mismatches += 1;
        }
    }
    if mismatches > 0 {
        bail!("{} of {} values differ (max abs diff {:e})", mismatches, found.len(), max_diff);
    }
    println!("{} values match (max abs diff {:e})", found.len(), max_diff);
    Ok(())
}
