use serde_json::json;

use tfprobe_core::prelude::*;

use crate::CliResult;

/// Stops right after the input shape is resolved. Nothing is allocated or run.
pub fn handle<E: Engine>(engine: &E, config: &RunConfig) -> CliResult<()> {
    let mut pipeline = Pipeline::new(engine, config);
    let buffer = pipeline.load()?;
    let size = buffer.len();
    let graph = pipeline.import(buffer)?;
    let (input, shape) = pipeline.resolve(&graph)?;
    let output = match graph.signature(&config.output) {
        Ok(signature) => Some(signature),
        Err(e) => {
            warn!("No signature for {:?}: {:#}", config.output, e);
            None
        }
    };

    match config.format {
        OutputFormat::Plain => {
            println!("model: {:?} ({} bytes)", config.model, size);
            println!("engine: {} on {}", engine.name(), config.device);
            println!("input: {} {} -> {} ({} values)", config.input, input, shape, shape.num_elements());
            match output {
                Some(output) => println!("output: {} {}", config.output, output),
                None => println!("output: {} ?", config.output),
            }
        }
        OutputFormat::Json => {
            let summary = json!({
                "model": config.model,
                "size": size,
                "engine": engine.name(),
                "device": config.device,
                "input": {
                    "name": config.input,
                    "element_type": input.element_type.to_string(),
                    "declared": input.dims,
                    "resolved": shape.dims(),
                    "num_elements": shape.num_elements(),
                },
                "output": {
                    "name": config.output,
                    "element_type": output.as_ref().map(|o| o.element_type.to_string()),
                    "declared": output.as_ref().and_then(|o| o.dims.clone()),
                },
            });
            println!("{summary}");
        }
    }
    Ok(())
}
