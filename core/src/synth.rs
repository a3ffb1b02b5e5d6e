use rand::SeedableRng;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;

use crate::engine::ElementType;
use crate::errors::ProbeError;
use crate::shape::ResolvedShape;

/// Input data fed to the single inference step. Owns its values; they go away
/// with the tensor.
#[derive(Clone, Debug, PartialEq)]
pub struct InputTensor {
    shape: ResolvedShape,
    data: Vec<f32>,
}

impl InputTensor {
    pub fn new(shape: ResolvedShape, data: Vec<f32>) -> Result<InputTensor, ProbeError> {
        if data.len() != shape.num_elements() {
            return Err(ProbeError::TensorConstruction(format!(
                "{} values for shape {} ({} elements)",
                data.len(),
                shape,
                shape.num_elements()
            )));
        }
        Ok(InputTensor { shape, data })
    }

    /// Uniform values in [0, 1) from a seeded generator. The same seed and
    /// shape always give the same bits.
    pub fn synthesize(shape: ResolvedShape, seed: u64) -> InputTensor {
        let mut rng = StdRng::seed_from_u64(seed);
        let uniform = Uniform::new(0f32, 1f32);
        let data = uniform.sample_iter(&mut rng).take(shape.num_elements()).collect();
        InputTensor { shape, data }
    }

    /// Synthesize for a declared element type. Only 32-bit floats are
    /// supported.
    pub fn synthesize_for(
        element_type: &ElementType,
        shape: ResolvedShape,
        seed: u64,
    ) -> Result<InputTensor, ProbeError> {
        if *element_type != ElementType::F32 {
            return Err(ProbeError::TensorConstruction(format!(
                "input is declared as {element_type}, only f32 inputs can be synthesized"
            )));
        }
        Ok(Self::synthesize(shape, seed))
    }

    pub fn shape(&self) -> &ResolvedShape {
        &self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn num_elements(&self) -> usize {
        self.data.len()
    }
}
