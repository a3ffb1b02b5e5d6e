use std::fmt;

use crate::errors::ProbeError;

/// Sentinel for a free dimension in a declared shape.
pub const FREE_DIM: i64 = -1;

/// A fully known shape, ready for allocation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResolvedShape {
    dims: Vec<usize>,
    num_elements: usize,
}

impl ResolvedShape {
    /// Binds a declared shape to a single-example batch.
    ///
    /// Only the leading dimension may be free; it becomes 1. Every other
    /// dimension has to be strictly positive and the element count has to fit.
    pub fn resolve(declared: &[i64]) -> Result<ResolvedShape, ProbeError> {
        let mut dims = Vec::with_capacity(declared.len());
        for (axis, &d) in declared.iter().enumerate() {
            let d = if axis == 0 && d == FREE_DIM {
                info!("Free batch dimension set to 1");
                1
            } else if d == FREE_DIM {
                return Err(ProbeError::Shape(format!(
                    "dimension {axis} of {declared:?} is free, only the batch dimension can be"
                )));
            } else if d <= 0 {
                return Err(ProbeError::Shape(format!(
                    "dimension {axis} of {declared:?} is {d}, expected a positive size"
                )));
            } else {
                usize::try_from(d).map_err(|_| {
                    ProbeError::Shape(format!("dimension {axis} of {declared:?} is too large"))
                })?
            };
            dims.push(d);
        }
        Self::from_dims(dims)
    }

    pub fn from_dims(dims: Vec<usize>) -> Result<ResolvedShape, ProbeError> {
        let num_elements = dims
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .filter(|n| i64::try_from(*n).is_ok())
            .ok_or_else(|| ProbeError::Shape(format!("element count of {dims:?} overflows")))?;
        if num_elements == 0 {
            return Err(ProbeError::Shape(format!("{dims:?} holds no element")));
        }
        Ok(ResolvedShape { dims, num_elements })
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn num_elements(&self) -> usize {
        self.num_elements
    }
}

impl fmt::Display for ResolvedShape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let dims: Vec<String> = self.dims.iter().map(|d| d.to_string()).collect();
        write!(f, "{}", dims.join("x"))
    }
}
