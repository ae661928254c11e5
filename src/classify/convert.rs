use std::collections::HashSet;

use ndarray::prelude::*;
use tracing::trace;

use crate::classify::LabeledVector;
use crate::error::{ClassifyResult, ClusterError};

/// Validate one run's input and pack it into a dense `(n_samples, n_features)` matrix.
///
/// Row `i` of the result is the embedding of `vectors[i]`, so row indices
/// double as the identifier lookup for the rest of the run.
#[tracing::instrument(name = "Converting labeled vectors", level = "debug", skip(vectors))]
pub fn labeled_to_ndarray(vectors: &[LabeledVector]) -> ClassifyResult<Array2<f64>> {
    let rows = vectors.len();
    let cols = vectors.first().map_or(0, |v| v.embedding.len());

    let mut seen: HashSet<&str> = HashSet::with_capacity(rows);
    for v in vectors {
        if v.embedding.len() != cols {
            return Err(ClusterError::DimensionMismatch {
                id: v.id.clone(),
                expected: cols,
                found: v.embedding.len(),
            });
        }
        if let Some(index) = v.embedding.iter().position(|x| !x.is_finite()) {
            return Err(ClusterError::NonFiniteComponent {
                id: v.id.clone(),
                index,
            });
        }
        if !seen.insert(v.id.as_str()) {
            return Err(ClusterError::DuplicateIdentifier(v.id.clone()));
        }
    }

    let mut arr: Array2<f64> = Array2::<f64>::zeros((rows, cols));
    trace!("Initialized ndarray with shape: {:?}", arr.dim());
    for (mut row, v) in arr.axis_iter_mut(Axis(0)).zip(vectors) {
        row.assign(&aview1(&v.embedding));
    }
    Ok(arr)
}
