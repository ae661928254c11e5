mod lloyd;

use ndarray::prelude::*;
use tracing::{debug, warn};

use crate::classify::convert::labeled_to_ndarray;
use crate::classify::traits::Clusterer;
use crate::classify::{ClusterAssignment, ClusterResult, LabeledVector};
use crate::error::{ClassifyResult, ClusterError};

pub const DEFAULT_K: usize = 8;
pub const DEFAULT_MAX_ITERATIONS: usize = 300;

/// K-means over cosine distance, seeded with the first `k` input vectors.
///
/// The engine keeps no state between calls; one instance can serve any
/// number of concurrent runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KMeans {
    pub k: usize,
    pub max_iterations: usize,
}

impl Default for KMeans {
    fn default() -> Self {
        KMeans {
            k: DEFAULT_K,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        KMeans {
            k,
            ..Default::default()
        }
    }

    pub fn set_k(&mut self, k: usize) -> &mut Self {
        self.k = k;
        self
    }

    pub fn set_max_iterations(&mut self, max_iterations: usize) -> &mut Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Partition `vectors` into at most `k` clusters.
    ///
    /// Empty input yields an empty result whatever the parameters. Otherwise
    /// `k` is clamped to the number of vectors and every vector is validated
    /// before the first iteration.
    #[tracing::instrument(
        name = "Clustering labeled vectors",
        level = "info",
        skip(self, vectors),
        fields(n_samples = vectors.len(), k = self.k, max_iterations = self.max_iterations)
    )]
    pub fn fit(&self, vectors: &[LabeledVector]) -> ClassifyResult<ClusterResult> {
        if vectors.is_empty() {
            debug!("No vectors supplied, returning an empty result");
            return Ok(ClusterResult::default());
        }
        if self.k == 0 {
            return Err(ClusterError::InvalidParameter(
                "k must be at least 1".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(ClusterError::InvalidParameter(
                "max_iterations must be at least 1".to_string(),
            ));
        }

        let k = self.k.min(vectors.len());
        if k < self.k {
            debug!("Clamped k from {} to {}", self.k, k);
        }

        let x = labeled_to_ndarray(vectors)?; // x = (n_samples, n_features)
        let centers_init = x.slice(s![0..k, ..]).to_owned(); // centers_init = (k, n_features)

        let (labels, centers, inertia) =
            lloyd::kmeans_single_lloyd(&x, &centers_init, self.max_iterations)?;

        let mut assignment: ClusterAssignment = vec![Vec::new(); k];
        for (v, &label) in vectors.iter().zip(labels.iter()) {
            assignment[label].push(v.id.clone());
        }

        let distinct_clusters = assignment.iter().filter(|ids| !ids.is_empty()).count();
        if distinct_clusters < k {
            warn!(
                "Number of distinct clusters ({}) found smaller than n_clusters ({}). Possibly due to duplicate directions in the input.",
                distinct_clusters, k
            );
        }

        let centroids = centers.outer_iter().map(|row| row.to_vec()).collect();
        Ok(ClusterResult {
            assignment,
            centroids,
            inertia,
        })
    }
}

impl Clusterer for KMeans {
    fn cluster(&self, vectors: &[LabeledVector]) -> ClassifyResult<ClusterResult> {
        self.fit(vectors)
    }
}

/// Cluster `vectors` into at most `k` groups using `max_iterations` Lloyd steps.
pub fn cluster(
    vectors: &[LabeledVector],
    k: usize,
    max_iterations: usize,
) -> ClassifyResult<ClusterResult> {
    KMeans { k, max_iterations }.fit(vectors)
}
