use crate::classify::{ClusterResult, LabeledVector};
use crate::error::ClassifyResult;

/// Trait for partitioning labeled embeddings into similarity groups.
pub trait Clusterer: Send + Sync {
    /// Cluster the given vectors.
    /// Returns the member identifiers of every cluster index together with its centroid.
    fn cluster(&self, vectors: &[LabeledVector]) -> ClassifyResult<ClusterResult>;
}
