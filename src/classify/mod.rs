pub(super) mod convert;
pub mod kmeans;
pub mod linalg;
pub mod traits;

use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

pub use kmeans::{KMeans, cluster};
pub use traits::Clusterer;

/// One document embedding tagged with the caller's identifier.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LabeledVector {
    pub id: String,
    pub embedding: Vec<f64>,
}

impl LabeledVector {
    pub fn new(id: impl Into<String>, embedding: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            embedding,
        }
    }

    pub fn view(&self) -> ArrayView1<'_, f64> {
        aview1(&self.embedding)
    }
}

/// Member identifiers for every cluster index `0..k`, in input order.
/// Every slot is present even when its cluster is empty.
pub type ClusterAssignment = Vec<Vec<String>>;

/// Partition and final centroids of one clustering run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ClusterResult {
    pub assignment: ClusterAssignment,
    /// Same order as `assignment`.
    pub centroids: Vec<Vec<f64>>,
    /// Sum of member-to-centroid cosine distances from the last assignment step.
    pub inertia: f64,
}

impl ClusterResult {
    /// Number of cluster slots, empty ones included.
    pub fn len(&self) -> usize {
        self.assignment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignment.is_empty()
    }

    /// Cluster index holding `id`, if any.
    pub fn cluster_of(&self, id: &str) -> Option<usize> {
        self.assignment
            .iter()
            .position(|members| members.iter().any(|m| m == id))
    }

    pub fn non_empty_clusters(&self) -> usize {
        self.assignment.iter().filter(|m| !m.is_empty()).count()
    }
}
