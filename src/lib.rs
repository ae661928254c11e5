//! Similarity clustering of document embeddings.
//!
//! Callers supply `(id, embedding)` pairs obtained elsewhere and get back a
//! partition of the ids into `k` groups plus the group centroids, computed by
//! k-means over cosine distance.

pub mod classify;
pub mod error;

pub use classify::{ClusterAssignment, ClusterResult, Clusterer, KMeans, LabeledVector, cluster};
pub use error::{AppError, AppResult, ClassifyResult, ClusterError};
