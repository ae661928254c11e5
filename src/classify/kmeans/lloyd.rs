use ndarray::prelude::*;
use tracing::{debug, info_span, trace};
use tracing_indicatif::span_ext::IndicatifSpanExt;
use tracing_indicatif::style::ProgressStyle;

use crate::classify::linalg::cosine_distance;
use crate::error::ClassifyResult;

/// Result of one assignment step followed by one update step.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct LloydStep {
    pub labels: Array1<usize>,  // labels = (n_samples,)
    pub centers: Array2<f64>,   // centers = (n_clusters, n_features)
    pub counts: Array1<usize>,  // counts = (n_clusters,)
    pub inertia: f64,
}

/// Nearest center to `row` by cosine distance.
///
/// Centers are scanned in index order with a strict `<`, so the lowest
/// index wins a tie.
fn nearest_center(
    row: ArrayView1<f64>,   // row = (n_features,)
    centers: &Array2<f64>,  // centers = (n_clusters, n_features)
) -> ClassifyResult<(usize, f64)> {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (cluster, center) in centers.axis_iter(Axis(0)).enumerate() {
        let dist = cosine_distance(row, center)?;
        if dist < best_dist {
            best = cluster;
            best_dist = dist;
        }
    }
    Ok((best, best_dist))
}

/// Single Lloyd iteration: assign every sample, then move every center to
/// the mean of its members.
pub(super) fn lloyd_iter(
    x: &Array2<f64>,           // x = (n_samples, n_features)
    centers_old: &Array2<f64>, // centers_old = (n_clusters, n_features)
) -> ClassifyResult<LloydStep> {
    let n_samples = x.nrows();
    let (n_clusters, n_features) = centers_old.dim();

    let mut labels = Array1::<usize>::zeros(n_samples);
    let mut centers = Array2::<f64>::zeros((n_clusters, n_features));
    let mut counts = Array1::<usize>::zeros(n_clusters);
    let mut inertia = 0.0;

    for (i, row) in x.axis_iter(Axis(0)).enumerate() {
        let (label, dist) = nearest_center(row, centers_old)
            .inspect_err(|e| debug!(sample = i, "Assignment failed: {e}"))?;
        labels[i] = label;
        counts[label] += 1;
        inertia += dist;
        // accumulates the member sum for the cluster
        let mut acc = centers.row_mut(label);
        acc += &row;
    }

    for (cluster, mut center) in centers.axis_iter_mut(Axis(0)).enumerate() {
        if counts[cluster] > 0 {
            center /= counts[cluster] as f64;
        } else {
            // keep previous center if cluster is empty
            center.assign(&centers_old.row(cluster));
        }
    }

    Ok(LloydStep {
        labels,
        centers,
        counts,
        inertia,
    })
}

/// Run Lloyd's algorithm for exactly `max_iter` iterations.
///
/// There is no early exit on stable labels. Returns (labels, centers,
/// inertia), where labels and inertia come from the last assignment step
/// and centers from the last update step.
pub(super) fn kmeans_single_lloyd(
    x: &Array2<f64>,            // x = (n_samples, n_features)
    centers_init: &Array2<f64>, // centers_init = (n_clusters, n_features)
    max_iter: usize,
) -> ClassifyResult<(Array1<usize>, Array2<f64>, f64)> {
    let header_span = info_span!("Refining centroids");
    header_span.pb_set_message("Iterating...");
    header_span.pb_set_finish_message("Centroids refined");
    header_span.pb_set_length(max_iter as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
    {
        header_span.pb_set_style(&style);
    }
    let _header_span_enter = header_span.enter();

    // Buffers replaced every iteration
    let mut centers = centers_init.clone();
    let mut labels = Array1::<usize>::zeros(x.nrows());
    let mut inertia = 0.0;

    for i in 0..max_iter {
        let step = lloyd_iter(x, &centers)?;
        trace!(
            iteration = i + 1,
            inertia = step.inertia,
            "Cluster sizes: {:?}",
            step.counts.to_vec()
        );
        labels = step.labels;
        centers = step.centers;
        inertia = step.inertia;
        header_span.pb_inc(1);
    }

    Ok((labels, centers, inertia))
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::error::ClusterError;

    fn assert_all_close_2d(actual: &Array2<f64>, expected: &Array2<f64>, tol: f64) {
        assert_eq!(actual.dim(), expected.dim(), "2D shapes differ");
        for ((idx, a), e) in actual.indexed_iter().zip(expected.iter()) {
            assert!(
                (a - e).abs() <= tol,
                "expected {e}, got {a} at {:?}, tol {tol}",
                idx
            );
        }
    }

    #[test]
    fn kmeans_lloyd_splits_two_directions() {
        let x = array![[1.0, 0.0], [0.9, 0.1], [0.0, 1.0], [0.1, 0.9]]; // x = (4, 2)
        let centers_init = array![[1.0, 0.0], [0.0, 1.0]]; // (2, 2)

        let (labels, centers, _inertia) = kmeans_single_lloyd(&x, &centers_init, 5).unwrap();

        assert_eq!(labels.to_vec(), vec![0, 0, 1, 1]);
        let expected_centers = array![[0.95, 0.05], [0.05, 0.95]];
        assert_all_close_2d(&centers, &expected_centers, 1e-12);
    }

    #[test]
    fn empty_cluster_keeps_previous_center() {
        let x = array![[1.0, 0.0], [0.9, 0.1]]; // (2, 2)
        let centers_old = array![[1.0, 0.0], [0.0, 1.0]]; // (2, 2)

        let step = lloyd_iter(&x, &centers_old).unwrap();

        assert_eq!(step.labels.to_vec(), vec![0, 0]);
        assert_eq!(step.counts.to_vec(), vec![2, 0]);
        assert_eq!(step.centers.row(1), centers_old.row(1));
        assert_all_close_2d(
            &step.centers.slice(s![0..1, ..]).to_owned(),
            &array![[0.95, 0.05]],
            1e-12,
        );
    }

    #[test]
    fn ties_go_to_the_lowest_index() {
        let x = array![[1.0, 1.0]]; // equidistant from both centers
        let centers_old = array![[1.0, 0.0], [0.0, 1.0]];

        let step = lloyd_iter(&x, &centers_old).unwrap();

        assert_eq!(step.labels.to_vec(), vec![0]);
    }

    #[test]
    fn inertia_sums_assignment_distances() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [0.0, 3.0]];
        let centers_old = array![[1.0, 0.0], [0.0, 1.0]];
        let step = lloyd_iter(&x, &centers_old).unwrap();
        assert_eq!(step.inertia, 0.0);

        let x = array![[1.0, 1.0]];
        let step = lloyd_iter(&x, &centers_old).unwrap();
        assert!((step.inertia - (1.0 - 0.5_f64.sqrt())).abs() < 1e-12);
    }

    #[test]
    fn zero_center_fails_the_step() {
        let x = array![[1.0, 0.0]];
        let centers_old = array![[0.0, 0.0]];

        assert_eq!(
            lloyd_iter(&x, &centers_old),
            Err(ClusterError::DegenerateVector)
        );
    }
}
