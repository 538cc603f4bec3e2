use std::fs;
use std::path::Path;
use vecclust::pipeline::{assignments, centroids, cluster, inspect, prefix};
use vecclust::storage::{npy, read_vecs};
use vecclust::{Error, InitMethod, PipelineConfig};

/// Two well separated groups of 4-d byte vectors, 50 each, interleaved
fn write_dataset(path: &Path) {
    let mut bytes = Vec::new();
    for i in 0..100u32 {
        let base: u8 = if i % 2 == 0 { 10 } else { 200 };
        let jitter = (i % 5) as u8;
        bytes.extend_from_slice(&4u32.to_le_bytes());
        bytes.extend_from_slice(&[base + jitter, base, base + 1, base + jitter]);
    }
    fs::write(path, bytes).unwrap();
}

fn test_config(dir: &Path) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.paths.dataset = dir.join("base.bvecs");
    config.paths.centroids_npy = dir.join("centroids.npy");
    config.paths.assignments_npy = dir.join("clusters.npy");
    config.paths.centroids_vecs = dir.join("centroids.fvecs");
    config.paths.assignments_vecs = dir.join("clusters.ivecs");
    config.clustering.dimension = 4;
    config.clustering.num_clusters = 2;
    config.clustering.max_vectors = None;
    config.clustering.iterations = 10;
    config.clustering.restarts = 3;
    config.clustering.seed = Some(354);
    config.clustering.init = InitMethod::PlusPlus;
    config
}

#[test]
fn test_full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    write_dataset(&config.paths.dataset);

    let summary = cluster::run(&config).unwrap();
    assert_eq!(summary.vectors, 100);
    assert_eq!(summary.dimension, 4);
    assert_eq!(summary.clusters, 2);

    assert_eq!(centroids::run(&config).unwrap(), 2);
    assert_eq!(assignments::run(&config).unwrap(), 100);

    // Centroid file holds exactly the trained array
    let trained = npy::load_centroids(&config.paths.centroids_npy).unwrap();
    let (values, dim, records) = read_vecs::<f32, _>(&config.paths.centroids_vecs, Some(4)).unwrap();
    assert_eq!((dim, records), (4, 2));
    assert_eq!(values, trained.iter().copied().collect::<Vec<_>>());

    // One single-element record per vector, every id in range
    let (ids, dim, records) = read_vecs::<u32, _>(&config.paths.assignments_vecs, Some(1)).unwrap();
    assert_eq!((dim, records), (1, 100));
    assert!(ids.iter().all(|&c| c < 2));

    // Interleaved groups end up in alternating clusters
    assert_ne!(ids[0], ids[1]);
    for (i, &c) in ids.iter().enumerate() {
        assert_eq!(c, ids[i % 2]);
    }

    let fsize = fs::metadata(&config.paths.assignments_vecs).unwrap().len();
    assert_eq!(fsize, 100 * 8);
}

#[test]
fn test_pipeline_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let first = test_config(dir.path());
    write_dataset(&first.paths.dataset);

    let mut second = first.clone();
    second.paths.centroids_npy = dir.path().join("centroids2.npy");
    second.paths.assignments_npy = dir.path().join("clusters2.npy");
    second.paths.centroids_vecs = dir.path().join("centroids2.fvecs");
    second.paths.assignments_vecs = dir.path().join("clusters2.ivecs");

    for config in [&first, &second] {
        cluster::run(config).unwrap();
        centroids::run(config).unwrap();
        assignments::run(config).unwrap();
    }

    assert_eq!(
        fs::read(&first.paths.centroids_vecs).unwrap(),
        fs::read(&second.paths.centroids_vecs).unwrap()
    );
    assert_eq!(
        fs::read(&first.paths.assignments_vecs).unwrap(),
        fs::read(&second.paths.assignments_vecs).unwrap()
    );
}

#[test]
fn test_truncation_limit() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.clustering.max_vectors = Some(10);
    write_dataset(&config.paths.dataset);

    assert_eq!(cluster::run(&config).unwrap().vectors, 10);
    assert_eq!(assignments::run(&config).unwrap(), 10);
}

#[test]
fn test_wrong_dimension_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.clustering.dimension = 128;
    write_dataset(&config.paths.dataset);

    let err = cluster::run(&config).unwrap_err();
    assert!(matches!(err, Error::Format { record: 0, expected: 128, found: 4, .. }));
    assert!(!config.paths.centroids_npy.exists());
}

#[test]
fn test_prefix_then_inspect() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("base.bvecs");
    let output = dir.path().join("base_10.bvecs");
    write_dataset(&input);

    assert_eq!(prefix::run(&input, &output, 10, Some(4)).unwrap(), 10);

    let summary = inspect::run(&output, None, Some(4)).unwrap();
    assert_eq!(summary.records, 10);
    assert_eq!(summary.dimension, 4);
    assert_eq!(summary.min, 10.0);
    assert_eq!(summary.max, 204.0);
}
