//! Batch extraction into a feature store, and target resolution for queries.
//!
//! Batch operations skip items that fail with a recoverable error (decode
//! failure, image too small, degenerate histogram), log each one, and report
//! them at the end. Anything else aborts the batch.

use crate::feature::{Features, Strategy};
use crate::image::PixelGrid;
use crate::rank::Ranking;
use crate::search::Matcher;
use crate::store::{check_image_id, FeatureRecord, FeatureStore};
use crate::trace::{trace_event, trace_warn};
use crate::util::{ImgMatchError, ImgMatchResult};
use std::path::Path;

/// Options for building a store from a directory.
#[derive(Clone, Debug, Default)]
pub struct IndexConfig {
    /// Extract images in parallel when the `rayon` feature is enabled.
    pub parallel: bool,
}

/// Result of a batch extraction pass.
#[derive(Debug, Default)]
pub struct IndexReport {
    /// Records for every image that was described successfully.
    pub store: FeatureStore,
    /// Images that were skipped, with the reason.
    pub skipped: Vec<(String, ImgMatchError)>,
}

/// Returns the directory-independent id of an image path (its file name).
///
/// A name that is not UTF-8 or cannot be stored yields
/// [`ImgMatchError::InvalidImageId`] carrying its lossy form.
pub fn image_id_from_path(path: &Path) -> ImgMatchResult<String> {
    let lossy = || ImgMatchError::InvalidImageId {
        image_id: path
            .file_name()
            .unwrap_or(path.as_os_str())
            .to_string_lossy()
            .into_owned(),
    };
    let image_id = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(lossy)?;
    check_image_id(image_id)?;
    Ok(image_id.to_string())
}

/// Describes already-decoded images and collects them into a store.
pub fn index_images<G, I>(strategy: &Strategy, images: I) -> ImgMatchResult<IndexReport>
where
    G: PixelGrid,
    I: IntoIterator<Item = (String, ImgMatchResult<G>)>,
{
    check_indexable(strategy)?;
    let described = images
        .into_iter()
        .map(|(id, grid)| {
            let features = grid.and_then(|g| strategy.describe(&g));
            (id, features)
        })
        .collect();
    collect_report(strategy, described)
}

/// Reads every regular file in `dir`, describes it, and builds a store.
///
/// Files are visited in sorted path order. Decode failures are skipped.
#[cfg(feature = "image-io")]
pub fn index_directory<P: AsRef<Path>>(
    dir: P,
    strategy: &Strategy,
    cfg: &IndexConfig,
) -> ImgMatchResult<IndexReport> {
    use crate::image::io::load_bgr_image;
    use std::path::PathBuf;

    let dir = dir.as_ref();
    let _span = crate::trace::trace_span!("index_directory", dir = %dir.display()).entered();
    check_indexable(strategy)?;

    let entries = std::fs::read_dir(dir).map_err(|err| ImgMatchError::io(dir, err))?;
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| ImgMatchError::io(dir, err))?;
        let is_file = entry
            .file_type()
            .map(|ft| ft.is_file())
            .map_err(|err| ImgMatchError::io(entry.path(), err))?;
        if is_file {
            paths.push(entry.path());
        }
    }
    paths.sort();
    trace_event!("index_files", count = paths.len());

    let describe_path = |path: &PathBuf| -> (String, ImgMatchResult<Features>) {
        match image_id_from_path(path) {
            Ok(id) => {
                let features = load_bgr_image(path).and_then(|img| strategy.describe(&img));
                (id, features)
            }
            Err(err) => (path.display().to_string(), Err(err)),
        }
    };

    let described = map_paths(&paths, cfg.parallel, describe_path);
    collect_report(strategy, described)
}

#[cfg(all(feature = "image-io", feature = "rayon"))]
fn map_paths<T, F>(paths: &[std::path::PathBuf], parallel: bool, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(&std::path::PathBuf) -> T + Sync + Send,
{
    use rayon::prelude::*;
    if parallel {
        paths.par_iter().map(f).collect()
    } else {
        paths.iter().map(f).collect()
    }
}

#[cfg(all(feature = "image-io", not(feature = "rayon")))]
fn map_paths<T, F>(paths: &[std::path::PathBuf], _parallel: bool, f: F) -> Vec<T>
where
    F: Fn(&std::path::PathBuf) -> T,
{
    paths.iter().map(f).collect()
}

fn check_indexable(strategy: &Strategy) -> ImgMatchResult<()> {
    if matches!(strategy, Strategy::DeepEmbedding) {
        return Err(ImgMatchError::InvalidInput(
            "deep embeddings are looked up in a store, not extracted",
        ));
    }
    Ok(())
}

/// Pushes described items into a store in order; the single writer.
fn collect_report(
    strategy: &Strategy,
    described: Vec<(String, ImgMatchResult<Features>)>,
) -> ImgMatchResult<IndexReport> {
    let mut report = IndexReport::default();
    for (image_id, features) in described {
        let features = features.and_then(|f| check_image_id(&image_id).map(|()| f));
        match features {
            Ok(features) => {
                report
                    .store
                    .push(FeatureRecord::new(image_id, features.into_values()))?;
            }
            Err(err) if err.is_recoverable() => {
                trace_warn!("image_skipped", image_id = image_id, error = err);
                report.skipped.push((image_id, err));
            }
            Err(err) => return Err(err),
        }
    }
    trace_event!(
        "index_done",
        strategy = strategy.name(),
        records = report.store.len(),
        skipped = report.skipped.len()
    );
    Ok(report)
}

/// Reads a target's precomputed vector from a store.
pub fn lookup_target(store: &FeatureStore, image_id: &str) -> ImgMatchResult<Features> {
    let record = store.require(image_id)?;
    Ok(Features::single(record.vector.clone()))
}

/// Appends the target's embedding from `embeddings` as a new segment.
pub fn attach_embedding(
    features: Features,
    embeddings: &FeatureStore,
    image_id: &str,
) -> ImgMatchResult<Features> {
    let record = embeddings.require(image_id)?;
    Ok(features.with_segment(&record.vector))
}

/// Ranks several targets against one store.
///
/// Each target succeeds or fails on its own; a missing or degenerate target
/// does not stop the others.
pub fn rank_targets<I>(
    matcher: &Matcher,
    store: &FeatureStore,
    targets: I,
) -> Vec<(String, ImgMatchResult<Ranking>)>
where
    I: IntoIterator<Item = (String, ImgMatchResult<Features>)>,
{
    targets
        .into_iter()
        .map(|(image_id, target)| {
            let ranking = target.and_then(|t| matcher.rank(&t, store));
            if let Err(err) = &ranking {
                trace_warn!("query_failed", image_id = image_id, error = err);
            }
            (image_id, ranking)
        })
        .collect()
}
