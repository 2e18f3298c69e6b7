use clap::{Parser, Subcommand};
use imgmatch::io::load_bgr_image;
use imgmatch::{
    attach_embedding, image_id_from_path, index_directory, lookup_target, rank_targets,
    FeatureStore, Features, ImgMatchResult, IndexConfig, MatchConfig, Matcher, Method, Metric,
    RankedMatch, Ranking, Rect, RegionLayout, Strategy, WeightedMetric, WeightedTerm,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Content-based image retrieval over feature stores")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    /// Path to a JSON configuration file.
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable info-level tracing output.
    #[arg(long, global = true)]
    trace: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract features for every image in a directory into a store file.
    Extract {
        /// Directory of images to index.
        image_dir: PathBuf,
        /// Strategy name (baseline, histogram, texture, chromaticity, multi,
        /// color-texture, custom).
        strategy: String,
        /// Output store file.
        output: PathBuf,
        /// Histogram bucket count per axis.
        #[arg(long)]
        bins: Option<usize>,
        /// Extract images in parallel.
        #[arg(long)]
        parallel: bool,
    },
    /// Rank every stored image against a target image.
    Match {
        /// Target image path; its file name is the id for store lookups.
        target: PathBuf,
        /// Strategy name used to build the store.
        strategy: String,
        /// Store file produced by `extract` (or an embedding file for `deep`).
        store: PathBuf,
        /// Number of best matches to report.
        k: usize,
        /// Histogram bucket count per axis.
        #[arg(long)]
        bins: Option<usize>,
        /// Embedding store joined in by the `custom` strategy.
        #[arg(long, value_name = "FILE")]
        embeddings: Option<PathBuf>,
        /// Also report this many least similar images.
        #[arg(long)]
        least: Option<usize>,
        /// Additional target images ranked in the same run.
        #[arg(long, value_name = "IMAGE")]
        also: Vec<PathBuf>,
        /// Score records in parallel.
        #[arg(long)]
        parallel: bool,
        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum MetricConfig {
    Ssd,
    Intersection,
    IntersectionDistance,
    Cosine,
}

impl From<MetricConfig> for Metric {
    fn from(value: MetricConfig) -> Self {
        match value {
            MetricConfig::Ssd => Metric::Ssd,
            MetricConfig::Intersection => Metric::Intersection,
            MetricConfig::IntersectionDistance => Metric::IntersectionDistance,
            MetricConfig::Cosine => Metric::Cosine,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MetricWeightJson {
    metric: MetricConfig,
    weight: f32,
}

#[derive(Debug, Deserialize)]
struct RectJson {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
enum RegionsJson {
    #[default]
    Halves,
    Grid {
        columns: usize,
        rows: usize,
    },
    Rects {
        rects: Vec<RectJson>,
    },
}

impl From<RegionsJson> for RegionLayout {
    fn from(value: RegionsJson) -> Self {
        match value {
            RegionsJson::Halves => RegionLayout::Halves,
            RegionsJson::Grid { columns, rows } => RegionLayout::Grid { columns, rows },
            RegionsJson::Rects { rects } => RegionLayout::Rects(
                rects
                    .into_iter()
                    .map(|r| Rect::new(r.x, r.y, r.width, r.height))
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    bins: Option<usize>,
    regions: RegionsJson,
    metric_weights: Option<Vec<MetricWeightJson>>,
    parallel: bool,
    least: usize,
    embeddings: Option<PathBuf>,
}

impl Config {
    fn load(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .map_err(|err| format!("reading config {}: {err}", path.display()))?;
                Ok(serde_json::from_str(&text)?)
            }
            None => Ok(Self::default()),
        }
    }

    fn metric(&mut self, method: Method, regions: &RegionLayout) -> ImgMatchResult<WeightedMetric> {
        match self.metric_weights.take() {
            Some(weights) => WeightedMetric::new(
                weights
                    .into_iter()
                    .map(|w| WeightedTerm::new(w.metric.into(), w.weight))
                    .collect(),
            ),
            None => method.default_metric(regions),
        }
    }
}

#[derive(Debug, Serialize)]
struct MatchRecord {
    image_id: String,
    score: f32,
}

impl From<RankedMatch> for MatchRecord {
    fn from(value: RankedMatch) -> Self {
        Self {
            image_id: value.image_id,
            score: value.score,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    target: String,
    best: Vec<MatchRecord>,
    worst: Vec<MatchRecord>,
    skipped: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut filter = EnvFilter::from_default_env().add_directive("warn".parse()?);
    if cli.trace {
        filter = filter.add_directive("imgmatch=info".parse()?);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let mut config = Config::load(cli.config.as_deref())?;
    match cli.command {
        Some(Command::Extract {
            image_dir,
            strategy,
            output,
            bins,
            parallel,
        }) => {
            let method: Method = strategy.parse()?;
            let regions = RegionLayout::from(std::mem::take(&mut config.regions));
            let strategy = method.strategy(bins.or(config.bins), &regions);
            let cfg = IndexConfig {
                parallel: parallel || config.parallel,
            };
            let report = index_directory(&image_dir, &strategy, &cfg)?;
            for (image_id, err) in &report.skipped {
                tracing::info!(%image_id, %err, "skipped");
            }
            report.store.write_to(&output)?;
            println!(
                "Wrote {} records to {} ({} skipped)",
                report.store.len(),
                output.display(),
                report.skipped.len()
            );
            Ok(())
        }
        Some(Command::Match {
            target,
            strategy,
            store,
            k,
            bins,
            embeddings,
            least,
            also,
            parallel,
            json,
        }) => {
            let method: Method = strategy.parse()?;
            let regions = RegionLayout::from(std::mem::take(&mut config.regions));
            let strategy = method.strategy(bins.or(config.bins), &regions);
            let metric = config.metric(method, &regions)?;
            let matcher = Matcher::new(metric).with_config(MatchConfig {
                k,
                least: least.unwrap_or(config.least),
                parallel: parallel || config.parallel,
            });

            let mut records = FeatureStore::read_from(&store)?;
            let embeddings = if method.uses_embeddings() {
                let path = embeddings
                    .or(config.embeddings.take())
                    .ok_or("the custom strategy needs --embeddings")?;
                let embeddings = FeatureStore::read_from(&path)?;
                let (joined, missing) = records.join(&embeddings);
                if !missing.is_empty() {
                    tracing::warn!(count = missing.len(), "stored images without an embedding");
                }
                records = joined;
                Some(embeddings)
            } else {
                None
            };

            let targets = std::iter::once(target).chain(also).map(|path| {
                let resolved = image_id_from_path(&path).and_then(|image_id| {
                    let features =
                        resolve_target(method, &strategy, &path, &image_id, &records, &embeddings);
                    Ok((image_id, features))
                });
                match resolved {
                    Ok(pair) => pair,
                    Err(err) => (path.display().to_string(), Err(err)),
                }
            });

            let mut failures = 0usize;
            for (image_id, ranking) in rank_targets(&matcher, &records, targets) {
                match ranking {
                    Ok(ranking) => print_ranking(&image_id, ranking, json)?,
                    Err(err) => {
                        eprintln!("Error: {image_id}: {err}");
                        failures += 1;
                    }
                }
            }
            if failures > 0 {
                return Err(format!("{failures} target(s) failed").into());
            }
            Ok(())
        }
        None => Err("no command given (try --help)".into()),
    }
}

fn resolve_target(
    method: Method,
    strategy: &Strategy,
    path: &Path,
    image_id: &str,
    store: &FeatureStore,
    embeddings: &Option<FeatureStore>,
) -> ImgMatchResult<Features> {
    if method.target_from_store() {
        return lookup_target(store, image_id);
    }
    let features = load_bgr_image(path).and_then(|img| strategy.describe(&img))?;
    match embeddings {
        Some(embeddings) => attach_embedding(features, embeddings, image_id),
        None => Ok(features),
    }
}

fn print_ranking(
    target: &str,
    ranking: Ranking,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let output = Output {
            target: target.to_string(),
            best: ranking.best.into_iter().map(MatchRecord::from).collect(),
            worst: ranking.worst.into_iter().map(MatchRecord::from).collect(),
            skipped: ranking.skipped,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Top {} matches for {target}:", ranking.best.len());
    for m in &ranking.best {
        println!("{} ({})", m.image_id, m.score);
    }
    if !ranking.worst.is_empty() {
        println!("Least similar to {target}:");
        for m in &ranking.worst {
            println!("{} ({})", m.image_id, m.score);
        }
    }
    if ranking.skipped > 0 {
        println!("({} records skipped)", ranking.skipped);
    }
    Ok(())
}
