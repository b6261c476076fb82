use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use image::{Rgb, RgbImage};
use log::info;
use mws_cluster::relabel_consecutive;
use mws_core::{OffsetGraph, Tensor};
use mws_graph::{compute_affinities, compute_valid_edges};
use mws_segment::{
    Algorithm, SegmentationConfig, compute_segmentation, compute_sorted_priority_and_valid_edges,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(name = "mws_gallery")]
#[command(about = "Run mutex watershed segmentation on synthetic data and fixtures")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(name = "synthetic")]
    Synthetic(SyntheticArgs),
    #[command(name = "segment")]
    Segment(FixtureArgs),
    #[command(name = "valid_edges")]
    ValidEdges(FixtureArgs),
}

/// Overrides applied on top of the JSON config.
#[derive(Args, Debug, Clone)]
struct ConfigArgs {
    /// Segmentation config (JSON); missing fields use defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    algorithm: Option<Algorithm>,
    #[arg(long)]
    bias_cut: Option<f32>,
    /// Repulsive edge strides, one per axis (e.g. `2,2`).
    #[arg(long, value_delimiter = ',')]
    strides: Option<Vec<usize>>,
    #[arg(long)]
    randomize_strides: bool,
    /// Keep repulsive weights as they are instead of mapping `w` to `1 - w`.
    #[arg(long)]
    no_invert: bool,
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug, Clone)]
struct SyntheticArgs {
    #[command(flatten)]
    cfg: ConfigArgs,
    #[arg(long, default_value = "docs/fig/raw")]
    out: PathBuf,
    #[arg(long, default_value_t = 128)]
    width: usize,
    #[arg(long, default_value_t = 128)]
    height: usize,
    /// Number of ground-truth segments.
    #[arg(long, default_value_t = 12)]
    blobs: usize,
    /// Amplitude of uniform noise added to the affinities.
    #[arg(long, default_value_t = 0.3)]
    noise: f32,
    /// Seed of the scene generator.
    #[arg(long, default_value_t = 7)]
    scene_seed: u64,
}

#[derive(Args, Debug, Clone)]
struct FixtureArgs {
    #[command(flatten)]
    cfg: ConfigArgs,
    #[arg(long, required = true)]
    input: PathBuf,
    #[arg(long, default_value = "docs/fig/raw")]
    out: PathBuf,
}

/// Affinity fixture: weights of shape `[offsets.len()] + shape`, row-major.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Fixture {
    case: String,
    shape: Vec<usize>,
    offsets: Vec<Vec<isize>>,
    num_attractive: usize,
    weights: Vec<f32>,
    #[serde(default)]
    valid_region: Option<Vec<bool>>,
}

#[derive(Debug, Clone, Serialize)]
struct LabelsDto {
    shape: Vec<usize>,
    labels: Vec<u64>,
}

#[derive(Debug, Clone, Serialize)]
struct MetaSegment {
    case: String,
    config: SegmentationConfig,
    offsets: Vec<Vec<isize>>,
    num_attractive: usize,
    num_segments: usize,
    masked: bool,
    elapsed_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
struct MetaSynthetic {
    width: usize,
    height: usize,
    blobs: usize,
    noise: f32,
    scene_seed: u64,
    config: SegmentationConfig,
    offsets: Vec<Vec<isize>>,
    num_segments: usize,
    truth_segments: usize,
    elapsed_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
struct ChannelCountDto {
    channel: usize,
    offset: Vec<isize>,
    attractive: bool,
    valid: usize,
    total: usize,
}

#[derive(Debug, Clone, Serialize)]
struct ValidEdgesDto {
    case: String,
    config: SegmentationConfig,
    channels: Vec<ChannelCountDto>,
    num_valid: usize,
    top_edges: Vec<usize>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Synthetic(args) => run_synthetic(args),
        Command::Segment(args) => run_segment(args),
        Command::ValidEdges(args) => run_valid_edges(args),
    }
}

fn run_synthetic(args: SyntheticArgs) -> Result<()> {
    if args.width == 0 || args.height == 0 {
        bail!("synthetic scene must be non-empty, got {}x{}.", args.width, args.height);
    }
    if args.blobs == 0 {
        bail!("synthetic scene needs at least one blob.");
    }

    let config = load_config(&args.cfg)?;
    let case_dir = prepare_out_dir(&args.out, "synthetic")?;

    let truth = blob_labels(args.width, args.height, args.blobs, args.scene_seed);
    let offsets = default_offsets_2d();
    let graph = OffsetGraph::new(offsets.clone(), 2).context("building offset graph")?;
    let weights = noisy_affinities(&truth, &offsets, args.noise, args.scene_seed)?;

    let t0 = Instant::now();
    let labels = compute_segmentation(&weights, &graph, &config, None)
        .context("segmenting synthetic affinities")?;
    let elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0;

    let mut compact = labels.into_vec();
    let num_segments = relabel_consecutive(&mut compact, false);
    let mut truth_compact: Vec<u64> = truth.data().iter().map(|&l| u64::from(l)).collect();
    let truth_segments = relabel_consecutive(&mut truth_compact, false);
    info!("synthetic: {num_segments} segments ({truth_segments} in truth), {elapsed_ms:.2} ms");

    save_label_image(case_dir.join("labels.png"), args.width, args.height, &compact)?;
    save_label_image(case_dir.join("truth.png"), args.width, args.height, &truth_compact)?;
    write_json(
        case_dir.join("labels.json"),
        &LabelsDto {
            shape: vec![args.height, args.width],
            labels: compact,
        },
    )?;
    write_json(
        case_dir.join("meta.json"),
        &MetaSynthetic {
            width: args.width,
            height: args.height,
            blobs: args.blobs,
            noise: args.noise,
            scene_seed: args.scene_seed,
            config,
            offsets,
            num_segments,
            truth_segments,
            elapsed_ms,
        },
    )?;

    Ok(())
}

fn run_segment(args: FixtureArgs) -> Result<()> {
    let config = load_config(&args.cfg)?;
    let fixture = load_fixture(&args.input)?;
    let (graph, weights, region) = fixture_tensors(&fixture)?;
    let case_dir = prepare_out_dir(&args.out, &fixture.case)?;

    let t0 = Instant::now();
    let labels = compute_segmentation(&weights, &graph, &config, region.as_ref())
        .with_context(|| format!("segmenting fixture '{}'", fixture.case))?;
    let elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0;

    let mut compact = labels.into_vec();
    let num_segments = relabel_consecutive(&mut compact, region.is_some());
    info!("{}: {num_segments} segments, {elapsed_ms:.2} ms", fixture.case);

    if let [height, width] = fixture.shape[..] {
        save_label_image(case_dir.join("labels.png"), width, height, &compact)?;
    }
    write_json(
        case_dir.join("labels.json"),
        &LabelsDto {
            shape: fixture.shape.clone(),
            labels: compact,
        },
    )?;
    write_json(
        case_dir.join("meta.json"),
        &MetaSegment {
            case: fixture.case.clone(),
            config,
            offsets: fixture.offsets.clone(),
            num_attractive: fixture.num_attractive,
            num_segments,
            masked: region.is_some(),
            elapsed_ms,
        },
    )?;

    Ok(())
}

fn run_valid_edges(args: FixtureArgs) -> Result<()> {
    let config = load_config(&args.cfg)?;
    let fixture = load_fixture(&args.input)?;
    let (graph, weights, region) = fixture_tensors(&fixture)?;
    let case_dir = prepare_out_dir(&args.out, &fixture.case)?;

    let exclude = region.as_ref().map(|r| r.map(|&inside| !inside));
    let strides = config.stride_spec();
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let valid = compute_valid_edges(
        weights.shape(),
        &graph,
        strides.as_ref(),
        exclude.as_ref(),
        &mut rng,
    )
    .context("computing valid edges")?;

    let channels = (0..graph.num_channels())
        .map(|c| {
            let mask = valid.channel(c).unwrap_or_default();
            ChannelCountDto {
                channel: c,
                offset: graph.offsets()[c].clone(),
                attractive: graph.is_attractive(c),
                valid: mask.iter().filter(|&&v| v).count(),
                total: mask.len(),
            }
        })
        .collect();

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let priority = compute_sorted_priority_and_valid_edges(
        &weights,
        &graph,
        strides.as_ref(),
        config.invert_repulsive_weights,
        config.bias_cut,
        &mut rng,
    )
    .context("computing priority order")?;

    write_json(
        case_dir.join("valid_edges.json"),
        &ValidEdgesDto {
            case: fixture.case.clone(),
            config,
            channels,
            num_valid: priority.num_valid,
            top_edges: priority.valid_order().iter().take(32).copied().collect(),
        },
    )?;

    Ok(())
}

fn load_config(args: &ConfigArgs) -> Result<SegmentationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            ensure_file_exists(path, "config")?;
            read_json(path).with_context(|| format!("reading config {}", path.display()))?
        }
        None => SegmentationConfig::default(),
    };

    if let Some(algorithm) = args.algorithm {
        config.algorithm = algorithm;
    }
    if let Some(bias_cut) = args.bias_cut {
        config.bias_cut = bias_cut;
    }
    if let Some(strides) = &args.strides {
        config.strides = Some(strides.clone());
    }
    if args.randomize_strides {
        config.randomize_strides = true;
    }
    if args.no_invert {
        config.invert_repulsive_weights = false;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    Ok(config)
}

fn load_fixture(path: &Path) -> Result<Fixture> {
    ensure_file_exists(path, "input")?;
    read_json(path).with_context(|| format!("reading fixture {}", path.display()))
}

fn fixture_tensors(
    fixture: &Fixture,
) -> Result<(OffsetGraph, Tensor<f32>, Option<Tensor<bool>>)> {
    let graph = OffsetGraph::new(fixture.offsets.clone(), fixture.num_attractive)
        .with_context(|| format!("invalid offsets in fixture '{}'", fixture.case))?;
    let weights = Tensor::from_vec(&graph.edge_shape(&fixture.shape), fixture.weights.clone())
        .with_context(|| format!("weights of fixture '{}'", fixture.case))?;
    let region = fixture
        .valid_region
        .as_ref()
        .map(|r| Tensor::from_vec(&fixture.shape, r.clone()))
        .transpose()
        .with_context(|| format!("valid_region of fixture '{}'", fixture.case))?;
    Ok((graph, weights, region))
}

fn default_offsets_2d() -> Vec<Vec<isize>> {
    vec![
        vec![-1, 0],
        vec![0, -1],
        vec![-3, 0],
        vec![0, -3],
        vec![-9, 0],
        vec![0, -9],
        vec![-9, -9],
        vec![9, -9],
    ]
}

/// Nearest-seed partition of a `height x width` grid.
fn blob_labels(width: usize, height: usize, blobs: usize, seed: u64) -> Tensor<u32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let seeds: Vec<(f32, f32)> = (0..blobs)
        .map(|_| (rng.gen_range(0.0..height as f32), rng.gen_range(0.0..width as f32)))
        .collect();

    let data = (0..width * height)
        .map(|i| {
            let (y, x) = ((i / width) as f32, (i % width) as f32);
            let mut best = (f32::INFINITY, 0u32);
            for (id, &(sy, sx)) in seeds.iter().enumerate() {
                let d = (y - sy).powi(2) + (x - sx).powi(2);
                if d < best.0 {
                    best = (d, id as u32 + 1);
                }
            }
            best.1
        })
        .collect();

    Tensor::from_vec(&[height, width], data).expect("data length equals width * height")
}

fn noisy_affinities(
    truth: &Tensor<u32>,
    offsets: &[Vec<isize>],
    noise: f32,
    seed: u64,
) -> Result<Tensor<f32>> {
    let (mut affs, _) =
        compute_affinities(truth, offsets, None).context("computing ground-truth affinities")?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));
    for w in affs.data_mut() {
        let jitter = rng.gen_range(-1.0f32..=1.0) * noise;
        *w = (*w + jitter).clamp(0.0, 1.0);
    }
    Ok(affs)
}

fn label_color(label: u64) -> Rgb<u8> {
    if label == 0 {
        return Rgb([0, 0, 0]);
    }
    let h = label.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let [r, g, b] = [h >> 40, h >> 24, h >> 8].map(|v| 64 + (v & 0xBF) as u8);
    Rgb([r, g, b])
}

fn save_label_image(path: PathBuf, width: usize, height: usize, labels: &[u64]) -> Result<()> {
    if labels.len() != width * height {
        bail!(
            "label count {} does not match image size {}x{}.",
            labels.len(),
            width,
            height
        );
    }
    let rgb = RgbImage::from_fn(width as u32, height as u32, |x, y| {
        label_color(labels[y as usize * width + x as usize])
    });
    rgb.save(&path)
        .with_context(|| format!("saving image {}", path.display()))
}

fn prepare_out_dir(out: &Path, case_name: &str) -> Result<PathBuf> {
    let case_dir = out.join(case_name);
    fs::create_dir_all(&case_dir)
        .with_context(|| format!("creating output directory {}", case_dir.display()))?;
    Ok(case_dir)
}

fn write_json(path: PathBuf, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(&path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing json {}", path.display()))
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}
