use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Parser, Debug)]
#[command(name = "vizage", version)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one portrait as a PNG.
    Render(RenderArgs),
    /// Render many portraits, streaming results in input order.
    Batch(BatchArgs),
    /// List the part keys of an atlas.
    Parts(PartsArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Sprite atlas directory.
    #[arg(long)]
    assets: PathBuf,

    /// Portrait selection JSON.
    #[arg(long)]
    config: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Output edge in pixels.
    #[arg(long, default_value_t = 1024)]
    size: u32,

    /// Also write a thumbnail PNG here.
    #[arg(long)]
    thumb: Option<PathBuf>,

    /// Thumbnail edge in pixels.
    #[arg(long, default_value_t = 128)]
    thumb_size: u32,

    /// Use the preview renderer (nearest-neighbour sampling).
    #[arg(long, default_value_t = false)]
    preview: bool,

    /// Fail on part keys missing from the atlas.
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Draw the atlas backdrop under the portrait.
    #[arg(long, default_value_t = false)]
    backdrop: bool,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Sprite atlas directory.
    #[arg(long)]
    assets: PathBuf,

    /// JSON array of entries (`{name?, config}` or bare selections).
    #[arg(long = "in", conflicts_with = "random", required_unless_present = "random")]
    in_path: Option<PathBuf>,

    /// Generate this many random selections instead of reading `--in`.
    #[arg(long)]
    random: Option<usize>,

    /// Seed for random selections and generated names.
    #[arg(long)]
    seed: Option<u64>,

    /// Write PNGs and `portraits.json` here instead of streaming NDJSON to stdout.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Output edge in pixels.
    #[arg(long, default_value_t = 1024)]
    size: u32,

    /// Thumbnail edge in pixels.
    #[arg(long, default_value_t = 128)]
    thumb_size: u32,

    /// Prefix of generated names.
    #[arg(long, default_value = "portrait")]
    prefix: String,

    /// Enable portrait-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Render chunk size (parallel mode only).
    #[arg(long, default_value_t = 16)]
    chunk_size: usize,

    /// Fail entries whose part keys are missing from the atlas.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[derive(Parser, Debug)]
struct PartsArgs {
    /// Sprite atlas directory.
    #[arg(long)]
    assets: PathBuf,

    /// Only list this category.
    #[arg(long)]
    category: Option<vizage::PartCategory>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Batch(args) => cmd_batch(args),
        Command::Parts(args) => cmd_parts(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn compositor_opts(strict: bool, backdrop: bool) -> vizage::CompositorOpts {
    vizage::CompositorOpts {
        part_policy: if strict {
            vizage::PartPolicy::Strict
        } else {
            vizage::PartPolicy::Lenient
        },
        backdrop,
        ..vizage::CompositorOpts::default()
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let atlas = Arc::new(vizage::SpriteAtlas::load(&args.assets)?);
    let sel = vizage::PortraitSelection::from_path(&args.config)?;
    let kind = if args.preview {
        vizage::RendererKind::Preview
    } else {
        vizage::RendererKind::Batch
    };
    let renderer =
        vizage::create_renderer(kind, atlas, compositor_opts(args.strict, args.backdrop));

    let image = renderer.render(&sel, args.size)?;
    write_file(&args.out, &image.encode_png()?)?;
    eprintln!("wrote {}", args.out.display());

    if let Some(thumb_path) = &args.thumb {
        let thumb = vizage::reduce_thumbnail(&image, args.thumb_size)?;
        write_file(thumb_path, &thumb.encode_png()?)?;
        eprintln!("wrote {}", thumb_path.display());
    }
    Ok(())
}

fn cmd_batch(args: BatchArgs) -> anyhow::Result<()> {
    let atlas = Arc::new(vizage::SpriteAtlas::load(&args.assets)?);

    let entries: Vec<vizage::BatchEntry> = match (&args.in_path, args.random) {
        (Some(path), _) => {
            let bytes =
                std::fs::read(path).with_context(|| format!("read batch '{}'", path.display()))?;
            serde_json::from_slice(&bytes)
                .with_context(|| format!("parse batch '{}'", path.display()))?
        }
        (None, Some(n)) => {
            let sampler = vizage::SelectionSampler::new(&atlas);
            let mut rng = match args.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            (0..n)
                .map(|_| vizage::BatchEntry::from(sampler.sample(&mut rng)))
                .collect()
        }
        (None, None) => anyhow::bail!("either --in or --random is required"),
    };

    let renderer: Arc<dyn vizage::PortraitRenderer> = Arc::new(vizage::BatchRenderer::new(
        atlas,
        compositor_opts(args.strict, false),
    ));
    let opts = vizage::BatchOpts {
        size: args.size,
        thumbnail_size: args.thumb_size,
        name_prefix: args.prefix,
        seed: args.seed,
        parallel: args.parallel,
        threads: args.threads,
        chunk_size: args.chunk_size,
        ..vizage::BatchOpts::default()
    };
    let session = vizage::BatchSession::new(renderer, opts)?;

    let stats = match &args.out_dir {
        Some(dir) => {
            let mut sink = vizage::DirectorySink::new(dir);
            let stats = session.render_into(entries, &mut sink)?;
            eprintln!("wrote {}", sink.dir().display());
            stats
        }
        None => {
            let mut sink = vizage::JsonLinesSink::new(std::io::stdout());
            session.render_into(entries, &mut sink)?
        }
    };

    eprintln!(
        "rendered {} portraits ({} failed)",
        stats.items_ok, stats.items_failed
    );
    Ok(())
}

fn cmd_parts(args: PartsArgs) -> anyhow::Result<()> {
    let atlas = vizage::SpriteAtlas::load(&args.assets)?;
    match args.category {
        Some(category) => {
            for key in atlas.part_keys(category) {
                println!("{key}");
            }
        }
        None => {
            for category in vizage::PartCategory::ALL {
                for key in atlas.part_keys(category) {
                    println!("{category}\t{key}");
                }
            }
        }
    }
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write png '{}'", path.display()))
}
