use std::collections::HashMap;
use std::sync::{Arc, mpsc};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::encode::png::png_data_url;
use crate::encode::sink::{PortraitSink, SinkConfig};
use crate::foundation::error::{VizageError, VizageResult};
use crate::portrait::config::PortraitConfig;
use crate::portrait::selection::PortraitSelection;
use crate::render::backend::PortraitRenderer;
use crate::render::compositor::{MAX_OUTPUT_SIZE, validate_output_size};
use crate::render::thumbnail::reduce;

const SUFFIX_LEN: usize = 6;
const SUFFIX_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Options controlling batch generation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchOpts {
    /// Full-size output edge in pixels.
    pub size: u32,
    /// Thumbnail edge in pixels.
    pub thumbnail_size: u32,
    /// Prefix of generated names.
    pub name_prefix: String,
    /// Seed for name suffixes. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Render entries on a rayon pool.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Entries handed to the pool at once; bounds the reorder buffer.
    pub chunk_size: usize,
    /// Bounded channel capacity between render workers and the sink thread.
    pub channel_capacity: usize,
}

impl Default for BatchOpts {
    fn default() -> Self {
        Self {
            size: 1024,
            thumbnail_size: 128,
            name_prefix: "portrait".to_owned(),
            seed: None,
            parallel: false,
            threads: None,
            chunk_size: 16,
            channel_capacity: 4,
        }
    }
}

/// One batch input: an optional name plus the selection to render.
///
/// Deserializes from `{ "name": ..., "config": {...} }` or from a bare selection object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BatchEntryRepr")]
pub struct BatchEntry {
    /// Explicit name; generated when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Selection to render.
    pub config: PortraitSelection,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BatchEntryRepr {
    Entry {
        #[serde(default)]
        name: Option<String>,
        config: PortraitSelection,
    },
    Bare(PortraitSelection),
}

impl From<BatchEntryRepr> for BatchEntry {
    fn from(repr: BatchEntryRepr) -> Self {
        match repr {
            BatchEntryRepr::Entry { name, config } => Self { name, config },
            BatchEntryRepr::Bare(config) => Self { name: None, config },
        }
    }
}

impl From<PortraitSelection> for BatchEntry {
    fn from(config: PortraitSelection) -> Self {
        Self { name: None, config }
    }
}

/// PNG bytes of one rendered portrait.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedPortrait {
    /// Full-size PNG.
    pub full_size_png: Vec<u8>,
    /// Thumbnail PNG.
    pub thumbnail_png: Vec<u8>,
}

/// Outcome for one entry, in input order.
#[derive(Debug)]
pub struct BatchItem {
    /// Position in the input list.
    pub index: usize,
    /// Given or generated name.
    pub name: String,
    /// Selection that was rendered.
    pub config: PortraitSelection,
    /// Encoded images, or why this entry failed.
    pub result: VizageResult<EncodedPortrait>,
}

impl BatchItem {
    /// Whether the entry rendered.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Persistable record with both images inlined as data URLs. `None` for failed entries.
    pub fn to_portrait_config(&self) -> Option<PortraitConfig> {
        let encoded = self.result.as_ref().ok()?;
        Some(PortraitConfig {
            name: self.name.clone(),
            config: self.config.clone(),
            thumbnail: png_data_url(&encoded.thumbnail_png),
            full_size_image: Some(png_data_url(&encoded.full_size_png)),
            uploaded: None,
        })
    }
}

/// Batch statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    /// Entries in the batch.
    pub items_total: usize,
    /// Entries that rendered.
    pub items_ok: usize,
    /// Entries that failed.
    pub items_failed: usize,
}

#[derive(Clone, Debug)]
struct Job {
    index: usize,
    name: String,
    config: PortraitSelection,
}

/// Renders a list of selections with one renderer, in input order.
///
/// Each entry is independent: a failing entry yields an error item and its siblings still render.
pub struct BatchSession {
    renderer: Arc<dyn PortraitRenderer>,
    opts: BatchOpts,
}

impl BatchSession {
    /// Construct a session, validating the output sizes.
    pub fn new(renderer: Arc<dyn PortraitRenderer>, opts: BatchOpts) -> VizageResult<Self> {
        validate_output_size(opts.size)?;
        if opts.thumbnail_size == 0 || opts.thumbnail_size > MAX_OUTPUT_SIZE {
            return Err(VizageError::validation(format!(
                "thumbnail size must be in 1..={MAX_OUTPUT_SIZE}, got {}",
                opts.thumbnail_size
            )));
        }
        Ok(Self { renderer, opts })
    }

    /// Session options.
    pub fn opts(&self) -> &BatchOpts {
        &self.opts
    }

    /// Lazily render `entries`; each `next()` renders exactly one entry.
    ///
    /// All entries are validated before this returns.
    pub fn iter(&self, entries: Vec<BatchEntry>) -> VizageResult<BatchIter<'_>> {
        let jobs = self.prepare(entries)?;
        Ok(BatchIter {
            session: self,
            jobs: jobs.into_iter(),
        })
    }

    /// Render `entries` into `sink`, in input order.
    ///
    /// When `parallel` is enabled, out-of-order worker completion is reordered at the sink
    /// boundary (bounded channel backpressure).
    pub fn render_into(
        &self,
        entries: Vec<BatchEntry>,
        sink: &mut dyn PortraitSink,
    ) -> VizageResult<BatchStats> {
        let jobs = self.prepare(entries)?;
        let total = jobs.len();
        let cfg = SinkConfig {
            size: self.opts.size,
            thumbnail_size: self.opts.thumbnail_size,
            total,
        };
        let cap = self.opts.channel_capacity.max(1);
        let chunk_size = self.opts.chunk_size.max(1);

        let pool = if self.opts.parallel {
            Some(build_thread_pool(self.opts.threads)?)
        } else {
            None
        };

        tracing::info!(
            total,
            parallel = self.opts.parallel,
            size = self.opts.size,
            "batch started"
        );

        // Sink thread: enforce in-order delivery regardless of render completion order.
        let stats = std::thread::scope(|scope| -> VizageResult<BatchStats> {
            let (tx, rx) = mpsc::sync_channel::<BatchItem>(cap);
            let sink_ref: &mut dyn PortraitSink = sink;

            let writer = scope.spawn(move || -> VizageResult<BatchStats> {
                sink_ref.begin(cfg)?;

                let mut stats = BatchStats {
                    items_total: total,
                    ..BatchStats::default()
                };
                let mut next = 0usize;
                let mut pending = HashMap::<usize, BatchItem>::new();
                while next < total {
                    let item = match pending.remove(&next) {
                        Some(item) => item,
                        None => {
                            let item = rx.recv().map_err(|_| {
                                VizageError::render("item channel disconnected unexpectedly")
                            })?;
                            if item.index != next {
                                pending.insert(item.index, item);
                                continue;
                            }
                            item
                        }
                    };
                    if item.is_ok() {
                        stats.items_ok += 1;
                    } else {
                        stats.items_failed += 1;
                    }
                    sink_ref.push_item(item)?;
                    next += 1;
                }

                sink_ref.end()?;
                Ok(stats)
            });

            let produce_res = match pool.as_ref() {
                Some(pool) => jobs.chunks(chunk_size).try_for_each(|chunk| {
                    pool.install(|| {
                        chunk.par_iter().try_for_each_init(
                            || tx.clone(),
                            |tx, job| {
                                tx.send(self.render_job(job)).map_err(|_| {
                                    VizageError::render("sink thread is not accepting items")
                                })
                            },
                        )
                    })
                }),
                None => jobs.iter().try_for_each(|job| {
                    tx.send(self.render_job(job))
                        .map_err(|_| VizageError::render("sink thread is not accepting items"))
                }),
            };

            drop(tx);
            let writer_res = writer
                .join()
                .map_err(|_| VizageError::render("sink thread panicked"))?;

            // A sink failure closes the channel; report it rather than the send error it causes.
            let stats = writer_res?;
            produce_res?;
            Ok(stats)
        })?;

        tracing::info!(
            ok = stats.items_ok,
            failed = stats.items_failed,
            "batch finished"
        );
        Ok(stats)
    }

    fn prepare(&self, entries: Vec<BatchEntry>) -> VizageResult<Vec<Job>> {
        if entries.is_empty() {
            return Err(VizageError::validation("batch must contain at least one entry"));
        }
        for (index, entry) in entries.iter().enumerate() {
            entry
                .config
                .validate()
                .map_err(|e| VizageError::validation(format!("entry {index}: {e}")))?;
        }

        let mut namer = Namer::new(&self.opts);
        Ok(entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| Job {
                index,
                name: entry.name.unwrap_or_else(|| namer.name(index)),
                config: entry.config,
            })
            .collect())
    }

    #[tracing::instrument(skip(self, job), fields(index = job.index, name = %job.name))]
    fn render_job(&self, job: &Job) -> BatchItem {
        let result = self.encode(&job.config);
        if let Err(e) = &result {
            tracing::warn!(error = %e, "portrait failed");
        }
        BatchItem {
            index: job.index,
            name: job.name.clone(),
            config: job.config.clone(),
            result,
        }
    }

    fn encode(&self, sel: &PortraitSelection) -> VizageResult<EncodedPortrait> {
        let image = self.renderer.render(sel, self.opts.size)?;
        let thumb = reduce(&image, self.opts.thumbnail_size)?;
        Ok(EncodedPortrait {
            full_size_png: image.encode_png()?,
            thumbnail_png: thumb.encode_png()?,
        })
    }
}

/// Lazy, ordered batch iterator returned by [`BatchSession::iter`].
pub struct BatchIter<'a> {
    session: &'a BatchSession,
    jobs: std::vec::IntoIter<Job>,
}

impl Iterator for BatchIter<'_> {
    type Item = BatchItem;

    fn next(&mut self) -> Option<BatchItem> {
        let job = self.jobs.next()?;
        Some(self.session.render_job(&job))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.jobs.size_hint()
    }
}

impl ExactSizeIterator for BatchIter<'_> {}

/// Generates `{prefix}_{unix_millis}_{index}_{suffix}` names.
struct Namer {
    prefix: String,
    millis: u128,
    rng: StdRng,
}

impl Namer {
    fn new(opts: &BatchOpts) -> Self {
        let millis = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let rng = match opts.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            prefix: opts.name_prefix.clone(),
            millis,
            rng,
        }
    }

    fn name(&mut self, index: usize) -> String {
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| char::from(SUFFIX_CHARS[self.rng.gen_range(0..SUFFIX_CHARS.len())]))
            .collect();
        format!("{}_{}_{index}_{suffix}", self.prefix, self.millis)
    }
}

fn build_thread_pool(threads: Option<usize>) -> VizageResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(VizageError::validation(
            "batch 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| VizageError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/session/batch.rs"]
mod tests;
