use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Serialize;

use crate::encode::png::png_data_url;
use crate::foundation::error::VizageResult;
use crate::portrait::config::PortraitConfig;
use crate::portrait::selection::PortraitSelection;
use crate::session::batch::BatchItem;

/// File written by [`DirectorySink`] once the batch ends.
pub const PORTRAITS_INDEX_FILE: &str = "portraits.json";

/// Configuration provided to a [`PortraitSink`] at the start of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkConfig {
    /// Full-size edge in pixels.
    pub size: u32,
    /// Thumbnail edge in pixels.
    pub thumbnail_size: u32,
    /// Number of items that will be pushed.
    pub total: usize,
}

/// Sink contract for consuming batch results.
///
/// Ordering contract: `push_item` is called exactly once per entry, in strictly increasing index
/// order, including for entries whose render failed.
pub trait PortraitSink: Send {
    /// Called once before any items are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> VizageResult<()>;
    /// Push one finished item.
    fn push_item(&mut self, item: BatchItem) -> VizageResult<()>;
    /// Called once after the last item is pushed.
    fn end(&mut self) -> VizageResult<()>;
}

/// In-memory sink for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    items: Vec<BatchItem>,
    ended: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Borrow the captured items.
    pub fn items(&self) -> &[BatchItem] {
        &self.items
    }

    /// Take the captured items.
    pub fn into_items(self) -> Vec<BatchItem> {
        self.items
    }

    /// Whether `end` was called.
    pub fn ended(&self) -> bool {
        self.ended
    }
}

impl PortraitSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> VizageResult<()> {
        self.cfg = Some(cfg);
        self.items.clear();
        self.ended = false;
        Ok(())
    }

    fn push_item(&mut self, item: BatchItem) -> VizageResult<()> {
        self.items.push(item);
        Ok(())
    }

    fn end(&mut self) -> VizageResult<()> {
        self.ended = true;
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(
    tag = "event",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
enum StreamEvent<'a> {
    Start {
        total: usize,
        size: u32,
        thumbnail_size: u32,
    },
    Item {
        index: usize,
        name: &'a str,
        config: &'a PortraitSelection,
        thumbnail: String,
        full_size_image: String,
    },
    Error {
        index: usize,
        name: &'a str,
        config: &'a PortraitSelection,
        error: String,
    },
    End {
        ok: usize,
        failed: usize,
    },
}

/// Newline-delimited JSON event stream, flushed after every event.
///
/// Emits `start`, then one `item` or `error` per entry, then `end`.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write + Send> {
    out: W,
    ok: usize,
    failed: usize,
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Stream events into `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            ok: 0,
            failed: 0,
        }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: &StreamEvent<'_>) -> VizageResult<()> {
        serde_json::to_writer(&mut self.out, event)?;
        self.out.write_all(b"\n").context("write event line")?;
        self.out.flush().context("flush event stream")?;
        Ok(())
    }
}

impl<W: Write + Send> PortraitSink for JsonLinesSink<W> {
    fn begin(&mut self, cfg: SinkConfig) -> VizageResult<()> {
        self.ok = 0;
        self.failed = 0;
        self.emit(&StreamEvent::Start {
            total: cfg.total,
            size: cfg.size,
            thumbnail_size: cfg.thumbnail_size,
        })
    }

    fn push_item(&mut self, item: BatchItem) -> VizageResult<()> {
        let event = match &item.result {
            Ok(encoded) => {
                self.ok += 1;
                StreamEvent::Item {
                    index: item.index,
                    name: &item.name,
                    config: &item.config,
                    thumbnail: png_data_url(&encoded.thumbnail_png),
                    full_size_image: png_data_url(&encoded.full_size_png),
                }
            }
            Err(e) => {
                self.failed += 1;
                StreamEvent::Error {
                    index: item.index,
                    name: &item.name,
                    config: &item.config,
                    error: e.to_string(),
                }
            }
        };
        self.emit(&event)
    }

    fn end(&mut self) -> VizageResult<()> {
        self.emit(&StreamEvent::End {
            ok: self.ok,
            failed: self.failed,
        })
    }
}

/// Writes `<name>.png` and `<name>.thumb.png` per item and a closing `portraits.json`.
///
/// Failed items are logged and left out of the index. Names that sanitize to the same file stem
/// get a numeric suffix (`name_2.png`).
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    records: Vec<PortraitConfig>,
    stems: HashSet<String>,
}

impl DirectorySink {
    /// Sink writing into `dir` (created on `begin`).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            records: Vec::new(),
            stems: HashSet::new(),
        }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Records written so far.
    pub fn records(&self) -> &[PortraitConfig] {
        &self.records
    }

    // Stems are compared case-insensitively so case-folding file systems cannot collide either.
    fn claim_stem(&mut self, name: &str) -> String {
        let base = file_stem(name);
        let mut stem = base.clone();
        let mut n = 2usize;
        while !self.stems.insert(stem.to_ascii_lowercase()) {
            stem = format!("{base}_{n}");
            n += 1;
        }
        stem
    }
}

impl PortraitSink for DirectorySink {
    fn begin(&mut self, _cfg: SinkConfig) -> VizageResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir '{}'", self.dir.display()))?;
        self.records.clear();
        self.stems.clear();
        Ok(())
    }

    fn push_item(&mut self, item: BatchItem) -> VizageResult<()> {
        let encoded = match &item.result {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(index = item.index, name = %item.name, error = %e, "skipping failed portrait");
                return Ok(());
            }
        };

        let stem = self.claim_stem(&item.name);
        let full_name = format!("{stem}.png");
        let full_path = self.dir.join(&full_name);
        std::fs::write(&full_path, &encoded.full_size_png)
            .with_context(|| format!("write '{}'", full_path.display()))?;
        let thumb_path = self.dir.join(format!("{stem}.thumb.png"));
        std::fs::write(&thumb_path, &encoded.thumbnail_png)
            .with_context(|| format!("write '{}'", thumb_path.display()))?;

        self.records.push(PortraitConfig {
            name: item.name,
            config: item.config,
            thumbnail: png_data_url(&encoded.thumbnail_png),
            full_size_image: Some(full_name),
            uploaded: None,
        });
        Ok(())
    }

    fn end(&mut self) -> VizageResult<()> {
        let path = self.dir.join(PORTRAITS_INDEX_FILE);
        let json = serde_json::to_vec_pretty(&self.records)?;
        std::fs::write(&path, json).with_context(|| format!("write '{}'", path.display()))?;
        tracing::info!(portraits = self.records.len(), dir = %self.dir.display(), "portrait index written");
        Ok(())
    }
}

/// File-system safe stem for a portrait name.
fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_start_matches('.');
    if stem.is_empty() {
        "portrait".to_owned()
    } else {
        stem.to_owned()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
