//! Write pipeline: drives a record source into a row-group writer.
//!
//! The pipeline pulls rows one at a time, checks the cancel token between
//! reads, and reports progress at a configurable interval. Cancellation is
//! cooperative and is not an error: the session finalizes normally and the
//! file is structurally valid, truncated at the last completed flush.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rowpipe_result::Result;

use crate::source::RecordSource;
use crate::writer::{RowGroupWriter, WriterConfig};

/// Cooperative cancellation flag, cheap to clone and share across threads.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    /// Request a stop. Observed once per row in the write loop and once per
    /// row (group) in the scan loop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Progress callback: receives the cumulative row count.
pub type ProgressFn<'a> = &'a mut dyn FnMut(u64);

/// One-shot orchestration of a full write session.
#[derive(Debug, Clone, Default)]
pub struct WritePipeline {
    config: WriterConfig,
}

impl WritePipeline {
    pub fn new(config: WriterConfig) -> WritePipeline {
        WritePipeline { config }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Write every row of `source` to a new file at `path`.
    ///
    /// Returns the total number of rows written. See
    /// [`write_to`](WritePipeline::write_to).
    pub fn write_path(
        &self,
        path: impl AsRef<Path>,
        source: &mut dyn RecordSource,
        progress: Option<ProgressFn<'_>>,
        cancel: &CancelToken,
    ) -> Result<u64> {
        let file = File::create(path)?;
        self.write_to(file, source, progress, cancel)
    }

    /// Write every row of `source` to `sink` until the source is exhausted
    /// or cancellation is observed. Returns the total rows written.
    ///
    /// The progress callback fires only when the cumulative row count is an
    /// exact positive multiple of the configured interval; an interval of
    /// zero disables it. On any error the footer is still sealed over the
    /// groups flushed so far, then the error propagates — whether to delete
    /// the file is the caller's decision.
    pub fn write_to<W: Write + Send>(
        &self,
        sink: W,
        source: &mut dyn RecordSource,
        mut progress: Option<ProgressFn<'_>>,
        cancel: &CancelToken,
    ) -> Result<u64> {
        let mut writer = RowGroupWriter::open(sink, source, &self.config)?;
        let notify_after = self.config.notify_after;
        let mut rows: u64 = 0;

        enum Stop {
            Exhausted,
            Cancelled,
        }

        let outcome: Result<Stop> = loop {
            if cancel.is_cancelled() {
                tracing::debug!("write cancelled after {} rows", rows);
                break Ok(Stop::Cancelled);
            }
            match source.next_row() {
                Ok(true) => {}
                Ok(false) => break Ok(Stop::Exhausted),
                Err(err) => break Err(err),
            }
            if let Err(err) = writer.write(source) {
                break Err(err);
            }
            rows += 1;
            if notify_after > 0 && rows % notify_after == 0 {
                if let Some(callback) = progress.as_mut() {
                    callback(rows);
                }
            }
        };

        match outcome {
            Ok(Stop::Exhausted) => {
                writer.finalize()?;
                Ok(rows)
            }
            // Cancelled: buffered-but-unflushed rows are never persisted.
            // The footer is sealed over the completed flushes, so the file
            // is valid but truncated.
            Ok(Stop::Cancelled) => {
                writer.seal()?;
                Ok(rows)
            }
            Err(err) => {
                // Seal the footer over the already-flushed groups so the
                // file stays structurally valid; the original error wins.
                if let Err(close_err) = writer.seal() {
                    tracing::warn!("failed to seal file after write error: {}", close_err);
                }
                Err(err)
            }
        }
    }
}
