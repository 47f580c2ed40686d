//! Paginated, predicate-filtered scans over row groups.
//!
//! Filtering happens before pagination: the matched-row counter that drives
//! offset/limit arithmetic only advances for rows that pass the filter set,
//! so page boundaries are stable for a given predicate. Two modes:
//!
//! - **stop-early** (`count_all = false`): scanning halts as soon as the
//!   requested page is complete; the returned total is only the matches seen
//!   so far.
//! - **count-all** (`count_all = true`): scanning continues through every
//!   remaining row group solely to compute the exact match count, without
//!   materializing further rows.
//!
//! When the filter set is empty, whole groups that end before the requested
//! offset are skipped by row-count arithmetic alone. With a non-empty filter
//! no group can be skipped wholesale — every row must be evaluated to keep
//! the matched count correct.

use arrow::datatypes::SchemaRef;
use rowpipe_result::{Error, Result};

use crate::filter::FilterSet;
use crate::pipeline::{CancelToken, ProgressFn};
use crate::reader::{row_values, RowGroupReader};
use crate::types::Value;

/// Default read-progress notification interval, in scanned rows.
pub const DEFAULT_SCAN_NOTIFY_AFTER: u64 = 10_000;

/// Which page of matched rows to return.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u64,
    /// Rows per page.
    pub page_size: usize,
    /// Keep scanning after the page is full to compute the exact total.
    pub count_all: bool,
}

impl PageRequest {
    pub fn new(page: u64, page_size: usize, count_all: bool) -> PageRequest {
        PageRequest {
            page,
            page_size,
            count_all,
        }
    }

    /// Index of the first matched row on this page.
    ///
    /// Saturates for an (invalid) page number of zero; such requests are
    /// rejected by validation before any scan work starts.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1) * self.page_size as u64
    }

    fn validate(&self) -> Result<()> {
        if self.page < 1 {
            return Err(Error::InvalidArgumentError(
                "page numbers start at 1".into(),
            ));
        }
        if self.page_size == 0 {
            return Err(Error::InvalidArgumentError(
                "page size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration for scan sessions.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Progress callback interval in scanned rows; `0` disables.
    pub notify_after: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            notify_after: DEFAULT_SCAN_NOTIFY_AFTER,
        }
    }
}

/// Result of one paginated scan.
#[derive(Debug)]
pub struct ScanResult {
    pub schema: SchemaRef,
    /// The rows of the requested page, in file order.
    pub rows: Vec<Vec<Option<Value>>>,
    /// Rows matching the filter set. Exact only when the request asked to
    /// count all; otherwise the count reached when scanning stopped.
    pub total_matched: u64,
}

/// Paginated scanner over a [`RowGroupReader`].
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    config: ScanConfig,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Scanner {
        Scanner { config }
    }

    /// Scan `reader` and return the requested page plus the match count.
    ///
    /// Cancellation is checked once per row; a cancelled scan returns the
    /// rows and count accumulated so far.
    pub fn scan(
        &self,
        reader: &RowGroupReader,
        request: &PageRequest,
        filters: &FilterSet,
        mut progress: Option<ProgressFn<'_>>,
        cancel: &CancelToken,
    ) -> Result<ScanResult> {
        request.validate()?;

        let schema = reader.schema();
        let field_names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        let offset = request.offset();
        let page_end = offset + request.page_size as u64;
        let notify_after = self.config.notify_after;

        let mut rows: Vec<Vec<Option<Value>>> = Vec::new();
        let mut matched: u64 = 0;
        let mut scanned: u64 = 0;

        'groups: for group in 0..reader.row_group_count() {
            if cancel.is_cancelled() {
                break;
            }
            let group_rows = reader.row_group_rows(group)? as u64;

            // Unfiltered groups wholly before the offset contribute only
            // arithmetic; with a filter present every row must be evaluated.
            if filters.is_empty() && matched + group_rows <= offset {
                matched += group_rows;
                scanned += group_rows;
                continue;
            }

            let batch = reader.read_row_group(group)?;
            tracing::trace!("scanning row group {} ({} rows)", group, batch.num_rows());
            for row in 0..batch.num_rows() {
                if cancel.is_cancelled() {
                    break 'groups;
                }
                scanned += 1;
                if notify_after > 0 && scanned % notify_after == 0 {
                    if let Some(callback) = progress.as_mut() {
                        callback(scanned);
                    }
                }

                let values = row_values(&batch, row)?;
                if accepts(filters, &field_names, &values) {
                    if matched >= offset && rows.len() < request.page_size {
                        rows.push(values);
                    }
                    matched += 1;
                }
                if !request.count_all && matched >= page_end {
                    break 'groups;
                }
            }
        }

        tracing::debug!(
            "scan finished: {} rows emitted, {} matched, {} scanned",
            rows.len(),
            matched,
            scanned
        );
        Ok(ScanResult {
            schema,
            rows,
            total_matched: matched,
        })
    }
}

/// A row is accepted only when every constrained column passes.
///
/// Evaluation goes field by field in ordinal order; duplicate column names
/// are each tested against the same filter.
fn accepts(filters: &FilterSet, field_names: &[&str], values: &[Option<Value>]) -> bool {
    if filters.is_empty() {
        return true;
    }
    field_names
        .iter()
        .zip(values)
        .all(|(name, value)| filters.evaluate(name, value.as_ref()))
}
