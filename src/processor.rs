//! Per-record resolution pipeline and batch driver
//!
//! This is the heart of the tool: pick a search key, query the service,
//! interpret the response, optionally disambiguate a multi-work result with
//! a second work-index lookup, and merge the classifiers into the record.
//! A record is never dropped and a row that fails to resolve passes through
//! untouched.

use std::time::Duration;

use crate::client::ClassifyService;
use crate::record::{FieldMapping, Record};
use crate::response::{classify_response, extract_classifiers, resolve_work_index, Classification};
use crate::search_key::{select_search_key, SearchKey};

/// Output field holding the Dewey Decimal classifier.
pub const DDC_FIELD: &str = "ddc";
/// Output field holding the Library of Congress classifier.
pub const LCC_FIELD: &str = "lcc";

/// What happened to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    /// A configured skip field was already populated; no lookup attempted
    Skipped,
    /// No mapped field held a usable value
    NoSearchKey,
    /// Classifiers merged into the record
    Resolved,
    /// Service had no answer: not-found codes, malformed payloads and
    /// transport failures all land here
    Unresolved,
}

/// Explicit per-run configuration for the row processor.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Fields that mark a record as already resolved by prior data. Checked
    /// before key selection; any non-empty value short-circuits the row.
    pub skip_fields: Vec<String>,
}

/// Resolve one record in place. Never fails: every unresolvable condition
/// leaves the record untouched and reports an outcome instead.
pub async fn process_record<S: ClassifyService + ?Sized>(
    service: &S,
    record: &mut Record,
    mapping: &FieldMapping,
    options: &ProcessOptions,
) -> RowOutcome {
    if options.skip_fields.iter().any(|f| record.has_value(f)) {
        return RowOutcome::Skipped;
    }

    let Some(key) = select_search_key(record, mapping) else {
        return RowOutcome::NoSearchKey;
    };

    let primary = match service.lookup(&key).await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(error = %e, ?key, "primary lookup failed");
            return RowOutcome::Unresolved;
        }
    };

    let Some(code) = classify_response(&primary) else {
        tracing::debug!(?key, "malformed primary response");
        return RowOutcome::Unresolved;
    };

    if code.is_single_work() {
        return match extract_classifiers(&primary) {
            Some(c) => {
                merge_classification(record, c);
                RowOutcome::Resolved
            }
            None => RowOutcome::Unresolved,
        };
    }

    if code.is_multi_work() {
        let Some(wi) = resolve_work_index(&primary) else {
            tracing::debug!(?key, "multi-work response with no resolvable work index");
            return RowOutcome::Unresolved;
        };

        let secondary = match service.lookup(&SearchKey::WorkIndex(wi)).await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(error = %e, "work index lookup failed");
                return RowOutcome::Unresolved;
            }
        };

        // Classifiers come from the resolved (secondary) response, not the
        // multi-work listing.
        if classify_response(&secondary).is_some_and(|c| c.is_single_work()) {
            if let Some(c) = extract_classifiers(&secondary) {
                merge_classification(record, c);
                return RowOutcome::Resolved;
            }
        }
        return RowOutcome::Unresolved;
    }

    // code >= 100
    tracing::debug!(?key, code = code.code(), "query did not resolve");
    RowOutcome::Unresolved
}

fn merge_classification(record: &mut Record, c: Classification) {
    record.set(DDC_FIELD, c.ddc);
    record.set(LCC_FIELD, c.lcc);
}

/// Pause policy between service calls. Purely a courtesy towards the
/// external service; it has no correctness implication.
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    pub short_every: usize,
    pub short_pause: Duration,
    pub long_every: usize,
    pub long_pause: Duration,
}

impl Pacing {
    /// Default policy: short breather every 10 lookups, long one every 250.
    pub fn polite() -> Self {
        Pacing {
            short_every: 10,
            short_pause: Duration::from_secs(1),
            long_every: 250,
            long_pause: Duration::from_secs(30),
        }
    }

    /// No pauses at all.
    pub fn none() -> Self {
        Pacing {
            short_every: 0,
            short_pause: Duration::ZERO,
            long_every: 0,
            long_pause: Duration::ZERO,
        }
    }
}

/// Outcome counts for a completed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub resolved: usize,
    pub unresolved: usize,
    pub skipped: usize,
    pub no_search_key: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.resolved + self.unresolved + self.skipped + self.no_search_key
    }
}

/// Run every record through the row processor, in input order, mutating the
/// slice in place. One outcome per record; records are never reordered or
/// dropped.
pub async fn run_batch<S: ClassifyService + ?Sized>(
    service: &S,
    records: &mut [Record],
    mapping: &FieldMapping,
    options: &ProcessOptions,
    pacing: Pacing,
) -> BatchSummary {
    let mut summary = BatchSummary::default();
    let mut lookups = 0usize;

    for (row, record) in records.iter_mut().enumerate() {
        let outcome = process_record(service, record, mapping, options).await;
        tracing::debug!(row, ?outcome, "processed record");

        match outcome {
            RowOutcome::Resolved => summary.resolved += 1,
            RowOutcome::Unresolved => summary.unresolved += 1,
            RowOutcome::Skipped => summary.skipped += 1,
            RowOutcome::NoSearchKey => summary.no_search_key += 1,
        }

        // Only rows that actually hit the service count towards pacing
        if matches!(outcome, RowOutcome::Resolved | RowOutcome::Unresolved) {
            lookups += 1;
            if pacing.long_every > 0 && lookups % pacing.long_every == 0 {
                tracing::info!(lookups, "long rate-limit pause");
                tokio::time::sleep(pacing.long_pause).await;
            } else if pacing.short_every > 0 && lookups % pacing.short_every == 0 {
                tracing::debug!(lookups, "short rate-limit pause");
                tokio::time::sleep(pacing.short_pause).await;
            }
        }
    }

    summary
}
