// ImeiSift - app/resolution.rs
//
// IMEI recovery from images and the manual-resolution queue.
//
// Images are read one at a time, in submission order. A failed or
// unverified read never stops the batch; the image is queued for a person
// to resolve. Each queued item is resolved exactly once, either accepted
// with a value (appended to the bulk query set) or skipped. Nothing is
// retried.

use crate::core::query;
use crate::core::registry::Registry;
use crate::core::vision::{self, ImagePayload, Recognition, VisionReader};
use std::collections::{HashSet, VecDeque};

// =============================================================================
// Bulk query set
// =============================================================================

/// Distinct query tokens in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkQuerySet {
    tokens: Vec<String>,
    seen: HashSet<String>,
}

impl BulkQuerySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every token of `raw` (tokenised like a bulk query).
    /// Returns how many new tokens were added.
    pub fn extend_from_text(&mut self, raw: &str) -> usize {
        query::tokenize(raw)
            .into_iter()
            .filter(|token| self.insert(token.clone()))
            .count()
    }

    /// Add one token; false if it was already present or blank.
    pub fn insert(&mut self, token: String) -> bool {
        let token = token.trim().to_string();
        if token.is_empty() || !self.seen.insert(token.clone()) {
            return false;
        }
        self.tokens.push(token);
        true
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Newline-joined tokens, suitable for the query matcher.
    pub fn to_query_string(&self) -> String {
        self.tokens.join("\n")
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
        self.seen.clear();
    }
}

// =============================================================================
// Manual-resolution queue
// =============================================================================

/// Why an image needs a person to look at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingReason {
    /// The reader failed or returned no usable IMEI.
    RecognitionFailed,
    /// The reader found this IMEI but the loaded report does not contain it.
    Unverified(String),
}

/// One image awaiting manual resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingItem {
    pub label: String,
    pub reason: PendingReason,
}

/// How a pending item was settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Add this value to the bulk query set.
    Accept(String),
    Skip,
}

/// FIFO of images awaiting manual resolution.
#[derive(Debug, Clone, Default)]
pub struct ManualQueue {
    pending: VecDeque<PendingItem>,
    resolved: Vec<(PendingItem, Resolution)>,
}

impl ManualQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: PendingItem) {
        tracing::debug!(image = %item.label, reason = ?item.reason, "Queued for manual resolution");
        self.pending.push_back(item);
    }

    /// The item the next `resolve_next` call will settle.
    pub fn peek(&self) -> Option<&PendingItem> {
        self.pending.front()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Settle the front item. Accepted values are added to `queries`.
    ///
    /// Returns the settled item, or None when the queue is empty.
    pub fn resolve_next(
        &mut self,
        resolution: Resolution,
        queries: &mut BulkQuerySet,
    ) -> Option<PendingItem> {
        let item = self.pending.pop_front()?;

        match &resolution {
            Resolution::Accept(value) => {
                let added = queries.extend_from_text(value);
                tracing::info!(image = %item.label, added, "Manual entry accepted");
            }
            Resolution::Skip => {
                tracing::info!(image = %item.label, "Manual entry skipped");
            }
        }

        self.resolved.push((item.clone(), resolution));
        Some(item)
    }

    /// Items settled so far, in settlement order.
    pub fn resolved(&self) -> &[(PendingItem, Resolution)] {
        &self.resolved
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.resolved.clear();
    }
}

// =============================================================================
// Image batch
// =============================================================================

/// Tally of one image batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    pub recognized: usize,
    pub unverified: usize,
    pub failed: usize,
}

/// Read every image in order. Recognised IMEIs go straight into `queries`;
/// everything else is queued for manual resolution.
pub fn recover_from_images<R: VisionReader + ?Sized>(
    reader: &R,
    images: &[ImagePayload],
    registry: &Registry,
    queries: &mut BulkQuerySet,
    queue: &mut ManualQueue,
) -> RecoveryReport {
    let mut report = RecoveryReport::default();

    for image in images {
        match vision::recognize(reader, image, registry) {
            Recognition::Recognized(imei) => {
                queries.insert(imei);
                report.recognized += 1;
            }
            Recognition::Unverified(imei) => {
                queue.push(PendingItem {
                    label: image.label.clone(),
                    reason: PendingReason::Unverified(imei),
                });
                report.unverified += 1;
            }
            Recognition::Failed => {
                queue.push(PendingItem {
                    label: image.label.clone(),
                    reason: PendingReason::RecognitionFailed,
                });
                report.failed += 1;
            }
        }
    }

    tracing::info!(
        images = images.len(),
        recognized = report.recognized,
        unverified = report.unverified,
        failed = report.failed,
        "Image batch processed"
    );

    report
}
