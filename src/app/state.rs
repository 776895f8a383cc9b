// ImeiSift - app/state.rs
//
// Session state owned by a front end. Holds the loaded registry, the last
// query outcome, the bulk query set and the manual-resolution queue.
// A new report replaces the registry wholesale and resets everything
// derived from the old one.

use crate::app::resolution::{self, BulkQuerySet, ManualQueue, RecoveryReport};
use crate::core::export::{self, TextExportOptions};
use crate::core::model::{CarrierGroupView, Device, RegistrySummary};
use crate::core::parser::{self, ExtractResult};
use crate::core::query::{self, QueryOutcome};
use crate::core::registry::Registry;
use crate::core::vision::{ImagePayload, VisionReader};
use crate::util::error::InputError;
use std::path::PathBuf;

/// Top-level session state.
#[derive(Debug, Default)]
pub struct AppState {
    /// Devices of the currently loaded report.
    pub registry: Registry,

    /// Where the current report came from, if it was a file.
    pub source_path: Option<PathBuf>,

    /// Summary of the current report.
    pub summary: RegistrySummary,

    /// Outcome of the most recent query (None = showing the full registry).
    pub last_query: Option<QueryOutcome>,

    /// Tokens collected for the next bulk query.
    pub bulk_queries: BulkQuerySet,

    /// Images awaiting manual resolution.
    pub manual_queue: ManualQueue,

    /// Status message for the front end.
    pub status_message: String,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            status_message: "Ready. Load an IMEI report to begin.".to_string(),
            ..Default::default()
        }
    }

    /// Extract in-memory report text and install it as the current registry.
    pub fn load_document(&mut self, html: &str) -> &RegistrySummary {
        self.install(parser::extract(html), None)
    }

    /// Extract a report read from `source_path` and install it.
    ///
    /// Fails only when the bytes are not UTF-8; the current registry is kept
    /// in that case.
    pub fn load_report(
        &mut self,
        bytes: Vec<u8>,
        source_path: PathBuf,
    ) -> Result<&RegistrySummary, InputError> {
        let result = parser::extract_from_bytes(bytes, Some(source_path.as_path()))?;
        Ok(self.install(result, Some(source_path)))
    }

    fn install(&mut self, result: ExtractResult, source_path: Option<PathBuf>) -> &RegistrySummary {
        let registry = Registry::new(result.devices);
        let summary = registry.summary();
        let source = source_path
            .as_deref()
            .map_or_else(|| "<memory>".to_string(), |p| p.display().to_string());

        tracing::info!(
            source = %source,
            devices = summary.total_devices,
            dropped = result.segments_dropped,
            active = summary.active,
            icloud_locked = summary.icloud_locked,
            duplicates = summary.duplicate_imeis,
            "Report loaded"
        );

        self.registry = registry;
        self.summary = summary;
        self.source_path = source_path;
        self.last_query = None;
        self.bulk_queries.clear();
        self.manual_queue.clear();
        self.status_message = format!(
            "Loaded {} devices from {source} ({} fragments skipped).",
            self.summary.total_devices, result.segments_dropped
        );

        &self.summary
    }

    /// Match a raw query against the registry and remember the outcome.
    pub fn run_query(&mut self, raw_query: &str) -> &QueryOutcome {
        let outcome = query::match_query(self.registry.devices(), raw_query);
        self.status_message = format!(
            "{} devices matched, {} not found.",
            outcome.matched_count(),
            outcome.not_found.len()
        );
        self.last_query.insert(outcome)
    }

    /// Match the accumulated bulk query set.
    pub fn run_bulk_query(&mut self) -> &QueryOutcome {
        let raw = self.bulk_queries.to_query_string();
        self.run_query(&raw)
    }

    /// Drop the current query so exports cover the full registry again.
    pub fn clear_query(&mut self) {
        self.last_query = None;
    }

    /// Devices currently in view: the last query's matches, or everything.
    pub fn current_devices(&self) -> Vec<&Device> {
        match &self.last_query {
            Some(outcome) => outcome.matched(self.registry.devices()),
            None => self.registry.devices().iter().collect(),
        }
    }

    /// Bucketed text export of the devices currently in view.
    pub fn export_text(&self, options: &TextExportOptions) -> String {
        export::render_text(self.current_devices(), options)
    }

    pub fn groups(&self) -> Vec<CarrierGroupView<'_>> {
        self.registry.groups()
    }

    /// Run an image batch against the current registry.
    pub fn recover_from_images<R: VisionReader + ?Sized>(
        &mut self,
        reader: &R,
        images: &[ImagePayload],
    ) -> RecoveryReport {
        resolution::recover_from_images(
            reader,
            images,
            &self.registry,
            &mut self.bulk_queries,
            &mut self.manual_queue,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "<b>IMEI:</b> 111111111111111<pre>\
        Model Description: IPHONE 12-USA<br>iCloud Lock: ON<br></pre>\
        <b>IMEI:</b> 222222222222222<pre>\
        Locked Carrier: Verizon<br>Activation Status: Activated<br></pre>";

    #[test]
    fn test_load_replaces_registry_and_resets_query() {
        let mut state = AppState::new();
        state.load_document(REPORT);
        assert_eq!(state.registry.len(), 2);

        state.run_query("1111");
        state.bulk_queries.insert("2222".to_string());
        assert!(state.last_query.is_some());

        let summary = state.load_document("<b>IMEI:</b> 333333333333333<pre></pre>");
        assert_eq!(summary.total_devices, 1);
        assert!(state.last_query.is_none());
        assert!(state.bulk_queries.is_empty());
        assert_eq!(state.registry.devices()[0].imei, "333333333333333");
    }

    #[test]
    fn test_export_uses_query_subset() {
        let mut state = AppState::new();
        state.load_document(REPORT);
        let options = TextExportOptions { separator_width: 3 };

        let full = state.export_text(&options);
        assert!(full.contains("ICLOUD"));
        assert!(full.contains("LOCKED N ACTIVE"));

        let outcome = state.run_query("2222\n9999");
        assert_eq!(outcome.not_found, vec!["9999"]);
        assert_eq!(
            state.export_text(&options),
            "LOCKED N ACTIVE\n\n222222222222222\n==="
        );

        state.clear_query();
        assert_eq!(state.current_devices().len(), 2);
    }

    #[test]
    fn test_bulk_query_runs_collected_tokens() {
        let mut state = AppState::new();
        state.load_document(REPORT);
        state.bulk_queries.extend_from_text("111111111111111, 555");
        let outcome = state.run_bulk_query();
        assert_eq!(outcome.matched_indices, vec![0]);
        assert_eq!(outcome.not_found, vec!["555"]);
    }

    #[test]
    fn test_load_report_records_source() {
        let mut state = AppState::new();
        let path = PathBuf::from("reports/batch.html");
        let summary = state.load_report(REPORT.as_bytes().to_vec(), path.clone()).unwrap();
        assert_eq!(summary.total_devices, 2);
        assert_eq!(state.source_path.as_deref(), Some(path.as_path()));
        assert!(state.status_message.contains("reports/batch.html"));
    }

    #[test]
    fn test_load_report_rejects_invalid_utf8_and_keeps_registry() {
        let mut state = AppState::new();
        state.load_document(REPORT);

        let result = state.load_report(vec![0xc3, 0x28], PathBuf::from("bad.html"));
        assert!(matches!(
            result,
            Err(InputError::InvalidEncoding { path: Some(_), .. })
        ));
        assert_eq!(state.registry.len(), 2);
        assert!(state.source_path.is_none());
    }
}
