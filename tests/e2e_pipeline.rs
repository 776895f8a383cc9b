// ImeiSift - tests/e2e_pipeline.rs
//
// End-to-end tests for the extract -> classify -> query -> export pipeline.
//
// These tests read a real HTML report from disk and run it through the
// public library API with no mocks.

use imeisift::app::resolution::{ManualQueue, PendingReason, Resolution};
use imeisift::app::state::AppState;
use imeisift::core::export::{self, ExportBucket, ExportFormat, TextExportOptions};
use imeisift::core::model::CarrierGroup;
use imeisift::core::parser;
use imeisift::core::query;
use imeisift::core::registry::Registry;
use imeisift::core::vision::{ImagePayload, VisionReader};
use imeisift::platform::fs;
use imeisift::util::error::VisionError;
use std::path::PathBuf;

// =============================================================================
// Helpers
// =============================================================================

/// Absolute path to the on-disk fixture files.
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn report_bytes() -> Vec<u8> {
    fs::read_report(&fixture("lookup_report.html"), 1024 * 1024).unwrap()
}

fn load_report() -> String {
    String::from_utf8(report_bytes()).unwrap()
}

// =============================================================================
// Extraction
// =============================================================================

/// Malformed fragments are dropped; valid ones come back in document order.
#[test]
fn e2e_extracts_valid_devices_from_fixture() {
    let result = parser::extract(&load_report());

    assert_eq!(result.segments_seen, 6);
    assert_eq!(result.segments_dropped, 2);

    let ids: Vec<_> = result.devices.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "356712345678901-1",
            "353998109876543-2",
            "359876111103337-5",
            "354444555566667-6",
        ]
    );
    for device in &result.devices {
        assert_eq!(device.imei.len(), 15);
        assert!(device.imei.bytes().all(|b| b.is_ascii_digit()));
    }
}

#[test]
fn e2e_fields_and_classification() {
    let devices = parser::extract_devices(&load_report());

    let first = &devices[0];
    assert_eq!(first.model_description, "IPHONE 12 PRO 128GB GRAPHITE-USA");
    assert_eq!(first.imei2, "356712345678919");
    assert_eq!(first.warranty_status, "Out Of Warranty");
    assert_eq!(first.icloud_lock, "ON");
    assert_eq!(first.carrier_group, CarrierGroup::Unlocked);
    assert!(first.is_active);
    assert!(first.raw_detail_block.contains("<span style=\"color:red;\">ON</span>"));

    let second = &devices[1];
    assert_eq!(second.carrier_group, CarrierGroup::TMobileSprint);
    assert_eq!(second.activation_status, "Not Activated");
    assert!(!second.is_active);

    let third = &devices[2];
    assert_eq!(third.icloud_lock, "OFF");
    assert_eq!(third.carrier_group, CarrierGroup::Att);
    assert!(third.is_active);

    let fourth = &devices[3];
    assert_eq!(fourth.carrier_group, CarrierGroup::Unlocked);
    assert!(fourth.is_active);
}

#[test]
fn e2e_extraction_is_idempotent() {
    let html = load_report();
    assert_eq!(parser::extract_devices(&html), parser::extract_devices(&html));
}

// =============================================================================
// Query + export
// =============================================================================

#[test]
fn e2e_full_text_export() {
    let registry = Registry::from_html(&load_report());
    let text = export::render_text(registry.devices(), &TextExportOptions::default());

    let expected = "\
ICLOUD
IPHONE 12 PRO 128GB GRAPHITE
356712345678901
====================

LOCKED N NON ACTIVE T-MOBILE
IPHONE 13 128GB MIDNIGHT
353998109876543
====================

LOCKED N ACTIVE
IPHONE 11 64GB BLACK
359876111103337
====================

UNLOCKED N ACTIVE
IPHONE SE 2ND GEN 64GB
354444555566667
====================";
    assert_eq!(text, expected);
}

#[test]
fn e2e_bulk_query_reports_not_found() {
    let registry = Registry::from_html(&load_report());
    let outcome = query::match_query(registry.devices(), "1111,2222\n1111");

    assert_eq!(outcome.tokens, vec!["1111", "2222"]);
    assert_eq!(outcome.matched_count(), 1);
    assert_eq!(outcome.not_found, vec!["2222"]);
    assert_eq!(outcome.matched(registry.devices())[0].imei, "359876111103337");
}

#[test]
fn e2e_two_fragment_report_export() {
    let html = "<b>IMEI:</b> 111111111111111<pre>Model Description: IPHONE X-USA<br>\
                iCloud Lock: ON<br></pre>\
                <b>IMEI:</b> 222222222222222<pre>Model Description: IPHONE XS<br>\
                Locked Carrier: T-Mobile<br>Sim-Lock Status: Locked<br>\
                Activation Status: Not Activated<br></pre>";
    let devices = parser::extract_devices(html);
    assert_eq!(devices.len(), 2);

    let buckets = export::partition_buckets(&devices);
    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[0].0, ExportBucket::ICloud);
    assert_eq!(buckets[1].0, ExportBucket::LockedInactiveTMobile);

    let text = export::render_text(&devices, &TextExportOptions { separator_width: 10 });
    let icloud = text.find("ICLOUD").unwrap();
    let tmobile = text.find("LOCKED N NON ACTIVE T-MOBILE").unwrap();
    assert!(icloud < tmobile);
    assert!(text.ends_with("222222222222222\n=========="));
    assert_eq!(text.matches("==========").count(), 2);
}

#[test]
fn e2e_csv_export_to_file() {
    let registry = Registry::from_html(&load_report());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("devices.csv");
    let file = std::fs::File::create(&path).unwrap();

    let count = export::write_export(
        registry.devices(),
        ExportFormat::Csv,
        &TextExportOptions::default(),
        file,
        &path,
    )
    .unwrap();
    assert_eq!(count, 4);

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 5);
    assert!(content.contains("353998109876543-2,353998109876543"));
}

// =============================================================================
// Session state + image recovery
// =============================================================================

/// Reads the IMEI from the image bytes themselves, as text.
struct TextImageReader;

impl VisionReader for TextImageReader {
    fn read_imei(&self, image: &ImagePayload) -> Result<String, VisionError> {
        let text = String::from_utf8_lossy(&image.bytes).into_owned();
        if text.is_empty() {
            Err(VisionError::NotFound)
        } else {
            Ok(text)
        }
    }
}

fn image(label: &str, text: &str) -> ImagePayload {
    ImagePayload {
        label: label.to_string(),
        bytes: text.as_bytes().to_vec(),
    }
}

#[test]
fn e2e_image_recovery_feeds_bulk_query() {
    let mut state = AppState::new();
    state
        .load_report(report_bytes(), fixture("lookup_report.html"))
        .unwrap();
    assert_eq!(state.summary.total_devices, 4);

    let images = vec![
        image("a.jpg", "IMEI 35 399810 987654 3"),
        image("b.jpg", ""),
        image("c.jpg", "999999999999999"),
    ];
    let report = state.recover_from_images(&TextImageReader, &images);
    assert_eq!((report.recognized, report.unverified, report.failed), (1, 1, 1));

    let queue: &mut ManualQueue = &mut state.manual_queue;
    assert_eq!(queue.peek().map(|i| &i.reason), Some(&PendingReason::RecognitionFailed));
    queue.resolve_next(
        Resolution::Accept("359876111103337".to_string()),
        &mut state.bulk_queries,
    );
    queue.resolve_next(Resolution::Skip, &mut state.bulk_queries);
    assert!(state.manual_queue.is_empty());

    let outcome = state.run_bulk_query();
    assert!(outcome.not_found.is_empty());
    assert_eq!(outcome.matched_indices, vec![1, 2]);

    let text = state.export_text(&TextExportOptions { separator_width: 3 });
    assert!(text.starts_with("LOCKED N NON ACTIVE T-MOBILE\n"));
    assert!(!text.contains("ICLOUD"));
}
