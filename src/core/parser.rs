// ImeiSift - core/parser.rs
//
// Tolerant record extraction from IMEI-lookup HTML reports.
// Core layer: operates on in-memory text, never touches the filesystem.
//
// This is a label scan, not an HTML parser. The lookup service emits
// inconsistent markup, and a strict parse would reject fragments that the
// label -> next-break heuristic reads correctly.

use crate::core::classify;
use crate::core::model::{Device, DeviceFields};
use crate::util::constants;
use crate::util::error::InputError;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Result of extracting one report.
#[derive(Debug, Default)]
pub struct ExtractResult {
    /// Valid device records in document order.
    pub devices: Vec<Device>,
    /// Candidate fragments found after the IMEI marker.
    pub segments_seen: usize,
    /// Candidates discarded for a missing IMEI or detail block.
    pub segments_dropped: usize,
}

/// Why a candidate fragment was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DropReason {
    NoImei,
    NoDetailBlock,
}

/// Extract every device record from a report.
///
/// Never fails: malformed fragments are dropped and whatever valid records
/// remain are returned, possibly none.
pub fn extract(html: &str) -> ExtractResult {
    let mut result = ExtractResult::default();

    // Index 0 is the preamble before the first marker; segment indices are
    // therefore 1-based for real candidates.
    for (segment_index, segment) in html.split(constants::IMEI_MARKER).enumerate().skip(1) {
        result.segments_seen += 1;
        match parse_segment(segment, segment_index) {
            Ok(device) => result.devices.push(device),
            Err(reason) => {
                result.segments_dropped += 1;
                tracing::debug!(segment_index, reason = ?reason, "Dropped report fragment");
            }
        }
    }

    tracing::debug!(
        segments = result.segments_seen,
        devices = result.devices.len(),
        dropped = result.segments_dropped,
        "Extraction finished"
    );

    result
}

/// Extract device records, discarding the extraction statistics.
pub fn extract_devices(html: &str) -> Vec<Device> {
    extract(html).devices
}

/// Extract from raw document bytes.
///
/// The only failure is a document that is not UTF-8 text; that is rejected
/// up front rather than producing corrupted records. `path` is carried into
/// the error when the bytes came from a file.
pub fn extract_from_bytes(
    bytes: Vec<u8>,
    path: Option<&Path>,
) -> Result<ExtractResult, InputError> {
    let html = String::from_utf8(bytes).map_err(|source| InputError::InvalidEncoding {
        path: path.map(Path::to_path_buf),
        source,
    })?;
    Ok(extract(&html))
}

fn parse_segment(segment: &str, segment_index: usize) -> Result<Device, DropReason> {
    let imei = leading_imei(segment).ok_or(DropReason::NoImei)?;
    let block = detail_block(segment).ok_or(DropReason::NoDetailBlock)?;
    let fields = read_fields(block);
    Ok(build_device(imei, segment_index, block, fields))
}

/// Construct a classified device. The only place a `Device` is created.
///
/// Callers pass an IMEI already checked by `leading_imei`.
pub(crate) fn build_device(
    imei: &str,
    segment_index: usize,
    raw_detail_block: &str,
    fields: DeviceFields,
) -> Device {
    let carrier_group = classify::carrier_group(&fields.sim_lock_status, &fields.carrier_raw);
    let is_active = classify::is_active(&fields.activation_status, &fields.estimated_purchase_date);

    Device {
        id: format!("{imei}-{segment_index}"),
        imei: imei.to_string(),
        model_description: fields.model_description,
        imei2: fields.imei2,
        serial_number: fields.serial_number,
        warranty_status: fields.warranty_status,
        icloud_lock: fields.icloud_lock.to_uppercase(),
        carrier_raw: fields.carrier_raw,
        sim_lock_status: fields.sim_lock_status,
        estimated_purchase_date: fields.estimated_purchase_date,
        activation_status: fields.activation_status,
        raw_detail_block: raw_detail_block.to_string(),
        carrier_group,
        is_active,
    }
}

/// Read the IMEI at the start of a segment: exactly 15 digits, optionally
/// preceded by whitespace and not followed by another digit.
fn leading_imei(segment: &str) -> Option<&str> {
    let rest = segment.trim_start();
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    (digits == constants::IMEI_LEN).then(|| &rest[..constants::IMEI_LEN])
}

/// Locate the inner text of the first `<pre ...>...</pre>` block.
fn detail_block(segment: &str) -> Option<&str> {
    // ASCII lowercasing keeps byte offsets aligned with `segment`.
    let lower = segment.to_ascii_lowercase();
    let open = constants::DETAIL_BLOCK_OPEN;

    let mut from = 0;
    let tag_start = loop {
        let at = lower[from..].find(open)? + from;
        let next = lower.as_bytes().get(at + open.len()).copied();
        if matches!(next, Some(b'>')) || next.is_some_and(|b| b.is_ascii_whitespace()) {
            break at;
        }
        from = at + open.len();
    };

    let content_start = lower[tag_start..].find('>')? + tag_start + 1;
    let content_end = lower[content_start..].find(constants::DETAIL_BLOCK_CLOSE)? + content_start;
    Some(&segment[content_start..content_end])
}

fn read_fields(block: &str) -> DeviceFields {
    DeviceFields {
        model_description: field_value(block, constants::LABEL_MODEL_DESCRIPTION),
        imei2: field_value(block, constants::LABEL_IMEI2),
        serial_number: field_value(block, constants::LABEL_SERIAL_NUMBER),
        warranty_status: field_value(block, constants::LABEL_WARRANTY_STATUS),
        icloud_lock: field_value(block, constants::LABEL_ICLOUD_LOCK),
        carrier_raw: field_value(block, constants::LABEL_LOCKED_CARRIER),
        sim_lock_status: field_value(block, constants::LABEL_SIM_LOCK_STATUS),
        estimated_purchase_date: field_value(block, constants::LABEL_PURCHASE_DATE),
        activation_status: field_value(block, constants::LABEL_ACTIVATION_STATUS),
    }
}

/// Value of `label:` up to the next `<br>` or newline, with markup stripped.
/// Empty when the label is absent.
pub(crate) fn field_value(block: &str, label: &str) -> String {
    let needle = format!("{label}:");
    let Some(at) = block.find(&needle) else {
        return String::new();
    };

    let rest = &block[at + needle.len()..];
    let end = line_break_regex()
        .find(rest)
        .map_or(rest.len(), |m| m.start());

    clean_text(&rest[..end])
}

/// Strip tags, decode `&nbsp;`, and trim.
fn clean_text(raw: &str) -> String {
    tag_regex()
        .replace_all(raw, "")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}

fn line_break_regex() -> &'static Regex {
    static BREAK: OnceLock<Regex> = OnceLock::new();
    BREAK.get_or_init(|| Regex::new(r"(?i)<br\b[^>]*>|\n").expect("static break regex is valid"))
}

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("static tag regex is valid"))
}
