// ImeiSift - core/export.rs
//
// Export of device lists: the bucketed plain-text listing used for
// messaging, plus CSV and JSON device dumps.
// Core layer: writes to any Write trait object.

use crate::core::model::{CarrierGroup, Device};
use crate::util::constants;
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

// =============================================================================
// Buckets
// =============================================================================

/// Export sections in output order. Every device lands in exactly one.
///
/// AT&T, Verizon and Other share the plain "LOCKED" buckets; only
/// T-Mobile/Sprint gets its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExportBucket {
    ICloud,
    LockedInactiveTMobile,
    LockedActiveTMobile,
    LockedInactive,
    LockedActive,
    UnlockedInactive,
    UnlockedActive,
}

impl ExportBucket {
    /// Returns all buckets in output order.
    pub fn all() -> &'static [ExportBucket] {
        &[
            ExportBucket::ICloud,
            ExportBucket::LockedInactiveTMobile,
            ExportBucket::LockedActiveTMobile,
            ExportBucket::LockedInactive,
            ExportBucket::LockedActive,
            ExportBucket::UnlockedInactive,
            ExportBucket::UnlockedActive,
        ]
    }

    /// Section header line.
    pub fn header(&self) -> &'static str {
        match self {
            ExportBucket::ICloud => "ICLOUD",
            ExportBucket::LockedInactiveTMobile => "LOCKED N NON ACTIVE T-MOBILE",
            ExportBucket::LockedActiveTMobile => "LOCKED N ACTIVE T-MOBILE",
            ExportBucket::LockedInactive => "LOCKED N NON ACTIVE",
            ExportBucket::LockedActive => "LOCKED N ACTIVE",
            ExportBucket::UnlockedInactive => "UNLOCKED N NON ACTIVE",
            ExportBucket::UnlockedActive => "UNLOCKED N ACTIVE",
        }
    }

    /// First matching rule wins; iCloud lock overrides carrier and activation.
    pub fn for_device(device: &Device) -> Self {
        if device.is_icloud_locked() {
            return ExportBucket::ICloud;
        }
        match (device.carrier_group, device.is_active) {
            (CarrierGroup::TMobileSprint, false) => ExportBucket::LockedInactiveTMobile,
            (CarrierGroup::TMobileSprint, true) => ExportBucket::LockedActiveTMobile,
            (CarrierGroup::Att | CarrierGroup::Verizon | CarrierGroup::Other, false) => {
                ExportBucket::LockedInactive
            }
            (CarrierGroup::Att | CarrierGroup::Verizon | CarrierGroup::Other, true) => {
                ExportBucket::LockedActive
            }
            (CarrierGroup::Unlocked, false) => ExportBucket::UnlockedInactive,
            (CarrierGroup::Unlocked, true) => ExportBucket::UnlockedActive,
        }
    }
}

impl std::fmt::Display for ExportBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header())
    }
}

/// Partition devices into buckets, keeping input order within each bucket.
/// Empty buckets are omitted; non-empty ones are in `ExportBucket::all()` order.
pub fn partition_buckets<'a, I>(devices: I) -> Vec<(ExportBucket, Vec<&'a Device>)>
where
    I: IntoIterator<Item = &'a Device>,
{
    let mut buckets: Vec<(ExportBucket, Vec<&'a Device>)> = ExportBucket::all()
        .iter()
        .map(|&bucket| (bucket, Vec::new()))
        .collect();

    for device in devices {
        let bucket = ExportBucket::for_device(device);
        if let Some((_, members)) = buckets.iter_mut().find(|(b, _)| *b == bucket) {
            members.push(device);
        }
    }

    buckets.retain(|(_, members)| !members.is_empty());
    buckets
}

// =============================================================================
// Text export
// =============================================================================

/// Options for the text export.
#[derive(Debug, Clone)]
pub struct TextExportOptions {
    /// Number of `=` characters in the line closing each device; clamped to
    /// `MIN_SEPARATOR_WIDTH..=MAX_SEPARATOR_WIDTH` when rendering.
    pub separator_width: usize,
}

impl Default for TextExportOptions {
    fn default() -> Self {
        Self {
            separator_width: constants::DEFAULT_SEPARATOR_WIDTH,
        }
    }
}

/// Render devices as the bucketed plain-text listing.
///
/// Each bucket is a header line followed by, per device, the model (with
/// "-USA" removed) and the IMEI, closed by a separator line. Devices and
/// sections are separated by one blank line.
pub fn render_text<'a, I>(devices: I, options: &TextExportOptions) -> String
where
    I: IntoIterator<Item = &'a Device>,
{
    let width = options
        .separator_width
        .clamp(constants::MIN_SEPARATOR_WIDTH, constants::MAX_SEPARATOR_WIDTH);
    let separator = "=".repeat(width);

    let sections: Vec<String> = partition_buckets(devices)
        .into_iter()
        .map(|(bucket, members)| {
            let entries: Vec<String> = members
                .iter()
                .map(|device| {
                    format!(
                        "{}\n{}\n{separator}",
                        export_model_name(&device.model_description),
                        device.imei
                    )
                })
                .collect();
            format!("{}\n{}", bucket.header(), entries.join("\n\n"))
        })
        .collect();

    sections.join("\n\n").trim().to_string()
}

/// Model description as shown in the text export.
pub fn export_model_name(model_description: &str) -> String {
    model_description
        .replace(constants::MODEL_REGION_SUFFIX, "")
        .trim()
        .to_string()
}

// =============================================================================
// CSV / JSON export
// =============================================================================

/// Export devices to CSV format.
///
/// Writes every device field except the raw detail block.
pub fn export_csv<'a, I, W>(devices: I, writer: W, export_path: &Path) -> Result<usize, ExportError>
where
    I: IntoIterator<Item = &'a Device>,
    W: Write,
{
    let csv_err = |source| ExportError::Csv {
        path: export_path.to_path_buf(),
        source,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record([
            "id",
            "imei",
            "imei2",
            "serial_number",
            "model_description",
            "warranty_status",
            "icloud_lock",
            "locked_carrier",
            "sim_lock_status",
            "estimated_purchase_date",
            "activation_status",
            "carrier_group",
            "active",
        ])
        .map_err(csv_err)?;

    let mut count = 0;
    for device in devices {
        csv_writer
            .write_record([
                device.id.as_str(),
                &device.imei,
                &device.imei2,
                &device.serial_number,
                &device.model_description,
                &device.warranty_status,
                &device.icloud_lock,
                &device.carrier_raw,
                &device.sim_lock_status,
                &device.estimated_purchase_date,
                &device.activation_status,
                device.carrier_group.label(),
                if device.is_active { "true" } else { "false" },
            ])
            .map_err(csv_err)?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

/// Export devices to JSON format (array of objects, all fields).
pub fn export_json<'a, I, W>(devices: I, writer: W, export_path: &Path) -> Result<usize, ExportError>
where
    I: IntoIterator<Item = &'a Device>,
    W: Write,
{
    let devices: Vec<&Device> = devices.into_iter().collect();
    serde_json::to_writer_pretty(writer, &devices).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(devices.len())
}

/// Output format for a device export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Text,
    Csv,
    Json,
}

impl ExportFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "text" | "txt" => Some(ExportFormat::Text),
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

/// Write devices to `writer` in the chosen format. Returns the device count.
pub fn write_export<'a, I, W>(
    devices: I,
    format: ExportFormat,
    text_options: &TextExportOptions,
    mut writer: W,
    export_path: &Path,
) -> Result<usize, ExportError>
where
    I: IntoIterator<Item = &'a Device>,
    W: Write,
{
    match format {
        ExportFormat::Csv => export_csv(devices, writer, export_path),
        ExportFormat::Json => export_json(devices, writer, export_path),
        ExportFormat::Text => {
            let devices: Vec<&Device> = devices.into_iter().collect();
            let text = render_text(devices.iter().copied(), text_options);
            let io_err = |source| ExportError::Io {
                path: export_path.to_path_buf(),
                source,
            };
            writer.write_all(text.as_bytes()).map_err(io_err)?;
            writer.write_all(b"\n").map_err(io_err)?;
            writer.flush().map_err(io_err)?;
            Ok(devices.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::DeviceFields;
    use crate::core::parser::build_device;
    use std::path::PathBuf;

    fn make_device(
        imei: &str,
        model: &str,
        icloud: &str,
        carrier: &str,
        activation: &str,
    ) -> Device {
        build_device(
            imei,
            1,
            "",
            DeviceFields {
                model_description: model.to_string(),
                icloud_lock: icloud.to_string(),
                carrier_raw: carrier.to_string(),
                sim_lock_status: "Locked".to_string(),
                activation_status: activation.to_string(),
                ..Default::default()
            },
        )
    }

    fn options() -> TextExportOptions {
        TextExportOptions { separator_width: 5 }
    }

    #[test]
    fn test_bucket_rules() {
        let cases = [
            (make_device("1", "", "ON", "Unlocked", "Activated"), ExportBucket::ICloud),
            (
                make_device("2", "", "OFF", "T-Mobile", "Not Activated"),
                ExportBucket::LockedInactiveTMobile,
            ),
            (
                make_device("3", "", "", "Sprint", "Activated"),
                ExportBucket::LockedActiveTMobile,
            ),
            (make_device("4", "", "", "AT&T", "Not Activated"), ExportBucket::LockedInactive),
            (make_device("5", "", "", "Verizon", "Activated"), ExportBucket::LockedActive),
            (make_device("6", "", "", "Some MVNO", "Activated"), ExportBucket::LockedActive),
            (
                make_device("7", "", "", "Open Policy", "Not Activated"),
                ExportBucket::UnlockedInactive,
            ),
            (make_device("8", "", "", "Unlocked", "Activated"), ExportBucket::UnlockedActive),
        ];
        for (device, expected) in &cases {
            assert_eq!(ExportBucket::for_device(device), *expected, "imei {}", device.imei);
        }
    }

    #[test]
    fn test_partition_is_exclusive_and_complete() {
        let devices = vec![
            make_device("1", "", "ON", "T-Mobile", "Activated"),
            make_device("2", "", "", "T-Mobile", "Activated"),
            make_device("3", "", "", "AT&T", ""),
            make_device("4", "", "", "Verizon", "Not Activated"),
            make_device("5", "", "", "Unlocked", "Activated"),
        ];
        let buckets = partition_buckets(&devices);
        let placed: usize = buckets.iter().map(|(_, m)| m.len()).sum();
        assert_eq!(placed, devices.len());

        let mut ids: Vec<&str> = buckets
            .iter()
            .flat_map(|(_, m)| m.iter().map(|d| d.imei.as_str()))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), devices.len());

        let order: Vec<_> = buckets.iter().map(|(b, _)| *b).collect();
        assert_eq!(
            order,
            vec![
                ExportBucket::ICloud,
                ExportBucket::LockedActiveTMobile,
                ExportBucket::LockedInactive,
                ExportBucket::UnlockedActive,
            ]
        );
    }

    #[test]
    fn test_render_text_layout() {
        let devices = vec![
            make_device("111111111111111", "IPHONE 12 64GB-USA", "ON", "", ""),
            make_device("222222222222222", " IPHONE 11 ", "", "T-Mobile", "Not Activated"),
            make_device("333333333333333", "IPHONE XR-USA", "on", "", ""),
        ];
        let text = render_text(&devices, &options());
        let expected = "ICLOUD\n\
                        IPHONE 12 64GB\n\
                        111111111111111\n\
                        =====\n\
                        \n\
                        IPHONE XR\n\
                        333333333333333\n\
                        =====\n\
                        \n\
                        LOCKED N NON ACTIVE T-MOBILE\n\
                        IPHONE 11\n\
                        222222222222222\n\
                        =====";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_text_empty() {
        assert_eq!(render_text(std::iter::empty(), &options()), "");
    }

    #[test]
    fn test_render_text_clamps_separator_width() {
        let devices = vec![make_device("111111111111111", "IPHONE 12", "", "", "")];

        let text = render_text(&devices, &TextExportOptions { separator_width: 0 });
        assert!(text.ends_with("111111111111111\n="));

        let text = render_text(&devices, &TextExportOptions { separator_width: usize::MAX });
        let last = text.lines().last().unwrap();
        assert_eq!(last.len(), constants::MAX_SEPARATOR_WIDTH);
        assert!(last.bytes().all(|b| b == b'='));
    }

    #[test]
    fn test_export_model_name() {
        assert_eq!(export_model_name("IPHONE 13 PRO-USA "), "IPHONE 13 PRO");
        assert_eq!(export_model_name("IPAD-USA WIFI"), "IPAD WIFI");
    }

    #[test]
    fn test_csv_export() {
        let devices = vec![
            make_device("111111111111111", "IPHONE 12", "", "AT&T", "Activated"),
            make_device("222222222222222", "IPHONE 13", "", "Verizon", ""),
        ];
        let mut buf = Vec::new();
        let count = export_csv(&devices, &mut buf, &PathBuf::from("out.csv")).unwrap();
        assert_eq!(count, 2);

        let output = String::from_utf8(buf).unwrap();
        assert!(output.starts_with("id,imei,imei2"));
        assert!(output.contains("111111111111111-1,111111111111111"));
        assert!(output.contains("AT&T,true"));
        assert!(output.contains("Verizon,false"));
    }

    #[test]
    fn test_json_export() {
        let devices = vec![make_device("111111111111111", "IPHONE 12", "", "Unlocked", "")];
        let mut buf = Vec::new();
        let count = export_json(&devices, &mut buf, &PathBuf::from("out.json")).unwrap();
        assert_eq!(count, 1);

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[0]["imei"], "111111111111111");
        assert_eq!(value[0]["carrier_group"], "Unlocked");
        assert_eq!(value[0]["is_active"], false);
    }

    #[test]
    fn test_write_export_text_appends_newline() {
        let devices = vec![make_device("111111111111111", "X", "ON", "", "")];
        let mut buf = Vec::new();
        let count = write_export(
            &devices,
            ExportFormat::Text,
            &options(),
            &mut buf,
            &PathBuf::from("out.txt"),
        )
        .unwrap();
        assert_eq!(count, 1);
        assert_eq!(String::from_utf8(buf).unwrap(), "ICLOUD\nX\n111111111111111\n=====\n");
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!(ExportFormat::parse("CSV"), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::parse("txt"), Some(ExportFormat::Text));
        assert_eq!(ExportFormat::parse("xml"), None);
    }
}
