// ImeiSift - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// These types are the shared vocabulary across all layers.

use serde::Serialize;
use std::collections::HashMap;

// =============================================================================
// Device (normalised output of extraction)
// =============================================================================

/// A single device record parsed from one IMEI-lookup report fragment.
///
/// Built once by the extractor and classifier, then only ever read.
/// Optional report fields are empty strings when the label was absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    /// `<imei>-<segment index>`; unique within one extraction pass even when
    /// the same IMEI appears twice in a report.
    pub id: String,

    /// Exactly 15 ASCII digits.
    pub imei: String,

    pub model_description: String,
    pub imei2: String,
    pub serial_number: String,
    pub warranty_status: String,

    /// Uppercased (`ON` / `OFF`) or empty.
    pub icloud_lock: String,

    /// Text of the "Locked Carrier" field as reported.
    pub carrier_raw: String,

    pub sim_lock_status: String,
    pub estimated_purchase_date: String,
    pub activation_status: String,

    /// The untouched contents of the preformatted detail block.
    pub raw_detail_block: String,

    /// Derived carrier-lock classification.
    pub carrier_group: CarrierGroup,

    /// Derived activation state.
    pub is_active: bool,
}

impl Device {
    /// Whether the iCloud activation lock is reported as on.
    pub fn is_icloud_locked(&self) -> bool {
        self.icloud_lock == "ON"
    }
}

/// Report fields read from one detail block, before classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceFields {
    pub model_description: String,
    pub imei2: String,
    pub serial_number: String,
    pub warranty_status: String,
    pub icloud_lock: String,
    pub carrier_raw: String,
    pub sim_lock_status: String,
    pub estimated_purchase_date: String,
    pub activation_status: String,
}

// =============================================================================
// Carrier group
// =============================================================================

/// Which network a device is locked to, or whether it is unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Default)]
pub enum CarrierGroup {
    Unlocked,
    #[serde(rename = "AT&T")]
    Att,
    #[serde(rename = "T-Mobile/Sprint")]
    TMobileSprint,
    Verizon,
    #[default]
    Other,
}

impl CarrierGroup {
    /// Returns all variants in display order.
    pub fn all() -> &'static [CarrierGroup] {
        &[
            CarrierGroup::Unlocked,
            CarrierGroup::Att,
            CarrierGroup::TMobileSprint,
            CarrierGroup::Verizon,
            CarrierGroup::Other,
        ]
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            CarrierGroup::Unlocked => "Unlocked",
            CarrierGroup::Att => "AT&T",
            CarrierGroup::TMobileSprint => "T-Mobile/Sprint",
            CarrierGroup::Verizon => "Verizon",
            CarrierGroup::Other => "Other",
        }
    }
}

impl std::fmt::Display for CarrierGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Carrier group view
// =============================================================================

/// Devices of one carrier group, derived on demand from a registry.
#[derive(Debug, Clone)]
pub struct CarrierGroupView<'a> {
    pub name: CarrierGroup,
    pub devices: Vec<&'a Device>,
    pub count: usize,
}

// =============================================================================
// Registry summary
// =============================================================================

/// Summary statistics for one loaded report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrySummary {
    /// Total devices extracted.
    pub total_devices: usize,

    /// Devices per carrier group.
    pub devices_by_group: HashMap<CarrierGroup, usize>,

    /// Devices classified as active.
    pub active: usize,

    /// Devices classified as not active.
    pub inactive: usize,

    /// Devices with the iCloud lock on.
    pub icloud_locked: usize,

    /// Devices whose IMEI already appeared earlier in the report.
    pub duplicate_imeis: usize,
}
