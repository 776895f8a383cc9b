// ImeiSift - core/filter.rs
//
// Composable filter engine for device records.
// All active filters are AND-combined.
// Core layer: pure logic, no I/O or UI dependencies.

use crate::core::model::{CarrierGroup, Device};
use std::collections::HashSet;

/// Complete filter state. All fields are AND-combined when applied.
#[derive(Debug, Clone, Default)]
pub struct DeviceFilter {
    /// Carrier groups to include (empty = all).
    pub carrier_groups: HashSet<CarrierGroup>,

    /// Activation state to include. None = both.
    pub active: Option<bool>,

    /// iCloud lock state to include. None = both.
    pub icloud_locked: Option<bool>,

    /// Substring search over IMEI, serial number and model (case-insensitive).
    /// Empty = no filter.
    pub text_search: String,
}

impl DeviceFilter {
    /// Returns true if no filters are active.
    pub fn is_empty(&self) -> bool {
        self.carrier_groups.is_empty()
            && self.active.is_none()
            && self.icloud_locked.is_none()
            && self.text_search.is_empty()
    }

    /// Quick-filter for a single carrier group.
    pub fn group(group: CarrierGroup) -> Self {
        Self {
            carrier_groups: HashSet::from([group]),
            ..Default::default()
        }
    }

    /// Quick-filter for devices that have not been activated.
    pub fn inactive_only() -> Self {
        Self {
            active: Some(false),
            ..Default::default()
        }
    }
}

/// Apply filters to a slice of devices, returning indices of matching devices.
///
/// Indices refer to the original slice and are in ascending order.
pub fn apply_filters(devices: &[Device], filter: &DeviceFilter) -> Vec<usize> {
    if filter.is_empty() {
        return (0..devices.len()).collect();
    }

    let text_lower = filter.text_search.to_lowercase();

    devices
        .iter()
        .enumerate()
        .filter(|(_, device)| matches_all(device, filter, &text_lower))
        .map(|(idx, _)| idx)
        .collect()
}

fn matches_all(device: &Device, filter: &DeviceFilter, text_lower: &str) -> bool {
    if !filter.carrier_groups.is_empty() && !filter.carrier_groups.contains(&device.carrier_group)
    {
        return false;
    }

    if filter.active.is_some_and(|active| active != device.is_active) {
        return false;
    }

    if filter
        .icloud_locked
        .is_some_and(|locked| locked != device.is_icloud_locked())
    {
        return false;
    }

    if !text_lower.is_empty() {
        let hit = [&device.imei, &device.serial_number, &device.model_description]
            .iter()
            .any(|field| field.to_lowercase().contains(text_lower));
        if !hit {
            return false;
        }
    }

    true
}
