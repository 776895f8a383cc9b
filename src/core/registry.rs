// ImeiSift - core/registry.rs
//
// In-memory device collection for one loaded report.
// Created wholesale by one extraction pass and never partially updated;
// callers install a new registry instead of editing the old one.

use crate::core::filter::{self, DeviceFilter};
use crate::core::model::{CarrierGroup, CarrierGroupView, Device, RegistrySummary};
use std::collections::HashSet;

/// Ordered devices of one report, in document order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    devices: Vec<Device>,
}

impl Registry {
    pub fn new(devices: Vec<Device>) -> Self {
        Self { devices }
    }

    /// Extract and classify a report into a fresh registry.
    pub fn from_html(html: &str) -> Self {
        Self::new(crate::core::parser::extract_devices(html))
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Device> {
        self.devices.get(index)
    }

    /// Resolve registry indices to devices, skipping any out of range.
    pub fn select(&self, indices: &[usize]) -> Vec<&Device> {
        indices.iter().filter_map(|&i| self.devices.get(i)).collect()
    }

    pub fn find_by_imei(&self, imei: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.imei == imei)
    }

    pub fn contains_imei(&self, imei: &str) -> bool {
        self.find_by_imei(imei).is_some()
    }

    /// Devices matching a filter, in registry order.
    pub fn filtered(&self, filter: &DeviceFilter) -> Vec<&Device> {
        self.select(&filter::apply_filters(&self.devices, filter))
    }

    /// One view per carrier group that has at least one device, in
    /// `CarrierGroup::all()` order.
    pub fn groups(&self) -> Vec<CarrierGroupView<'_>> {
        CarrierGroup::all()
            .iter()
            .filter_map(|&group| {
                let devices = self.filtered(&DeviceFilter::group(group));
                (!devices.is_empty()).then(|| CarrierGroupView {
                    name: group,
                    count: devices.len(),
                    devices,
                })
            })
            .collect()
    }

    pub fn summary(&self) -> RegistrySummary {
        let mut summary = RegistrySummary {
            total_devices: self.devices.len(),
            ..Default::default()
        };
        let mut seen = HashSet::new();

        for device in &self.devices {
            *summary
                .devices_by_group
                .entry(device.carrier_group)
                .or_insert(0) += 1;
            if device.is_active {
                summary.active += 1;
            } else {
                summary.inactive += 1;
            }
            if device.is_icloud_locked() {
                summary.icloud_locked += 1;
            }
            if !seen.insert(device.imei.as_str()) {
                summary.duplicate_imeis += 1;
            }
        }

        summary
    }
}
