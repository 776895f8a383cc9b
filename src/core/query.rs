// ImeiSift - core/query.rs
//
// Bulk query matching against a loaded registry.
// A query token matches a device when it is a case-sensitive substring of
// the device's IMEI or serial number.

use crate::core::model::Device;
use std::collections::{BTreeSet, HashSet};

/// Outcome of matching one bulk query against a registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOutcome {
    /// Distinct tokens in first-occurrence order.
    pub tokens: Vec<String>,

    /// Indices of matched devices, ascending (registry order), no repeats.
    pub matched_indices: Vec<usize>,

    /// Tokens that matched no device, in token order.
    pub not_found: Vec<String>,
}

impl QueryOutcome {
    /// Resolve matched indices against the device slice they came from.
    pub fn matched<'a>(&self, devices: &'a [Device]) -> Vec<&'a Device> {
        self.matched_indices
            .iter()
            .filter_map(|&i| devices.get(i))
            .collect()
    }

    pub fn matched_count(&self) -> usize {
        self.matched_indices.len()
    }
}

/// Split a raw query on runs of newline, comma, space or tab; trim tokens,
/// drop empties, and keep the first occurrence of each distinct token.
pub fn tokenize(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split(|c| matches!(c, '\n' | ',' | ' ' | '\t'))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter(|token| seen.insert(*token))
        .map(str::to_string)
        .collect()
}

/// Match a raw multi-token query against devices.
///
/// Pure and order-stable: the same devices and query always give the same
/// outcome.
pub fn match_query(devices: &[Device], raw_query: &str) -> QueryOutcome {
    let tokens = tokenize(raw_query);
    let mut matched = BTreeSet::new();
    let mut not_found = Vec::new();

    for token in &tokens {
        let before = matched.len();
        let mut hit = false;
        for (idx, device) in devices.iter().enumerate() {
            if device_matches(device, token) {
                matched.insert(idx);
                hit = true;
            }
        }
        if !hit {
            not_found.push(token.clone());
        }
        tracing::trace!(
            token = %token,
            new_matches = matched.len() - before,
            "Query token evaluated"
        );
    }

    tracing::debug!(
        tokens = tokens.len(),
        matched = matched.len(),
        not_found = not_found.len(),
        "Bulk query matched"
    );

    QueryOutcome {
        tokens,
        matched_indices: matched.into_iter().collect(),
        not_found,
    }
}

fn device_matches(device: &Device, token: &str) -> bool {
    device.imei.contains(token) || device.serial_number.contains(token)
}
