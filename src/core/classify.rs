// ImeiSift - core/classify.rs
//
// Carrier-group and activation classification of extracted fields.
// Rule order matters: an unlocked indication beats any carrier name.

use crate::core::model::CarrierGroup;
use regex::Regex;
use std::sync::OnceLock;

/// Classify the carrier lock from the sim-lock and carrier fields.
///
/// Matching is case-insensitive substring containment.
pub fn carrier_group(sim_lock_status: &str, carrier_raw: &str) -> CarrierGroup {
    let sim_lock = sim_lock_status.to_lowercase();
    let carrier = carrier_raw.to_lowercase();

    if sim_lock.contains("unlocked") || carrier.contains("unlock") || carrier.contains("open policy")
    {
        CarrierGroup::Unlocked
    } else if carrier.contains("t-mobile") || carrier.contains("sprint") {
        CarrierGroup::TMobileSprint
    } else if carrier.contains("at&t") {
        CarrierGroup::Att
    } else if carrier.contains("verizon") {
        CarrierGroup::Verizon
    } else {
        CarrierGroup::Other
    }
}

/// Decide whether a device has been put into service.
///
/// The activation status is authoritative when present. Otherwise the
/// purchase date is used: "not activated" means inactive, a plausible
/// year (19xx / 20xx) means active, anything else defaults to inactive.
pub fn is_active(activation_status: &str, estimated_purchase_date: &str) -> bool {
    if !activation_status.is_empty() {
        return !contains_not_activated(activation_status);
    }

    if contains_not_activated(estimated_purchase_date) {
        return false;
    }

    year_regex().is_match(estimated_purchase_date)
}

fn contains_not_activated(text: &str) -> bool {
    text.to_lowercase().contains("not activated")
}

fn year_regex() -> &'static Regex {
    static YEAR: OnceLock<Regex> = OnceLock::new();
    YEAR.get_or_init(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("static year regex is valid"))
}
