// ImeiSift - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "ImeiSift";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "ImeiSift";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Input limits
// =============================================================================

/// Default maximum size of an HTML report accepted for extraction.
pub const DEFAULT_MAX_INPUT_SIZE: u64 = 50 * 1024 * 1024; // 50 MB

/// Smallest user-configurable input size limit.
pub const MIN_MAX_INPUT_SIZE: u64 = 1024; // 1 KB

/// Hard upper bound on the input size limit.
pub const ABSOLUTE_MAX_INPUT_SIZE: u64 = 512 * 1024 * 1024; // 512 MB

// =============================================================================
// Record extraction
// =============================================================================

/// Literal marker preceding every device's IMEI in the lookup report.
/// The document is split on this exact text.
pub const IMEI_MARKER: &str = "<b>IMEI:</b>";

/// Number of decimal digits in an IMEI.
pub const IMEI_LEN: usize = 15;

/// Opening tag (prefix) of the preformatted detail block. Attributes are
/// tolerated, so only the prefix is matched.
pub const DETAIL_BLOCK_OPEN: &str = "<pre";

/// Closing tag of the preformatted detail block.
pub const DETAIL_BLOCK_CLOSE: &str = "</pre>";

/// Labels read from each detail block, in report order.
pub const LABEL_MODEL_DESCRIPTION: &str = "Model Description";
pub const LABEL_IMEI2: &str = "IMEI2";
pub const LABEL_SERIAL_NUMBER: &str = "Serial Number";
pub const LABEL_WARRANTY_STATUS: &str = "Warranty Status";
pub const LABEL_ICLOUD_LOCK: &str = "iCloud Lock";
pub const LABEL_LOCKED_CARRIER: &str = "Locked Carrier";
pub const LABEL_SIM_LOCK_STATUS: &str = "Sim-Lock Status";
pub const LABEL_PURCHASE_DATE: &str = "Estimated Purchase Date";
pub const LABEL_ACTIVATION_STATUS: &str = "Activation Status";

// =============================================================================
// Export
// =============================================================================

/// Default width of the `=` separator line closing each exported device.
pub const DEFAULT_SEPARATOR_WIDTH: usize = 20;

/// Minimum user-configurable separator width.
pub const MIN_SEPARATOR_WIDTH: usize = 1;

/// Maximum user-configurable separator width.
pub const MAX_SEPARATOR_WIDTH: usize = 200;

/// Substring removed from model descriptions in the text export.
pub const MODEL_REGION_SUFFIX: &str = "-USA";

// =============================================================================
// Logging
// =============================================================================

/// Default log level when neither RUST_LOG, --debug, nor config sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// File names
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
