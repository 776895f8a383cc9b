// ImeiSift - core/vision.rs
//
// Seam for an external image-to-IMEI reader. The reader itself lives
// outside this crate; the core only normalises what it returns and checks
// the candidate against the loaded registry.

use crate::core::registry::Registry;
use crate::util::constants;
use crate::util::error::VisionError;

/// An image submitted for IMEI recovery.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// Caller-facing name (usually the file name), used in the manual queue.
    pub label: String,
    pub bytes: Vec<u8>,
}

/// External capability that reads an IMEI out of an image.
///
/// Returns the raw text the reader produced; normalisation happens in
/// [`recognize`].
pub trait VisionReader {
    fn read_imei(&self, image: &ImagePayload) -> Result<String, VisionError>;
}

/// Outcome of reading one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognition {
    /// A 15-digit IMEI present in the registry.
    Recognized(String),
    /// A 15-digit IMEI the registry does not contain.
    Unverified(String),
    /// The reader failed or returned something that is not an IMEI.
    Failed,
}

/// Strip every non-digit; accept only if exactly 15 digits remain.
pub fn normalize_candidate(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    (digits.len() == constants::IMEI_LEN).then_some(digits)
}

/// Run the reader on one image and classify the result against `registry`.
pub fn recognize<R: VisionReader + ?Sized>(
    reader: &R,
    image: &ImagePayload,
    registry: &Registry,
) -> Recognition {
    let raw = match reader.read_imei(image) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(image = %image.label, error = %e, "Vision reader failed");
            return Recognition::Failed;
        }
    };

    match normalize_candidate(&raw) {
        Some(imei) if registry.contains_imei(&imei) => Recognition::Recognized(imei),
        Some(imei) => {
            tracing::debug!(image = %image.label, imei = %imei, "IMEI not present in loaded report");
            Recognition::Unverified(imei)
        }
        None => {
            tracing::debug!(image = %image.label, "Vision result is not a 15-digit IMEI");
            Recognition::Failed
        }
    }
}
