//! Numeric payload encoding.
//!
//! Readings go out as plain decimal text with a fixed number of fractional
//! digits, so the same value always yields the same bytes.

use core::fmt::Write;

use heapless::String;

use crate::error::PayloadError;

/// Maximum length of an encoded reading.
pub const MAX_PAYLOAD_LEN: usize = 32;

/// Highest supported number of fractional digits.
pub const MAX_PRECISION: u8 = 6;

/// An encoded reading.
pub type Payload = String<MAX_PAYLOAD_LEN>;

/// Formats `value` with exactly `precision` fractional digits.
///
/// `precision` is clamped to [`MAX_PRECISION`]. A result that reads as zero is
/// written without a sign, so `-0.001` at two digits becomes `0.00`.
pub fn format_reading(value: f32, precision: u8) -> Result<Payload, PayloadError> {
    if !value.is_finite() {
        return Err(PayloadError::NonFinite);
    }
    let precision = usize::from(precision.min(MAX_PRECISION));

    let mut out = Payload::new();
    write!(out, "{:.*}", precision, value).map_err(|_| PayloadError::TooLarge)?;

    if let Some(magnitude) = out.strip_prefix('-') {
        if magnitude.bytes().all(|b| b == b'0' || b == b'.') {
            let mut unsigned = Payload::new();
            unsigned
                .push_str(magnitude)
                .map_err(|_| PayloadError::TooLarge)?;
            return Ok(unsigned);
        }
    }
    Ok(out)
}
