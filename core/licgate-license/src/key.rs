//! License string decoding.
//!
//! A presented license string is built as:
//!
//! 1. `base64("<id>:<YYYYMMDD>")`
//! 2. split into groups joined by [`DELIMITER`]
//! 3. right-padded with [`FILLER`] to the presentation length
//!
//! Decoding strips the cosmetic characters and reverses the encoding.
//! Nothing here logs or touches I/O.

use crate::error::{DecodeError, DecodeResult};
use base64::{
    Engine,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Group separator in a presented license string.
pub const DELIMITER: char = '-';

/// Trailing padding character in a presented license string.
pub const FILLER: char = 'X';

/// Separator between the id and the date token in the decoded payload.
pub const PAYLOAD_SEPARATOR: char = ':';

/// Standard alphabet, accepting bodies with or without `=` padding.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// The decoded content of a license string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseClaim {
    /// Licensee identifier.
    pub id: String,
    /// Last calendar day on which the license grants access.
    pub expiration_date: NaiveDate,
}

impl LicenseClaim {
    /// Decodes a presented license string.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the body is not valid base64 text, the
    /// payload is not `<id>:<YYYYMMDD>`, or the date is not a real day.
    pub fn decode(input: &str) -> DecodeResult<Self> {
        let body: String = input.trim().chars().filter(|c| *c != DELIMITER).collect();
        let body = body.trim_end_matches(FILLER);
        if body.is_empty() {
            return Err(DecodeError::MalformedEncoding);
        }

        let bytes = LENIENT_STANDARD
            .decode(body)
            .map_err(|_| DecodeError::MalformedEncoding)?;
        let payload = String::from_utf8(bytes).map_err(|_| DecodeError::MalformedEncoding)?;

        let parts: Vec<&str> = payload.split(PAYLOAD_SEPARATOR).collect();
        let [id, token] = parts.as_slice() else {
            return Err(DecodeError::MalformedPayload);
        };
        if id.is_empty() || token.len() != 8 || !token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DecodeError::MalformedPayload);
        }

        Ok(Self {
            id: (*id).to_string(),
            expiration_date: parse_date_token(token)?,
        })
    }
}

/// Turns an 8-digit `YYYYMMDD` token into a calendar date.
fn parse_date_token(token: &str) -> DecodeResult<NaiveDate> {
    // Slicing is safe: the caller checked for exactly 8 ASCII digits.
    let year: i32 = token[0..4].parse().map_err(|_| DecodeError::MalformedPayload)?;
    let month: u32 = token[4..6].parse().map_err(|_| DecodeError::MalformedPayload)?;
    let day: u32 = token[6..8].parse().map_err(|_| DecodeError::MalformedPayload)?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or(DecodeError::InvalidDate)
}

/// Decodes a presented license string into a claim.
///
/// # Errors
///
/// See [`LicenseClaim::decode`].
pub fn decode(input: &str) -> DecodeResult<LicenseClaim> {
    LicenseClaim::decode(input)
}
