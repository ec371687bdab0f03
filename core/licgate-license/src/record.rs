//! The persisted license record.

use crate::error::{DecodeError, DecodeResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format of `validationDate`.
pub const RECORD_DATE_FORMAT: &str = "%Y-%m-%d";

/// The `{licenseKey, validationDate}` pair kept by the host store.
///
/// `validation_date` is only ever written from a successful decode of
/// `license_key`; an empty string means "no license".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseRecord {
    /// The license string exactly as the user entered it.
    #[serde(default)]
    pub license_key: String,
    /// ISO `YYYY-MM-DD` expiration date, or empty.
    #[serde(default)]
    pub validation_date: String,
}

impl LicenseRecord {
    /// A record for a key whose claim expires on `expiration_date`.
    #[must_use]
    pub fn validated(license_key: impl Into<String>, expiration_date: NaiveDate) -> Self {
        Self {
            license_key: license_key.into(),
            validation_date: expiration_date.format(RECORD_DATE_FORMAT).to_string(),
        }
    }

    /// The `("", "")` record that clears any saved license.
    #[must_use]
    pub fn cleared() -> Self {
        Self::default()
    }

    /// Returns true if the record carries no validation date.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validation_date.is_empty()
    }

    /// Parses the stored validation date.
    ///
    /// Returns `Ok(None)` for an empty record.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidDate`] if the stored text is not an ISO date.
    pub fn validation_date(&self) -> DecodeResult<Option<NaiveDate>> {
        if self.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(&self.validation_date, RECORD_DATE_FORMAT)
            .map(Some)
            .map_err(|_| DecodeError::InvalidDate)
    }
}
