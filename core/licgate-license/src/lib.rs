//! License gating for the licgate desktop shell.
//!
//! This crate handles:
//! - Decoding presented license strings into claims
//! - Date-only expiration checks against an injectable clock
//! - Persisting the `{licenseKey, validationDate}` record through a host store
//! - The session state machine that drives the access gate
//!
//! # License String Format
//!
//! `base64("<id>:<YYYYMMDD>")`, grouped with `-` and right-padded with `X`.
//! The scheme is a reversible encoding, not a signed credential.
//!
//! # State Machine
//!
//! ```text
//! Loading ──load──▶ Unlicensed | Valid | Expired
//! Unlicensed | Expired | Valid ──submit──▶ Valid | Expired
//! ```
//!
//! A failed decode or a failed save leaves the state where it was.

mod error;
mod gate;
mod key;
mod record;
mod session;
mod store;
mod validity;

pub use error::{DecodeError, DecodeResult, StoreError, StoreResult, SubmitError};
pub use gate::{AccessGate, Rendering, Route, UnknownRoute};
pub use key::{decode, LicenseClaim, DELIMITER, FILLER, PAYLOAD_SEPARATOR};
pub use record::{LicenseRecord, RECORD_DATE_FORMAT};
pub use session::{GateState, LicenseSession, SessionConfig, SessionSnapshot, SubmitOutcome};
pub use store::{FileRecordStore, LicenseRecordStore, MemoryRecordStore};
pub use validity::{is_valid, Clock, FixedClock, SystemClock, Validity};
