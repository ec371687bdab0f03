use licgate_license::{DecodeError, StoreError, SubmitError};

#[test]
fn error_display_decode_variants() {
    assert_eq!(DecodeError::MalformedEncoding.to_string(), "malformed encoding");
    assert_eq!(DecodeError::MalformedPayload.to_string(), "malformed payload");
    assert_eq!(DecodeError::InvalidDate.to_string(), "invalid date");
}

#[test]
fn error_display_storage_unavailable() {
    let err = StoreError::Unavailable("disk full".into());
    let msg = format!("{err}");
    assert!(msg.contains("storage"));
    assert!(msg.contains("disk full"));
}

#[test]
fn error_from_io() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: StoreError = io.into();
    assert!(format!("{err}").starts_with("storage error"));
}

#[test]
fn error_from_serde_json() {
    let serde_err: Result<serde_json::Value, _> = serde_json::from_str("not json");
    let store_err: StoreError = serde_err.unwrap_err().into();
    assert!(format!("{store_err}").contains("serialization"));
}

#[test]
fn submit_error_wraps_decode() {
    let err: SubmitError = DecodeError::MalformedPayload.into();
    assert!(matches!(err, SubmitError::Decode(DecodeError::MalformedPayload)));
    assert!(format!("{err}").contains("malformed payload"));
}

#[test]
fn user_messages_distinguish_failures() {
    assert_eq!(
        SubmitError::Decode(DecodeError::MalformedEncoding).user_message(),
        "license malformed"
    );
    assert_eq!(
        SubmitError::Decode(DecodeError::MalformedPayload).user_message(),
        "license malformed"
    );
    assert_eq!(
        SubmitError::Decode(DecodeError::InvalidDate).user_message(),
        "license date is invalid"
    );
    assert_eq!(
        SubmitError::Storage(StoreError::Unavailable("x".into())).user_message(),
        "could not reach storage, try again"
    );
    assert_eq!(
        SubmitError::Busy.user_message(),
        "a license check is already running"
    );
}

#[test]
fn error_is_debug() {
    let err = SubmitError::Busy;
    let _ = format!("{err:?}");
}
