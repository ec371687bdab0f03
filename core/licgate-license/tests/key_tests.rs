mod common;

use common::{date, present, present_raw};
use licgate_license::{DecodeError, FixedClock, LicenseClaim, Validity, Clock, decode, is_valid};
use pretty_assertions::assert_eq;

// ── Decoding ─────────────────────────────────────────────────────

#[test]
fn decode_presented_key() {
    let key = present("id1", "20991231");
    assert_eq!(key, "aWQx-OjIw-OTkx-MjMx-XXXX-XXXX");

    let claim = decode(&key).unwrap();
    assert_eq!(
        claim,
        LicenseClaim {
            id: "id1".into(),
            expiration_date: date(2099, 12, 31),
        }
    );
}

#[test]
fn decode_key_with_base64_padding() {
    let claim = decode(&present("ACME-042", "20991231")).unwrap();
    assert_eq!(claim.id, "ACME-042");
    assert_eq!(claim.expiration_date, date(2099, 12, 31));
}

#[test]
fn decode_bare_body_without_cosmetics() {
    let claim = decode("dXNlcjoyMDIwMDEwMQ==").unwrap();
    assert_eq!(claim.id, "user");
    assert_eq!(claim.expiration_date, date(2020, 1, 1));
}

#[test]
fn decode_body_with_padding_stripped() {
    let claim = decode("dXNlcjoyMDIwMDEwMQ").unwrap();
    assert_eq!(claim.expiration_date, date(2020, 1, 1));
}

#[test]
fn decode_trims_surrounding_whitespace() {
    let key = format!("  {}\n", present("id1", "20991231"));
    assert!(decode(&key).is_ok());
}

#[test]
fn decode_leap_day() {
    let claim = decode(&present("leap", "20280229")).unwrap();
    assert_eq!(claim.expiration_date, date(2028, 2, 29));
}

// ── Decode failures ──────────────────────────────────────────────

#[test]
fn empty_string_is_malformed() {
    assert_eq!(decode(""), Err(DecodeError::MalformedEncoding));
}

#[test]
fn delimiters_and_filler_only_is_malformed() {
    assert_eq!(decode("----XXXX-XXXX"), Err(DecodeError::MalformedEncoding));
}

#[test]
fn garbled_string_is_malformed() {
    assert_eq!(decode("garbled-string"), Err(DecodeError::MalformedEncoding));
}

#[test]
fn non_utf8_payload_is_malformed() {
    // base64 of [0xff, 0xfe, 0xfd]
    assert_eq!(decode("//79"), Err(DecodeError::MalformedEncoding));
}

#[test]
fn payload_without_separator_is_malformed() {
    assert_eq!(
        decode(&present_raw("nocolon20991231")),
        Err(DecodeError::MalformedPayload)
    );
}

#[test]
fn payload_with_extra_separator_is_malformed() {
    assert_eq!(
        decode(&present_raw("a:b:20991231")),
        Err(DecodeError::MalformedPayload)
    );
}

#[test]
fn payload_with_empty_id_is_malformed() {
    assert_eq!(
        decode(&present("", "20991231")),
        Err(DecodeError::MalformedPayload)
    );
}

#[test]
fn short_date_token_is_malformed() {
    assert_eq!(
        decode(&present("id1", "2099123")),
        Err(DecodeError::MalformedPayload)
    );
}

#[test]
fn non_digit_date_token_is_malformed() {
    assert_eq!(
        decode(&present("id1", "2099-1-1")),
        Err(DecodeError::MalformedPayload)
    );
}

#[test]
fn impossible_month_is_invalid_date() {
    assert_eq!(
        decode(&present("id1", "20231332")),
        Err(DecodeError::InvalidDate)
    );
}

#[test]
fn impossible_day_is_invalid_date() {
    assert_eq!(
        decode(&present("id1", "20230229")),
        Err(DecodeError::InvalidDate)
    );
    assert_eq!(
        decode(&present("id1", "20230431")),
        Err(DecodeError::InvalidDate)
    );
}

// ── Validity ─────────────────────────────────────────────────────

#[test]
fn expiration_today_is_valid() {
    let today = date(2026, 10, 18);
    assert!(is_valid(today, today));
    assert_eq!(Validity::of(today, today), Validity::Valid);
}

#[test]
fn expiration_tomorrow_is_valid() {
    assert!(is_valid(date(2026, 10, 19), date(2026, 10, 18)));
}

#[test]
fn expiration_yesterday_is_expired() {
    assert!(!is_valid(date(2026, 10, 17), date(2026, 10, 18)));
    assert_eq!(
        Validity::of(date(2026, 10, 17), date(2026, 10, 18)),
        Validity::Expired
    );
}

#[test]
fn validity_serde() {
    let json = serde_json::to_string(&Validity::Expired).unwrap();
    assert_eq!(json, r#""expired""#);
    let parsed: Validity = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, Validity::Expired);
}

#[test]
fn fixed_clock_returns_its_date() {
    let clock = FixedClock(date(2030, 6, 1));
    assert_eq!(clock.today(), date(2030, 6, 1));
}
