//! Behavior tests for the stored-amount codec

use std::str::FromStr;

use bridge_indexer::{BigInt, CodecError};

#[test]
fn decode_encode_round_trip() {
    // includes zero, negatives, and values far past 64-bit range
    for input in [
        "0",
        "1",
        "-1",
        "42",
        "9223372036854775807",
        "9223372036854775808",
        "-9223372036854775809",
        "340282366920938463463374607431768211456",
        "-115792089237316195423570985008687907853269984665640564039457584007913129639935",
    ] {
        let value = BigInt::from_str(input).unwrap();
        assert_eq!(value.to_stored(), input, "round trip failed for {input}");
    }
}

#[test]
fn encode_decode_round_trip_from_values() {
    for value in [
        BigInt::from(0i64),
        BigInt::from(i64::MAX),
        BigInt::from(i64::MIN),
        BigInt::from(u128::MAX),
        BigInt::from(-12345i64),
    ] {
        let decoded = BigInt::from_str(&value.to_stored()).unwrap();
        assert_eq!(decoded, value);
    }
}

#[test]
fn nil_sentinels_are_a_successful_no_op() {
    let null = BigInt::from_str("null").unwrap();
    let nil = BigInt::from_str("nil").unwrap();
    let angled = BigInt::from_str("<nil>").unwrap();

    assert_eq!(null, nil);
    assert_eq!(nil, angled);
    assert!(null.is_zero());
    assert_eq!(null, BigInt::default());
}

#[test]
fn decode_is_idempotent_on_zero() {
    let zero = BigInt::from_str("null").unwrap();
    let again = BigInt::from_str(&zero.to_stored()).unwrap();
    assert_eq!(zero, again);
    assert_eq!(again.to_stored(), "0");
}

#[test]
fn unparsable_text_is_a_format_error() {
    for input in ["abc", "1.5", "0x10", "1 2", "+7", "--1", ""] {
        match BigInt::from_str(input) {
            Err(CodecError::Format(reported)) => {
                assert_eq!(reported, input.trim(), "error should name the input")
            }
            other => panic!("expected format error for {input:?}, got {other:?}"),
        }
    }
}

#[test]
fn non_text_payload_is_a_type_error() {
    let payload = [0x00, 0x9f, 0x92, 0x96];
    assert!(matches!(
        BigInt::from_text(&payload),
        Err(CodecError::UnexpectedType(_))
    ));
}

#[test]
fn whitespace_is_tolerated_on_decode() {
    let value = BigInt::from_str("  -42\n").unwrap();
    assert_eq!(value.to_stored(), "-42");
}

#[test]
fn serde_uses_the_canonical_string_form() {
    let value = BigInt::from_str("340282366920938463463374607431768211456").unwrap();
    let json = serde_json::to_string(&value).unwrap();
    assert_eq!(json, "\"340282366920938463463374607431768211456\"");

    let back: BigInt = serde_json::from_str(&json).unwrap();
    assert_eq!(back, value);

    // integers and sentinels are accepted on the way in
    let from_int: BigInt = serde_json::from_str("123").unwrap();
    assert_eq!(from_int, BigInt::from(123i64));
    let from_nil: BigInt = serde_json::from_str("\"<nil>\"").unwrap();
    assert!(from_nil.is_zero());
}

#[test]
fn accumulation_over_large_values() {
    let mut total = BigInt::zero();
    let step = BigInt::from_str("340282366920938463463374607431768211456").unwrap();
    for _ in 0..3 {
        total += &step;
    }
    assert_eq!(
        total.to_stored(),
        "1020847100762815390390123822295304634368"
    );

    let summed: BigInt = vec![BigInt::from(1i64), BigInt::from(2i64), BigInt::from(-3i64)]
        .into_iter()
        .sum();
    assert!(summed.is_zero());
}
