//! Arbitrary-precision amount type and its storage codec

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use num_traits::Zero;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef};
use sqlx::{Decode, Encode, Postgres, Type};

use super::error::CodecError;

/// Stored literals treated as "no value present".
const NIL_SENTINELS: [&str; 3] = ["null", "nil", "<nil>"];

/// Arbitrary-precision signed integer used for every on-chain amount.
///
/// Chain-native quantities routinely exceed 64-bit range, so amount and fee
/// columns never use fixed-width integers. The stored form is canonical
/// base-10 text: `-` prefix for negatives, no leading zeros, `"0"` for zero.
/// Decoding accepts the nil sentinels `"null"`, `"nil"` and `"<nil>"` as a
/// successful no-op yielding the zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BigInt(num_bigint::BigInt);

impl BigInt {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Decode a stored byte payload.
    ///
    /// Non-UTF-8 input is a payload-kind error, not a format error: the
    /// caller handed us something that was never text.
    pub fn from_text(payload: &[u8]) -> Result<Self, CodecError> {
        let text = std::str::from_utf8(payload)
            .map_err(|_| CodecError::UnexpectedType("a non-UTF-8 byte payload"))?;
        text.parse()
    }

    /// Canonical text encoding of this value.
    pub fn to_stored(&self) -> String {
        self.0.to_string()
    }

    /// Text encoding of an optional value; absent encodes as `"null"`.
    pub fn to_stored_opt(value: Option<&BigInt>) -> String {
        match value {
            Some(v) => v.to_stored(),
            None => "null".to_string(),
        }
    }

    /// Scale an on-chain amount into fixed-point USD:
    /// `amount * price / 10^precision`, all in integer math.
    ///
    /// `price` is USD scaled by 1e8 (see [`crate::models::PRICE_SCALE`]), so
    /// the result keeps that scale.
    pub fn normalized(&self, price: i64, precision: i32) -> BigInt {
        let scale = num_traits::pow(num_bigint::BigInt::from(10u32), precision.max(0) as usize);
        BigInt((&self.0 * price) / scale)
    }
}

impl FromStr for BigInt {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, CodecError> {
        let trimmed = s.trim();
        if NIL_SENTINELS.contains(&trimmed) {
            return Ok(Self::default());
        }
        let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodecError::Format(trimmed.to_string()));
        }
        let value = num_bigint::BigInt::parse_bytes(trimmed.as_bytes(), 10)
            .ok_or_else(|| CodecError::Format(trimmed.to_string()))?;
        Ok(Self(value))
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<num_bigint::BigInt> for BigInt {
    fn from(value: num_bigint::BigInt) -> Self {
        Self(value)
    }
}

macro_rules! bigint_from_primitive {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for BigInt {
                fn from(value: $ty) -> Self {
                    Self(num_bigint::BigInt::from(value))
                }
            }
        )*
    };
}

bigint_from_primitive!(i32, i64, i128, u32, u64, u128);

impl Add for BigInt {
    type Output = BigInt;

    fn add(self, rhs: BigInt) -> BigInt {
        BigInt(self.0 + rhs.0)
    }
}

impl Add<&BigInt> for BigInt {
    type Output = BigInt;

    fn add(self, rhs: &BigInt) -> BigInt {
        BigInt(self.0 + &rhs.0)
    }
}

impl AddAssign<&BigInt> for BigInt {
    fn add_assign(&mut self, rhs: &BigInt) {
        self.0 += &rhs.0;
    }
}

impl AddAssign for BigInt {
    fn add_assign(&mut self, rhs: BigInt) {
        self.0 += rhs.0;
    }
}

impl Sum for BigInt {
    fn sum<I: Iterator<Item = BigInt>>(iter: I) -> BigInt {
        iter.fold(BigInt::zero(), Add::add)
    }
}

impl Serialize for BigInt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_stored())
    }
}

struct BigIntVisitor;

impl<'de> Visitor<'de> for BigIntVisitor {
    type Value = BigInt;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a base-10 integer string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<BigInt, E> {
        v.parse().map_err(de::Error::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<BigInt, E> {
        Ok(BigInt::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<BigInt, E> {
        Ok(BigInt::from(v))
    }
}

impl<'de> Deserialize<'de> for BigInt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        deserializer.deserialize_any(BigIntVisitor)
    }
}

impl Type<Postgres> for BigInt {
    fn type_info() -> PgTypeInfo {
        <&str as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <&str as Type<Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, Postgres> for BigInt {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> IsNull {
        <String as Encode<'q, Postgres>>::encode(self.to_stored(), buf)
    }
}

impl<'r> Decode<'r, Postgres> for BigInt {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let text = <&str as Decode<'r, Postgres>>::decode(value)
            .map_err(|_| CodecError::UnexpectedType("a non-text database value"))?;
        Ok(BigInt::from_text(text.as_bytes())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_round_trip() {
        for input in [
            "0",
            "1",
            "-1",
            "1234567890",
            "-98765432109876543210987654321098765432",
            "340282366920938463463374607431768211456",
        ] {
            let value = BigInt::from_text(input.as_bytes()).unwrap();
            assert_eq!(value.to_stored(), input);
        }
    }

    #[test]
    fn nil_sentinels_decode_to_zero() {
        for input in ["null", "nil", "<nil>", "  null  "] {
            let value = BigInt::from_text(input.as_bytes()).unwrap();
            assert!(value.is_zero());
        }
    }

    #[test]
    fn garbage_is_a_format_error() {
        for input in ["abc", "12a3", "--4", "+5", "-", ""] {
            match BigInt::from_text(input.as_bytes()) {
                Err(CodecError::Format(_)) => {}
                other => panic!("expected format error for {input:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn non_utf8_is_a_type_error() {
        match BigInt::from_text(&[0xff, 0xfe, 0x31]) {
            Err(CodecError::UnexpectedType(_)) => {}
            other => panic!("expected type error, got {other:?}"),
        }
    }

    #[test]
    fn absent_encodes_as_null() {
        assert_eq!(BigInt::to_stored_opt(None), "null");
        assert_eq!(BigInt::to_stored_opt(Some(&BigInt::from(7i64))), "7");
    }

    #[test]
    fn usd_normalization_stays_integer() {
        // 2.5 tokens at 9 decimals, price $2.00 (2e8 fixed-point)
        let amount = BigInt::from(2_500_000_000u64);
        let usd = amount.normalized(200_000_000, 9);
        assert_eq!(usd.to_stored(), "500000000");
    }
}
