use std::{
    borrow::Cow,
    fmt::Display,
    iter::Sum,
    ops::{Add, Sub},
    str::FromStr,
};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{
    encode::IsNull,
    error::BoxDynError,
    sqlite::{SqliteArgumentValue, SqliteTypeInfo, SqliteValueRef},
    Decode,
    Encode,
    Sqlite,
    Type,
};
use thiserror::Error;

//--------------------------------------       Price         ---------------------------------------------------------

/// A product price with monetary precision.
///
/// Prices are fixed-point decimal values. They compare exactly (`1.50 == 1.5`, `79.99 < 80`), so a
/// "strictly lower" check is a plain `<`. Never construct one from an `f64`; parse the decimal
/// string instead.
///
/// In SQLite a price is stored as its canonical decimal string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price(Decimal);

impl Price {
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl From<Decimal> for Price {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<i64> for Price {
    fn from(value: i64) -> Self {
        Self(Decimal::from(value))
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a price: {0}")]
pub struct PriceParseError(String);

impl FromStr for Price {
    type Err = PriceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s).map(Self).map_err(|e| PriceParseError(format!("{s}: {e}")))
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl Type<Sqlite> for Price {
    fn type_info() -> SqliteTypeInfo {
        <&str as Type<Sqlite>>::type_info()
    }

    fn compatible(ty: &SqliteTypeInfo) -> bool {
        <&str as Type<Sqlite>>::compatible(ty)
    }
}

impl<'q> Encode<'q, Sqlite> for Price {
    fn encode_by_ref(&self, buf: &mut Vec<SqliteArgumentValue<'q>>) -> IsNull {
        buf.push(SqliteArgumentValue::Text(Cow::Owned(self.0.to_string())));
        IsNull::No
    }
}

impl<'r> Decode<'r, Sqlite> for Price {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
        let s = <&str as Decode<Sqlite>>::decode(value)?;
        Ok(Self(Decimal::from_str(s)?))
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::Price;

    #[test]
    fn exact_comparison() {
        let a = Price::from_str("1.50").unwrap();
        let b = Price::from_str("1.5").unwrap();
        assert_eq!(a, b);
        assert!(Price::from_str("79.99").unwrap() < Price::from_str("80").unwrap());
        assert!(!(Price::from_str("80.00").unwrap() < Price::from_str("80").unwrap()));
    }

    #[test]
    fn parse_and_display() {
        let p = Price::from_str("123.45").unwrap();
        assert_eq!(p.to_string(), "123.45");
        assert!(Price::from_str("not a price").is_err());
    }

    #[test]
    fn serde_round_trip() {
        let p = Price::from_str("99.90").unwrap();
        let json = serde_json::to_string(&p).unwrap();
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn arithmetic() {
        let a = Price::from_str("100.00").unwrap();
        let b = Price::from_str("80.00").unwrap();
        assert_eq!((a - b).to_string(), "20.00");
        assert_eq!([a, b].into_iter().sum::<Price>().to_string(), "180.00");
    }
}
