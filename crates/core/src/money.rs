//! Signed fixed-point currency amount with two decimal places.
//!
//! Stored as `i64` minor units (`BIGINT` in PostgreSQL). On the wire an
//! amount is a JSON number in major units (`1000`, `1250.5`); a decimal
//! string (`"1250.50"`) is also accepted on input.
//!
//! Every constructor, parser and sum keeps the magnitude within
//! [`Money::MAX_MAJOR`], small enough that the emitted `f64` reads back to
//! the same cent.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Minor units per major unit.
const SCALE: i64 = 100;

const MAX_MINOR: i64 = Money::MAX_MAJOR * SCALE;

const OUT_OF_RANGE: &str = "amount out of range";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid money amount: {0}")]
pub struct MoneyParseError(String);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest accepted magnitude in major units (one trillion).
    pub const MAX_MAJOR: i64 = 1_000_000_000_000;

    /// Wrap stored minor units as-is. Use [`Money::checked_minor`] for
    /// untrusted values.
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    pub fn checked_minor(minor: i64) -> Option<Self> {
        (minor.checked_abs()? <= MAX_MINOR).then_some(Money(minor))
    }

    /// Whole major units, e.g. `Money::from_major(1000)` is `1000.00`.
    pub fn from_major(major: i64) -> Option<Self> {
        Self::checked_minor(major.checked_mul(SCALE)?)
    }

    pub const fn minor_units(self) -> i64 {
        self.0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        Self::checked_minor(self.0.checked_add(other.0)?)
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// `None` when out of range or finer than a cent.
    fn from_float(value: f64) -> Option<Self> {
        if !value.is_finite() || value.abs() > Self::MAX_MAJOR as f64 {
            return None;
        }
        let scaled = value * SCALE as f64;
        let rounded = scaled.round();
        // Slack for binary representation error only, far below half a cent.
        let slack = (scaled.abs() * f64::EPSILON * 4.0).max(1e-6);
        if (scaled - rounded).abs() > slack {
            return None;
        }
        Self::checked_minor(rounded as i64)
    }

    fn as_float(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = SCALE.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / scale, abs % scale)
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MoneyParseError(s.to_string());
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if frac.len() > 2 || !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };

        let minor = whole
            .checked_mul(SCALE)
            .and_then(|w| w.checked_add(frac))
            .ok_or_else(invalid)?;
        Money::checked_minor(if negative { -minor } else { minor }).ok_or_else(invalid)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_float())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl Visitor<'_> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a currency amount as a number or decimal string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Money::from_major(v).ok_or_else(|| E::custom(OUT_OF_RANGE))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        i64::try_from(v)
            .ok()
            .and_then(Money::from_major)
            .ok_or_else(|| E::custom(OUT_OF_RANGE))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        Money::from_float(v)
            .ok_or_else(|| E::custom("amount out of range or finer than a cent"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        v.parse().map_err(E::custom)
    }
}
