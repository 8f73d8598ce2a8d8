//! Elapsed-time values with a textual form shared by every config source.
//!
//! [`Duration`] wraps a signed nanosecond count and renders/parses the
//! compact unit-chain grammar (`"1h30m"`, `"1.5s"`, `"250ms"`), so duration
//! fields read identically from config files, environment variables, and
//! CLI flags.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SEC: u64 = 1_000_000_000;

/// A signed span of time with nanosecond resolution.
///
/// The `Display`/`FromStr` pair is the canonical text form used by all
/// sources: a sign, then `<number>[.fraction]<unit>` groups with units
/// `ns`, `us`/`µs`, `ms`, `s`, `m`, `h`. Rendering picks the smallest unit
/// chain that round-trips exactly (`"1.5µs"`, `"1h0m0.5s"`); zero renders
/// as `"0s"`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(i64);

impl Duration {
    pub const ZERO: Duration = Duration(0);

    pub const fn from_nanos(nanos: i64) -> Self {
        Duration(nanos)
    }

    pub const fn from_micros(micros: i64) -> Self {
        Duration(micros * NANOS_PER_MICRO as i64)
    }

    pub const fn from_millis(millis: i64) -> Self {
        Duration(millis * NANOS_PER_MILLI as i64)
    }

    pub const fn from_secs(secs: i64) -> Self {
        Duration(secs * NANOS_PER_SEC as i64)
    }

    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

/// A duration string that does not match the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid duration {0}")]
pub struct ParseDurationError(String);

impl FromStr for Duration {
    type Err = ParseDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseDurationError(s.to_string());

        let mut rest = s;
        let mut neg = false;
        if let Some(r) = rest.strip_prefix('-') {
            neg = true;
            rest = r;
        } else if let Some(r) = rest.strip_prefix('+') {
            rest = r;
        }

        // Bare "0" is the only unit-less form allowed.
        if rest == "0" {
            return Ok(Duration::ZERO);
        }
        if rest.is_empty() {
            return Err(err());
        }

        let mut total: i64 = 0;
        while !rest.is_empty() {
            let int_len = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            let (int_digits, mut after) = rest.split_at(int_len);

            let mut frac_digits = "";
            if let Some(r) = after.strip_prefix('.') {
                let frac_len = r.find(|c: char| !c.is_ascii_digit()).unwrap_or(r.len());
                frac_digits = &r[..frac_len];
                after = &r[frac_len..];
            }
            if int_digits.is_empty() && frac_digits.is_empty() {
                return Err(err());
            }

            let unit_len = after
                .find(|c: char| c.is_ascii_digit() || c == '.')
                .unwrap_or(after.len());
            let (unit, next) = after.split_at(unit_len);
            let scale = unit_scale(unit).ok_or_else(err)?;

            let int_part: u64 = if int_digits.is_empty() {
                0
            } else {
                int_digits.parse().map_err(|_| err())?
            };
            let mut nanos = int_part.checked_mul(scale).ok_or_else(err)?;

            if !frac_digits.is_empty() {
                // Integer numerator over a power-of-ten denominator keeps
                // values like "0.0000005s" exact (scale / pow is exact here).
                let mut numerator = 0u64;
                let mut pow = 1f64;
                for c in frac_digits.chars().take(18) {
                    numerator = numerator * 10 + u64::from(c as u32 - '0' as u32);
                    pow *= 10.0;
                }
                let frac_nanos = (numerator as f64 * (scale as f64 / pow)) as u64;
                nanos = nanos.checked_add(frac_nanos).ok_or_else(err)?;
            }

            let signed = i64::try_from(nanos).map_err(|_| err())?;
            total = total.checked_add(signed).ok_or_else(err)?;
            rest = next;
        }

        Ok(Duration(if neg { -total } else { total }))
    }
}

fn unit_scale(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3_600 * NANOS_PER_SEC),
        _ => None,
    }
}

/// Split `value` into an integer part and a trimmed `.fraction` suffix with
/// `prec` fractional digits. An all-zero fraction renders as nothing.
fn split_frac(value: u64, prec: u32) -> (u64, String) {
    let pow = 10u64.pow(prec);
    let (int, frac) = (value / pow, value % pow);
    if frac == 0 {
        return (int, String::new());
    }
    let mut digits = format!("{frac:0width$}", width = prec as usize);
    while digits.ends_with('0') {
        digits.pop();
    }
    (int, format!(".{digits}"))
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let u = self.0.unsigned_abs();
        if u == 0 {
            return f.write_str("0s");
        }
        let sign = if self.0 < 0 { "-" } else { "" };

        if u < NANOS_PER_MICRO {
            write!(f, "{sign}{u}ns")
        } else if u < NANOS_PER_MILLI {
            let (int, frac) = split_frac(u, 3);
            write!(f, "{sign}{int}{frac}µs")
        } else if u < NANOS_PER_SEC {
            let (int, frac) = split_frac(u, 6);
            write!(f, "{sign}{int}{frac}ms")
        } else {
            let (total_secs, frac) = split_frac(u, 9);
            let secs = total_secs % 60;
            let total_mins = total_secs / 60;
            write!(f, "{sign}")?;
            if total_mins > 0 {
                let mins = total_mins % 60;
                let hours = total_mins / 60;
                if hours > 0 {
                    write!(f, "{hours}h")?;
                }
                write!(f, "{mins}m")?;
            }
            write!(f, "{secs}{frac}s")
        }
    }
}

impl TryFrom<std::time::Duration> for Duration {
    type Error = std::num::TryFromIntError;

    fn try_from(d: std::time::Duration) -> Result<Self, Self::Error> {
        Ok(Duration(i64::try_from(d.as_nanos())?))
    }
}

impl TryFrom<Duration> for std::time::Duration {
    type Error = std::num::TryFromIntError;

    fn try_from(d: Duration) -> Result<Self, Self::Error> {
        Ok(std::time::Duration::from_nanos(u64::try_from(d.0)?))
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DurationVisitor;

        impl Visitor<'_> for DurationVisitor {
            type Value = Duration;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a duration string such as \"1h30m\" or \"250ms\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Duration, E> {
                v.parse().map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(DurationVisitor)
    }
}
