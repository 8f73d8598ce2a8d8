//! Environment-variable decoding pass.
//!
//! Key derivation: optional prefix + path segments joined with `_`,
//! upper-cased. With prefix `GF`, the field path `sub.str` reads from
//! `GF_SUB_STR`. Absent variables leave the field untouched; a present
//! value is parsed according to the field's kind and any parse failure
//! aborts the pass.
//!
//! Takes the variable map as input so tests can pass synthetic data
//! instead of `std::env::vars()`.

use std::collections::HashMap;

use crate::error::LayerfigError;
use crate::schema::{FieldValue, Section, SourceKind};
use crate::walk::walk;

/// Derive the environment key for a field path.
pub(crate) fn env_key(prefix: &str, path: &[String]) -> String {
    let joined = path.join("_");
    let key = if prefix.is_empty() {
        joined
    } else {
        format!("{prefix}_{joined}")
    };
    key.to_uppercase()
}

/// Overwrite every field whose derived key is present in `vars`.
pub(crate) fn apply_env(
    root: &mut dyn Section,
    prefix: &str,
    vars: &HashMap<String, String>,
) -> Result<(), LayerfigError> {
    walk(root, SourceKind::Env, &mut |path, value, _| {
        let key = env_key(prefix, path);
        match vars.get(&key) {
            Some(raw) => assign(&key, raw, value),
            None => Ok(()),
        }
    })
}

fn assign(key: &str, raw: &str, value: FieldValue<'_>) -> Result<(), LayerfigError> {
    let kind = value.kind_name();
    let parse_err = || LayerfigError::EnvParse {
        key: key.to_string(),
        value: raw.to_string(),
        kind,
    };
    match value {
        FieldValue::Str(v) => *v = raw.to_string(),
        // Strict boolean literals only; the underlying parse error is
        // surfaced as-is.
        FieldValue::Bool(v) => *v = raw.parse()?,
        FieldValue::I64(v) => *v = raw.parse().map_err(|_| parse_err())?,
        FieldValue::Isize(v) => *v = raw.parse().map_err(|_| parse_err())?,
        FieldValue::U64(v) => *v = raw.parse().map_err(|_| parse_err())?,
        FieldValue::Usize(v) => *v = raw.parse().map_err(|_| parse_err())?,
        FieldValue::F64(v) => {
            let parsed: f64 = raw.parse().map_err(|_| parse_err())?;
            // Overflowing text like "1e999" parses to infinity; only the
            // literal infinity/NaN spellings may yield a non-finite value.
            if !parsed.is_finite() {
                let literal = raw.strip_prefix(['+', '-']).unwrap_or(raw);
                if !matches!(
                    literal.to_ascii_lowercase().as_str(),
                    "inf" | "infinity" | "nan"
                ) {
                    return Err(parse_err());
                }
            }
            *v = parsed;
        }
        FieldValue::Duration(v) => *v = raw.parse().map_err(|_| parse_err())?,
    }
    Ok(())
}
