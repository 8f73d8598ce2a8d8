//! Config-file location and decoding.
//!
//! Location is either an explicit path carried by the designated
//! config-file flag (scanned out of the raw token list before clap runs),
//! or the first existing candidate from the configured extension-less base
//! names, each probed against `.json`, `.toml`, `.yaml` in that order.
//!
//! Whatever the format, the document is parsed into its own value tree and
//! canonicalized to a `toml::Table`. The walker then applies present keys
//! to matching leaves sparsely: keys absent from the document leave the
//! field's current value (the caller's default) untouched, and unknown
//! document keys are ignored.

use std::path::Path;

use toml::{Table, Value};

use crate::error::LayerfigError;
use crate::schema::{FieldValue, Section, SourceKind};
use crate::walk::walk;

/// Probe order for extension-less candidates.
const EXTENSIONS: [&str; 3] = [".json", ".toml", ".yaml"];

/// Scan the raw token list for the config-file flag's value.
///
/// Matches the first occurrence of either `--name value` or `--name=value`.
pub(crate) fn scan_config_flag(args: &[String], name: &str) -> Option<String> {
    let flag = format!("--{name}");
    let assign = format!("--{name}=");
    for (i, arg) in args.iter().enumerate() {
        if *arg == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
        if let Some(value) = arg.strip_prefix(&assign) {
            return Some(value.to_string());
        }
    }
    None
}

/// Locate and apply the config file, if any.
///
/// An explicit path must open and decode; failure to open it is fatal (the
/// user asked for that specific file). Without an explicit path, candidates
/// are probed in order and the first existing file wins; no file existing
/// anywhere is not an error.
pub(crate) fn apply_config_file(
    root: &mut dyn Section,
    explicit: Option<&str>,
    candidates: &[String],
) -> Result<(), LayerfigError> {
    if let Some(path) = explicit {
        let path = Path::new(path);
        let content = std::fs::read_to_string(path).map_err(|e| LayerfigError::FileOpen {
            path: path.to_path_buf(),
            source: e,
        })?;
        return decode_into(root, path, &content);
    }

    for base in candidates {
        for ext in EXTENSIONS {
            let path_str = format!("{base}{ext}");
            let path = Path::new(&path_str);
            match std::fs::read_to_string(path) {
                Ok(content) => return decode_into(root, path, &content),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(LayerfigError::FileOpen {
                        path: path.to_path_buf(),
                        source: e,
                    });
                }
            }
        }
    }
    Ok(())
}

/// Dispatch on the file extension and apply the decoded document.
pub(crate) fn decode_into(
    root: &mut dyn Section,
    path: &Path,
    content: &str,
) -> Result<(), LayerfigError> {
    let decode_err = |message: String| LayerfigError::FileDecode {
        path: path.to_path_buf(),
        message,
    };

    let ext = path.extension().and_then(|e| e.to_str());
    let tree = match ext {
        Some("json") => {
            let value: serde_json::Value =
                serde_json::from_str(content).map_err(|e| decode_err(e.to_string()))?;
            Value::try_from(value).map_err(|e| decode_err(e.to_string()))?
        }
        Some("toml") => {
            let table: Table = content.parse().map_err(|e: toml::de::Error| {
                decode_err(e.to_string())
            })?;
            Value::Table(table)
        }
        Some("yaml") => {
            let value: serde_yaml::Value =
                serde_yaml::from_str(content).map_err(|e| decode_err(e.to_string()))?;
            Value::try_from(value).map_err(|e| decode_err(e.to_string()))?
        }
        _ => return Err(LayerfigError::UnsupportedFileType),
    };

    let Value::Table(table) = tree else {
        return Err(decode_err("top-level document is not a table".into()));
    };
    apply_table(root, path, &table)
}

/// Overwrite every leaf whose key path is present in the document.
fn apply_table(root: &mut dyn Section, path: &Path, table: &Table) -> Result<(), LayerfigError> {
    walk(root, SourceKind::File, &mut |field_path, value, _| {
        match lookup(table, field_path) {
            Some(node) => assign(path, &field_path.join("."), value, node),
            None => Ok(()),
        }
    })
}

fn lookup<'t>(table: &'t Table, path: &[String]) -> Option<&'t Value> {
    let (leaf, parents) = path.split_last()?;
    let mut current = table;
    for segment in parents {
        current = current.get(segment)?.as_table()?;
    }
    current.get(leaf)
}

fn assign(
    file: &Path,
    key: &str,
    value: FieldValue<'_>,
    node: &Value,
) -> Result<(), LayerfigError> {
    let mismatch = |kind: &str| LayerfigError::FileDecode {
        path: file.to_path_buf(),
        message: format!("invalid value for '{key}': expected {kind}, found {}", node.type_str()),
    };
    match value {
        FieldValue::Str(v) => match node {
            Value::String(s) => *v = s.clone(),
            _ => return Err(mismatch("string")),
        },
        FieldValue::Bool(v) => match node {
            Value::Boolean(b) => *v = *b,
            _ => return Err(mismatch("bool")),
        },
        FieldValue::I64(v) => match node {
            Value::Integer(i) => *v = *i,
            _ => return Err(mismatch("integer")),
        },
        FieldValue::Isize(v) => match node {
            Value::Integer(i) => *v = isize::try_from(*i).map_err(|e| LayerfigError::FileDecode {
                path: file.to_path_buf(),
                message: format!("invalid value for '{key}': {e}"),
            })?,
            _ => return Err(mismatch("integer")),
        },
        FieldValue::U64(v) => match node {
            Value::Integer(i) => *v = u64::try_from(*i).map_err(|e| LayerfigError::FileDecode {
                path: file.to_path_buf(),
                message: format!("invalid value for '{key}': {e}"),
            })?,
            _ => return Err(mismatch("integer")),
        },
        FieldValue::Usize(v) => match node {
            Value::Integer(i) => *v = usize::try_from(*i).map_err(|e| LayerfigError::FileDecode {
                path: file.to_path_buf(),
                message: format!("invalid value for '{key}': {e}"),
            })?,
            _ => return Err(mismatch("integer")),
        },
        FieldValue::F64(v) => match node {
            Value::Float(f) => *v = *f,
            Value::Integer(i) => *v = *i as f64,
            _ => return Err(mismatch("float")),
        },
        FieldValue::Duration(v) => match node {
            Value::String(s) => {
                *v = s.parse().map_err(|e| LayerfigError::FileDecode {
                    path: file.to_path_buf(),
                    message: format!("invalid value for '{key}': {e}"),
                })?;
            }
            _ => return Err(mismatch("duration string")),
        },
    }
    Ok(())
}
