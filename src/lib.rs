//! Layered configuration resolution for server-style applications. Describe
//! a settings struct, point at your sources, and go.
//!
//! Layerfig populates a single settings structure from four sources —
//! caller-supplied defaults, an optional config file, environment
//! variables, and command-line flags — with a fixed precedence:
//!
//! ```text
//! Caller defaults       whatever the struct holds going in
//!        ↑ overridden by
//! Config file           first existing candidate, or an explicit --config path
//!        ↑ overridden by
//! Environment vars      PREFIX_FIELD_PATH
//!        ↑ overridden by
//! CLI flags             --field-path, only when explicitly supplied
//! ```
//!
//! Every source is **sparse**: it only overwrites the fields it actually
//! mentions, and unset fields fall through to the layer below. Precedence
//! is enforced purely by the order of the overwrite passes — no per-field
//! source tag is ever stored.
//!
//! ```ignore
//! use layerfig::{ErrorPolicy, FieldNode, Resolver, Section};
//!
//! #[derive(Default)]
//! struct ServerSettings {
//!     addr: String,
//!     port: i64,
//! }
//!
//! impl Section for ServerSettings {
//!     fn fields(&mut self) -> Vec<FieldNode<'_>> {
//!         vec![
//!             FieldNode::leaf("addr", &mut self.addr),
//!             FieldNode::leaf("port", &mut self.port),
//!         ]
//!     }
//! }
//!
//! let mut settings = ServerSettings { addr: "0.0.0.0".into(), port: 5243 };
//! Resolver::new(ErrorPolicy::Exit)
//!     .env_prefix("SRV")
//!     .config_file("server")          // tries server.json, server.toml, server.yaml
//!     .config_file_flag("config", "path to an explicit config file")
//!     .resolve(&mut settings)?;
//! ```
//!
//! # Design: the struct describes itself
//!
//! There is no runtime reflection. Each settings struct implements
//! [`Section`], listing its fields as [`FieldNode`]s: a leaf carries a
//! typed mutable handle (the closed [`FieldValue`] set — string, bool,
//! signed/unsigned integers in 64-bit and native widths, f64, and
//! [`Duration`]), a nested struct is another `Section`, and an
//! `Option<SubSection>` is walked only when present. [`FieldMeta`] adds
//! help text plus per-source renames and skip markers, so a field can be
//! hidden from the environment while still flaggable.
//!
//! Derived keys follow the field path: `sub.str` becomes the flag
//! `--sub-str`, the environment variable `PREFIX_SUB_STR`, and the nested
//! document key `[sub] str` in config files.
//!
//! # Config files
//!
//! Candidates are registered **without an extension** and probed against
//! `.json`, `.toml`, `.yaml` in order; the first existing file is decoded
//! and no file existing anywhere is fine. A designated config-file flag
//! (e.g. `--config path`) bypasses the search; with an explicit path,
//! failure to open it is fatal. Document keys the struct doesn't declare
//! are ignored; declared keys with the wrong type fail the resolution.
//!
//! # Error handling
//!
//! Every phase failure surfaces as a [`LayerfigError`]. What happens next
//! is decided once, at [`Resolver`] construction, by [`ErrorPolicy`]:
//! `Report` returns the error, `Exit` prints it and ends the process with
//! status 2, `Panic` panics carrying it. Resolution never retries; a
//! structure partially mutated by earlier passes is expected after a
//! failure.
//!
//! # Concurrency
//!
//! Resolution is single-threaded and synchronous. The settings structure
//! must be privately owned for the duration of one call; concurrent
//! resolution against the same structure is not supported.

pub mod error;

mod duration;
mod env;
mod file;
mod flags;
mod resolver;
mod schema;
mod walk;

#[cfg(test)]
mod fixtures;

pub use duration::{Duration, ParseDurationError};
pub use error::LayerfigError;
pub use resolver::{ErrorPolicy, Resolver};
pub use schema::{FieldMeta, FieldNode, FieldValue, Section, SourceKind};
