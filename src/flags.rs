//! Flag registration and the final override pass.
//!
//! One long option per leaf field, id = path segments joined with `-`,
//! typed by the field's kind and seeded with the field's content at
//! registration time (whatever default the caller pre-set). Parsing is
//! delegated to clap; afterwards only values the user actually supplied on
//! the command line are written back, so clap's own defaults never clobber
//! what the file and environment passes resolved.
//!
//! Registration fails fast on key collisions instead of letting the last
//! registrant silently win.

use std::collections::HashSet;

use clap::parser::ValueSource;
use clap::{Arg, Command};

use crate::duration::{Duration, ParseDurationError};
use crate::error::LayerfigError;
use crate::schema::{FieldMeta, FieldValue, Section, SourceKind};
use crate::walk::walk;

/// The caller-designated flag carrying an explicit config-file path.
#[derive(Debug, Clone)]
pub(crate) struct ConfigFlag {
    pub name: String,
    pub help: String,
}

/// The registered flag surface for one resolution session.
#[derive(Debug)]
pub(crate) struct FlagSet {
    command: Command,
}

impl FlagSet {
    /// Walk the settings structure and register one flag per leaf field,
    /// plus the config-file flag if designated.
    pub fn register(
        root: &mut dyn Section,
        bin_name: &str,
        config_flag: Option<&ConfigFlag>,
    ) -> Result<Self, LayerfigError> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut args: Vec<Arg> = Vec::new();

        walk(root, SourceKind::Flag, &mut |path, value, meta| {
            let key = path.join("-");
            if !seen.insert(key.clone()) {
                return Err(LayerfigError::KeyCollision { key });
            }
            args.push(build_arg(&key, &value, meta));
            Ok(())
        })?;

        if let Some(flag) = config_flag {
            if !seen.insert(flag.name.clone()) {
                return Err(LayerfigError::KeyCollision {
                    key: flag.name.clone(),
                });
            }
            args.push(
                Arg::new(flag.name.clone())
                    .long(flag.name.clone())
                    .help(flag.help.clone())
                    .value_name("PATH"),
            );
        }

        // Help/version stay out of the registered surface: the flag set
        // belongs to the resolution session, not to the application's own
        // CLI definition.
        let mut command = Command::new(bin_name.to_string())
            .disable_help_flag(true)
            .disable_version_flag(true);
        for arg in args {
            command = command.arg(arg);
        }
        Ok(FlagSet { command })
    }

    /// Parse the token list (program name excluded) and overwrite every
    /// field whose flag was explicitly supplied.
    pub fn parse_and_apply(
        self,
        root: &mut dyn Section,
        args: &[String],
    ) -> Result<(), LayerfigError> {
        let bin_name = self.command.get_name().to_string();
        let argv = std::iter::once(bin_name).chain(args.iter().cloned());
        let matches = self
            .command
            .try_get_matches_from(argv)
            .map_err(|e| LayerfigError::FlagParse(Box::new(e)))?;

        walk(root, SourceKind::Flag, &mut |path, value, _| {
            let key = path.join("-");
            if matches.value_source(&key) != Some(ValueSource::CommandLine) {
                return Ok(());
            }
            match value {
                FieldValue::Str(v) => {
                    if let Some(s) = matches.get_one::<String>(&key) {
                        *v = s.clone();
                    }
                }
                FieldValue::Bool(v) => {
                    if let Some(b) = matches.get_one::<bool>(&key) {
                        *v = *b;
                    }
                }
                FieldValue::I64(v) => {
                    if let Some(n) = matches.get_one::<i64>(&key) {
                        *v = *n;
                    }
                }
                FieldValue::Isize(v) => {
                    if let Some(n) = matches.get_one::<isize>(&key) {
                        *v = *n;
                    }
                }
                FieldValue::U64(v) => {
                    if let Some(n) = matches.get_one::<u64>(&key) {
                        *v = *n;
                    }
                }
                FieldValue::Usize(v) => {
                    if let Some(n) = matches.get_one::<usize>(&key) {
                        *v = *n;
                    }
                }
                FieldValue::F64(v) => {
                    if let Some(n) = matches.get_one::<f64>(&key) {
                        *v = *n;
                    }
                }
                FieldValue::Duration(v) => {
                    if let Some(d) = matches.get_one::<Duration>(&key) {
                        *v = *d;
                    }
                }
            }
            Ok(())
        })
    }
}

fn build_arg(key: &str, value: &FieldValue<'_>, meta: &FieldMeta) -> Arg {
    let mut arg = Arg::new(key.to_string())
        .long(key.to_string())
        .default_value(value.render());
    let help = meta.help_text();
    if !help.is_empty() {
        arg = arg.help(help);
    }
    match value {
        FieldValue::Str(_) => arg.value_name("STRING"),
        // `--flag` alone means true; an explicit value needs `--flag=false`.
        FieldValue::Bool(_) => arg
            .value_name("BOOL")
            .value_parser(clap::value_parser!(bool))
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true"),
        FieldValue::I64(_) => arg
            .value_name("INT")
            .allow_negative_numbers(true)
            .value_parser(clap::value_parser!(i64)),
        FieldValue::Isize(_) => arg
            .value_name("INT")
            .allow_negative_numbers(true)
            .value_parser(clap::value_parser!(isize)),
        FieldValue::U64(_) => arg
            .value_name("UINT")
            .value_parser(clap::value_parser!(u64)),
        FieldValue::Usize(_) => arg
            .value_name("UINT")
            .value_parser(clap::value_parser!(usize)),
        FieldValue::F64(_) => arg
            .value_name("FLOAT")
            .allow_negative_numbers(true)
            .value_parser(clap::value_parser!(f64)),
        // Durations may carry a leading sign ("-2m30s").
        FieldValue::Duration(_) => arg
            .value_name("DURATION")
            .allow_hyphen_values(true)
            .value_parser(parse_duration_flag),
    }
}

fn parse_duration_flag(s: &str) -> Result<Duration, ParseDurationError> {
    s.parse()
}
