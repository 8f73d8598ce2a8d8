//! The resolution orchestrator: four ordered overwrite passes over one
//! settings structure.
//!
//! 1. Register flags (capturing the caller's pre-set values as defaults)
//! 2. Locate and apply the optional config file
//! 3. Decode environment variables
//! 4. Parse flags and apply explicitly-supplied values
//!
//! Precedence (flag > env > file > default) is enforced purely by this
//! order; no per-field source tag is stored. The first error, in phase
//! order, stops all later phases — a structure left partially mutated by
//! earlier phases is expected.

use std::collections::HashMap;

use crate::env;
use crate::error::LayerfigError;
use crate::file;
use crate::flags::{ConfigFlag, FlagSet};
use crate::schema::Section;

/// What to do when a resolution phase fails. Selected at construction and
/// applied uniformly to every phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Return the error to the caller.
    Report,
    /// Print the error to stdout and end the process with status 2.
    Exit,
    /// Panic carrying the error message.
    Panic,
}

/// Drives one resolution session over a settings structure.
///
/// A `Resolver` holds only session configuration; the settings structure is
/// owned by the caller and mutated in place. Not safe to share across
/// concurrent resolution calls without external synchronization, and
/// concurrent calls against the same structure are not supported.
pub struct Resolver {
    policy: ErrorPolicy,
    bin_name: String,
    env_prefix: String,
    config_files: Vec<String>,
    config_flag: Option<ConfigFlag>,
}

impl Resolver {
    pub fn new(policy: ErrorPolicy) -> Self {
        Resolver {
            policy,
            bin_name: std::env::args().next().unwrap_or_else(|| "app".into()),
            env_prefix: String::new(),
            config_files: Vec::new(),
            config_flag: None,
        }
    }

    /// Prefix for environment keys. With prefix `GF`, the field path
    /// `sub.str` reads from `GF_SUB_STR`. Default: no prefix.
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    /// Add a config-file candidate **without its extension**. Candidates
    /// are probed in the order added, each against `.json`, `.toml`,
    /// `.yaml`; the first existing file wins.
    pub fn config_file(mut self, base: impl Into<String>) -> Self {
        self.config_files.push(base.into());
        self
    }

    /// Designate a flag that carries an explicit config-file path,
    /// bypassing the candidate search.
    pub fn config_file_flag(mut self, name: &str, help: &str) -> Self {
        self.config_flag = Some(ConfigFlag {
            name: name.to_string(),
            help: help.to_string(),
        });
        self
    }

    /// Resolve using the real process arguments and environment.
    pub fn resolve(&self, settings: &mut dyn Section) -> Result<(), LayerfigError> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        self.resolve_from(settings, &args)
    }

    /// Resolve with an explicit token list (program name excluded); the
    /// environment is still read from the process.
    pub fn resolve_from(
        &self,
        settings: &mut dyn Section,
        args: &[String],
    ) -> Result<(), LayerfigError> {
        let env_vars: HashMap<String, String> = std::env::vars().collect();
        match self.run(settings, args, &env_vars) {
            Ok(()) => Ok(()),
            Err(err) => match self.policy {
                ErrorPolicy::Report => Err(err),
                ErrorPolicy::Exit => {
                    println!("{err}");
                    std::process::exit(2);
                }
                ErrorPolicy::Panic => panic!("{err}"),
            },
        }
    }

    fn run(
        &self,
        settings: &mut dyn Section,
        args: &[String],
        env_vars: &HashMap<String, String>,
    ) -> Result<(), LayerfigError> {
        // Register first: flag defaults capture the caller's pre-set values
        // before any source overwrites them.
        let flag_set = FlagSet::register(settings, &self.bin_name, self.config_flag.as_ref())?;

        let explicit = self
            .config_flag
            .as_ref()
            .and_then(|flag| file::scan_config_flag(args, &flag.name));
        file::apply_config_file(settings, explicit.as_deref(), &self.config_files)?;

        env::apply_env(settings, &self.env_prefix, env_vars)?;

        flag_set.parse_and_apply(settings, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::Duration;
    use crate::fixtures::test::{TestSettings, populated};
    use crate::schema::FieldNode;
    use std::fs;
    use tempfile::TempDir;

    const CONFIG_DOC: &str = r#"
str = "config-file"
boolean = true
int = -1
int64 = -1
uint = 1
uint64 = 1
float = 1.1
duration = "1s"

[sub]
str = "renamed-config-file"
"#;

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn write_config(dir: &TempDir) -> String {
        let base = dir.path().join("settings");
        fs::write(format!("{}.toml", base.display()), CONFIG_DOC).unwrap();
        base.display().to_string()
    }

    #[test]
    fn defaults_survive_when_no_source_sets_them() {
        let mut settings = populated();
        let resolver = Resolver::new(ErrorPolicy::Report).env_prefix("GF");
        resolver.run(&mut settings, &[], &env(&[])).unwrap();
        assert_eq!(settings, populated());
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let base = write_config(&dir);

        let mut settings = populated();
        let resolver = Resolver::new(ErrorPolicy::Report).config_file(base);
        resolver.run(&mut settings, &[], &env(&[])).unwrap();

        assert_eq!(settings.str, "config-file");
        assert!(settings.boolean);
        assert_eq!(settings.int, -1);
        assert_eq!(settings.duration, Duration::from_secs(1));
        assert_eq!(settings.sub.renamed_str, "renamed-config-file");
    }

    #[test]
    fn env_overrides_file() {
        let dir = TempDir::new().unwrap();
        let base = write_config(&dir);

        let mut settings = populated();
        let resolver = Resolver::new(ErrorPolicy::Report)
            .env_prefix("GF")
            .config_file(base);
        let vars = env(&[
            ("GF_STR", "env"),
            ("GF_DURATION", "2s"),
            ("GF_SUB_STR", "renamed-env"),
        ]);
        resolver.run(&mut settings, &[], &vars).unwrap();

        assert_eq!(settings.str, "env");
        assert_eq!(settings.duration, Duration::from_secs(2));
        assert_eq!(settings.sub.renamed_str, "renamed-env");
        // untouched by env, still from the file
        assert_eq!(settings.int, -1);
    }

    #[test]
    fn flag_overrides_env_and_file() {
        let dir = TempDir::new().unwrap();
        let base = write_config(&dir);

        let mut settings = populated();
        let resolver = Resolver::new(ErrorPolicy::Report)
            .env_prefix("GF")
            .config_file(base);
        let vars = env(&[
            ("GF_STR", "env"),
            ("GF_DURATION", "2s"),
            ("GF_SUB_STR", "env"),
        ]);
        let args = argv(&[
            "--str", "flag", "--duration", "3s", "--sub-str", "renamed-flag",
        ]);
        resolver.run(&mut settings, &args, &vars).unwrap();

        assert_eq!(settings.str, "flag");
        assert_eq!(settings.duration, Duration::from_secs(3));
        assert_eq!(settings.sub.renamed_str, "renamed-flag");
        // flag defaults must not re-apply over the env value
        assert!(settings.boolean);
        assert_eq!(settings.int, -1);
    }

    #[test]
    fn explicit_config_flag_selects_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chosen.toml");
        fs::write(&path, "str = \"config-file\"\n").unwrap();

        let mut settings = TestSettings::default();
        let resolver = Resolver::new(ErrorPolicy::Report)
            .config_file_flag("config", "path to the config file");
        let args = argv(&["--config", path.to_str().unwrap()]);
        resolver.run(&mut settings, &args, &env(&[])).unwrap();
        assert_eq!(settings.str, "config-file");
    }

    #[test]
    fn explicit_config_flag_bypasses_candidates() {
        let dir = TempDir::new().unwrap();
        let base = write_config(&dir);
        let chosen = dir.path().join("chosen.toml");
        fs::write(&chosen, "str = \"explicit\"\n").unwrap();

        let mut settings = TestSettings::default();
        let resolver = Resolver::new(ErrorPolicy::Report)
            .config_file(base)
            .config_file_flag("config", "path to the config file");
        let args = argv(&["--config", chosen.to_str().unwrap()]);
        resolver.run(&mut settings, &args, &env(&[])).unwrap();
        assert_eq!(settings.str, "explicit");
        assert_eq!(settings.int, 0); // candidate file never decoded
    }

    #[test]
    fn explicit_missing_file_is_a_file_open_error() {
        let mut settings = TestSettings::default();
        let resolver = Resolver::new(ErrorPolicy::Report)
            .config_file_flag("config", "path to the config file");
        let args = argv(&["--config", "/nonexistent/app.toml"]);
        let err = resolver.run(&mut settings, &args, &env(&[])).unwrap_err();
        assert!(matches!(err, LayerfigError::FileOpen { .. }));
    }

    #[test]
    fn explicit_unknown_extension_is_unsupported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.unsuppext");
        fs::write(&path, "whatever").unwrap();

        let mut settings = TestSettings::default();
        let resolver = Resolver::new(ErrorPolicy::Report)
            .config_file_flag("config", "path to the config file");
        let args = argv(&["--config", path.to_str().unwrap()]);
        let err = resolver.run(&mut settings, &args, &env(&[])).unwrap_err();
        assert_eq!(err.to_string(), "config file type not supported");
    }

    #[test]
    fn env_skipped_field_still_flaggable() {
        use crate::fixtures::test::OptionalSettings;

        let mut settings = OptionalSettings::default();
        let resolver = Resolver::new(ErrorPolicy::Report).env_prefix("GF");
        let vars = env(&[("GF_SECRET", "from-env")]);
        let args = argv(&["--secret", "from-flag"]);
        resolver.run(&mut settings, &args, &vars).unwrap();
        assert_eq!(settings.secret, "from-flag");
    }

    #[test]
    fn env_error_preempts_flag_error() {
        let mut settings = TestSettings::default();
        let resolver = Resolver::new(ErrorPolicy::Report).env_prefix("GF");
        let vars = env(&[("GF_INT", "bad")]);
        // the unknown flag would also fail, but the env phase runs first
        let err = resolver
            .run(&mut settings, &argv(&["--nope"]), &vars)
            .unwrap_err();
        assert!(matches!(err, LayerfigError::EnvParse { .. }));
    }

    #[test]
    fn panic_policy_panics_on_error() {
        let result = std::panic::catch_unwind(|| {
            let mut settings = TestSettings::default();
            let resolver = Resolver::new(ErrorPolicy::Panic)
                .config_file_flag("config", "path to the config file");
            let args = argv(&["--config", "/nonexistent/app.toml"]);
            let _ = resolver.resolve_from(&mut settings, &args);
        });
        assert!(result.is_err());
    }

    // --- spec'd end-to-end scenarios ---

    #[derive(Default)]
    struct Example {
        str: String,
        port: i64,
    }

    impl Section for Example {
        fn fields(&mut self) -> Vec<FieldNode<'_>> {
            vec![
                FieldNode::leaf("str", &mut self.str),
                FieldNode::leaf("port", &mut self.port),
            ]
        }
    }

    #[test]
    fn env_only_scenario() {
        let mut example = Example {
            str: String::new(),
            port: 5243,
        };
        let resolver = Resolver::new(ErrorPolicy::Report).env_prefix("GF");
        resolver
            .run(&mut example, &[], &env(&[("GF_STR", "env")]))
            .unwrap();
        assert_eq!(example.str, "env");
        assert_eq!(example.port, 5243);
    }

    #[test]
    fn file_plus_flag_scenario() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("default");
        fs::write(format!("{}.toml", base.display()), "str = \"config-file\"\n").unwrap();

        let mut example = Example::default();
        let resolver = Resolver::new(ErrorPolicy::Report)
            .env_prefix("GF")
            .config_file(base.display().to_string());
        resolver
            .run(&mut example, &argv(&["--str", "flag"]), &env(&[]))
            .unwrap();
        assert_eq!(example.str, "flag");
    }
}
