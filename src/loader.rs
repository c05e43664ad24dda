//! One-call startup configuration.
//!
//! The loader runs every adapter over a registry in one pass: it parses
//! the command line (including a built-in `--conf` flag), applies
//! environment variables, applies flags, then loads the configuration
//! file named by `--conf` or found on the search path. Precedence is
//! enforced by arbitration, not by the order the adapters run, so the
//! config file can safely load after the flags that outrank it.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::{Arg, Command};

use crate::adapt::{conf, env, flag, Outcome};
use crate::error::ConfigError;
use crate::registry::Registry;

const CONF_FLAG: &str = "conf";

/// Drives startup configuration for one program.
///
/// ## Example
///
/// ```no_run
/// use confstack::{Field, Kind, Loader, Registry, Schema};
///
/// let mut reg = Registry::new();
/// Schema::group("server")
///     .field(Field::new("bind", Kind::String)
///         .with_default(":80")
///         .with_usage("Address to bind server to (e.g. :80)"))
///     .register(&mut reg)?;
///
/// let mut loader = Loader::new("myapp");
/// loader.load(&mut reg)?;
/// # Ok::<(), confstack::ConfigError>(())
/// ```
#[derive(Debug)]
pub struct Loader {
    program_name: String,
    env_prefix: String,
    search_paths: Vec<PathBuf>,
    conf_path: Option<PathBuf>,
}

impl Loader {
    pub fn new(program_name: impl Into<String>) -> Self {
        let program_name = program_name.into();
        let env_prefix = program_name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        let search_paths = conf::default_paths(&program_name);
        Self {
            program_name,
            env_prefix,
            search_paths,
            conf_path: None,
        }
    }

    /// Replaces the derived environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Replaces the default config file search path.
    pub fn with_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.search_paths = paths;
        self
    }

    /// Runs all adapters against the process environment and
    /// `std::env::args_os()`.
    pub fn load(&mut self, registry: &mut Registry) -> Result<Outcome, ConfigError> {
        self.load_from(registry, std::env::args_os())
    }

    /// Runs all adapters with an explicit argument vector (the first
    /// element is the program name, as in `argv`).
    ///
    /// Returns the merged outcome; per-path coercion failures are inside
    /// it, while unparseable command lines and unreadable config files are
    /// hard errors. Note clap reports `--help` as an error here.
    pub fn load_from<I, T>(&mut self, registry: &mut Registry, args: I) -> Result<Outcome, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let command = flag::augment(
            Command::new(self.program_name.clone()).arg(
                Arg::new(CONF_FLAG)
                    .long(CONF_FLAG)
                    .num_args(1)
                    .help("Configuration file path"),
            ),
            registry,
        );
        let matches = command.try_get_matches_from(args)?;

        let mut outcome = env::apply(registry, &self.env_prefix);
        outcome.merge(flag::apply_matches(registry, &matches));

        if let Some(path) = matches.get_one::<String>(CONF_FLAG) {
            let path = PathBuf::from(path);
            outcome.merge(conf::load(registry, &path)?);
            self.conf_path = Some(path);
        } else {
            let (chosen, file_outcome) = conf::load_search(registry, &self.search_paths)?;
            outcome.merge(file_outcome);
            self.conf_path = chosen;
        }

        tracing::debug!(
            applied = outcome.applied,
            skipped = outcome.skipped,
            errors = outcome.errors.len(),
            "configuration loaded"
        );
        Ok(outcome)
    }

    /// The config file the last load actually used, if any.
    pub fn conf_path(&self) -> Option<&Path> {
        self.conf_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::schema::{Field, Schema};
    use crate::value::Kind;

    fn test_registry() -> Registry {
        let mut reg = Registry::new();
        Schema::group("server")
            .field(Field::new("bind", Kind::String).with_default(":80"))
            .field(Field::new("bar", Kind::Int).with_default("42"))
            .register(&mut reg)
            .unwrap();
        reg
    }

    fn bar(reg: &Registry) -> i64 {
        reg.resolve("server.bar")
            .and_then(Node::as_setting)
            .unwrap()
            .value()
            .as_int()
            .unwrap()
    }

    #[test]
    fn test_flags_override_conf_file() {
        let dir = tempfile::tempdir().unwrap();
        let conf = dir.path().join("app.conf");
        std::fs::write(&conf, "[server]\nbind = \":7070\"\nbar = 9\n").unwrap();

        let mut reg = test_registry();
        let mut loader = Loader::new("testapp").with_search_paths(Vec::new());
        let outcome = loader
            .load_from(
                &mut reg,
                [
                    "testapp",
                    "--conf",
                    conf.to_str().unwrap(),
                    "--server.bar",
                    "3",
                ],
            )
            .unwrap();

        assert!(outcome.is_clean());
        assert_eq!(loader.conf_path(), Some(conf.as_path()));
        // The file loaded after the flag was applied, but arbitration kept
        // the flag's value.
        assert_eq!(bar(&reg), 3);
        let bind = reg.resolve("server.bind").and_then(Node::as_setting).unwrap();
        assert_eq!(bind.value().as_str(), Some(":7070"));
    }

    #[test]
    fn test_search_path_used_when_no_conf_flag() {
        let dir = tempfile::tempdir().unwrap();
        let conf = dir.path().join("testapp.conf");
        std::fs::write(&conf, "[server]\nbar = 5\n").unwrap();

        let mut reg = test_registry();
        let mut loader = Loader::new("testapp").with_search_paths(vec![conf.clone()]);
        loader.load_from(&mut reg, ["testapp"]).unwrap();

        assert_eq!(loader.conf_path(), Some(conf.as_path()));
        assert_eq!(bar(&reg), 5);
    }

    #[test]
    fn test_defaults_survive_when_nothing_else_speaks() {
        let mut reg = test_registry();
        let mut loader = Loader::new("testapp").with_search_paths(Vec::new());
        let outcome = loader.load_from(&mut reg, ["testapp"]).unwrap();

        assert_eq!(outcome.applied, 0);
        assert!(loader.conf_path().is_none());
        assert_eq!(bar(&reg), 42);
    }

    #[test]
    fn test_env_applies_but_real_flag_wins() {
        std::env::set_var("TESTAPP_LOADER_SERVER_BIND", ":6060");
        std::env::set_var("TESTAPP_LOADER_SERVER_BAR", "8");

        let mut reg = test_registry();
        let mut loader = Loader::new("testapp")
            .with_env_prefix("TESTAPP_LOADER")
            .with_search_paths(Vec::new());
        loader
            .load_from(&mut reg, ["testapp", "--server.bar", "3"])
            .unwrap();

        let bind = reg.resolve("server.bind").and_then(Node::as_setting).unwrap();
        assert_eq!(bind.value().as_str(), Some(":6060"));
        // Flags apply after env at the same priority, so the flag wins.
        assert_eq!(bar(&reg), 3);

        std::env::remove_var("TESTAPP_LOADER_SERVER_BIND");
        std::env::remove_var("TESTAPP_LOADER_SERVER_BAR");
    }

    #[test]
    fn test_bad_flag_syntax_is_an_error() {
        let mut reg = test_registry();
        let mut loader = Loader::new("testapp").with_search_paths(Vec::new());
        let err = loader
            .load_from(&mut reg, ["testapp", "--no.such.flag", "1"])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Flag(_)));
    }
}
