//! Configuration document adapter.
//!
//! Flattens a parsed TOML document into dotted entries and submits each at
//! [`Priority::File`]. Also handles finding and reading the file itself:
//! an explicit path, a `<path>.d/` drop-in directory of `*.conf`
//! fragments, or a conventional search path derived from the program name.

use std::path::{Path, PathBuf};

use crate::adapt::Outcome;
use crate::error::ConfigError;
use crate::registry::Registry;
use crate::value::Value;
use crate::Priority;

/// Applies every leaf of a parsed TOML table to the registry.
///
/// Keys with no matching setting are skipped; a value that fails coercion
/// is recorded and the remaining keys still apply.
pub fn apply_table(registry: &mut Registry, table: &toml::Table) -> Outcome {
    let mut entries = Vec::new();
    flatten(table, &mut Vec::new(), &mut entries);

    let mut outcome = Outcome::default();
    for (path, value) in entries {
        let result = registry.submit(&path, value, Priority::File);
        outcome.record(&path, result);
    }
    outcome
}

fn flatten(table: &toml::Table, prefix: &mut Vec<String>, entries: &mut Vec<(String, Value)>) {
    for (key, value) in table.iter() {
        prefix.push(key.clone());
        match value {
            toml::Value::Table(nested) => flatten(nested, prefix, entries),
            other => entries.push((prefix.join("."), convert(other))),
        }
        prefix.pop();
    }
}

fn convert(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(n) => Value::Int(*n),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Array(items) => Value::List(items.iter().map(convert).collect()),
        // Floats, datetimes and tables nested inside arrays have no native
        // kind; they are carried textually and surface as coercion errors
        // on any non-string setting.
        other => Value::String(other.to_string()),
    }
}

/// Loads a config file and applies it.
///
/// Reads `path` if it exists, then every `*.conf` file in `<path>.d/` in
/// sorted order. It is an error for neither to exist. Later fragments win
/// same-priority arbitration over earlier ones.
pub fn load(registry: &mut Registry, path: &Path) -> Result<Outcome, ConfigError> {
    let mut paths = Vec::new();
    if path.is_file() {
        paths.push(path.to_path_buf());
    }

    let drop_in = drop_in_dir(path);
    if drop_in.is_dir() {
        let mut fragments: Vec<PathBuf> = std::fs::read_dir(&drop_in)
            .map_err(|source| ConfigError::Read {
                path: drop_in.clone(),
                source,
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "conf"))
            .collect();
        fragments.sort();
        paths.extend(fragments);
    }

    if paths.is_empty() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let mut outcome = Outcome::default();
    for p in paths {
        tracing::debug!(path = %p.display(), "loading config file");
        let table = read_table(&p)?;
        outcome.merge(apply_table(registry, &table));
    }
    Ok(outcome)
}

/// Loads the first usable config file from a candidate list.
///
/// Every candidate is checked and the last one that exists (either the
/// file itself or its drop-in directory) wins. Returns the chosen path, or
/// `None` when no candidate exists; finding nothing is not an error.
pub fn load_search(
    registry: &mut Registry,
    candidates: &[PathBuf],
) -> Result<(Option<PathBuf>, Outcome), ConfigError> {
    let mut chosen = None;
    for candidate in candidates {
        if candidate.is_file() || drop_in_dir(candidate).is_dir() {
            chosen = Some(candidate.clone());
        }
    }

    match chosen {
        Some(path) => {
            let outcome = load(registry, &path)?;
            Ok((Some(path), outcome))
        }
        None => Ok((None, Outcome::default())),
    }
}

/// Conventional config file locations for a program name: under `/etc`,
/// relative to the working directory, and relative to the executable.
pub fn default_paths(program: &str) -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from(format!("/etc/{program}/{program}.conf")),
        PathBuf::from(format!("/etc/{program}.conf")),
        PathBuf::from(format!("etc/{program}.conf")),
    ];

    if let Some(bin_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        paths.push(bin_dir.join(format!("{program}.conf")));
        paths.push(bin_dir.join(format!("../etc/{program}/{program}.conf")));
        paths.push(bin_dir.join(format!("../etc/{program}.conf")));
    }

    paths
}

fn drop_in_dir(path: &Path) -> PathBuf {
    let mut dir = path.as_os_str().to_os_string();
    dir.push(".d");
    PathBuf::from(dir)
}

fn read_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::schema::{Field, Schema};
    use crate::value::Kind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn test_registry() -> Registry {
        let mut reg = Registry::new();
        Schema::group("server")
            .field(Field::new("bind", Kind::String).with_default(":80"))
            .field(Field::new("bar", Kind::Int).with_default("42"))
            .field(Field::new("hosts", Kind::List(Box::new(Kind::String))).with_usage("Hosts"))
            .register(&mut reg)
            .unwrap();
        reg
    }

    fn value_at(reg: &Registry, path: &str) -> Value {
        reg.resolve(path)
            .and_then(Node::as_setting)
            .unwrap()
            .value()
            .clone()
    }

    #[test]
    fn test_apply_table_nested_keys() {
        let mut reg = test_registry();
        let table: toml::Table = toml::from_str(
            r#"
            [server]
            bind = ":8080"
            bar = 7
            "#,
        )
        .unwrap();

        let outcome = apply_table(&mut reg, &table);
        assert_eq!(outcome.applied, 2);
        assert!(outcome.is_clean());
        assert_eq!(value_at(&reg, "server.bind").as_str(), Some(":8080"));
        assert_eq!(value_at(&reg, "server.bar").as_int(), Some(7));
    }

    #[test]
    fn test_apply_table_array_narrows_elements() {
        let mut reg = test_registry();
        let table: toml::Table = toml::from_str(r#"server = { hosts = ["a", "b"] }"#).unwrap();

        apply_table(&mut reg, &table);
        assert_eq!(
            value_at(&reg, "server.hosts"),
            Value::List(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_unknown_keys_are_skipped() {
        let mut reg = test_registry();
        let table: toml::Table =
            toml::from_str("[other]\nx = 1\n[server]\nbar = 7").unwrap();

        let outcome = apply_table(&mut reg, &table);
        assert_eq!(outcome.applied, 1);
        assert_eq!(outcome.skipped, 1);
    }

    #[test]
    fn test_coercion_error_does_not_stop_other_keys() {
        let mut reg = test_registry();
        let table: toml::Table = toml::from_str(
            r#"
            [server]
            bar = 4.2
            bind = ":90"
            "#,
        )
        .unwrap();

        let outcome = apply_table(&mut reg, &table);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].path, "server.bar");
        assert_eq!(value_at(&reg, "server.bar").as_int(), Some(42));
        assert_eq!(value_at(&reg, "server.bind").as_str(), Some(":90"));
    }

    #[test]
    fn test_load_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nbar = 9").unwrap();

        let mut reg = test_registry();
        let outcome = load(&mut reg, file.path()).unwrap();
        assert_eq!(outcome.applied, 1);
        assert_eq!(value_at(&reg, "server.bar").as_int(), Some(9));
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let mut reg = test_registry();
        let err = load(&mut reg, Path::new("/nonexistent/app.conf")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_drop_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("app.conf");
        std::fs::write(&base, "[server]\nbar = 1\n").unwrap();

        let drop_in = dir.path().join("app.conf.d");
        std::fs::create_dir(&drop_in).unwrap();
        std::fs::write(drop_in.join("10-first.conf"), "[server]\nbar = 2\n").unwrap();
        std::fs::write(drop_in.join("20-second.conf"), "[server]\nbar = 3\n").unwrap();
        std::fs::write(drop_in.join("ignored.txt"), "not toml").unwrap();

        let mut reg = test_registry();
        load(&mut reg, &base).unwrap();
        // Sorted fragment order; the last writer at File priority wins.
        assert_eq!(value_at(&reg, "server.bar").as_int(), Some(3));
    }

    #[test]
    fn test_load_search_prefers_last_existing_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.conf");
        let second = dir.path().join("b.conf");
        std::fs::write(&first, "[server]\nbar = 1\n").unwrap();
        std::fs::write(&second, "[server]\nbar = 2\n").unwrap();

        let mut reg = test_registry();
        let (chosen, _) = load_search(
            &mut reg,
            &[first, second.clone(), dir.path().join("missing.conf")],
        )
        .unwrap();
        assert_eq!(chosen, Some(second));
        assert_eq!(value_at(&reg, "server.bar").as_int(), Some(2));
    }

    #[test]
    fn test_load_search_with_no_candidates_is_quiet() {
        let mut reg = test_registry();
        let (chosen, outcome) =
            load_search(&mut reg, &[PathBuf::from("/nonexistent/app.conf")]).unwrap();
        assert!(chosen.is_none());
        assert_eq!(outcome.applied, 0);
    }
}
