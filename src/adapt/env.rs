//! Environment variable adapter.
//!
//! Each setting maps to one variable: its explicit hint, or a name derived
//! from the prefix and the setting's path (`myapp` + `server.bind` ->
//! `MYAPP_SERVER_BIND`). Values apply at [`Priority::Flag`]; the loader
//! runs this adapter before flag parsing, so an actual flag wins the
//! same-level tie-break by writing last.

use std::collections::HashMap;

use crate::adapt::Outcome;
use crate::registry::Registry;
use crate::value::Value;
use crate::Priority;

/// Applies values from the process environment.
pub fn apply(registry: &mut Registry, prefix: &str) -> Outcome {
    let vars: HashMap<String, String> = std::env::vars().collect();
    apply_lookup(registry, prefix, &vars)
}

/// Like [`apply`], but reads from the supplied variable map.
pub fn apply_lookup(
    registry: &mut Registry,
    prefix: &str,
    vars: &HashMap<String, String>,
) -> Outcome {
    let mut wanted = Vec::new();
    registry.for_each_setting(|path, setting| {
        let var = match setting.env_var() {
            Some(hint) => hint.to_string(),
            None => var_name(prefix, path),
        };
        wanted.push((path.join("."), var));
    });

    let mut outcome = Outcome::default();
    for (path, var) in wanted {
        let Some(value) = vars.get(&var) else {
            continue;
        };
        tracing::debug!(path = %path, var = %var, "environment value found");
        let result = registry.submit(&path, Value::String(value.clone()), Priority::Flag);
        outcome.record(&path, result);
    }
    outcome
}

/// Derives the variable name for a setting path: prefix and segments
/// uppercased and joined with `_`, non-alphanumerics mapped to `_`.
fn var_name(prefix: &str, path: &[String]) -> String {
    let mut parts = Vec::with_capacity(path.len() + 1);
    if !prefix.is_empty() {
        parts.push(mangle(prefix));
    }
    parts.extend(path.iter().map(|seg| mangle(seg)));
    parts.join("_")
}

fn mangle(segment: &str) -> String {
    segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}
