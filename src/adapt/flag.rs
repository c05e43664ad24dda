//! Command-line flag adapter, bridged to clap.
//!
//! Every setting becomes one long flag named by its dotted path. Flags are
//! declared without clap-side defaults; the engine already holds the
//! default, and a clap default would make every flag look "present" and
//! override lower-priority sources that should win.

use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::adapt::Outcome;
use crate::registry::Registry;
use crate::value::{Kind, Value};
use crate::Priority;

/// Gathered information about one bindable setting, enough to register it
/// with a flag parser.
#[derive(Debug, Clone)]
pub struct FlagInfo {
    /// Dotted path, used as the long flag name.
    pub name: String,
    pub usage: String,
    pub default_text: String,
    pub is_bool: bool,
}

/// Enumerates every setting in the registry as a flag binding.
pub fn bindings(registry: &Registry) -> Vec<FlagInfo> {
    let mut out = Vec::new();
    registry.for_each_setting(|path, setting| {
        out.push(FlagInfo {
            name: path.join("."),
            usage: setting.usage().to_string(),
            default_text: setting.default().to_string(),
            is_bool: matches!(setting.kind(), Kind::Bool),
        });
    });
    out
}

/// Adds one long flag per setting to a clap command.
///
/// Boolean settings accept a bare `--flag` (meaning true) or an attached
/// value (`--flag=no`); everything else takes exactly one value. Every
/// flag may repeat, which feeds the append rule on list settings and
/// last-writer-wins on scalars.
pub fn augment(mut command: Command, registry: &Registry) -> Command {
    for info in bindings(registry) {
        let mut arg = Arg::new(info.name.clone())
            .long(info.name.clone())
            .action(ArgAction::Append);
        if !info.usage.is_empty() {
            arg = arg.help(info.usage);
        }
        if !info.default_text.is_empty() {
            arg = arg.value_name(info.default_text);
        }
        if info.is_bool {
            arg = arg
                .num_args(0..=1)
                .default_missing_value("true")
                .require_equals(true);
        } else {
            arg = arg.num_args(1);
        }
        command = command.arg(arg);
    }
    command
}

/// Applies parsed matches, submitting each flag occurrence in command-line
/// order at [`Priority::Flag`].
pub fn apply_matches(registry: &mut Registry, matches: &ArgMatches) -> Outcome {
    let mut outcome = Outcome::default();
    let names: Vec<String> = bindings(registry).into_iter().map(|b| b.name).collect();
    for name in names {
        // Ignore ids the command was built without.
        let Ok(Some(values)) = matches.try_get_many::<String>(&name) else {
            continue;
        };
        for value in values {
            let result = registry.submit(&name, Value::String(value.clone()), Priority::Flag);
            outcome.record(&name, result);
        }
    }
    outcome
}

/// Submits a single textual flag value at [`Priority::Flag`], for callers
/// that bind to a different flag parser.
pub fn apply(
    registry: &mut Registry,
    name: &str,
    text: &str,
) -> Result<bool, crate::error::CoerceError> {
    registry.submit(name, Value::from(text), Priority::Flag)
}
