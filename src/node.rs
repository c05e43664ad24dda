//! Setting and group nodes, and the priority rule that arbitrates writes.

use crate::coerce::coerce;
use crate::error::{CoerceError, ConfigError};
use crate::value::{Kind, Value};

/// How the value currently stored on a setting got there.
///
/// Ordered ascending by strength; an incoming write is accepted only when
/// its priority is at least the node's current one. This describes the
/// provenance of the stored value, not the intrinsic trust of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// The compiled-in default installed at construction.
    Default,
    /// A configuration document.
    File,
    /// A command-line flag or environment variable.
    Flag,
    /// A programmatic override.
    Explicit,
}

/// A leaf configuration entry: a named, typed value with a default and the
/// priority of whichever source last set it.
#[derive(Debug, Clone)]
pub struct Setting {
    name: String,
    kind: Kind,
    value: Value,
    default: Value,
    priority: Priority,
    usage: String,
    env_var: Option<String>,
}

impl Setting {
    /// Creates a setting holding the zero value of `kind` at
    /// [`Priority::Default`].
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        let default = kind.zero();
        Self {
            name: name.into(),
            value: default.clone(),
            default,
            kind,
            priority: Priority::Default,
            usage: String::new(),
            env_var: None,
        }
    }

    /// Installs a default value, coerced to the setting's kind.
    ///
    /// Failure here is fatal to construction: a setting cannot exist in a
    /// partially-typed state.
    pub fn with_default(mut self, raw: impl Into<Value>) -> Result<Self, CoerceError> {
        let coerced = coerce(raw.into(), &self.kind, None)?;
        self.default = coerced.clone();
        self.value = coerced;
        Ok(self)
    }

    /// Attaches a one-line usage summary.
    pub fn with_usage(mut self, text: impl Into<String>) -> Self {
        self.usage = text.into();
        self
    }

    /// Overrides the environment variable name the env adapter derives from
    /// the setting's path.
    pub fn with_env(mut self, var: impl Into<String>) -> Self {
        self.env_var = Some(var.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn default(&self) -> &Value {
        &self.default
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn env_var(&self) -> Option<&str> {
        self.env_var.as_deref()
    }

    /// Submits a write at the given priority.
    ///
    /// The write is accepted iff the setting's current priority is less
    /// than or equal to the incoming one; re-applying at the same level is
    /// allowed, so the last writer at a level wins. A rejected write is a
    /// normal, silent outcome (`Ok(false)`), not a failure, and leaves the
    /// setting untouched. A coercion failure also leaves value and priority
    /// unchanged.
    ///
    /// The current value is offered to the coercion engine, so a scalar
    /// written to a list setting appends one element per accepted write.
    pub fn try_apply(&mut self, raw: Value, priority: Priority) -> Result<bool, CoerceError> {
        if priority < self.priority {
            return Ok(false);
        }
        let coerced = coerce(raw, &self.kind, Some(&self.value))?;
        self.value = coerced;
        self.priority = priority;
        Ok(true)
    }
}

/// A named container of child nodes; the unit of namespacing.
///
/// A group has no value of its own. Children keep insertion order and have
/// unique names among siblings.
#[derive(Debug, Clone)]
pub struct Group {
    name: String,
    children: Vec<Node>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a child, rejecting a duplicate sibling name so that path
    /// resolution stays unambiguous.
    pub fn push(&mut self, node: impl Into<Node>) -> Result<(), ConfigError> {
        let node = node.into();
        if self.children.iter().any(|c| c.name() == node.name()) {
            return Err(ConfigError::DuplicateName {
                group: self.name.clone(),
                name: node.name().to_string(),
            });
        }
        self.children.push(node);
        Ok(())
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name() == name)
    }

    pub(crate) fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.children.iter_mut().find(|c| c.name() == name)
    }
}

/// Either a setting (leaf, holds a value) or a group (container).
#[derive(Debug, Clone)]
pub enum Node {
    Setting(Setting),
    Group(Group),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Setting(s) => s.name(),
            Node::Group(g) => g.name(),
        }
    }

    pub fn as_setting(&self) -> Option<&Setting> {
        match self {
            Node::Setting(s) => Some(s),
            Node::Group(_) => None,
        }
    }

    pub fn as_setting_mut(&mut self) -> Option<&mut Setting> {
        match self {
            Node::Setting(s) => Some(s),
            Node::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Node::Setting(_) => None,
            Node::Group(g) => Some(g),
        }
    }

    /// The node's children; empty for settings.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Setting(_) => &[],
            Node::Group(g) => g.children(),
        }
    }

    pub(crate) fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        match self {
            Node::Setting(_) => None,
            Node::Group(g) => g.child_mut(name),
        }
    }
}

impl From<Setting> for Node {
    fn from(setting: Setting) -> Self {
        Node::Setting(setting)
    }
}

impl From<Group> for Node {
    fn from(group: Group) -> Self {
        Node::Group(group)
    }
}
