//! The registry of top-level nodes and dotted-path resolution over it.
//!
//! The registry is an explicit context object: constructed once by whoever
//! drives startup configuration, handed to each adapter, and read-mostly
//! afterward. It has no internal locking; callers that share it across
//! threads must serialize access themselves. Nodes are never removed.

use std::ops::ControlFlow;

use crate::error::CoerceError;
use crate::node::{Node, Setting};
use crate::value::Value;
use crate::Priority;

/// The set of registered top-level nodes.
#[derive(Debug, Default)]
pub struct Registry {
    roots: Vec<Node>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a top-level node.
    ///
    /// Registration is append-only and performs no deduplication;
    /// registering the same logical tree twice leaves both instances in
    /// place.
    pub fn register(&mut self, node: impl Into<Node>) {
        self.roots.push(node.into());
    }

    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    /// Depth-first pre-order traversal over every registered node,
    /// including group containers.
    ///
    /// The visit function may return [`ControlFlow::Break`] to stop early;
    /// no further nodes are visited.
    pub fn visit<F>(&self, mut f: F) -> ControlFlow<()>
    where
        F: FnMut(&Node) -> ControlFlow<()>,
    {
        for node in &self.roots {
            visit_node(node, &mut f)?;
        }
        ControlFlow::Continue(())
    }

    /// Resolves a dotted path (`"server.bind"`) to a node.
    ///
    /// Segments are matched by exact string equality; an unmatched segment
    /// anywhere in the path yields `None` for the whole resolution.
    pub fn resolve(&self, path: &str) -> Option<&Node> {
        let segments: Vec<&str> = path.split('.').collect();
        let (first, rest) = segments.split_first()?;
        let root = self.roots.iter().find(|n| n.name() == *first)?;
        resolve_in(root, rest)
    }

    pub fn resolve_mut(&mut self, path: &str) -> Option<&mut Node> {
        let segments: Vec<&str> = path.split('.').collect();
        let (first, rest) = segments.split_first()?;
        let root = self.roots.iter_mut().find(|n| n.name() == *first)?;
        resolve_in_mut(root, rest)
    }

    /// The producer interface: submits a raw value for the setting at the
    /// dotted path, arbitrated at the given priority.
    ///
    /// A path that resolves to nothing, or to a group, is not applicable
    /// and returns `Ok(false)` without error; adapters commonly have
    /// nothing to say about most nodes. `Ok(true)` means the write was
    /// accepted and stored; an `Err` is a coercion failure that left the
    /// setting untouched.
    pub fn submit(
        &mut self,
        path: &str,
        raw: Value,
        priority: Priority,
    ) -> Result<bool, CoerceError> {
        let Some(setting) = self.resolve_mut(path).and_then(Node::as_setting_mut) else {
            return Ok(false);
        };
        setting.try_apply(raw, priority)
    }

    /// Calls `f` with the full path of every setting, in declaration order.
    ///
    /// Used by adapters that enumerate all leaves needing binding.
    pub fn for_each_setting<F>(&self, mut f: F)
    where
        F: FnMut(&[String], &Setting),
    {
        let mut path = Vec::new();
        for node in &self.roots {
            walk_settings(node, &mut path, &mut f);
        }
    }
}

fn visit_node<F>(node: &Node, f: &mut F) -> ControlFlow<()>
where
    F: FnMut(&Node) -> ControlFlow<()>,
{
    f(node)?;
    for child in node.children() {
        visit_node(child, f)?;
    }
    ControlFlow::Continue(())
}

fn resolve_in<'a>(node: &'a Node, segments: &[&str]) -> Option<&'a Node> {
    match segments.split_first() {
        None => Some(node),
        Some((first, rest)) => resolve_in(node.as_group()?.child(first)?, rest),
    }
}

fn resolve_in_mut<'a>(node: &'a mut Node, segments: &[&str]) -> Option<&'a mut Node> {
    match segments.split_first() {
        None => Some(node),
        Some((first, rest)) => resolve_in_mut(node.child_mut(first)?, rest),
    }
}

fn walk_settings<F>(node: &Node, path: &mut Vec<String>, f: &mut F)
where
    F: FnMut(&[String], &Setting),
{
    path.push(node.name().to_string());
    match node {
        Node::Setting(setting) => f(path, setting),
        Node::Group(group) => {
            for child in group.children() {
                walk_settings(child, path, f);
            }
        }
    }
    path.pop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Group;
    use crate::value::Kind;

    fn server_tree() -> Registry {
        let mut server = Group::new("server");
        server
            .push(Setting::new("bind", Kind::String).with_default(":80").unwrap())
            .unwrap();
        server
            .push(Setting::new("bar", Kind::Int).with_default("42").unwrap())
            .unwrap();

        let mut reg = Registry::new();
        reg.register(server);
        reg
    }

    #[test]
    fn test_resolve_leaf() {
        let reg = server_tree();
        let node = reg.resolve("server.bind").unwrap();
        assert_eq!(node.as_setting().unwrap().value().as_str(), Some(":80"));
    }

    #[test]
    fn test_resolve_missing_leaf() {
        let reg = server_tree();
        assert!(reg.resolve("server.missing").is_none());
    }

    #[test]
    fn test_resolve_missing_root() {
        let reg = server_tree();
        assert!(reg.resolve("missing.bind").is_none());
    }

    #[test]
    fn test_resolve_group_itself() {
        let reg = server_tree();
        assert!(reg.resolve("server").unwrap().as_group().is_some());
    }

    #[test]
    fn test_submit_to_unknown_path_is_not_applicable() {
        let mut reg = server_tree();
        assert!(!reg.submit("nope.nope", "x".into(), Priority::Flag).unwrap());
    }

    #[test]
    fn test_submit_to_group_is_not_applicable() {
        let mut reg = server_tree();
        assert!(!reg.submit("server", "x".into(), Priority::Flag).unwrap());
    }

    #[test]
    fn test_visit_stops_early() {
        let reg = server_tree();
        let mut seen = Vec::new();
        let flow = reg.visit(|node| {
            seen.push(node.name().to_string());
            if node.name() == "bind" {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(flow, ControlFlow::Break(()));
        assert_eq!(seen, ["server", "bind"]);
    }

    #[test]
    fn test_for_each_setting_yields_full_paths() {
        let reg = server_tree();
        let mut paths = Vec::new();
        reg.for_each_setting(|path, _| paths.push(path.join(".")));
        assert_eq!(paths, ["server.bind", "server.bar"]);
    }

    // The layering scenario: default, then config file, then flag, then a
    // late config file write that loses.
    #[test]
    fn test_sources_layer_by_priority() {
        let mut reg = server_tree();
        let bar = |reg: &Registry| {
            reg.resolve("server.bar")
                .and_then(Node::as_setting)
                .map(|s| (s.value().as_int().unwrap(), s.priority()))
                .unwrap()
        };

        assert_eq!(bar(&reg), (42, Priority::Default));

        assert!(reg.submit("server.bar", "7".into(), Priority::File).unwrap());
        assert_eq!(bar(&reg), (7, Priority::File));

        assert!(reg.submit("server.bar", "3".into(), Priority::Flag).unwrap());
        assert_eq!(bar(&reg), (3, Priority::Flag));

        assert!(!reg.submit("server.bar", "9".into(), Priority::File).unwrap());
        assert_eq!(bar(&reg), (3, Priority::Flag));
    }
}
