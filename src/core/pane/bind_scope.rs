// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! A prefix-trie mapping key sequences to script callbacks. Each tree node
//! carries one [`BindScope`]; a lookup for a given node walks from the root
//! down to that node, consulting each ancestor's scope in turn so a binding
//! made deeper in the tree shadows the same sequence bound higher up.

use std::collections::HashMap;

/// One registered key binding: the script callback to invoke and its
/// documentation string (surfaced by help/which-key style UIs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub doc: String,
    pub callback: String,
}

#[derive(Debug, Default, Clone)]
struct TrieNode {
    binding: Option<Binding>,
    children: HashMap<String, TrieNode>,
}

/// A prefix-trie of key sequences (e.g. `["Ctrl-b", "c"]`) to [`Binding`]s.
#[derive(Debug, Default, Clone)]
pub struct BindScope {
    root: TrieNode,
}

impl BindScope {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Registers `callback` under `sequence`, replacing whatever was bound to
    /// that exact sequence in this scope before.
    pub fn bind(&mut self, sequence: &[String], doc: impl Into<String>, callback: impl Into<String>) {
        let mut node = &mut self.root;
        for key in sequence {
            node = node.children.entry(key.clone()).or_default();
        }
        node.binding = Some(Binding { doc: doc.into(), callback: callback.into() });
    }

    /// Removes whatever is bound to `sequence` in this scope, if anything.
    pub fn unbind(&mut self, sequence: &[String]) {
        let mut node = &mut self.root;
        for key in sequence {
            match node.children.get_mut(key) {
                Some(next) => node = next,
                None => return,
            }
        }
        node.binding = None;
    }

    /// Looks up the exact `sequence` in this scope alone (no ancestor
    /// stacking — see [`lookup_stacked`] for that).
    #[must_use]
    pub fn lookup(&self, sequence: &[String]) -> Option<&Binding> {
        let mut node = &self.root;
        for key in sequence {
            node = node.children.get(key)?;
        }
        node.binding.as_ref()
    }
}

/// Resolves `sequence` across a chain of scopes ordered root-to-leaf: each
/// scope that binds `sequence` overrides the previous one, so the deepest
/// (last) match wins.
#[must_use]
pub fn lookup_stacked<'a>(scopes: impl IntoIterator<Item = &'a BindScope>, sequence: &[String]) -> Option<&'a Binding> {
    let mut result = None;
    for scope in scopes {
        if let Some(binding) = scope.lookup(sequence) {
            result = Some(binding);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn seq(keys: &[&str]) -> Vec<String> { keys.iter().map(|s| (*s).to_string()).collect() }

    #[test]
    fn binds_and_looks_up_a_sequence() {
        let mut scope = BindScope::new();
        scope.bind(&seq(&["Ctrl-b", "c"]), "new pane", "pane/new");
        let binding = scope.lookup(&seq(&["Ctrl-b", "c"])).unwrap();
        assert_eq!(binding.callback, "pane/new");
    }

    #[test]
    fn unrelated_sequence_is_not_found() {
        let mut scope = BindScope::new();
        scope.bind(&seq(&["Ctrl-b", "c"]), "new pane", "pane/new");
        assert!(scope.lookup(&seq(&["Ctrl-b", "x"])).is_none());
    }

    #[test]
    fn unbind_removes_only_that_sequence() {
        let mut scope = BindScope::new();
        scope.bind(&seq(&["a"]), "doc a", "cb_a");
        scope.bind(&seq(&["a", "b"]), "doc ab", "cb_ab");
        scope.unbind(&seq(&["a"]));
        assert!(scope.lookup(&seq(&["a"])).is_none());
        assert!(scope.lookup(&seq(&["a", "b"])).is_some());
    }

    #[test]
    fn deeper_scope_shadows_shallower_one() {
        let mut root_scope = BindScope::new();
        root_scope.bind(&seq(&["q"]), "root quit", "root/quit");
        let mut leaf_scope = BindScope::new();
        leaf_scope.bind(&seq(&["q"]), "leaf quit", "leaf/quit");

        let binding = lookup_stacked([&root_scope, &leaf_scope], &seq(&["q"])).unwrap();
        assert_eq!(binding.callback, "leaf/quit");
    }

    #[test]
    fn ancestor_binding_is_visible_when_leaf_does_not_shadow() {
        let mut root_scope = BindScope::new();
        root_scope.bind(&seq(&["q"]), "root quit", "root/quit");
        let leaf_scope = BindScope::new();

        let binding = lookup_stacked([&root_scope, &leaf_scope], &seq(&["q"])).unwrap();
        assert_eq!(binding.callback, "root/quit");
    }
}
