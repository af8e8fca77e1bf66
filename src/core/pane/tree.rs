// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The pane tree: groups nest groups and panes in an arena keyed by
//! [`NodeId`], avoiding the cyclic `Rc<RefCell<..>>` ownership a pointer-based
//! tree would need. Topology (parent/children) is mutated through `&mut
//! Tree`; a node's display name lives behind its own lock so a rename never
//! blocks a concurrent topology read — callers that want both guarantees wrap
//! the whole `Tree` in one `RwLock` and only take a write lock for the
//! structural operations.

use std::{collections::HashMap, sync::Mutex};

use crate::core::{error::{Result, VtmuxError},
                   pty::{PtyCommandBuilder, PtyConfig}};

use super::{bind_scope::{lookup_stacked, BindScope, Binding},
            node_id::{NodeId, NodeIdAllocator},
            pane::Pane};

/// A handle to a node that contains other nodes rather than a PTY. Returned
/// by [`Tree::root`] and [`Tree::new_group`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group(NodeId);

impl Group {
    #[must_use]
    pub fn id(self) -> NodeId { self.0 }
}

/// One arena entry's topology and metadata. Panes themselves are stored
/// separately (see [`Tree::pane`]) since a `Node` needs to be cheap to walk
/// while holding the tree's topology lock, and a live `Pane` is not.
#[derive(Debug)]
pub struct Node {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    name: Mutex<String>,
    bind_scope: BindScope,
    is_pane: bool,
}

impl Node {
    fn new(id: NodeId, parent: Option<NodeId>, name: &str, is_pane: bool) -> Self {
        Self { id, parent, children: Vec::new(), name: Mutex::new(sanitize_name(name)), bind_scope: BindScope::new(), is_pane }
    }

    #[must_use]
    pub fn name(&self) -> String { self.name.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone() }

    #[must_use]
    pub fn is_pane(&self) -> bool { self.is_pane }
}

/// Keeps identifiers readable across a socket or a status line: trims
/// whitespace, maps anything outside `[A-Za-z0-9_-]` to `-`, and falls back
/// to a generated placeholder if that leaves nothing.
fn sanitize_name(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '-' })
        .collect();
    if cleaned.is_empty() { "node".to_string() } else { cleaned }
}

/// The pane/group arena. One `Tree` per server process; the root group always
/// exists and can never be removed or moved.
pub struct Tree {
    allocator: NodeIdAllocator,
    nodes: HashMap<NodeId, Node>,
    panes: HashMap<NodeId, Pane>,
    root: NodeId,
    scrollback_capacity: usize,
}

impl Tree {
    #[must_use]
    pub fn new(scrollback_capacity: usize) -> Self {
        let allocator = NodeIdAllocator::new();
        let root_id = allocator.allocate();
        let mut nodes = HashMap::new();
        nodes.insert(root_id, Node::new(root_id, None, "root", false));
        Self { allocator, nodes, panes: HashMap::new(), root: root_id, scrollback_capacity }
    }

    #[must_use]
    pub fn root(&self) -> Group { Group(self.root) }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> { self.nodes.get(&id) }

    #[must_use]
    pub fn pane(&self, id: NodeId) -> Option<&Pane> { self.panes.get(&id) }

    fn require_group(&self, id: NodeId) -> Result<()> {
        match self.nodes.get(&id) {
            Some(node) if !node.is_pane => Ok(()),
            Some(_) => Err(VtmuxError::Invalid(format!("node {id} is a pane, not a group"))),
            None => Err(VtmuxError::NotFound(format!("node {id}"))),
        }
    }

    /// Creates a new empty group under `parent`.
    ///
    /// # Errors
    /// [`VtmuxError::NotFound`] if `parent` does not exist, [`VtmuxError::Invalid`] if
    /// `parent` is a pane.
    pub fn new_group(&mut self, parent: Group) -> Result<Group> {
        self.require_group(parent.id())?;
        let id = self.allocator.allocate();
        self.nodes.insert(id, Node::new(id, Some(parent.id()), &id.to_string(), false));
        self.nodes.get_mut(&parent.id()).expect("just checked").children.push(id);
        Ok(Group(id))
    }

    /// Spawns a new pane under `parent`, bound to its own PTY and emulator.
    ///
    /// # Errors
    /// [`VtmuxError::NotFound`]/[`VtmuxError::Invalid`] as in [`Tree::new_group`], or
    /// whatever [`Pane::spawn`] returns if the PTY fails to start.
    pub fn new_pane(&mut self, parent: Group, command: PtyCommandBuilder, config: PtyConfig) -> Result<NodeId> {
        self.require_group(parent.id())?;
        let id = self.allocator.allocate();
        let pane = Pane::spawn(id, command, config, self.scrollback_capacity)?;
        self.nodes.insert(id, Node::new(id, Some(parent.id()), &id.to_string(), true));
        self.panes.insert(id, pane);
        self.nodes.get_mut(&parent.id()).expect("just checked").children.push(id);
        Ok(id)
    }

    /// Renames `id`. Only takes the node's own name lock, not the tree's
    /// topology — safe to call from a reader holding a shared lock on the
    /// surrounding `Tree`.
    ///
    /// # Errors
    /// [`VtmuxError::NotFound`] if `id` does not exist.
    pub fn rename(&self, id: NodeId, raw: &str) -> Result<()> {
        let node = self.nodes.get(&id).ok_or_else(|| VtmuxError::NotFound(format!("node {id}")))?;
        *node.name.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = sanitize_name(raw);
        Ok(())
    }

    /// Registers a key binding scoped to `id`; lookups from any descendant of
    /// `id` will see it unless shadowed by a binding closer to the leaf (see
    /// [`Tree::lookup_binding`]).
    ///
    /// # Errors
    /// [`VtmuxError::NotFound`] if `id` does not exist.
    pub fn bind(&mut self, id: NodeId, sequence: &[String], doc: impl Into<String>, callback: impl Into<String>) -> Result<()> {
        let node = self.nodes.get_mut(&id).ok_or_else(|| VtmuxError::NotFound(format!("node {id}")))?;
        node.bind_scope.bind(sequence, doc, callback);
        Ok(())
    }

    /// Resolves `sequence` against the scopes from the root down to `id`,
    /// with a binding on a deeper scope shadowing the same sequence bound
    /// higher up.
    #[must_use]
    pub fn lookup_binding(&self, id: NodeId, sequence: &[String]) -> Option<&Binding> {
        let chain = self.ancestor_chain(id);
        let scopes = chain.iter().filter_map(|id| self.nodes.get(id)).map(|node| &node.bind_scope);
        lookup_stacked(scopes, sequence)
    }

    /// Every node from the root to `id`, root first.
    fn ancestor_chain(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            chain.push(node_id);
            current = self.nodes.get(&node_id).and_then(|node| node.parent);
        }
        chain.reverse();
        chain
    }

    fn is_ancestor_of(&self, candidate: NodeId, id: NodeId) -> bool { self.ancestor_chain(id).contains(&candidate) }

    /// Removes `id` and, recursively, every descendant. Dropping each
    /// [`Pane`] tears down its PTY.
    ///
    /// # Errors
    /// [`VtmuxError::NotFound`] if `id` does not exist, [`VtmuxError::Invalid`] if `id`
    /// is the root.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(VtmuxError::Invalid("cannot remove the root group".to_string()));
        }
        let node = self.nodes.get(&id).ok_or_else(|| VtmuxError::NotFound(format!("node {id}")))?;
        let children = node.children.clone();
        let parent = node.parent;
        for child in children {
            self.remove(child)?;
        }
        if let Some(parent) = parent {
            if let Some(parent_node) = self.nodes.get_mut(&parent) {
                parent_node.children.retain(|child| *child != id);
            }
        }
        self.nodes.remove(&id);
        self.panes.remove(&id);
        Ok(())
    }

    /// Moves `id` to become a child of `new_parent` at `position`, clamped to
    /// the new parent's current child count.
    ///
    /// # Errors
    /// [`VtmuxError::Invalid`] if `id` is the root, `id == new_parent`, or `new_parent`
    /// is `id` or one of its own descendants (which would create a cycle); otherwise as
    /// in [`Tree::new_group`].
    pub fn move_node(&mut self, id: NodeId, new_parent: Group, position: usize) -> Result<()> {
        if id == self.root {
            return Err(VtmuxError::Invalid("cannot move the root group".to_string()));
        }
        if id == new_parent.id() || self.is_ancestor_of(id, new_parent.id()) {
            return Err(VtmuxError::Invalid("move would create a cycle".to_string()));
        }
        self.require_group(new_parent.id())?;
        let old_parent = self.nodes.get(&id).ok_or_else(|| VtmuxError::NotFound(format!("node {id}")))?.parent;

        if let Some(old_parent) = old_parent {
            if let Some(node) = self.nodes.get_mut(&old_parent) {
                node.children.retain(|child| *child != id);
            }
        }
        let new_parent_node = self.nodes.get_mut(&new_parent.id()).expect("checked by require_group");
        let insert_at = position.min(new_parent_node.children.len());
        new_parent_node.children.insert(insert_at, id);
        self.nodes.get_mut(&id).expect("checked above").parent = Some(new_parent.id());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use portable_pty::PtySize;

    use super::*;
    use crate::core::pty::PtyConfigOption;

    fn seq(keys: &[&str]) -> Vec<String> { keys.iter().map(|s| (*s).to_string()).collect() }

    #[test]
    fn root_group_exists_and_cannot_be_removed() {
        let mut tree = Tree::new(100);
        let root = tree.root();
        assert!(tree.remove(root.id()).is_err());
    }

    #[test]
    fn new_group_attaches_under_parent() {
        let mut tree = Tree::new(100);
        let root = tree.root();
        let child = tree.new_group(root).unwrap();
        assert_eq!(tree.node(root.id()).unwrap().children, vec![child.id()]);
        assert_eq!(tree.node(child.id()).unwrap().parent, Some(root.id()));
    }

    #[test]
    fn rename_sanitizes_disallowed_characters() {
        let mut tree = Tree::new(100);
        let root = tree.root();
        let child = tree.new_group(root).unwrap();
        tree.rename(child.id(), "my pane/1").unwrap();
        assert_eq!(tree.node(child.id()).unwrap().name(), "my-pane-1");
    }

    #[test]
    fn rename_of_blank_input_falls_back_to_placeholder() {
        let mut tree = Tree::new(100);
        let root = tree.root();
        let child = tree.new_group(root).unwrap();
        tree.rename(child.id(), "   ").unwrap();
        assert_eq!(tree.node(child.id()).unwrap().name(), "node");
    }

    #[test]
    fn remove_drops_entire_subtree() {
        let mut tree = Tree::new(100);
        let root = tree.root();
        let group = tree.new_group(root).unwrap();
        let grandchild = tree.new_group(group).unwrap();
        tree.remove(group.id()).unwrap();
        assert!(tree.node(group.id()).is_none());
        assert!(tree.node(grandchild.id()).is_none());
        assert!(tree.node(root.id()).unwrap().children.is_empty());
    }

    #[test]
    fn move_node_changes_parent_and_position() {
        let mut tree = Tree::new(100);
        let root = tree.root();
        let group_a = tree.new_group(root).unwrap();
        let group_b = tree.new_group(root).unwrap();
        let moved = tree.new_group(group_a).unwrap();

        tree.move_node(moved.id(), group_b, 0).unwrap();

        assert!(tree.node(group_a.id()).unwrap().children.is_empty());
        assert_eq!(tree.node(group_b.id()).unwrap().children, vec![moved.id()]);
        assert_eq!(tree.node(moved.id()).unwrap().parent, Some(group_b.id()));
    }

    #[test]
    fn move_node_into_own_descendant_is_rejected() {
        let mut tree = Tree::new(100);
        let root = tree.root();
        let parent = tree.new_group(root).unwrap();
        let child = tree.new_group(parent).unwrap();
        let err = tree.move_node(parent.id(), child, 0).unwrap_err();
        assert!(matches!(err, VtmuxError::Invalid(_)));
    }

    #[test]
    fn bindings_stack_from_root_with_leaf_shadowing() {
        let mut tree = Tree::new(100);
        let root = tree.root();
        let leaf = tree.new_group(root).unwrap();
        tree.bind(root.id(), &seq(&["q"]), "root quit", "root/quit").unwrap();
        tree.bind(leaf.id(), &seq(&["q"]), "leaf quit", "leaf/quit").unwrap();

        let binding = tree.lookup_binding(leaf.id(), &seq(&["q"])).unwrap();
        assert_eq!(binding.callback, "leaf/quit");
    }

    #[test]
    fn bindings_fall_through_to_ancestor_when_leaf_has_none() {
        let mut tree = Tree::new(100);
        let root = tree.root();
        let leaf = tree.new_group(root).unwrap();
        tree.bind(root.id(), &seq(&["q"]), "root quit", "root/quit").unwrap();

        let binding = tree.lookup_binding(leaf.id(), &seq(&["q"])).unwrap();
        assert_eq!(binding.callback, "root/quit");
    }

    #[tokio::test]
    async fn new_pane_spawns_a_live_pane_under_its_parent() {
        let mut tree = Tree::new(100);
        let root = tree.root();
        let config: PtyConfig = PtyConfigOption::Size(PtySize { rows: 5, cols: 20, pixel_width: 0, pixel_height: 0 }).into();
        let pane_id = tree.new_pane(root, PtyCommandBuilder::new("cat"), config).unwrap();

        assert!(tree.node(pane_id).unwrap().is_pane());
        assert!(tree.pane(pane_id).is_some());
        assert_eq!(tree.node(root.id()).unwrap().children, vec![pane_id]);
    }

    #[tokio::test]
    async fn new_group_under_a_pane_is_rejected() {
        let mut tree = Tree::new(100);
        let root = tree.root();
        let config: PtyConfig = PtyConfigOption::Size(PtySize { rows: 5, cols: 20, pixel_width: 0, pixel_height: 0 }).into();
        let pane_id = tree.new_pane(root, PtyCommandBuilder::new("cat"), config).unwrap();
        let pane_as_group = Group(pane_id);
        assert!(matches!(tree.new_group(pane_as_group).unwrap_err(), VtmuxError::Invalid(_)));
    }
}
