// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Panes (one PTY plus one emulator) arranged in a tree of groups, with
//! key-binding scopes that stack from root to leaf.

mod bind_scope;
mod node_id;
mod pane;
mod tree;

pub use bind_scope::{lookup_stacked, Binding, BindScope};
pub use node_id::{NodeId, NodeIdAllocator};
pub use pane::{Pane, PaneUpdate};
pub use tree::{Group, Node, Tree};
