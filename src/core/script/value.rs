// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::core::pane::NodeId;

/// The current client a script callback was invoked on behalf of. Opaque to
/// the interpreter — it exists only to be threaded back into callbacks like
/// `pane/current` that need to know "whose attachment is this."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub client_id: u64,
}

impl Context {
    #[must_use]
    pub fn new(client_id: u64) -> Self { Self { client_id } }
}

/// A typed argument or return value crossing the boundary between the script
/// interpreter and a registered Rust callback.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    List(Vec<String>),
    Int(i64),
    Bool(bool),
    Context(Context),
    NodeId(NodeId),
    /// No meaningful return value (e.g. `log(text)`).
    Unit,
}

impl Value {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(values) => Some(values.as_slice()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_context(&self) -> Option<Context> {
        match self {
            Value::Context(context) => Some(*context),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_node_id(&self) -> Option<NodeId> {
        match self {
            Value::NodeId(id) => Some(*id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn accessors_match_their_own_variant() {
        assert_eq!(Value::String("hi".to_string()).as_str(), Some("hi"));
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Int(7).as_int(), Some(7));
    }

    #[test]
    fn accessors_return_none_for_a_mismatched_variant() {
        assert_eq!(Value::Bool(true).as_str(), None);
        assert_eq!(Value::String("x".to_string()).as_int(), None);
    }
}
