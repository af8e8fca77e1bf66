// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Many-to-many change notification: panes and the replay engine publish
//! snapshots, clients subscribe without ever blocking the publisher.

mod publisher;

pub use publisher::{Publisher, Subscription};
