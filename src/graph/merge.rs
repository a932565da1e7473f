//! Merge rules for entities that share an identity.
//!
//! The newer descriptor (by file modification time) supplies the scalar fields.
//! Edge sets are always unioned, whichever side wins, so no declared dependency
//! is ever lost. On equal timestamps the existing entity is kept.

use crate::models::{Component, Parent};

pub fn merge_component(existing: Component, incoming: Component) -> Component {
    let (mut winner, loser) = if existing.last_modified < incoming.last_modified {
        (incoming, existing)
    } else {
        (existing, incoming)
    };
    winner.versions.extend(loser.versions);
    winner.dependencies.extend(loser.dependencies);
    winner
}

pub fn merge_parent(existing: Parent, incoming: Parent) -> Parent {
    if existing.last_modified < incoming.last_modified {
        incoming
    } else {
        existing
    }
}
