//! Opaque record identifiers
//!
//! Ids are short random tokens behind a type prefix (`npc_1a2b3c4d`). They are
//! generated once, when a record is created, and are the join key between a
//! collection and its entries.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

use crate::constants::id_prefix::TOKEN_LEN;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// New id of the form `{prefix}_{8 hex chars}`
    pub fn generate(prefix: &str) -> Self {
        let token = Uuid::new_v4().simple().to_string();
        Self(format!("{prefix}_{}", &token[..TOKEN_LEN]))
    }

    /// Campaign ids are full hyphenated UUIDs
    pub fn campaign() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('_'))
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for EntryId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A record that carries its own identifier
pub trait Identified {
    /// Prefix for generated ids (empty for campaigns)
    const PREFIX: &'static str;

    fn id(&self) -> &EntryId;
    fn set_id(&mut self, id: EntryId);

    fn fresh_id() -> EntryId {
        if Self::PREFIX.is_empty() {
            EntryId::campaign()
        } else {
            EntryId::generate(Self::PREFIX)
        }
    }
}

/// Hands out ids for the lifetime of a session.
/// Ids removed during the session are retired and never handed out again.
#[derive(Debug, Default)]
pub struct IdAllocator {
    retired: HashSet<EntryId>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh id for `T` that is neither in use nor retired
    pub fn allocate<T: Identified>(&self, in_use: impl Fn(&EntryId) -> bool) -> EntryId {
        loop {
            let id = T::fresh_id();
            if !in_use(&id) && !self.is_retired(id.as_str()) {
                return id;
            }
        }
    }

    pub fn retire(&mut self, id: EntryId) {
        self.retired.insert(id);
    }

    pub fn is_retired(&self, id: &str) -> bool {
        self.retired.contains(id)
    }
}
