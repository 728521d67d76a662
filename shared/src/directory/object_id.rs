use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::Role;

// shared by every session in the process so generated ids never repeat
static NEXT_OBJECT_NUMBER: AtomicU64 = AtomicU64::new(1);

/// Network-wide identifier of a replicated object
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Generate a fresh id: the role prefix followed by a process-wide counter
    pub fn generate(role: Role) -> Self {
        let number = NEXT_OBJECT_NUMBER.fetch_add(1, Ordering::Relaxed);
        Self(format!("{}{}", role.id_prefix(), number))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
