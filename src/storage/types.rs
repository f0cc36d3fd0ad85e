/// A single mutation applied to a [`KeyValueStore`](super::KeyValueStore)
///
/// Mutations are grouped into a slice and applied atomically, so a
/// conversation entry and the index that lists it never diverge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Insert or overwrite `key` with `value`
    Put {
        /// Entry key
        key: String,
        /// Serialized entry value
        value: String,
    },
    /// Remove `key`; removing an absent key is not an error
    Remove {
        /// Entry key
        key: String,
    },
}

impl WriteOp {
    /// Creates a put operation
    pub fn put(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates a remove operation
    pub fn remove(key: impl Into<String>) -> Self {
        Self::Remove { key: key.into() }
    }

    /// Key touched by this operation
    pub fn key(&self) -> &str {
        match self {
            Self::Put { key, .. } | Self::Remove { key } => key,
        }
    }
}
