/// Reserved token opening every index entry key.
pub const DEFAULT_INDEX_NAMESPACE: &str = "_khIndex";

/// Token opening every type partition prefix.
pub const DEFAULT_RECORD_NAMESPACE: &str = "kh_";

/// Candidate keys fetched per producer pull before the iterator asks for more.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Tunables for key layout and iteration.
#[derive(Debug, Clone)]
pub struct IndexOption {
    pub(crate) index_namespace: String,
    pub(crate) record_namespace: String,
    pub(crate) batch_size: usize,
}

impl Default for IndexOption {
    fn default() -> Self {
        IndexOption {
            index_namespace: DEFAULT_INDEX_NAMESPACE.to_string(),
            record_namespace: DEFAULT_RECORD_NAMESPACE.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl IndexOption {
    pub fn index_namespace(self, index_namespace: impl Into<String>) -> Self {
        IndexOption {
            index_namespace: index_namespace.into(),
            ..self
        }
    }

    pub fn record_namespace(self, record_namespace: impl Into<String>) -> Self {
        IndexOption {
            record_namespace: record_namespace.into(),
            ..self
        }
    }

    /// Zero is treated as one; a producer must always be able to make progress.
    pub fn batch_size(self, batch_size: usize) -> Self {
        IndexOption {
            batch_size: batch_size.max(1),
            ..self
        }
    }
}
