use std::error::Error;

/// Boxed source error carried across store and codec boundaries.
pub type BoxedError = Box<dyn Error + Send + Sync + 'static>;

/// Error returned by index maintenance, strategy selection and iteration.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Value or key list failed to serialize or deserialize.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    /// Store failure other than a missing key.
    #[error("store error: {0}")]
    Store(#[source] BoxedError),
    /// A candidate key produced by a scan or an index did not resolve to a record.
    #[error("index and record state diverged: key {key:?} has no record")]
    Inconsistent { key: Vec<u8> },
    /// The criteria evaluator could not decide a candidate.
    #[error("criteria evaluation failed: {0}")]
    Criteria(String),
    /// The query designates an index the storer never declared.
    #[error("type {type_name} declares no index named {index}")]
    UnknownIndex { type_name: String, index: String },
    /// A type or index name contains the key delimiter `:`.
    #[error("name {name:?} contains the key delimiter ':'")]
    InvalidName { name: String },
    /// Record and index namespaces overlap.
    #[error("record namespace {record:?} collides with index namespace {index:?}")]
    NamespaceCollision { record: String, index: String },
}

impl IndexError {
    pub(crate) fn store<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        IndexError::Store(Box::new(err))
    }
}

/// Serialization failure reported by a [`Codec`](crate::codec::Codec).
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("encode failed: {0}")]
    Encode(#[source] BoxedError),
    #[error("decode failed: {0}")]
    Decode(#[source] BoxedError),
}
