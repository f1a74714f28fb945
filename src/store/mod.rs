//! Contract the engine needs from the underlying ordered, transactional KV store.
//!
//! All engine work happens inside a caller-owned transaction passed by
//! reference. Missing keys are reported as `Ok(None)`, never as errors.

pub mod mem;

use std::error::Error;

/// Point reads, writes and prefix iteration inside one atomic transaction.
pub trait Transaction {
    type Error: Error + Send + Sync + 'static;

    type Iter<'txn>: StoreIter
    where
        Self: 'txn;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Self::Error>;

    fn set(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<(), Self::Error>;

    fn delete(&mut self, key: &[u8]) -> Result<(), Self::Error>;

    /// Open a fresh iteration handle over the transaction's view.
    ///
    /// Handles are independent; dropping one releases it.
    fn iter(&self) -> Self::Iter<'_>;
}

/// Ordered cursor over store keys.
pub trait StoreIter {
    /// Position on the first key greater than or equal to `key`.
    fn seek(&mut self, key: &[u8]);

    /// Whether the cursor sits on a key that starts with `prefix`.
    fn valid_for_prefix(&self, prefix: &[u8]) -> bool;

    /// Advance to the next key in byte order.
    fn next(&mut self);

    /// Current key and value, or `None` when exhausted.
    fn item(&self) -> Option<(&[u8], &[u8])>;
}
