use std::{collections::VecDeque, fmt, iter::FusedIterator};

use crate::{
    codec::Codec,
    error::IndexError,
    keyspace::Keyspace,
    logging::{display_key, keyhold_log},
    query::{select_strategy, KeySource, Pull, Query, ScanSource},
    store::Transaction,
    storer::Storer,
};

/// Pull-based stream of `(record key, stored value)` pairs matching a query.
///
/// Iteration stops at exhaustion or at the first error. Errors are sticky:
/// once [`error`](Iter::error) returns `Some`, `next` keeps returning `None`.
/// [`close`](Iter::close) releases the store cursor early; dropping the
/// iterator releases it too.
pub struct Iter<'a, T, K>
where
    T: Transaction + 'a,
{
    txn: &'a T,
    iter: Option<T::Iter<'a>>,
    source: K,
    key_cache: VecDeque<Vec<u8>>,
    exhausted: bool,
    err: Option<IndexError>,
}

impl<'a, T, S, C> Iter<'a, T, ScanSource<'a, S, C>>
where
    T: Transaction + 'a,
    S: Storer,
    C: Codec,
{
    /// Select a strategy for `query` and position a producer for it.
    pub fn new(
        txn: &'a T,
        keyspace: &Keyspace,
        storer: &'a S,
        query: &'a Query<S::Criterion>,
        codec: &'a C,
    ) -> Result<Self, IndexError> {
        let mut iter = txn.iter();
        let strategy = select_strategy(keyspace, storer, &mut iter, query)?;
        let source = ScanSource::new(strategy, keyspace, storer, query, codec)?;
        Ok(Self::from_parts(txn, iter, source))
    }
}

impl<'a, T, K> Iter<'a, T, K>
where
    T: Transaction + 'a,
    K: KeySource,
{
    /// Drive iteration from a key producer over a fresh cursor.
    ///
    /// The producer positions the cursor itself; a [`ScanSource`] seeks to its
    /// prefix on the first pull.
    pub fn with_source(txn: &'a T, source: K) -> Self {
        Self::from_parts(txn, txn.iter(), source)
    }

    fn from_parts(txn: &'a T, iter: T::Iter<'a>, source: K) -> Self {
        Self {
            txn,
            iter: Some(iter),
            source,
            key_cache: VecDeque::new(),
            exhausted: false,
            err: None,
        }
    }

    pub fn source(&self) -> &K {
        &self.source
    }

    /// Last recorded error, if any.
    pub fn error(&self) -> Option<&IndexError> {
        self.err.as_ref()
    }

    /// Take the recorded error, leaving the iterator finished.
    pub fn into_error(self) -> Option<IndexError> {
        self.err
    }

    /// Release the store cursor. Safe to call more than once.
    pub fn close(&mut self) {
        self.iter = None;
        self.key_cache.clear();
        self.exhausted = true;
    }

    fn fail(&mut self, err: IndexError) -> Option<(Vec<u8>, Vec<u8>)> {
        keyhold_log!(log::Level::Debug, "iterator_error", "error={}", err);
        self.err = Some(err);
        None
    }
}

impl<'a, T, K> Iterator for Iter<'a, T, K>
where
    T: Transaction + 'a,
    K: KeySource,
{
    type Item = (Vec<u8>, Vec<u8>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.err.is_some() || self.exhausted {
            return None;
        }

        if self.key_cache.is_empty() {
            let iter = self.iter.as_mut()?;
            match self.source.pull(iter) {
                Ok(Pull::Batch(keys)) if !keys.is_empty() => self.key_cache.extend(keys),
                Ok(_) => {
                    self.exhausted = true;
                    return None;
                }
                Err(err) => return self.fail(err),
            }
        }

        let key = self.key_cache.pop_front()?;
        match self.txn.get(&key) {
            Ok(Some(value)) => Some((key, value)),
            Ok(None) => {
                keyhold_log!(
                    log::Level::Debug,
                    "dangling_candidate",
                    "key={}",
                    display_key(&key)
                );
                self.fail(IndexError::Inconsistent { key })
            }
            Err(err) => self.fail(IndexError::store(err)),
        }
    }
}

impl<'a, T, K> FusedIterator for Iter<'a, T, K>
where
    T: Transaction + 'a,
    K: KeySource,
{
}

impl<'a, T, K> fmt::Debug for Iter<'a, T, K>
where
    T: Transaction + 'a,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("open", &self.iter.is_some())
            .field("cached", &self.key_cache.len())
            .field("exhausted", &self.exhausted)
            .field("err", &self.err)
            .finish()
    }
}
