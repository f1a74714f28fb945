use serde::de::DeserializeOwned;

use crate::{
    codec::{BincodeCodec, Codec},
    error::IndexError,
    index,
    keyspace::Keyspace,
    option::IndexOption,
    query::{self, Iter, Query, ScanSource, ScanStrategy},
    store::Transaction,
    storer::Storer,
};

/// Entry point bundling the key layout and the value codec.
///
/// Holds no store handle: every call takes the caller's transaction, and the
/// indexer carries no state between calls, so one instance serves any number
/// of concurrent transactions.
#[derive(Debug, Clone)]
pub struct Indexer<C = BincodeCodec> {
    keyspace: Keyspace,
    codec: C,
}

impl Indexer<BincodeCodec> {
    pub fn new(option: &IndexOption) -> Result<Self, IndexError> {
        Self::with_codec(option, BincodeCodec)
    }
}

impl Default for Indexer<BincodeCodec> {
    fn default() -> Self {
        Self {
            keyspace: Keyspace::default(),
            codec: BincodeCodec,
        }
    }
}

impl<C> Indexer<C>
where
    C: Codec,
{
    pub fn with_codec(option: &IndexOption, codec: C) -> Result<Self, IndexError> {
        Ok(Self {
            keyspace: Keyspace::new(option)?,
            codec,
        })
    }

    pub fn keyspace(&self) -> &Keyspace {
        &self.keyspace
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Store key for a record of `storer`'s type. This is the key records are
    /// written under and the `key` the `index_*` operations expect.
    pub fn record_key<S: Storer>(&self, storer: &S, key: &[u8]) -> Result<Vec<u8>, IndexError> {
        self.keyspace.record_key(storer.type_name(), key)
    }

    /// Add `key`, a full store key from [`record_key`](Self::record_key), to
    /// the entries of every index declared by `storer`.
    pub fn index_add<S, T>(
        &self,
        storer: &S,
        txn: &mut T,
        key: &[u8],
        value: &S::Record,
    ) -> Result<(), IndexError>
    where
        S: Storer,
        T: Transaction,
    {
        index::index_add(&self.keyspace, &self.codec, storer, txn, key, value)
    }

    /// See [`index::index_delete`]: `original` must be the value as it was indexed.
    pub fn index_delete<S, T>(
        &self,
        storer: &S,
        txn: &mut T,
        key: &[u8],
        original: &S::Record,
    ) -> Result<(), IndexError>
    where
        S: Storer,
        T: Transaction,
    {
        index::index_delete(&self.keyspace, &self.codec, storer, txn, key, original)
    }

    pub fn index_update<S, T>(
        &self,
        storer: &S,
        txn: &mut T,
        key: &[u8],
        old: &S::Record,
        new: &S::Record,
    ) -> Result<(), IndexError>
    where
        S: Storer,
        T: Transaction,
    {
        index::index_update(&self.keyspace, &self.codec, storer, txn, key, old, new)
    }

    /// Whether `index_name` can answer queries on `storer`'s type; see
    /// [`index::index_exists`].
    pub fn index_exists<S, T>(
        &self,
        txn: &T,
        storer: &S,
        index_name: &str,
    ) -> Result<bool, IndexError>
    where
        S: Storer,
        T: Transaction,
    {
        index::index_exists(
            &mut txn.iter(),
            &self.keyspace,
            storer.type_name(),
            index_name,
        )
    }

    pub fn select_strategy<S, T>(
        &self,
        txn: &T,
        storer: &S,
        query: &Query<S::Criterion>,
    ) -> Result<ScanStrategy, IndexError>
    where
        S: Storer,
        T: Transaction,
    {
        query::select_strategy(&self.keyspace, storer, &mut txn.iter(), query)
    }

    /// Open a streaming iterator over the records matching `query`.
    pub fn query<'a, S, T>(
        &'a self,
        txn: &'a T,
        storer: &'a S,
        query: &'a Query<S::Criterion>,
    ) -> Result<Iter<'a, T, ScanSource<'a, S, C>>, IndexError>
    where
        S: Storer,
        T: Transaction + 'a,
    {
        Iter::new(txn, &self.keyspace, storer, query, &self.codec)
    }

    pub fn encode<V>(&self, value: &V) -> Result<Vec<u8>, IndexError>
    where
        V: serde::Serialize + ?Sized,
    {
        Ok(self.codec.encode(value)?)
    }

    pub fn decode<V>(&self, bytes: &[u8]) -> Result<V, IndexError>
    where
        V: DeserializeOwned,
    {
        Ok(self.codec.decode(bytes)?)
    }
}
