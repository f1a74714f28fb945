//! Secondary indexes and query iteration over an ordered, transactional KV store.
//!
//! Callers declare indexed fields through a [`Storer`]. Every record write is
//! paired with [`Indexer::index_add`] / [`Indexer::index_delete`] inside the
//! same transaction, which keeps one sorted [`KeyList`] of record keys per
//! distinct field value. Queries pick a [`ScanStrategy`] (primary key order,
//! an index, or a full scan of the type) and stream matching records in
//! batches through an [`Iter`].
//!
//! The store, the value codec and the criteria evaluator are supplied by the
//! embedder through the [`Transaction`], [`Codec`] and [`Storer`] traits.
//! [`MemStore`](store::mem::MemStore) is an in-memory store for tests and
//! embedding.

pub mod codec;
pub mod error;
pub mod index;
mod indexer;
pub mod keyspace;
mod logging;
pub mod option;
pub mod query;
pub mod store;
pub mod storer;

#[cfg(test)]
mod test_util;

pub use crate::{
    codec::{BincodeCodec, Codec},
    error::{CodecError, IndexError},
    index::KeyList,
    indexer::Indexer,
    keyspace::Keyspace,
    option::IndexOption,
    query::{IndexTarget, Iter, Query, ScanStrategy},
    store::{StoreIter, Transaction},
    storer::{Candidate, Index, Storer},
};
