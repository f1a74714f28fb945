use crate::{
    codec::Codec,
    error::IndexError,
    index::KeyList,
    keyspace::Keyspace,
    logging::{display_key, keyhold_log},
    store::Transaction,
    storer::{Index, Storer},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mutation {
    Add,
    Remove,
}

/// Add `key` to every index entry derived from `value`.
///
/// `key` is the full store key of the record, as built by
/// [`Keyspace::record_key`]. Queries resolve entry members with a point
/// lookup, so a bare primary key here surfaces later as
/// [`IndexError::Inconsistent`].
pub fn index_add<S, T, C>(
    keyspace: &Keyspace,
    codec: &C,
    storer: &S,
    txn: &mut T,
    key: &[u8],
    value: &S::Record,
) -> Result<(), IndexError>
where
    S: Storer,
    T: Transaction,
    C: Codec,
{
    for index in storer.indexes() {
        update_entry(
            keyspace,
            codec,
            storer.type_name(),
            index,
            txn,
            key,
            value,
            Mutation::Add,
        )?;
    }
    Ok(())
}

/// Remove `key` from every index entry derived from `original`.
///
/// `original` must be the value the record held when it was indexed; passing
/// the new value leaves `key` behind in the old field value's list.
pub fn index_delete<S, T, C>(
    keyspace: &Keyspace,
    codec: &C,
    storer: &S,
    txn: &mut T,
    key: &[u8],
    original: &S::Record,
) -> Result<(), IndexError>
where
    S: Storer,
    T: Transaction,
    C: Codec,
{
    for index in storer.indexes() {
        update_entry(
            keyspace,
            codec,
            storer.type_name(),
            index,
            txn,
            key,
            original,
            Mutation::Remove,
        )?;
    }
    Ok(())
}

/// Re-index a record whose value changed from `old` to `new`.
pub fn index_update<S, T, C>(
    keyspace: &Keyspace,
    codec: &C,
    storer: &S,
    txn: &mut T,
    key: &[u8],
    old: &S::Record,
    new: &S::Record,
) -> Result<(), IndexError>
where
    S: Storer,
    T: Transaction,
    C: Codec,
{
    index_delete(keyspace, codec, storer, txn, key, old)?;
    index_add(keyspace, codec, storer, txn, key, new)
}

#[allow(clippy::too_many_arguments)]
fn update_entry<R, T, C>(
    keyspace: &Keyspace,
    codec: &C,
    type_name: &str,
    index: &Index<R>,
    txn: &mut T,
    key: &[u8],
    value: &R,
    mutation: Mutation,
) -> Result<(), IndexError>
where
    T: Transaction,
    C: Codec,
{
    let Some(encoded) = index.encode(value)? else {
        return Ok(());
    };
    let index_key = keyspace.index_key(type_name, index.name(), &encoded)?;

    let mut list = match txn.get(&index_key).map_err(IndexError::store)? {
        Some(bytes) => codec.decode::<KeyList>(&bytes)?,
        None => KeyList::new(),
    };
    let changed = match mutation {
        Mutation::Add => list.add(key),
        Mutation::Remove => list.remove(key),
    };
    if !changed {
        return Ok(());
    }

    if list.is_empty() {
        keyhold_log!(
            log::Level::Trace,
            "index_entry_removed",
            "type={} index={} entry={}",
            type_name,
            index.name(),
            display_key(&index_key)
        );
        return txn.delete(&index_key).map_err(IndexError::store);
    }

    let bytes = codec.encode(&list)?;
    keyhold_log!(
        log::Level::Trace,
        "index_entry_written",
        "type={} index={} entry={} keys={}",
        type_name,
        index.name(),
        display_key(&index_key),
        list.len()
    );
    txn.set(index_key, bytes).map_err(IndexError::store)
}
