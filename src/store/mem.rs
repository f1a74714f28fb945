//! In-memory MVCC store implementing [`Transaction`].
//!
//! Committed versions live in a skiplist keyed by `(key asc, timestamp desc)`.
//! A transaction reads the snapshot at its read timestamp, overlays its own
//! buffered writes, and publishes them atomically on commit. Write-write
//! conflicts against transactions committed after the read timestamp abort
//! the commit.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashSet},
    mem,
    ops::Bound,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crossbeam_skiplist::SkipMap;

use crate::{
    logging::{display_key, keyhold_log},
    store::{StoreIter, Transaction},
};

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub(crate) struct Timestamp(u64);

impl Timestamp {
    const MIN: Self = Self(0);
    const MAX: Self = Self(u64::MAX);

    fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp::MIN
    }
}

/// Versioned key ordered by key ascending, then newest version first.
#[derive(PartialEq, Eq, Debug, Clone)]
pub(crate) struct Timestamped<V> {
    value: V,
    ts: Timestamp,
}

impl<V> Timestamped<V> {
    fn new(value: V, ts: Timestamp) -> Self {
        Self { value, ts }
    }
}

impl<V: Ord> PartialOrd for Timestamped<V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<V: Ord> Ord for Timestamped<V> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .cmp(&other.value)
            .then_with(|| other.ts.cmp(&self.ts))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MemStoreError {
    #[error("transaction write conflict on {} key(s)", keys.len())]
    WriteConflict { keys: Vec<Vec<u8>> },
}

#[derive(Debug, Default)]
struct OracleState {
    now: Timestamp,
    in_read: BTreeMap<Timestamp, usize>,
    committed: BTreeMap<Timestamp, HashSet<Vec<u8>>>,
}

#[derive(Debug, Default)]
struct Oracle {
    state: Mutex<OracleState>,
}

impl Oracle {
    fn lock(&self) -> MutexGuard<'_, OracleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start_read(&self) -> Timestamp {
        let mut state = self.lock();
        let now = state.now;
        *state.in_read.entry(now).or_default() += 1;
        now
    }

    fn read_commit(&self, ts: Timestamp) {
        let mut state = self.lock();
        if let Some(count) = state.in_read.get_mut(&ts) {
            *count -= 1;
            if *count == 0 {
                state.in_read.remove(&ts);
            }
        }
    }
}

/// Ordered in-memory store with snapshot transactions.
#[derive(Debug, Default)]
pub struct MemStore {
    data: SkipMap<Timestamped<Vec<u8>>, Option<Vec<u8>>>,
    oracle: Oracle,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a transaction reading the latest committed state.
    pub fn transaction(&self) -> MemTransaction<'_> {
        MemTransaction {
            read_at: self.oracle.start_read(),
            local: BTreeMap::new(),
            store: self,
        }
    }

    fn get_committed(&self, key: &[u8], read_at: Timestamp) -> Option<Vec<u8>> {
        self.data
            .range(Timestamped::new(key.to_vec(), read_at)..)
            .next()
            .filter(|entry| entry.key().value == key)
            .and_then(|entry| entry.value().clone())
    }

    /// First live committed entry at or after `lower` visible at `read_at`.
    fn first_committed(
        &self,
        lower: Bound<&[u8]>,
        read_at: Timestamp,
    ) -> Option<(Vec<u8>, Vec<u8>)> {
        let lower = match lower {
            Bound::Included(key) => Bound::Included(Timestamped::new(key.to_vec(), Timestamp::MAX)),
            Bound::Excluded(key) => Bound::Excluded(Timestamped::new(key.to_vec(), Timestamp::MIN)),
            Bound::Unbounded => Bound::Unbounded,
        };
        let mut decided: Option<Vec<u8>> = None;
        for entry in self.data.range((lower, Bound::Unbounded)) {
            let versioned = entry.key();
            if versioned.ts > read_at || decided.as_ref() == Some(&versioned.value) {
                continue;
            }
            match entry.value() {
                Some(value) => return Some((versioned.value.clone(), value.clone())),
                // tombstone hides the older versions of this key
                None => decided = Some(versioned.value.clone()),
            }
        }
        None
    }
}

/// Snapshot transaction over a [`MemStore`].
///
/// Dropping without [`commit`](MemTransaction::commit) discards buffered writes.
#[derive(Debug)]
pub struct MemTransaction<'s> {
    read_at: Timestamp,
    local: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
    store: &'s MemStore,
}

impl<'s> MemTransaction<'s> {
    /// Publish buffered writes atomically.
    pub fn commit(mut self) -> Result<(), MemStoreError> {
        let local = mem::take(&mut self.local);
        if local.is_empty() {
            return Ok(());
        }
        let mut state = self.store.oracle.lock();
        let in_write: HashSet<Vec<u8>> = local.keys().cloned().collect();
        let conflicts: Vec<Vec<u8>> = state
            .committed
            .range((Bound::Excluded(self.read_at), Bound::Unbounded))
            .flat_map(|(_, keys)| keys.intersection(&in_write))
            .cloned()
            .collect();
        if !conflicts.is_empty() {
            return Err(MemStoreError::WriteConflict { keys: conflicts });
        }

        let write_at = state.now.next();
        for (key, value) in local {
            keyhold_log!(
                log::Level::Trace,
                "commit",
                "key={} ts={} tombstone={}",
                display_key(&key),
                write_at.0,
                value.is_none()
            );
            self.store.data.insert(Timestamped::new(key, write_at), value);
        }
        state.committed.insert(write_at, in_write);
        state.now = write_at;

        // write sets at or below the oldest open snapshot can no longer conflict
        let horizon = state
            .in_read
            .keys()
            .next()
            .copied()
            .unwrap_or(state.now);
        state.committed = state.committed.split_off(&horizon.next());
        Ok(())
    }

    fn seek_visible(&self, lower: Bound<&[u8]>) -> Option<(Vec<u8>, Vec<u8>)> {
        let mut lower: Bound<Vec<u8>> = match lower {
            Bound::Included(key) => Bound::Included(key.to_vec()),
            Bound::Excluded(key) => Bound::Excluded(key.to_vec()),
            Bound::Unbounded => Bound::Unbounded,
        };
        loop {
            let bound = as_slice_bound(&lower);
            let local = self
                .local
                .range::<[u8], _>((bound, Bound::Unbounded))
                .next();
            let shared = self.store.first_committed(bound, self.read_at);

            match (local, shared) {
                (None, None) => return None,
                (Some((key, value)), shared)
                    if shared
                        .as_ref()
                        .map_or(true, |(shared_key, _)| key <= shared_key) =>
                {
                    match value {
                        Some(value) => return Some((key.clone(), value.clone())),
                        None => lower = Bound::Excluded(key.clone()),
                    }
                }
                (_, shared) => return shared,
            }
        }
    }
}

fn as_slice_bound(bound: &Bound<Vec<u8>>) -> Bound<&[u8]> {
    match bound {
        Bound::Included(key) => Bound::Included(key.as_slice()),
        Bound::Excluded(key) => Bound::Excluded(key.as_slice()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

impl Drop for MemTransaction<'_> {
    fn drop(&mut self) {
        self.store.oracle.read_commit(self.read_at);
    }
}

impl<'s> Transaction for MemTransaction<'s> {
    type Error = MemStoreError;

    type Iter<'txn> = MemIter<'txn, 's>
    where
        Self: 'txn;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(match self.local.get(key) {
            Some(value) => value.clone(),
            None => self.store.get_committed(key, self.read_at),
        })
    }

    fn set(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<(), Self::Error> {
        self.local.insert(key, Some(value));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), Self::Error> {
        self.local.insert(key.to_vec(), None);
        Ok(())
    }

    fn iter(&self) -> Self::Iter<'_> {
        MemIter {
            txn: self,
            current: None,
        }
    }
}

/// Cursor over a [`MemTransaction`]'s view. Unpositioned until the first seek.
#[derive(Debug)]
pub struct MemIter<'txn, 's> {
    txn: &'txn MemTransaction<'s>,
    current: Option<(Vec<u8>, Vec<u8>)>,
}

impl StoreIter for MemIter<'_, '_> {
    fn seek(&mut self, key: &[u8]) {
        self.current = self.txn.seek_visible(Bound::Included(key));
    }

    fn valid_for_prefix(&self, prefix: &[u8]) -> bool {
        self.current
            .as_ref()
            .is_some_and(|(key, _)| key.starts_with(prefix))
    }

    fn next(&mut self) {
        if let Some((key, _)) = self.current.take() {
            self.current = self.txn.seek_visible(Bound::Excluded(&key));
        }
    }

    fn item(&self) -> Option<(&[u8], &[u8])> {
        self.current
            .as_ref()
            .map(|(key, value)| (key.as_slice(), value.as_slice()))
    }
}
