use std::collections::VecDeque;

use crate::{
    codec::Codec,
    error::IndexError,
    index::KeyList,
    keyspace::Keyspace,
    query::{Query, ScanStrategy},
    store::StoreIter,
    storer::{Candidate, Storer},
};

/// Outcome of one pull from a [`KeySource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pull {
    /// Candidate record keys, never more than the source's batch size.
    Batch(Vec<Vec<u8>>),
    /// The scanned prefix is exhausted.
    End,
}

/// Lazy producer of candidate record keys.
pub trait KeySource {
    fn pull<I>(&mut self, iter: &mut I) -> Result<Pull, IndexError>
    where
        I: StoreIter;
}

/// Key producer for one [`ScanStrategy`].
///
/// Seeks the cursor it is handed to its prefix on the first pull; every later
/// pull continues from where the previous one stopped, so one source must
/// always be driven with the same cursor.
pub struct ScanSource<'a, S, C>
where
    S: Storer,
{
    strategy: ScanStrategy,
    prefix: Vec<u8>,
    positioned: bool,
    batch_size: usize,
    storer: &'a S,
    query: &'a Query<S::Criterion>,
    codec: &'a C,
    // keys of an index entry that did not fit in the previous batch
    pending: VecDeque<Vec<u8>>,
}

impl<'a, S, C> ScanSource<'a, S, C>
where
    S: Storer,
    C: Codec,
{
    pub fn new(
        strategy: ScanStrategy,
        keyspace: &Keyspace,
        storer: &'a S,
        query: &'a Query<S::Criterion>,
        codec: &'a C,
    ) -> Result<Self, IndexError> {
        let type_name = storer.type_name();
        let prefix = match &strategy {
            ScanStrategy::PrimaryKeyScan | ScanStrategy::FullScan => {
                keyspace.type_prefix(type_name)?
            }
            ScanStrategy::IndexedLookup { index } => {
                keyspace.index_key_prefix(type_name, index)?
            }
        };
        Ok(Self {
            strategy,
            prefix,
            positioned: false,
            batch_size: keyspace.batch_size(),
            storer,
            query,
            codec,
            pending: VecDeque::new(),
        })
    }

    pub fn strategy(&self) -> &ScanStrategy {
        &self.strategy
    }

    fn record_matches(&self, key: &[u8], value: &[u8]) -> Result<bool, IndexError> {
        if !self.query.has_criteria() {
            return Ok(true);
        }
        let record: S::Record = self.codec.decode(value)?;
        let stripped = &key[self.prefix.len()..];
        let type_name = self.storer.type_name();

        let key_candidate = Candidate {
            field: "",
            value: stripped,
            is_key: true,
            type_name,
            record: Some(&record),
        };
        if !self
            .storer
            .matches_all(self.query.key_criteria(), key_candidate)?
        {
            return Ok(false);
        }
        for (field, criteria) in self.query.field_criteria() {
            let candidate = Candidate {
                field,
                value: stripped,
                is_key: false,
                type_name,
                record: Some(&record),
            };
            if !self.storer.matches_all(criteria, candidate)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn entry_matches(&self, index: &str, encoded: &[u8]) -> Result<bool, IndexError> {
        let candidate = Candidate {
            field: index,
            value: encoded,
            is_key: false,
            type_name: self.storer.type_name(),
            record: None,
        };
        self.storer
            .matches_all(self.query.target_criteria(), candidate)
    }
}

impl<S, C> KeySource for ScanSource<'_, S, C>
where
    S: Storer,
    C: Codec,
{
    fn pull<I>(&mut self, iter: &mut I) -> Result<Pull, IndexError>
    where
        I: StoreIter,
    {
        if !self.positioned {
            iter.seek(&self.prefix);
            self.positioned = true;
        }

        let take = self.pending.len().min(self.batch_size);
        let mut keys: Vec<Vec<u8>> = self.pending.drain(..take).collect();

        while keys.len() < self.batch_size && iter.valid_for_prefix(&self.prefix) {
            let Some((key, value)) = iter.item() else {
                break;
            };
            match &self.strategy {
                ScanStrategy::PrimaryKeyScan => {
                    if self.record_matches(key, value)? {
                        keys.push(key.to_vec());
                    }
                }
                ScanStrategy::FullScan => keys.push(key.to_vec()),
                ScanStrategy::IndexedLookup { index } => {
                    if self.entry_matches(index, &key[self.prefix.len()..])? {
                        let list: KeyList = self.codec.decode(value)?;
                        let room = self.batch_size - keys.len();
                        let mut entry_keys = list.into_keys().into_iter();
                        keys.extend(entry_keys.by_ref().take(room));
                        self.pending.extend(entry_keys);
                    }
                }
            }
            iter.next();
        }

        Ok(if keys.is_empty() {
            Pull::End
        } else {
            Pull::Batch(keys)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        option::IndexOption,
        query::criteria::Criterion,
        store::{mem::MemStore, Transaction},
        test_util::{insert, user, Users},
        Indexer,
    };

    fn batches<K: KeySource, I: StoreIter>(source: &mut K, iter: &mut I) -> Vec<Vec<Vec<u8>>> {
        let mut out = Vec::new();
        while let Pull::Batch(keys) = source.pull(iter).unwrap() {
            out.push(keys);
        }
        out
    }

    #[test]
    fn primary_key_scan_respects_batch_size() {
        let indexer = Indexer::new(&IndexOption::default().batch_size(2)).unwrap();
        let (storer, store) = (Users::new(), MemStore::new());
        let mut txn = store.transaction();
        for (key, age) in [("1", 20), ("2", 31), ("3", 42), ("4", 53), ("5", 64)] {
            insert(&indexer, &storer, &mut txn, key, &user("u", "red", age));
        }

        let query = Query::new();
        let mut iter = txn.iter();
        let mut source = ScanSource::new(
            ScanStrategy::PrimaryKeyScan,
            indexer.keyspace(),
            &storer,
            &query,
            indexer.codec(),
        )
        .unwrap();
        let sizes: Vec<usize> = batches(&mut source, &mut iter)
            .iter()
            .map(Vec::len)
            .collect();
        assert_eq!(sizes, vec![2, 2, 1]);
        assert_eq!(source.pull(&mut iter).unwrap(), Pull::End);
    }

    #[test]
    fn primary_key_scan_filters_key_and_fields() {
        let indexer = Indexer::default();
        let (storer, store) = (Users::new(), MemStore::new());
        let mut txn = store.transaction();
        insert(&indexer, &storer, &mut txn, "a", &user("ann", "red", 30));
        insert(&indexer, &storer, &mut txn, "b", &user("bob", "blue", 30));
        insert(&indexer, &storer, &mut txn, "c", &user("cat", "red", 30));

        let query = Query::new()
            .key_criterion(Criterion::Gt(b"a".to_vec()))
            .criterion("team", Criterion::Eq(b"red".to_vec()));
        let mut iter = txn.iter();
        let mut source = ScanSource::new(
            ScanStrategy::PrimaryKeyScan,
            indexer.keyspace(),
            &storer,
            &query,
            indexer.codec(),
        )
        .unwrap();
        let found = batches(&mut source, &mut iter).concat();
        assert_eq!(found, vec![indexer.record_key(&storer, b"c").unwrap()]);
    }

    #[test]
    fn full_scan_yields_every_key_of_the_type() {
        let indexer = Indexer::default();
        let (storer, store) = (Users::new(), MemStore::new());
        let mut txn = store.transaction();
        insert(&indexer, &storer, &mut txn, "a", &user("ann", "red", 30));
        insert(&indexer, &storer, &mut txn, "b", &user("bob", "blue", 30));
        txn.set(b"other".to_vec(), b"x".to_vec()).unwrap();

        let query = Query::new()
            .index("team")
            .criterion("team", Criterion::Eq(b"red".to_vec()));
        let mut iter = txn.iter();
        let mut source = ScanSource::new(
            ScanStrategy::FullScan,
            indexer.keyspace(),
            &storer,
            &query,
            indexer.codec(),
        )
        .unwrap();
        let found = batches(&mut source, &mut iter).concat();
        assert_eq!(
            found,
            vec![
                indexer.record_key(&storer, b"a").unwrap(),
                indexer.record_key(&storer, b"b").unwrap(),
            ]
        );
    }

    #[test]
    fn large_entry_spills_across_batches() {
        let indexer = Indexer::new(&IndexOption::default().batch_size(2)).unwrap();
        let (storer, store) = (Users::new(), MemStore::new());
        let mut txn = store.transaction();
        for key in ["1", "2", "3"] {
            insert(&indexer, &storer, &mut txn, key, &user("u", "red", 30));
        }
        insert(&indexer, &storer, &mut txn, "4", &user("u", "blue", 30));
        insert(&indexer, &storer, &mut txn, "5", &user("u", "teal", 30));

        let query = Query::new()
            .index("team")
            .criterion("team", Criterion::Ne(b"blue".to_vec()));
        let mut iter = txn.iter();
        let mut source = ScanSource::new(
            ScanStrategy::IndexedLookup {
                index: "team".into(),
            },
            indexer.keyspace(),
            &storer,
            &query,
            indexer.codec(),
        )
        .unwrap();
        let found = batches(&mut source, &mut iter);
        assert!(found.iter().all(|batch| batch.len() <= 2));

        let record = |key: &[u8]| indexer.record_key(&storer, key).unwrap();
        assert_eq!(
            found.concat(),
            vec![record(b"1"), record(b"2"), record(b"3"), record(b"5")]
        );
    }
}
